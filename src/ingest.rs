use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, warn};

use crate::error::{PipelineError, Result};
use crate::series::{MatchRecord, parse_score};
use crate::table::{TwoLevelTable, parse_number};

pub const STANDARD_TOPIC: &str = "standard";
pub const MATCHES_TOPIC: &str = "matches";

/// Topics merged into the style table, base first.
pub const STYLE_TOPICS: [&str; 5] = [STANDARD_TOPIC, "passing", "possession", "defense", "shooting"];

/// `2024` → `"2024-25"`.
pub fn season_label(start_year: i32) -> String {
    format!("{start_year}-{:02}", (start_year + 1).rem_euclid(100))
}

#[derive(Debug, Clone)]
pub struct SeasonFiles {
    pub start_year: i32,
    pub season: String,
    pub topics: BTreeMap<String, PathBuf>,
    pub matches: Option<PathBuf>,
}

impl SeasonFiles {
    fn new(start_year: i32) -> Self {
        Self {
            start_year,
            season: season_label(start_year),
            topics: BTreeMap::new(),
            matches: None,
        }
    }

    pub fn topic(&self, topic: &str) -> Result<&Path> {
        self.topics.get(topic).map(PathBuf::as_path).ok_or_else(|| {
            PipelineError::schema(
                format!("season {}", self.season),
                format!("missing '{topic}' topic file"),
            )
        })
    }
}

/// `laliga_2023_defense.csv` → `(2023, "defense")`. Other names are `None`.
pub fn parse_file_name(file_name: &str, league: &str) -> Option<(i32, String)> {
    let stem = file_name.strip_suffix(".csv")?;
    let rest = stem.strip_prefix(league)?.strip_prefix('_')?;
    let (year, topic) = rest.split_once('_')?;
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) || topic.is_empty() {
        return None;
    }
    Some((year.parse().ok()?, topic.to_lowercase()))
}

pub fn discover(raw_dir: &Path, league: &str) -> Result<Vec<SeasonFiles>> {
    let mut by_year: BTreeMap<i32, SeasonFiles> = BTreeMap::new();

    for entry in fs::read_dir(raw_dir)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        let Some((year, topic)) = parse_file_name(name, league) else {
            continue;
        };

        let is_matches = topic == MATCHES_TOPIC;
        if !is_matches && !STYLE_TOPICS.contains(&topic.as_str()) {
            debug!(file = name, "ignoring topic");
            continue;
        }

        let season = by_year.entry(year).or_insert_with(|| SeasonFiles::new(year));
        if is_matches {
            season.matches = Some(entry.path());
        } else {
            season.topics.insert(topic, entry.path());
        }
    }

    Ok(by_year.into_values().collect())
}

fn table_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn record_cells(record: &StringRecord, width: usize) -> Vec<String> {
    let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
    if cells.len() < width {
        cells.resize(width, String::new());
    }
    cells
}

/// Reads a topic table whose first two records are the header levels.
pub fn read_two_level_csv(path: &Path, season: &str) -> Result<TwoLevelTable> {
    let name = table_name(path);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut records = reader.records();
    let (Some(outer), Some(inner)) = (records.next().transpose()?, records.next().transpose()?)
    else {
        return Err(PipelineError::schema(name, "expected two header rows"));
    };

    let width = outer.len().max(inner.len());
    let header = record_cells(&outer, width)
        .into_iter()
        .zip(record_cells(&inner, width))
        .collect();

    let mut rows = Vec::new();
    for record in records {
        rows.push(record_cells(&record?, width));
    }

    debug!(table = %name, columns = width, rows = rows.len(), "read topic table");
    Ok(TwoLevelTable {
        name,
        season: season.to_string(),
        header,
        rows,
    })
}

const MATCH_COLUMNS: [(&str, &[&str]); 6] = [
    ("matchday", &["week", "matchday", "round", "Wk"]),
    ("home_team", &["home_team", "homeTeam", "Home"]),
    ("away_team", &["away_team", "awayTeam", "Away"]),
    ("score", &["score", "Score"]),
    ("home_xg", &["home_xg", "homeXg", "homeXG"]),
    ("away_xg", &["away_xg", "awayXg", "awayXG"]),
];

fn match_column_indices(headers: &StringRecord, table: &str) -> Result<[usize; 6]> {
    let mut indices = [0usize; 6];
    for (slot, (field, accepted)) in indices.iter_mut().zip(MATCH_COLUMNS) {
        *slot = accepted
            .iter()
            .find_map(|name| headers.iter().position(|h| h.trim() == *name))
            .ok_or_else(|| {
                PipelineError::schema(
                    table,
                    format!("missing '{field}' column (accepted: {})", accepted.join(", ")),
                )
            })?;
    }
    Ok(indices)
}

/// Reads a season schedule. Rows without both team names are skipped.
pub fn read_match_csv(path: &Path, season: &str) -> Result<Vec<MatchRecord>> {
    let name = table_name(path);
    let mut reader = ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.headers()?.clone();
    let [matchday_idx, home_idx, away_idx, score_idx, home_xg_idx, away_xg_idx] =
        match_column_indices(&headers, &name)?;

    let mut matches = Vec::new();
    let mut skipped = 0usize;
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();

        let (home, away) = (field(home_idx), field(away_idx));
        if home.is_empty() || away.is_empty() {
            skipped += 1;
            continue;
        }

        let raw_matchday = field(matchday_idx);
        let matchday = parse_matchday(raw_matchday).ok_or_else(|| PipelineError::InvalidValue {
            table: name.clone(),
            row: row + 1,
            column: "matchday".to_string(),
            value: raw_matchday.to_string(),
        })?;

        let goals = parse_score(field(score_idx));
        matches.push(MatchRecord {
            season: season.to_string(),
            matchday,
            home_team: home.to_string(),
            away_team: away.to_string(),
            home_goals: goals.map(|(h, _)| h),
            away_goals: goals.map(|(_, a)| a),
            home_xg: parse_number(field(home_xg_idx)),
            away_xg: parse_number(field(away_xg_idx)),
        });
    }

    if skipped > 0 {
        warn!(table = %name, skipped, "skipped schedule rows without both teams");
    }
    Ok(matches)
}

/// Whole matchday number, at least 1. Accepts `"7"` and `"7.0"`.
fn parse_matchday(raw: &str) -> Option<u32> {
    let v = parse_number(raw)?;
    if v < 1.0 || v.fract() != 0.0 || v > f64::from(u32::MAX) {
        return None;
    }
    Some(v as u32)
}

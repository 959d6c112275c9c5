use std::collections::HashMap;
use std::path::PathBuf;

use tracing::warn;

use crate::classify::{StyleConfig, TrendConfig};
use crate::overview::DEFAULT_MATCHES_PER_SEASON;
use crate::series::DEFAULT_TEAM_ALIASES;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub raw_dir: PathBuf,
    pub out_dir: PathBuf,
    /// Second copy of every output table, for the static site.
    pub web_dir: Option<PathBuf>,
    pub league: String,
    pub matches_per_season: u32,
    pub team_aliases: HashMap<String, String>,
    pub xlsx_path: Option<PathBuf>,
    /// Start years to process; empty means every season discovered.
    pub seasons: Vec<i32>,
    pub trend: TrendConfig,
    pub style: StyleConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("data_raw"),
            out_dir: PathBuf::from("data_processed"),
            web_dir: None,
            league: "laliga".to_string(),
            matches_per_season: DEFAULT_MATCHES_PER_SEASON,
            team_aliases: DEFAULT_TEAM_ALIASES.clone(),
            xlsx_path: None,
            seasons: Vec::new(),
            trend: TrendConfig::default(),
            style: StyleConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by `DATASTORY_*` variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(dir) = var("DATASTORY_RAW_DIR") {
            cfg.raw_dir = PathBuf::from(dir);
        }
        if let Some(dir) = var("DATASTORY_OUT_DIR") {
            cfg.out_dir = PathBuf::from(dir);
        }
        cfg.web_dir = var("DATASTORY_WEB_DIR").map(PathBuf::from);
        if let Some(league) = var("DATASTORY_LEAGUE") {
            cfg.league = league;
        }
        if let Some(raw) = var("DATASTORY_MATCHES_PER_SEASON") {
            match raw.parse::<u32>() {
                Ok(n) if n > 0 => cfg.matches_per_season = n,
                _ => warn!(value = %raw, "ignoring invalid DATASTORY_MATCHES_PER_SEASON"),
            }
        }
        if let Some(raw) = var("DATASTORY_TEAM_ALIASES") {
            cfg.team_aliases.extend(parse_aliases(&raw));
        }
        cfg.xlsx_path = var("DATASTORY_XLSX").map(PathBuf::from);
        cfg
    }

    pub fn wants_season(&self, start_year: i32) -> bool {
        self.seasons.is_empty() || self.seasons.contains(&start_year)
    }
}

/// `"Betis=Real Betis;Atletico=Atletico Madrid"` → map. Malformed pairs are skipped.
pub fn parse_aliases(raw: &str) -> HashMap<String, String> {
    raw.split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let parsed = pair
                .split_once('=')
                .map(|(from, to)| (from.trim(), to.trim()))
                .filter(|(from, to)| !from.is_empty() && !to.is_empty());
            if parsed.is_none() {
                warn!(pair, "ignoring malformed team alias");
            }
            parsed.map(|(from, to)| (from.to_string(), to.to_string()))
        })
        .collect()
}

/// `"2020,2021"` → start years. Accepts season labels like `2020-21` too.
pub fn parse_season_list(raw: &str) -> Result<Vec<i32>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            let year = s.split_once('-').map_or(s, |(y, _)| y);
            year.parse::<i32>()
                .map_err(|_| format!("invalid season '{s}'"))
        })
        .collect()
}

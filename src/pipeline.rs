use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::classify::trends_by_team;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::export::{self, OutputTable};
use crate::flatten::flatten;
use crate::ingest::{self, STANDARD_TOPIC, STYLE_TOPICS, SeasonFiles};
use crate::merge::{DroppedTeam, merge};
use crate::overview::{self, EfficiencyRow, OverviewRow};
use crate::series::{self, EvolutionRow};
use crate::style::{self, StyleRecord};
use crate::summary::{self, SummaryRow};
use crate::table::FlatTable;

pub const REPORT_FILE: &str = "run_report.json";

#[derive(Debug, Clone)]
pub struct SeasonOutput {
    pub season: String,
    pub overview: Vec<OverviewRow>,
    pub style: Vec<StyleRecord>,
    pub evolution: Vec<EvolutionRow>,
    pub dropped: Vec<DroppedTeam>,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub seasons: Vec<String>,
    pub overview: Vec<OverviewRow>,
    pub efficiency: Vec<EfficiencyRow>,
    pub evolution: Vec<EvolutionRow>,
    pub style: Vec<StyleRecord>,
    pub summary: Vec<SummaryRow>,
    pub dropped: Vec<DroppedTeam>,
}

impl PipelineOutput {
    pub fn tables(&self) -> Vec<OutputTable> {
        vec![
            OutputTable::from_records(export::OVERVIEW_FILE, "Overview", &self.overview),
            OutputTable::from_records(export::EFFICIENCY_FILE, "Efficiency", &self.efficiency),
            OutputTable::from_records(export::EVOLUTION_FILE, "Evolution", &self.evolution),
            OutputTable::from_records(export::STYLE_FILE, "Style", &self.style),
            OutputTable::from_records(export::SUMMARY_FILE, "Summary", &self.summary),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TableCount {
    pub file: String,
    pub rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub generated_at: String,
    pub league: String,
    pub seasons: Vec<String>,
    pub tables: Vec<TableCount>,
    pub dropped_teams: Vec<DroppedTeam>,
    pub outputs: Vec<String>,
}

fn read_topic(files: &SeasonFiles, topic: &str) -> Result<FlatTable> {
    let raw = ingest::read_two_level_csv(files.topic(topic)?, &files.season)?;
    flatten(&raw)
}

/// Runs the per-season stages in order: overview, merged style metrics, match series.
pub fn process_season(files: &SeasonFiles, cfg: &PipelineConfig) -> Result<SeasonOutput> {
    info!(season = %files.season, "processing season");

    let standard = read_topic(files, STANDARD_TOPIC)?;
    let overview_rows = overview::overview(&standard)?;

    let others = STYLE_TOPICS
        .iter()
        .filter(|t| **t != STANDARD_TOPIC)
        .map(|t| read_topic(files, t))
        .collect::<Result<Vec<_>>>()?;
    let other_refs: Vec<&FlatTable> = others.iter().collect();
    let merged = merge(&standard, &other_refs)?;
    for dropped in &merged.dropped {
        warn!(
            season = %dropped.season,
            team = %dropped.team,
            missing_from = %dropped.missing_from,
            "team dropped from style merge"
        );
    }
    let style_rows = style::derive(&merged.table)?;

    let evolution = match &files.matches {
        Some(path) => {
            let matches = ingest::read_match_csv(path, &files.season)?;
            series::build(&matches, &cfg.team_aliases)
        }
        None => {
            warn!(season = %files.season, "no schedule file, evolution left empty");
            Vec::new()
        }
    };

    info!(
        season = %files.season,
        teams = overview_rows.len(),
        style_rows = style_rows.len(),
        evolution_rows = evolution.len(),
        "season done"
    );

    Ok(SeasonOutput {
        season: files.season.clone(),
        overview: overview_rows,
        style: style_rows,
        evolution,
        dropped: merged.dropped,
    })
}

/// Processes seasons in parallel and assembles the cross-season tables in season order.
pub fn build(seasons: &[SeasonFiles], cfg: &PipelineConfig) -> Result<PipelineOutput> {
    let per_season = seasons
        .par_iter()
        .map(|files| process_season(files, cfg))
        .collect::<Result<Vec<_>>>()?;

    let mut out = PipelineOutput::default();
    for season in per_season {
        out.seasons.push(season.season);
        out.overview.extend(season.overview);
        out.style.extend(season.style);
        out.evolution.extend(season.evolution);
        out.dropped.extend(season.dropped);
    }

    out.efficiency = overview::efficiency(&out.overview, cfg.matches_per_season);
    style::normalize_style(&mut out.style);
    let trends = trends_by_team(&out.evolution, cfg.trend);
    out.summary = summary::summarize(
        &out.overview,
        &out.efficiency,
        &trends,
        &out.style,
        cfg.style,
    );
    Ok(out)
}

pub fn select_seasons(cfg: &PipelineConfig) -> Result<Vec<SeasonFiles>> {
    let found = ingest::discover(&cfg.raw_dir, &cfg.league)?;
    let selected: Vec<SeasonFiles> = found
        .into_iter()
        .filter(|s| cfg.wants_season(s.start_year))
        .collect();
    if selected.is_empty() {
        return Err(PipelineError::schema(
            cfg.raw_dir.display().to_string(),
            format!("no {}_<year>_<topic>.csv files for the requested seasons", cfg.league),
        ));
    }
    info!(
        seasons = ?selected.iter().map(|s| s.season.as_str()).collect::<Vec<_>>(),
        "seasons found"
    );
    Ok(selected)
}

/// Writes every table to the output directory and its web mirror, plus the optional workbook.
pub fn write_outputs(tables: &[OutputTable], cfg: &PipelineConfig) -> Result<Vec<PathBuf>> {
    let mut dirs: Vec<&Path> = vec![cfg.out_dir.as_path()];
    if let Some(web) = &cfg.web_dir {
        dirs.push(web.as_path());
    }

    let mut written = Vec::new();
    for dir in dirs {
        for table in tables {
            export::write_csv(dir, table)?;
            let path = dir.join(table.file_name);
            info!(file = %path.display(), rows = table.record_count(), "wrote table");
            written.push(path);
        }
    }

    if let Some(path) = &cfg.xlsx_path {
        export::write_workbook(path, tables)?;
        info!(file = %path.display(), "wrote workbook");
        written.push(path.clone());
    }
    Ok(written)
}

pub fn write_report(report: &RunReport, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(REPORT_FILE);
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(report)?;
    fs::write(&tmp, json)?;
    fs::rename(&tmp, &path)?;
    Ok(path)
}

pub fn run(cfg: &PipelineConfig) -> Result<RunReport> {
    let seasons = select_seasons(cfg)?;
    let output = build(&seasons, cfg)?;
    let tables = output.tables();
    let written = write_outputs(&tables, cfg)?;

    if !output.dropped.is_empty() {
        warn!(count = output.dropped.len(), "teams dropped by the style merge");
    }

    let report = RunReport {
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        league: cfg.league.clone(),
        seasons: output.seasons.clone(),
        tables: tables
            .iter()
            .map(|t| TableCount {
                file: t.file_name.to_string(),
                rows: t.record_count(),
            })
            .collect(),
        dropped_teams: output.dropped.clone(),
        outputs: written.iter().map(|p| p.display().to_string()).collect(),
    };
    let report_path = write_report(&report, &cfg.out_dir)?;
    info!(file = %report_path.display(), "wrote run report");
    Ok(report)
}

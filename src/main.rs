use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};

use datastory::config::{PipelineConfig, parse_season_list};
use datastory::logging::init_logging;
use datastory::{flatten, ingest, pipeline};

#[derive(Parser)]
#[command(name = "datastory")]
#[command(about = "Builds the LaLiga datastory chart tables from raw season CSVs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and write every output table
    Run {
        /// Directory holding <league>_<year>_<topic>.csv files
        #[arg(long)]
        raw_dir: Option<PathBuf>,
        /// Directory the section CSVs are written to
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Extra directory receiving a copy of every table
        #[arg(long)]
        web_dir: Option<PathBuf>,
        /// File name prefix of the raw files
        #[arg(long)]
        league: Option<String>,
        /// Start years to process (comma-separated, e.g. 2020,2021)
        #[arg(long)]
        seasons: Option<String>,
        /// Matches in a season, used to project season xG
        #[arg(long)]
        matches_per_season: Option<u32>,
        /// Also write all tables into one workbook
        #[arg(long)]
        xlsx: Option<PathBuf>,
    },
    /// Flatten one topic file and list its column names
    Inspect {
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_logging();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            raw_dir,
            out_dir,
            web_dir,
            league,
            seasons,
            matches_per_season,
            xlsx,
        } => {
            let mut cfg = PipelineConfig::from_env();
            if let Some(dir) = raw_dir {
                cfg.raw_dir = dir;
            }
            if let Some(dir) = out_dir {
                cfg.out_dir = dir;
            }
            if web_dir.is_some() {
                cfg.web_dir = web_dir;
            }
            if let Some(league) = league {
                cfg.league = league;
            }
            if let Some(raw) = seasons {
                cfg.seasons = parse_season_list(&raw).map_err(|e| anyhow!(e))?;
            }
            if let Some(n) = matches_per_season {
                if n == 0 {
                    return Err(anyhow!("--matches-per-season must be at least 1"));
                }
                cfg.matches_per_season = n;
            }
            if xlsx.is_some() {
                cfg.xlsx_path = xlsx;
            }
            run(&cfg)
        }
        Commands::Inspect { file } => inspect(&file),
    }
}

fn run(cfg: &PipelineConfig) -> Result<()> {
    let report = pipeline::run(cfg)
        .with_context(|| format!("pipeline failed for {}", cfg.raw_dir.display()))?;

    println!("Datastory tables complete");
    println!("Seasons: {}", report.seasons.join(", "));
    for table in &report.tables {
        println!("{}: {} rows", table.file, table.rows);
    }
    if !report.dropped_teams.is_empty() {
        println!("Dropped from style merge: {}", report.dropped_teams.len());
        for dropped in report.dropped_teams.iter().take(6) {
            println!(
                "   - {} {} (missing from {})",
                dropped.season, dropped.team, dropped.missing_from
            );
        }
    }
    println!("Output: {}", cfg.out_dir.display());
    Ok(())
}

fn inspect(path: &Path) -> Result<()> {
    let season = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.split('_').nth(1))
        .and_then(|y| y.parse::<i32>().ok())
        .map(ingest::season_label)
        .unwrap_or_default();

    let raw = ingest::read_two_level_csv(path, &season)
        .with_context(|| format!("read {}", path.display()))?;
    let table = flatten::flatten(&raw).with_context(|| format!("flatten {}", path.display()))?;

    println!("{} ({} rows)", table.name, table.len());
    for (idx, column) in table.columns.iter().enumerate() {
        println!("{idx:>3}  {column}");
    }
    let missing_team = table.rows.iter().filter(|r| r.team.is_none()).count();
    if missing_team > 0 {
        println!("rows without team: {missing_team}");
    }
    Ok(())
}

use crate::columns::{ColumnBinding, StatSpec};
use crate::error::Result;
use crate::table::{FlatTable, parse_count, ratio, round_to};

pub const DEFAULT_MATCHES_PER_SEASON: u32 = 38;

const XG: StatSpec = StatSpec::new("xg", &["Expected_xG"]);
// The standard table has no conceded-xG column; non-penalty xG is the figure charted.
const XG_AGAINST: StatSpec = StatSpec::new("xg_against", &["Expected_npxG"]);
const MATCHES_PLAYED: StatSpec = StatSpec::new("matches_played", &["Playing Time_MP"]);
const GOALS: StatSpec = StatSpec::new("goals", &["Performance_Gls"]);

const OVERVIEW_STATS: &[StatSpec] = &[XG, XG_AGAINST, MATCHES_PLAYED, GOALS];

#[derive(Debug, Clone, PartialEq)]
pub struct OverviewRow {
    pub team: Option<String>,
    pub season: String,
    pub xg_per_game: Option<f64>,
    pub xga_per_game: Option<f64>,
    pub goals: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EfficiencyRow {
    pub team: Option<String>,
    pub season: String,
    pub xg: Option<f64>,
    pub goals: Option<u32>,
}

/// Per-game xG figures and goals from a flattened `standard` topic table.
/// Rows keep their source order; a row without a team is kept with an empty team.
pub fn overview(standard: &FlatTable) -> Result<Vec<OverviewRow>> {
    let binding = ColumnBinding::bind(standard, OVERVIEW_STATS)?;
    let goals_col = binding.column(GOALS.key).map(|c| c.index);

    let rows = standard
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let played = binding.value(standard, idx, MATCHES_PLAYED.key);
            let per_game = |spec: &StatSpec| {
                ratio(binding.value(standard, idx, spec.key), played).map(|v| round_to(v, 2))
            };
            OverviewRow {
                team: row.team.clone(),
                season: standard.season.clone(),
                xg_per_game: per_game(&XG),
                xga_per_game: per_game(&XG_AGAINST),
                goals: goals_col
                    .and_then(|col| standard.cell(idx, col))
                    .and_then(parse_count),
            }
        })
        .collect();
    Ok(rows)
}

/// Season-total xG projected from the rounded per-game figure, sorted by season then team.
pub fn efficiency(rows: &[OverviewRow], matches_per_season: u32) -> Vec<EfficiencyRow> {
    let mut out: Vec<EfficiencyRow> = rows
        .iter()
        .map(|r| EfficiencyRow {
            team: r.team.clone(),
            season: r.season.clone(),
            xg: r
                .xg_per_game
                .map(|v| round_to(v * f64::from(matches_per_season), 1)),
            goals: r.goals,
        })
        .collect();
    out.sort_by(|a, b| {
        a.season
            .cmp(&b.season)
            .then_with(|| a.team.is_none().cmp(&b.team.is_none()))
            .then_with(|| a.team.cmp(&b.team))
    });
    out
}

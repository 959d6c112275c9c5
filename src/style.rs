use crate::columns::{ColumnBinding, StatSpec};
use crate::error::Result;
use crate::normalize::normalize_by_season;
use crate::table::{FlatTable, ratio};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleMetric {
    PossessionPct,
    XgPer90,
    ShotsPer90,
    TouchesAttPenAreaPer90,
    ProgressivePassesPer90,
    TacklesInterceptionsPer90,
    TacklesWonPer90,
    BlocksPer90,
    InterceptionsPer90,
    DefActionsAttThirdPer90,
    ProgressiveCarriesPer90,
    LongPassPct,
    CrossesIntoPenAreaPer90,
    TouchesPerPossession,
}

pub const STYLE_METRIC_COUNT: usize = 14;

impl StyleMetric {
    /// Output column order.
    pub const ALL: [StyleMetric; STYLE_METRIC_COUNT] = [
        StyleMetric::PossessionPct,
        StyleMetric::XgPer90,
        StyleMetric::ShotsPer90,
        StyleMetric::TouchesAttPenAreaPer90,
        StyleMetric::ProgressivePassesPer90,
        StyleMetric::TacklesInterceptionsPer90,
        StyleMetric::TacklesWonPer90,
        StyleMetric::BlocksPer90,
        StyleMetric::InterceptionsPer90,
        StyleMetric::DefActionsAttThirdPer90,
        StyleMetric::ProgressiveCarriesPer90,
        StyleMetric::LongPassPct,
        StyleMetric::CrossesIntoPenAreaPer90,
        StyleMetric::TouchesPerPossession,
    ];

    pub fn column(self) -> &'static str {
        match self {
            StyleMetric::PossessionPct => "possession_pct",
            StyleMetric::XgPer90 => "xg_per90",
            StyleMetric::ShotsPer90 => "shots_per90",
            StyleMetric::TouchesAttPenAreaPer90 => "touches_att_pen_area_per90",
            StyleMetric::ProgressivePassesPer90 => "progressive_passes_per90",
            StyleMetric::TacklesInterceptionsPer90 => "tackles_interceptions_per90",
            StyleMetric::TacklesWonPer90 => "tackles_won_per90",
            StyleMetric::BlocksPer90 => "blocks_per90",
            StyleMetric::InterceptionsPer90 => "interceptions_per90",
            StyleMetric::DefActionsAttThirdPer90 => "def_actions_att_third_per90",
            StyleMetric::ProgressiveCarriesPer90 => "progressive_carries_per90",
            StyleMetric::LongPassPct => "long_pass_pct",
            StyleMetric::CrossesIntoPenAreaPer90 => "crosses_into_pen_area_per90",
            StyleMetric::TouchesPerPossession => "touches_per_possession",
        }
    }

    pub fn norm_column(self) -> String {
        format!("{}_norm", self.column())
    }

    fn index(self) -> usize {
        self as usize
    }
}

// Logical source statistics. Candidates are tried in order through the column resolver.
const NINETIES: StatSpec = StatSpec::new("nineties", &["Playing Time_90s"]);
const POSS: StatSpec = StatSpec::new("poss", &["Poss"]);
const XG_90: StatSpec = StatSpec::new("xg_90", &["Per 90 Minutes_xG"]);
const SHOTS_90: StatSpec = StatSpec::new("shots_90", &["Standard_Sh/90"]);
const TOUCHES_ATT_PEN: StatSpec = StatSpec::new("touches_att_pen", &["Touches_Att Pen"]);
const PRG_PASSES: StatSpec = StatSpec::new("prg_passes", &["PrgP"]);
const TKL_INT: StatSpec = StatSpec::new("tkl_int", &["Tkl+Int"]);
const TKL_WON: StatSpec = StatSpec::new("tkl_won", &["TklW"]);
const BLOCKS_SHOTS: StatSpec = StatSpec::new("blocks_shots", &["Blocks_Sh"]);
const BLOCKS_PASSES: StatSpec = StatSpec::new("blocks_passes", &["Blocks_Pass"]);
const INTERCEPTIONS: StatSpec = StatSpec::new("interceptions", &["Int"]);
const TACKLES_ATT_THIRD: StatSpec =
    StatSpec::new("tackles_att_third", &["Tackles_Att 3rd", "Att 3rd"]);
const PRG_CARRIES: StatSpec = StatSpec::new("prg_carries", &["PrgC"]);
const LONG_CMP_PCT: StatSpec = StatSpec::new("long_cmp_pct", &["Long_Cmp%"]);
const CROSSES_PEN_AREA: StatSpec = StatSpec::new("crosses_pen_area", &["CrsPA"]);
const TOUCHES: StatSpec = StatSpec::new("touches", &["Touches_Touches"]);

pub const STYLE_SOURCE_STATS: &[StatSpec] = &[
    NINETIES,
    POSS,
    XG_90,
    SHOTS_90,
    TOUCHES_ATT_PEN,
    PRG_PASSES,
    TKL_INT,
    TKL_WON,
    BLOCKS_SHOTS,
    BLOCKS_PASSES,
    INTERCEPTIONS,
    TACKLES_ATT_THIRD,
    PRG_CARRIES,
    LONG_CMP_PCT,
    CROSSES_PEN_AREA,
    TOUCHES,
];

#[derive(Debug, Clone, PartialEq)]
pub struct StyleRecord {
    pub season: String,
    pub team: String,
    pub values: [Option<f64>; STYLE_METRIC_COUNT],
    /// Season-normalized scores, filled by [`normalize_style`].
    pub norms: [Option<f64>; STYLE_METRIC_COUNT],
}

impl StyleRecord {
    pub fn new(season: &str, team: &str) -> Self {
        Self {
            season: season.to_string(),
            team: team.to_string(),
            values: [None; STYLE_METRIC_COUNT],
            norms: [None; STYLE_METRIC_COUNT],
        }
    }

    pub fn value(&self, metric: StyleMetric) -> Option<f64> {
        self.values[metric.index()]
    }

    pub fn norm(&self, metric: StyleMetric) -> Option<f64> {
        self.norms[metric.index()]
    }

    pub fn set(&mut self, metric: StyleMetric, value: Option<f64>) {
        self.values[metric.index()] = value;
    }

    pub fn set_norm(&mut self, metric: StyleMetric, value: Option<f64>) {
        self.norms[metric.index()] = value;
    }
}

/// Derives the style metrics from a merged season table.
///
/// Per-90 rates divide by the 90s-played column, resolved once for the table.
/// Percentages and values the source already expresses per 90 pass through.
pub fn derive(merged: &FlatTable) -> Result<Vec<StyleRecord>> {
    let binding = ColumnBinding::bind(merged, STYLE_SOURCE_STATS)?;
    let stat = |row: usize, spec: &StatSpec| binding.value(merged, row, spec.key);

    let mut out = Vec::with_capacity(merged.len());
    for (idx, row) in merged.rows.iter().enumerate() {
        let Some(team) = row.team.as_deref() else {
            continue;
        };
        let nineties = stat(idx, &NINETIES);
        let per90 = |spec: &StatSpec| ratio(stat(idx, spec), nineties);
        let blocks = match (stat(idx, &BLOCKS_SHOTS), stat(idx, &BLOCKS_PASSES)) {
            (Some(shots), Some(passes)) => Some(shots + passes),
            _ => None,
        };

        let mut rec = StyleRecord::new(&merged.season, team);
        rec.set(StyleMetric::PossessionPct, stat(idx, &POSS));
        rec.set(StyleMetric::XgPer90, stat(idx, &XG_90));
        rec.set(StyleMetric::ShotsPer90, stat(idx, &SHOTS_90));
        rec.set(StyleMetric::TouchesAttPenAreaPer90, per90(&TOUCHES_ATT_PEN));
        rec.set(StyleMetric::ProgressivePassesPer90, per90(&PRG_PASSES));
        rec.set(StyleMetric::TacklesInterceptionsPer90, per90(&TKL_INT));
        rec.set(StyleMetric::TacklesWonPer90, per90(&TKL_WON));
        rec.set(StyleMetric::BlocksPer90, ratio(blocks, nineties));
        rec.set(StyleMetric::InterceptionsPer90, per90(&INTERCEPTIONS));
        rec.set(StyleMetric::DefActionsAttThirdPer90, per90(&TACKLES_ATT_THIRD));
        rec.set(StyleMetric::ProgressiveCarriesPer90, per90(&PRG_CARRIES));
        rec.set(StyleMetric::LongPassPct, stat(idx, &LONG_CMP_PCT));
        rec.set(StyleMetric::CrossesIntoPenAreaPer90, per90(&CROSSES_PEN_AREA));
        rec.set(
            StyleMetric::TouchesPerPossession,
            ratio(stat(idx, &TOUCHES), stat(idx, &POSS)),
        );
        out.push(rec);
    }
    Ok(out)
}

/// Fills `norms` for every metric, season by season, across all records.
pub fn normalize_style(records: &mut [StyleRecord]) {
    let seasons: Vec<String> = records.iter().map(|r| r.season.clone()).collect();
    let season_refs: Vec<&str> = seasons.iter().map(|s| s.as_str()).collect();
    for metric in StyleMetric::ALL {
        let values: Vec<Option<f64>> = records.iter().map(|r| r.value(metric)).collect();
        let norms = normalize_by_season(&season_refs, &values);
        for (rec, norm) in records.iter_mut().zip(norms) {
            rec.set_norm(metric, norm);
        }
    }
}

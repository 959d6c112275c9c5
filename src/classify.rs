use std::collections::BTreeMap;
use std::fmt;

use crate::series::EvolutionRow;
use crate::style::{StyleMetric, StyleRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    pub fn label(self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Stable => "stable",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayStyle {
    Ofensiu,
    Defensiu,
    Equilibrat,
}

impl PlayStyle {
    pub fn label(self) -> &'static str {
        match self {
            PlayStyle::Ofensiu => "Ofensiu",
            PlayStyle::Defensiu => "Defensiu",
            PlayStyle::Equilibrat => "Equilibrat",
        }
    }
}

impl fmt::Display for PlayStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TrendConfig {
    pub min_matchdays: usize,
    pub delta_threshold: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            min_matchdays: 6,
            delta_threshold: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StyleConfig {
    pub threshold: f64,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self { threshold: 0.6 }
    }
}

/// Compares the mean cumulative xG differential of the first and last thirds.
///
/// Both thirds are `len / 3` long, so middle entries left over by the floor
/// belong to neither. Missing entries are excluded from the means.
pub fn classify_trend(cumulative_xg_diff: &[Option<f64>], cfg: TrendConfig) -> Trend {
    let n = cumulative_xg_diff.len();
    if n < cfg.min_matchdays {
        return Trend::Stable;
    }
    let k = n / 3;
    let (Some(first), Some(last)) = (
        mean_present(&cumulative_xg_diff[..k]),
        mean_present(&cumulative_xg_diff[n - k..]),
    ) else {
        return Trend::Stable;
    };
    let delta = last - first;
    if delta > cfg.delta_threshold {
        Trend::Up
    } else if delta < -cfg.delta_threshold {
        Trend::Down
    } else {
        Trend::Stable
    }
}

/// Trend per (season, team) of an evolution table, sorted by season then team.
pub fn trends_by_team(rows: &[EvolutionRow], cfg: TrendConfig) -> Vec<(String, String, Trend)> {
    let mut groups: BTreeMap<(&str, &str), Vec<&EvolutionRow>> = BTreeMap::new();
    for row in rows {
        groups
            .entry((row.season.as_str(), row.team.as_str()))
            .or_default()
            .push(row);
    }

    groups
        .into_iter()
        .map(|((season, team), mut group)| {
            group.sort_by_key(|r| r.matchday);
            let series: Vec<Option<f64>> = group.iter().map(|r| r.xg_diff_cum).collect();
            (season.to_string(), team.to_string(), classify_trend(&series, cfg))
        })
        .collect()
}

/// Offensive rule first, then defensive; missing scores never pass a threshold.
pub fn classify_style(row: &StyleRecord, cfg: StyleConfig) -> PlayStyle {
    let above = |metric: StyleMetric| row.norm(metric).is_some_and(|v| v > cfg.threshold);

    if above(StyleMetric::XgPer90) && above(StyleMetric::ProgressivePassesPer90) {
        PlayStyle::Ofensiu
    } else if above(StyleMetric::TacklesInterceptionsPer90) && above(StyleMetric::BlocksPer90) {
        PlayStyle::Defensiu
    } else {
        PlayStyle::Equilibrat
    }
}

fn mean_present(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    Some(present.iter().sum::<f64>() / present.len() as f64)
}

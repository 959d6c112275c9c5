use std::collections::HashMap;

use crate::classify::{PlayStyle, StyleConfig, Trend, classify_style};
use crate::overview::{EfficiencyRow, OverviewRow};
use crate::style::StyleRecord;
use crate::table::round_to;

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub season: String,
    pub team: String,
    pub performance_xg: Option<f64>,
    pub efficiency: Option<f64>,
    pub trend: Option<Trend>,
    pub play_style: Option<PlayStyle>,
}

type Key<'a> = (&'a str, &'a str);

/// One row per team-season present in both KPI tables, in overview order.
///
/// Trend and style are attached when the (season, team) key matches and left
/// empty otherwise. Overview rows without a team cannot be keyed and are skipped.
pub fn summarize(
    overview: &[OverviewRow],
    efficiency: &[EfficiencyRow],
    trends: &[(String, String, Trend)],
    styles: &[StyleRecord],
    style_cfg: StyleConfig,
) -> Vec<SummaryRow> {
    let mut eff_by_key: HashMap<Key<'_>, &EfficiencyRow> = HashMap::new();
    for row in efficiency {
        if let Some(team) = row.team.as_deref() {
            eff_by_key.entry((row.season.as_str(), team)).or_insert(row);
        }
    }

    let trend_by_key: HashMap<Key<'_>, Trend> = trends
        .iter()
        .map(|(season, team, trend)| ((season.as_str(), team.as_str()), *trend))
        .collect();

    let mut style_by_key: HashMap<Key<'_>, PlayStyle> = HashMap::new();
    for record in styles {
        style_by_key
            .entry((record.season.as_str(), record.team.as_str()))
            .or_insert_with(|| classify_style(record, style_cfg));
    }

    overview
        .iter()
        .filter_map(|perf| {
            let team = perf.team.as_deref()?;
            let key = (perf.season.as_str(), team);
            let eff = eff_by_key.get(&key)?;
            Some(SummaryRow {
                season: perf.season.clone(),
                team: team.to_string(),
                performance_xg: performance_xg(perf),
                efficiency: efficiency_kpi(eff),
                trend: trend_by_key.get(&key).copied(),
                play_style: style_by_key.get(&key).copied(),
            })
        })
        .collect()
}

/// Per-game xG for minus xG against.
pub fn performance_xg(row: &OverviewRow) -> Option<f64> {
    let (xg, xga) = (row.xg_per_game?, row.xga_per_game?);
    Some(round_to(xg - xga, 2))
}

/// Goals scored above (or below) the season's projected xG.
pub fn efficiency_kpi(row: &EfficiencyRow) -> Option<f64> {
    let (goals, xg) = (row.goals?, row.xg?);
    Some(round_to(f64::from(goals) - xg, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::StyleMetric;

    fn perf(team: Option<&str>, xg: f64, xga: f64) -> OverviewRow {
        OverviewRow {
            team: team.map(str::to_string),
            season: "2023-24".to_string(),
            xg_per_game: Some(xg),
            xga_per_game: Some(xga),
            goals: Some(50),
        }
    }

    fn eff(team: &str, xg: f64, goals: u32) -> EfficiencyRow {
        EfficiencyRow {
            team: Some(team.to_string()),
            season: "2023-24".to_string(),
            xg: Some(xg),
            goals: Some(goals),
        }
    }

    #[test]
    fn kpis_are_inner_joined_and_keep_overview_order() {
        let overview = vec![
            perf(Some("Sevilla"), 1.4, 1.2),
            perf(Some("Girona"), 2.1, 1.0),
            perf(Some("Almeria"), 1.0, 1.9),
        ];
        let efficiency = vec![eff("Girona", 79.8, 85), eff("Sevilla", 53.2, 48)];
        let out = summarize(&overview, &efficiency, &[], &[], StyleConfig::default());

        let teams: Vec<_> = out.iter().map(|r| r.team.as_str()).collect();
        assert_eq!(teams, vec!["Sevilla", "Girona"]);
        assert_eq!(out[0].performance_xg, Some(0.2));
        assert_eq!(out[0].efficiency, Some(-5.2));
        assert_eq!(out[1].efficiency, Some(5.2));
    }

    #[test]
    fn unmatched_trend_and_style_stay_empty() {
        let overview = vec![perf(Some("Cadiz"), 0.9, 1.3), perf(Some("Getafe"), 1.1, 1.1)];
        let efficiency = vec![eff("Cadiz", 34.2, 26), eff("Getafe", 41.8, 42)];
        let trends = vec![("2023-24".to_string(), "Getafe".to_string(), Trend::Down)];
        let mut style = StyleRecord::new("2023-24", "Getafe");
        style.set_norm(StyleMetric::TacklesInterceptionsPer90, Some(0.95));
        style.set_norm(StyleMetric::BlocksPer90, Some(0.7));

        let out = summarize(&overview, &efficiency, &trends, &[style], StyleConfig::default());
        assert_eq!(out[0].trend, None);
        assert_eq!(out[0].play_style, None);
        assert_eq!(out[1].trend, Some(Trend::Down));
        assert_eq!(out[1].play_style, Some(PlayStyle::Defensiu));
    }

    #[test]
    fn rows_without_team_never_match() {
        let overview = vec![perf(None, 1.0, 1.0)];
        let efficiency = vec![EfficiencyRow {
            team: None,
            season: "2023-24".to_string(),
            xg: Some(38.0),
            goals: Some(40),
        }];
        assert!(summarize(&overview, &efficiency, &[], &[], StyleConfig::default()).is_empty());
    }

    #[test]
    fn missing_operands_give_missing_kpis() {
        let mut row = perf(Some("Mallorca"), 1.0, 1.0);
        row.xga_per_game = None;
        assert_eq!(performance_xg(&row), None);
        let mut e = eff("Mallorca", 40.0, 33);
        e.goals = None;
        assert_eq!(efficiency_kpi(&e), None);
    }
}

use std::collections::HashMap;
use std::path::PathBuf;

use datastory::classify::{PlayStyle, StyleConfig, Trend, TrendConfig, classify_style, classify_trend};
use datastory::columns::resolve;
use datastory::flatten::flatten;
use datastory::ingest::read_two_level_csv;
use datastory::merge::merge;
use datastory::normalize::normalize_by_season;
use datastory::series::{self, MatchRecord, TeamMatchRow, accumulate};
use datastory::style::{StyleMetric, StyleRecord};
use datastory::table::{FlatRow, FlatTable};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("raw");
    path.push(name);
    path
}

fn table(name: &str, teams: &[&str]) -> FlatTable {
    FlatTable {
        name: name.to_string(),
        season: "2022-23".to_string(),
        columns: vec!["stat".to_string(), "url".to_string()],
        rows: teams
            .iter()
            .map(|t| FlatRow {
                team: Some(t.to_string()),
                cells: vec!["1".to_string(), format!("https://x/{t}-Stats")],
            })
            .collect(),
    }
}

fn round_robin() -> Vec<MatchRecord> {
    let teams = ["Alpha", "Bravo", "Charlie", "Delta"];
    let pairings = [(0, 1, 2, 3), (0, 2, 1, 3), (0, 3, 1, 2)];
    let mut matches = Vec::new();
    for leg in 0..2u32 {
        for (round, (a, b, c, d)) in pairings.iter().enumerate() {
            let matchday = leg * 3 + round as u32 + 1;
            for (i, (h, aw)) in [(a, b), (c, d)].into_iter().enumerate() {
                let (home, away) = if leg == 0 { (*h, *aw) } else { (*aw, *h) };
                let seed = matchday as usize * 3 + i;
                matches.push(MatchRecord {
                    season: "2022-23".to_string(),
                    matchday,
                    home_team: teams[home].to_string(),
                    away_team: teams[away].to_string(),
                    home_goals: Some((seed % 4) as u32),
                    away_goals: Some((seed % 3) as u32),
                    home_xg: Some(0.5 + (seed % 5) as f64 * 0.3),
                    away_xg: Some(0.4 + (seed % 7) as f64 * 0.2),
                });
            }
        }
    }
    matches
}

#[test]
fn resolver_prefers_exact_then_prefix_then_suffix() {
    let columns: Vec<String> = ["Expected_xG", "xG_Unnamed: 4_level_1", "xG", "Per 90 Minutes_xG"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(resolve(&columns, "xG").unwrap().index, 2);
    assert_eq!(resolve(&columns[..2], "xG").unwrap().index, 1);
    assert_eq!(resolve(&columns[..1], "xG").unwrap().index, 0);
    assert!(resolve(&columns, "npxG").is_err());
}

#[test]
fn fixture_topic_flattens_with_team_names() {
    let raw = read_two_level_csv(&fixture_path("laliga_2023_standard.csv"), "2023-24").unwrap();
    let flat = flatten(&raw).unwrap();
    assert!(flat.columns.iter().all(|c| !c.contains("players_used")));
    assert_eq!(flat.columns[0], "Poss");
    assert_eq!(flat.columns.last().map(String::as_str), Some("url"));
    let teams: Vec<_> = flat.rows.iter().filter_map(|r| r.team.as_deref()).collect();
    assert_eq!(
        teams,
        vec!["Real Madrid", "Barcelona", "Girona", "Real Betis", "Getafe"]
    );
}

#[test]
fn merger_keeps_only_teams_in_every_topic() {
    let standard = table("standard", &["A", "B"]);
    let passing = table("passing", &["A"]);
    let out = merge(&standard, &[&passing]).unwrap();
    assert_eq!(out.table.len(), 1);
    assert_eq!(out.table.rows[0].team.as_deref(), Some("A"));
    assert_eq!(out.table.columns, vec!["stat", "url", "stat"]);
    assert_eq!(out.dropped.len(), 1);
    assert_eq!(out.dropped[0].team, "B");
}

#[test]
fn normalizer_is_bounded_and_hits_both_ends() {
    let seasons: Vec<&str> = (0..30)
        .map(|i| match i % 3 {
            0 => "2020-21",
            1 => "2021-22",
            _ => "2022-23",
        })
        .collect();
    let values: Vec<Option<f64>> = (0..30)
        .map(|i| if i % 7 == 0 { None } else { Some(((i * 13) % 17) as f64 * 1.5) })
        .collect();
    let norms = normalize_by_season(&seasons, &values);

    for season in ["2020-21", "2021-22", "2022-23"] {
        let group: Vec<f64> = seasons
            .iter()
            .zip(&norms)
            .filter(|(s, _)| **s == season)
            .filter_map(|(_, n)| *n)
            .collect();
        assert!(group.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(group.contains(&0.0));
        assert!(group.contains(&1.0));
    }
    for (value, norm) in values.iter().zip(&norms) {
        assert_eq!(value.is_none(), norm.is_none());
    }
}

#[test]
fn final_cumulative_points_equal_sum_of_match_points() {
    let matches = round_robin();
    let evolution = series::build(&matches, &HashMap::new());

    let mut per_match: HashMap<String, u32> = HashMap::new();
    for m in &matches {
        let [home, away] = m.team_rows();
        assert_eq!(home.goal_diff.map(|g| -g), away.goal_diff);
        *per_match.entry(home.team).or_default() += home.points.unwrap();
        *per_match.entry(away.team).or_default() += away.points.unwrap();
    }

    for (team, total) in per_match {
        let last = evolution
            .iter()
            .filter(|r| r.team == team)
            .max_by_key(|r| r.matchday)
            .unwrap();
        assert_eq!(last.matchday, 6);
        assert_eq!(last.points_cum, Some(total));
    }
}

#[test]
fn win_loss_draw_accumulates_to_three_three_four() {
    let rows: Vec<TeamMatchRow> = [3, 0, 1]
        .iter()
        .enumerate()
        .map(|(i, p)| TeamMatchRow {
            team: "Osasuna".to_string(),
            season: "2022-23".to_string(),
            matchday: i as u32 + 1,
            points: Some(*p),
            goal_diff: Some(0),
            xg_diff: Some(0.0),
        })
        .collect();
    let cum: Vec<_> = accumulate(&rows).iter().map(|r| r.points_cum).collect();
    assert_eq!(cum, vec![Some(3), Some(3), Some(4)]);
}

#[test]
fn trend_needs_six_matchdays_and_more_than_threshold() {
    let cfg = TrendConfig::default();
    let five: Vec<Option<f64>> = (0..5).map(|i| Some(i as f64 * 10.0)).collect();
    assert_eq!(classify_trend(&five, cfg), Trend::Stable);

    let flat_then_up = [0.0, 0.0, 0.0, 0.0, 0.3, 0.3].map(Some);
    assert_eq!(classify_trend(&flat_then_up, cfg), Trend::Stable);
    let down = [0.0, 0.0, 0.0, 0.0, -0.5, -0.5].map(Some);
    assert_eq!(classify_trend(&down, cfg), Trend::Down);
}

#[test]
fn offensive_style_wins_when_every_score_is_high() {
    let mut rec = StyleRecord::new("2022-23", "Villarreal");
    for metric in StyleMetric::ALL {
        rec.set_norm(metric, Some(0.9));
    }
    assert_eq!(classify_style(&rec, StyleConfig::default()), PlayStyle::Ofensiu);
}

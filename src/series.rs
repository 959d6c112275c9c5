use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use tracing::warn;

/// Exact-string spellings the schedule source uses for teams the statistics
/// source names differently.
pub static DEFAULT_TEAM_ALIASES: Lazy<HashMap<String, String>> = Lazy::new(|| {
    HashMap::from([("Betis".to_string(), "Real Betis".to_string())])
});

#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub season: String,
    pub matchday: u32,
    pub home_team: String,
    pub away_team: String,
    pub home_goals: Option<u32>,
    pub away_goals: Option<u32>,
    pub home_xg: Option<f64>,
    pub away_xg: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamMatchRow {
    pub team: String,
    pub season: String,
    pub matchday: u32,
    pub points: Option<u32>,
    pub goal_diff: Option<i32>,
    pub xg_diff: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionRow {
    pub team: String,
    pub season: String,
    pub matchday: u32,
    pub points_cum: Option<u32>,
    pub goal_diff_cum: Option<i32>,
    pub xg_diff_cum: Option<f64>,
}

/// `"2–1"` → `(2, 1)`. En-dashes are read as hyphens; anything else unparseable is missing.
/// Goal counts beyond `i32::MAX` are treated as unparseable.
pub fn parse_score(raw: &str) -> Option<(u32, u32)> {
    let normalized = raw.trim().replace('–', "-");
    if normalized.is_empty() {
        return None;
    }
    let (home, away) = normalized.split_once('-')?;
    let goals = |s: &str| {
        let n = s.trim().parse::<i32>().ok()?;
        u32::try_from(n).ok()
    };
    Some((goals(home)?, goals(away)?))
}

pub fn points_for(own: u32, opponent: u32) -> u32 {
    if own > opponent {
        3
    } else if own == opponent {
        1
    } else {
        0
    }
}

impl MatchRecord {
    /// Home row then away row.
    pub fn team_rows(&self) -> [TeamMatchRow; 2] {
        [
            self.side(&self.home_team, self.home_goals, self.away_goals, self.home_xg),
            self.side(&self.away_team, self.away_goals, self.home_goals, self.away_xg),
        ]
    }

    fn side(
        &self,
        team: &str,
        own: Option<u32>,
        opponent: Option<u32>,
        own_xg: Option<f64>,
    ) -> TeamMatchRow {
        let score = own.zip(opponent);
        TeamMatchRow {
            team: team.to_string(),
            season: self.season.clone(),
            matchday: self.matchday,
            points: score.map(|(o, p)| points_for(o, p)),
            goal_diff: score
                .and_then(|(o, p)| i32::try_from(i64::from(o) - i64::from(p)).ok()),
            xg_diff: own.zip(own_xg).map(|(goals, xg)| f64::from(goals) - xg),
        }
    }
}

/// Expands matches into team rows and accumulates them per team in matchday order.
///
/// Output is sorted by team then matchday. A missing per-match value leaves
/// that row's running total missing and is excluded from later totals.
/// Aliases are applied to the finished series.
pub fn build(matches: &[MatchRecord], aliases: &HashMap<String, String>) -> Vec<EvolutionRow> {
    let mut by_team: BTreeMap<&str, Vec<TeamMatchRow>> = BTreeMap::new();
    for m in matches {
        let [home, away] = m.team_rows();
        by_team.entry(m.home_team.as_str()).or_default().push(home);
        by_team.entry(m.away_team.as_str()).or_default().push(away);
    }

    let mut out = Vec::with_capacity(matches.len() * 2);
    for (team, mut rows) in by_team {
        // Stable: duplicate matchdays keep schedule order.
        rows.sort_by_key(|r| r.matchday);
        if rows.windows(2).any(|w| w[0].matchday == w[1].matchday) {
            warn!(team, season = %rows[0].season, "duplicate matchday in schedule");
        }
        out.extend(accumulate(&rows));
    }

    for row in &mut out {
        if let Some(canonical) = aliases.get(&row.team) {
            row.team = canonical.clone();
        }
    }
    out
}

/// Running sums over rows already in matchday order.
pub fn accumulate(rows: &[TeamMatchRow]) -> Vec<EvolutionRow> {
    let mut points = 0u32;
    let mut goal_diff = 0i32;
    let mut xg_diff = 0.0f64;

    rows.iter()
        .map(|r| {
            let points_cum = r.points.map(|p| {
                points += p;
                points
            });
            let goal_diff_cum = r.goal_diff.map(|g| {
                goal_diff = goal_diff.saturating_add(g);
                goal_diff
            });
            let xg_diff_cum = r.xg_diff.map(|x| {
                xg_diff += x;
                xg_diff
            });
            EvolutionRow {
                team: r.team.clone(),
                season: r.season.clone(),
                matchday: r.matchday,
                points_cum,
                goal_diff_cum,
                xg_diff_cum,
            }
        })
        .collect()
}

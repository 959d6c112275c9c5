use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::error::{PipelineError, Result};
use crate::flatten::URL_COLUMN;
use crate::table::{FlatRow, FlatTable};

/// A team removed by the inner join because one topic had no row for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedTeam {
    pub season: String,
    pub team: String,
    pub missing_from: String,
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub table: FlatTable,
    pub dropped: Vec<DroppedTeam>,
}

/// Inner-joins same-season topic tables on team, keeping base row order.
///
/// Columns are concatenated base first; non-base url columns are skipped and
/// duplicate names are kept, so lookups rely on first-match resolution.
pub fn merge(base: &FlatTable, others: &[&FlatTable]) -> Result<MergeOutcome> {
    for other in others {
        if other.season != base.season {
            return Err(PipelineError::schema(
                &other.name,
                format!(
                    "season {} does not match base season {}",
                    other.season, base.season
                ),
            ));
        }
    }

    let mut columns = base.columns.clone();
    let mut lookups = Vec::with_capacity(others.len());
    for other in others {
        let kept: Vec<usize> = other
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.as_str() != URL_COLUMN)
            .map(|(idx, _)| idx)
            .collect();
        columns.extend(kept.iter().map(|&idx| other.columns[idx].clone()));
        lookups.push((*other, kept, first_row_by_team(other)));
    }

    let mut rows = Vec::new();
    let mut dropped = Vec::new();
    for row in &base.rows {
        let Some(team) = row.team.as_deref() else {
            continue;
        };
        let mut cells = row.cells.clone();
        let mut complete = true;
        for (other, kept, by_team) in &lookups {
            let Some(&other_row) = by_team.get(team) else {
                dropped.push(DroppedTeam {
                    season: base.season.clone(),
                    team: team.to_string(),
                    missing_from: other.name.clone(),
                });
                complete = false;
                break;
            };
            let source = &other.rows[other_row].cells;
            cells.extend(
                kept.iter()
                    .map(|&idx| source.get(idx).cloned().unwrap_or_default()),
            );
        }
        if complete {
            rows.push(FlatRow {
                team: Some(team.to_string()),
                cells,
            });
        }
    }

    // Teams only present in a non-base topic never reach the merged table either.
    let base_teams: HashSet<&str> = base.rows.iter().filter_map(|r| r.team.as_deref()).collect();
    for other in others {
        for team in other.rows.iter().filter_map(|r| r.team.as_deref()) {
            if !base_teams.contains(team) {
                dropped.push(DroppedTeam {
                    season: base.season.clone(),
                    team: team.to_string(),
                    missing_from: base.name.clone(),
                });
            }
        }
    }

    Ok(MergeOutcome {
        table: FlatTable {
            name: format!("{}_merged", base.name),
            season: base.season.clone(),
            columns,
            rows,
        },
        dropped,
    })
}

fn first_row_by_team(table: &FlatTable) -> HashMap<&str, usize> {
    let mut out = HashMap::with_capacity(table.rows.len());
    for (idx, row) in table.rows.iter().enumerate() {
        if let Some(team) = row.team.as_deref() {
            out.entry(team).or_insert(idx);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str, season: &str, columns: &[&str], rows: &[(&str, &[&str])]) -> FlatTable {
        FlatTable {
            name: name.to_string(),
            season: season.to_string(),
            columns: columns.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|(team, cells)| FlatRow {
                    team: Some(team.to_string()),
                    cells: cells.iter().map(|s| s.to_string()).collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn team_missing_from_a_topic_is_dropped() {
        let standard = table(
            "standard",
            "2020-21",
            &["url", "Poss"],
            &[("A", &["/a/A-Stats", "55"]), ("B", &["/b/B-Stats", "45"])],
        );
        let passing = table(
            "passing",
            "2020-21",
            &["url", "PrgP"],
            &[("A", &["/a/A-Stats", "800"])],
        );
        let out = merge(&standard, &[&passing]).unwrap();
        assert_eq!(out.table.rows.len(), 1);
        assert_eq!(out.table.rows[0].team.as_deref(), Some("A"));
        assert_eq!(out.table.columns, vec!["url", "Poss", "PrgP"]);
        assert_eq!(out.table.rows[0].cells, vec!["/a/A-Stats", "55", "800"]);
        assert_eq!(
            out.dropped,
            vec![DroppedTeam {
                season: "2020-21".to_string(),
                team: "B".to_string(),
                missing_from: "passing".to_string(),
            }]
        );
    }

    #[test]
    fn duplicate_column_names_are_kept_in_topic_order() {
        let standard = table("standard", "2022-23", &["url", "Poss"], &[("A", &["u", "51"])]);
        let possession = table("possession", "2022-23", &["url", "Poss"], &[("A", &["u", "52"])]);
        let out = merge(&standard, &[&possession]).unwrap();
        assert_eq!(out.table.columns, vec!["url", "Poss", "Poss"]);
        assert_eq!(out.table.rows[0].cells, vec!["u", "51", "52"]);
    }

    #[test]
    fn team_only_in_other_topic_is_reported() {
        let standard = table("standard", "2021-22", &["url"], &[("A", &["u"])]);
        let defense = table("defense", "2021-22", &["url"], &[("A", &["u"]), ("C", &["u"])]);
        let out = merge(&standard, &[&defense]).unwrap();
        assert_eq!(out.table.rows.len(), 1);
        assert_eq!(out.dropped.len(), 1);
        assert_eq!(out.dropped[0].team, "C");
        assert_eq!(out.dropped[0].missing_from, "standard");
    }

    #[test]
    fn rows_without_team_cannot_be_keyed() {
        let mut standard = table("standard", "2021-22", &["url"], &[("A", &["u"])]);
        standard.rows.push(FlatRow {
            team: None,
            cells: vec![String::new()],
        });
        let out = merge(&standard, &[]).unwrap();
        assert_eq!(out.table.rows.len(), 1);
    }

    #[test]
    fn mismatched_seasons_are_rejected() {
        let standard = table("standard", "2021-22", &["url"], &[]);
        let passing = table("passing", "2022-23", &["url"], &[]);
        assert!(matches!(
            merge(&standard, &[&passing]),
            Err(PipelineError::Schema { .. })
        ));
    }
}

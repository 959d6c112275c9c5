use std::collections::HashMap;

use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::table::FlatTable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    pub index: usize,
    pub name: String,
}

/// Finds the column matching `logical` in a flattened table.
///
/// Tiers, first match wins, each scanned left to right:
/// exact name, `logical_*` (category half), `*_logical` (statistic half).
pub fn resolve(columns: &[String], logical: &str) -> Result<ResolvedColumn> {
    let found = columns
        .iter()
        .position(|c| c.trim() == logical)
        .or_else(|| {
            let prefix = format!("{logical}_");
            columns.iter().position(|c| c.starts_with(&prefix))
        })
        .or_else(|| {
            let suffix = format!("_{logical}");
            columns.iter().position(|c| c.ends_with(&suffix))
        });

    match found {
        Some(index) => Ok(ResolvedColumn {
            index,
            name: columns[index].clone(),
        }),
        None => Err(PipelineError::ColumnNotFound {
            logical: logical.to_string(),
            available: columns.to_vec(),
        }),
    }
}

/// One logical statistic and the raw names it may appear under, most specific first.
#[derive(Debug, Clone, Copy)]
pub struct StatSpec {
    pub key: &'static str,
    pub candidates: &'static [&'static str],
}

impl StatSpec {
    pub const fn new(key: &'static str, candidates: &'static [&'static str]) -> Self {
        Self { key, candidates }
    }
}

/// Schema mapping resolved once against a concrete table.
#[derive(Debug, Clone)]
pub struct ColumnBinding {
    by_key: HashMap<&'static str, ResolvedColumn>,
}

impl ColumnBinding {
    pub fn bind(table: &FlatTable, specs: &[StatSpec]) -> Result<Self> {
        let mut by_key = HashMap::with_capacity(specs.len());
        for spec in specs {
            let resolved = resolve_any(&table.columns, spec)?;
            debug!(
                table = %table.name,
                stat = spec.key,
                column = %resolved.name,
                "resolved column"
            );
            by_key.insert(spec.key, resolved);
        }
        Ok(Self { by_key })
    }

    pub fn column(&self, key: &str) -> Option<&ResolvedColumn> {
        self.by_key.get(key)
    }

    /// Numeric value of `key` on `row`. Unbound keys and unparseable cells are missing.
    pub fn value(&self, table: &FlatTable, row: usize, key: &str) -> Option<f64> {
        let col = self.by_key.get(key)?;
        table.number(row, col.index)
    }
}

fn resolve_any(columns: &[String], spec: &StatSpec) -> Result<ResolvedColumn> {
    let mut first_err = None;
    for candidate in spec.candidates {
        match resolve(columns, candidate) {
            Ok(found) => return Ok(found),
            Err(err) => {
                first_err.get_or_insert(err);
            }
        }
    }
    Err(first_err.unwrap_or_else(|| PipelineError::ColumnNotFound {
        logical: spec.key.to_string(),
        available: columns.to_vec(),
    }))
}

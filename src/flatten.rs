use crate::error::{PipelineError, Result};
use crate::table::{FlatRow, FlatTable, TwoLevelTable};

const PLAYERS_USED_MARKER: &str = "players_used";
const URL_MARKER: &str = "url";
pub const URL_COLUMN: &str = "url";

/// Collapses the two-level header, drops players-used counters, renames the
/// url column and derives the team for every row.
pub fn flatten(raw: &TwoLevelTable) -> Result<FlatTable> {
    let names: Vec<String> = raw
        .header
        .iter()
        .map(|(outer, inner)| flatten_name(outer, inner))
        .collect();

    let keep: Vec<usize> = names
        .iter()
        .enumerate()
        .filter(|(_, name)| !name.to_lowercase().contains(PLAYERS_USED_MARKER))
        .map(|(idx, _)| idx)
        .collect();

    let mut columns: Vec<String> = keep.iter().map(|&idx| names[idx].clone()).collect();

    let Some(url_pos) = columns
        .iter()
        .position(|c| c.to_lowercase().starts_with(URL_MARKER))
    else {
        return Err(PipelineError::schema(
            &raw.name,
            format!("no '{URL_MARKER}' column among {columns:?}"),
        ));
    };
    columns[url_pos] = URL_COLUMN.to_string();

    let rows = raw
        .rows
        .iter()
        .map(|row| {
            let cells: Vec<String> = keep
                .iter()
                .map(|&idx| row.get(idx).cloned().unwrap_or_default())
                .collect();
            let team = cells.get(url_pos).and_then(|url| team_from_url(url));
            FlatRow { team, cells }
        })
        .collect();

    Ok(FlatTable {
        name: raw.name.clone(),
        season: raw.season.clone(),
        columns,
        rows,
    })
}

/// `("Playing Time", "MP")` → `"Playing Time_MP"`; an empty level degrades to the other.
pub fn flatten_name(outer: &str, inner: &str) -> String {
    format!("{outer}_{inner}")
        .trim_matches('_')
        .trim()
        .to_string()
}

/// `.../squads/206dc7f5/Real-Madrid-Stats` → `Real Madrid`.
pub fn team_from_url(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    let last = url.rsplit('/').next().unwrap_or(url);
    let name = last.replace("-Stats", "").replace('-', " ");
    let name = name.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

use std::fs;
use std::path::Path;

use rust_xlsxwriter::{Workbook, Worksheet};

use crate::classify::{PlayStyle, Trend};
use crate::error::Result;
use crate::overview::{EfficiencyRow, OverviewRow};
use crate::series::EvolutionRow;
use crate::style::{StyleMetric, StyleRecord};
use crate::summary::SummaryRow;
use crate::table::parse_number;

pub const OVERVIEW_FILE: &str = "section1_overview.csv";
pub const EFFICIENCY_FILE: &str = "section2_efficiency.csv";
pub const EVOLUTION_FILE: &str = "section3_evolution.csv";
pub const STYLE_FILE: &str = "section4_style.csv";
pub const SUMMARY_FILE: &str = "section5_summary.csv";

/// A record that renders as one line of an output table.
pub trait TableRow {
    fn header() -> Vec<String>;
    fn cells(&self) -> Vec<String>;
}

/// A rendered output table, header first.
#[derive(Debug, Clone)]
pub struct OutputTable {
    pub file_name: &'static str,
    pub sheet: &'static str,
    pub rows: Vec<Vec<String>>,
}

impl OutputTable {
    pub fn from_records<T: TableRow>(file_name: &'static str, sheet: &'static str, records: &[T]) -> Self {
        let mut rows = Vec::with_capacity(records.len() + 1);
        rows.push(T::header());
        rows.extend(records.iter().map(T::cells));
        Self {
            file_name,
            sheet,
            rows,
        }
    }

    pub fn record_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }
}

/// Whole numbers keep one decimal (`38.0`); everything else prints shortest round-trip.
pub fn fmt_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

fn opt_float(value: Option<f64>) -> String {
    value.map(fmt_float).unwrap_or_default()
}

fn opt_to_string<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn header(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl TableRow for OverviewRow {
    fn header() -> Vec<String> {
        header(&["team", "season", "xGPerGame", "xGAPerGame", "goals"])
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.team.clone().unwrap_or_default(),
            self.season.clone(),
            opt_float(self.xg_per_game),
            opt_float(self.xga_per_game),
            opt_to_string(self.goals),
        ]
    }
}

impl TableRow for EfficiencyRow {
    fn header() -> Vec<String> {
        header(&["team", "season", "xG", "goals"])
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.team.clone().unwrap_or_default(),
            self.season.clone(),
            opt_float(self.xg),
            opt_to_string(self.goals),
        ]
    }
}

impl TableRow for EvolutionRow {
    fn header() -> Vec<String> {
        header(&[
            "team",
            "season",
            "matchday",
            "points_cum",
            "goal_diff_cum",
            "xg_diff_cum",
        ])
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.team.clone(),
            self.season.clone(),
            self.matchday.to_string(),
            opt_to_string(self.points_cum),
            opt_to_string(self.goal_diff_cum),
            opt_float(self.xg_diff_cum),
        ]
    }
}

impl TableRow for StyleRecord {
    fn header() -> Vec<String> {
        let mut cols = header(&["season", "team"]);
        cols.extend(StyleMetric::ALL.iter().map(|m| m.column().to_string()));
        cols.extend(StyleMetric::ALL.iter().map(|m| m.norm_column()));
        cols
    }

    fn cells(&self) -> Vec<String> {
        let mut cells = vec![self.season.clone(), self.team.clone()];
        cells.extend(self.values.iter().copied().map(opt_float));
        cells.extend(self.norms.iter().copied().map(opt_float));
        cells
    }
}

impl TableRow for SummaryRow {
    fn header() -> Vec<String> {
        header(&[
            "season",
            "team",
            "performance_xg",
            "efficiency",
            "trend",
            "play_style",
        ])
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.season.clone(),
            self.team.clone(),
            opt_float(self.performance_xg),
            opt_float(self.efficiency),
            self.trend.map(Trend::label).unwrap_or_default().to_string(),
            self.play_style.map(PlayStyle::label).unwrap_or_default().to_string(),
        ]
    }
}

/// Writes `table` into `dir`, swapping a temporary file into place.
pub fn write_csv(dir: &Path, table: &OutputTable) -> Result<()> {
    fs::create_dir_all(dir)?;
    let path = dir.join(table.file_name);
    let tmp = path.with_extension("csv.tmp");

    let mut writer = csv::Writer::from_path(&tmp)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    drop(writer);

    fs::rename(&tmp, &path)?;
    Ok(())
}

/// All tables as sheets of one workbook, numeric cells written as numbers.
pub fn write_workbook(path: &Path, tables: &[OutputTable]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let mut workbook = Workbook::new();
    for table in tables {
        let sheet = workbook.add_worksheet();
        sheet.set_name(table.sheet)?;
        write_rows(sheet, &table.rows)?;
    }
    workbook.save(path)?;
    Ok(())
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            let (r, c) = (row_idx as u32, col_idx as u16);
            match parse_number(value) {
                Some(number) if row_idx > 0 => worksheet.write_number(r, c, number)?,
                _ => worksheet.write_string(r, c, value)?,
            };
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_render_like_the_charts_expect() {
        assert_eq!(fmt_float(38.0), "38.0");
        assert_eq!(fmt_float(2.24), "2.24");
        assert_eq!(fmt_float(-1.5), "-1.5");
        assert_eq!(opt_float(None), "");
    }

    #[test]
    fn style_header_lists_metrics_then_norms() {
        let header = StyleRecord::header();
        assert_eq!(header.len(), 2 + 28);
        assert_eq!(header[2], "possession_pct");
        assert_eq!(header[16], "possession_pct_norm");
        assert_eq!(header[29], "touches_per_possession_norm");
    }

    #[test]
    fn summary_cells_leave_unmatched_labels_empty() {
        let row = SummaryRow {
            season: "2022-23".to_string(),
            team: "Elche".to_string(),
            performance_xg: Some(-0.71),
            efficiency: None,
            trend: Some(Trend::Up),
            play_style: None,
        };
        assert_eq!(row.cells(), vec!["2022-23", "Elche", "-0.71", "", "up", ""]);
    }

    #[test]
    fn csv_is_written_with_header_and_empty_missing_cells() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![EfficiencyRow {
            team: None,
            season: "2020-21".to_string(),
            xg: Some(41.0),
            goals: None,
        }];
        let table = OutputTable::from_records(EFFICIENCY_FILE, "Efficiency", &rows);
        write_csv(dir.path(), &table).unwrap();

        let written = fs::read_to_string(dir.path().join(EFFICIENCY_FILE)).unwrap();
        assert_eq!(written, "team,season,xG,goals\n,2020-21,41.0,\n");
        assert!(!dir.path().join("section2_efficiency.csv.tmp").exists());
    }

    #[test]
    fn workbook_gets_one_sheet_per_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("datastory.xlsx");
        let tables = vec![
            OutputTable::from_records::<OverviewRow>(OVERVIEW_FILE, "Overview", &[]),
            OutputTable::from_records::<SummaryRow>(SUMMARY_FILE, "Summary", &[]),
        ];
        write_workbook(&path, &tables).unwrap();
        assert!(path.exists());
    }
}

#[derive(Debug, Clone)]
pub struct TwoLevelTable {
    pub name: String,
    pub season: String,
    /// (outer, inner) label per column. Either side may be empty.
    pub header: Vec<(String, String)>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlatRow {
    pub team: Option<String>,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FlatTable {
    pub name: String,
    pub season: String,
    pub columns: Vec<String>,
    pub rows: Vec<FlatRow>,
}

impl FlatTable {
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.cells.get(col))
            .map(|s| s.as_str())
    }

    pub fn number(&self, row: usize, col: usize) -> Option<f64> {
        self.cell(row, col).and_then(parse_number)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Lenient numeric parse. Empty cells, dashes and non-finite values are missing.
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() || s == "-" {
        return None;
    }
    // FBref exports occasionally carry thousands separators.
    let cleaned = s.replace(',', "");
    let v = cleaned.parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}

pub fn parse_count(raw: &str) -> Option<u32> {
    let v = parse_number(raw)?;
    if v < 0.0 || v.fract() != 0.0 || v > f64::from(u32::MAX) {
        return None;
    }
    Some(v as u32)
}

/// `a / b`, missing when either side is missing or the divisor is zero.
pub fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (n, d) = (numerator?, denominator?);
    if d == 0.0 {
        return None;
    }
    Some(n / d)
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

use std::collections::HashMap;

/// Value every member of a group receives when the group carries no spread.
pub const DEGENERATE_SCORE: f64 = 0.5;

/// Min/max rescale of `values` within each season group.
///
/// `seasons[i]` is the group of `values[i]`. Missing values stay missing and
/// do not take part in the group's min/max. A group whose present values are
/// all equal maps every present value to [`DEGENERATE_SCORE`].
pub fn normalize_by_season(seasons: &[&str], values: &[Option<f64>]) -> Vec<Option<f64>> {
    debug_assert_eq!(seasons.len(), values.len());

    let mut bounds: HashMap<&str, (f64, f64)> = HashMap::new();
    for (season, value) in seasons.iter().zip(values) {
        let Some(v) = *value else { continue };
        bounds
            .entry(*season)
            .and_modify(|(lo, hi)| {
                *lo = lo.min(v);
                *hi = hi.max(v);
            })
            .or_insert((v, v));
    }

    seasons
        .iter()
        .zip(values)
        .map(|(season, value)| {
            let v = (*value)?;
            let (lo, hi) = *bounds.get(season)?;
            if hi == lo {
                Some(DEGENERATE_SCORE)
            } else {
                Some((v - lo) / (hi - lo))
            }
        })
        .collect()
}

//! imputation::matching — nearest-donor search for predictive mean matching.
//!
//! Donors are ranked by `|pred - target|`, ties broken by the donor's
//! position so the ranking is deterministic. NaN distances sort last under
//! `f64::total_cmp`.

/// Positions (into `donor_preds`) of the `k` donors closest to `target`,
/// nearest first. Returns fewer than `k` only when there are fewer donors.
pub fn nearest_donors(target: f64, donor_preds: &[f64], k: usize) -> Vec<usize> {
    let mut ranked: Vec<(f64, usize)> =
        donor_preds.iter().enumerate().map(|(i, &p)| ((p - target).abs(), i)).collect();
    ranked.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    ranked.into_iter().take(k).map(|(_, i)| i).collect()
}

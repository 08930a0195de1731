//! Equal weighting.

use centum_data::ConstituentWeight;

/// Assign `1/N` to each selected ticker. The result is sorted by ticker.
pub fn equal_weights(selected: &[String]) -> Vec<ConstituentWeight> {
    if selected.is_empty() {
        return Vec::new();
    }

    let weight = 1.0 / selected.len() as f64;
    let mut weights: Vec<_> = selected
        .iter()
        .map(|ticker| ConstituentWeight::new(ticker.clone(), weight))
        .collect();
    weights.sort_by(|a, b| a.ticker.cmp(&b.ticker));
    weights
}

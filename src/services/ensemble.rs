use std::cmp::Ordering;

use crate::data::{normalize_label, SimilarityTable};

/// Ranks the items most similar to `item` under a weighted blend of two
/// precomputed similarity tables.
///
/// The combined score for a candidate `j` is
/// `alpha * content(j, item) + (1 - alpha) * collaborative(j, item)`,
/// evaluated over the intersection of the two tables' row labels with `item`
/// itself excluded. Candidates are ordered by score descending; equal scores
/// are broken by label ascending so repeated calls are deterministic.
///
/// Returns `None` when `item` is absent from either table's column index,
/// which is distinct from `Some` of an empty list (item known, nothing to
/// rank). `alpha` and `top_k` are not validated.
pub fn recommend(
    item: &str,
    content: &SimilarityTable,
    collaborative: &SimilarityTable,
    alpha: f64,
    top_k: usize,
) -> Option<Vec<String>> {
    let item = normalize_label(item);
    if !content.has_column(&item) || !collaborative.has_column(&item) {
        return None;
    }

    let mut scored: Vec<(String, f64)> = content
        .row_labels()
        .filter(|label| *label != item)
        .filter_map(|label| {
            let content_score = content.score(label, &item)?;
            let collaborative_score = collaborative.score(label, &item)?;
            let combined = alpha * content_score + (1.0 - alpha) * collaborative_score;
            Some((label.to_string(), combined))
        })
        .collect();

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    scored.truncate(top_k);

    Some(scored.into_iter().map(|(label, _)| label).collect())
}

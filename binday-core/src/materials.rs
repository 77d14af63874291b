//! Search over the A-Z "which bin" guide.

use crate::model::Material;

/// Materials whose title or keywords contain `query`, sorted by title.
///
/// A blank query returns the whole guide.
#[must_use]
pub fn search<'guide>(materials: &'guide [Material], query: &str) -> Vec<&'guide Material> {
    let needle = query.trim().to_lowercase();

    let mut matches: Vec<&Material> = materials
        .iter()
        .filter(|material| {
            needle.is_empty()
                || material.title.to_lowercase().contains(&needle)
                || material
                    .keywords
                    .as_deref()
                    .is_some_and(|keywords| keywords.to_lowercase().contains(&needle))
        })
        .collect();

    matches.sort_by(|left, right| left.title.cmp(&right.title));
    matches
}

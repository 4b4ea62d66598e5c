//! Ingredient-to-recipe matching.
//!
//! A recipe matches when at least one of its required ingredients equals one of
//! the detected labels after both sides are lowercased. Matching is pure: it
//! borrows the catalog and returns references in catalog order.

use std::collections::HashSet;

use crate::model::Recipe;

/// Normalizes a detected label or ingredient name for comparison
pub fn normalize_label(label: &str) -> String {
    label.to_lowercase()
}

/// Returns the recipes from `catalog` that share at least one ingredient with `labels`
pub fn match_recipes<'a, S: AsRef<str>>(labels: &[S], catalog: &'a [Recipe]) -> Vec<&'a Recipe> {
    if labels.is_empty() {
        return Vec::new();
    }

    let detected: HashSet<String> = labels
        .iter()
        .map(|label| normalize_label(label.as_ref()))
        .collect();

    catalog
        .iter()
        .filter(|recipe| {
            recipe
                .required_ingredients
                .iter()
                .any(|ingredient| detected.contains(&normalize_label(ingredient)))
        })
        .collect()
}

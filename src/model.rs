use serde::{Deserialize, Serialize};

/// A recipe in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: u32,
    pub name: String,
    /// Lowercase ingredient names, kept in display order
    pub required_ingredients: Vec<String>,
    pub instructions: String,
    pub image_url: String,
}

/// Result of analyzing a single image
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    /// Lowercased labels reported by the vision provider, in detection order
    pub detected_ingredients: Vec<String>,
    /// Catalog recipes sharing at least one ingredient with the detections
    pub matching_recipes: Vec<Recipe>,
}

impl AnalysisOutcome {
    pub fn has_matches(&self) -> bool {
        !self.matching_recipes.is_empty()
    }
}

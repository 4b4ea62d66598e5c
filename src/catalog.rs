use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use log::info;

use crate::error::CatalogError;
use crate::matcher::{match_recipes, normalize_label};
use crate::model::Recipe;

/// Read-only list of recipes available for matching.
///
/// Clones share the same backing slice, so one catalog can serve any number of
/// concurrent requests without locking.
#[derive(Debug, Clone)]
pub struct RecipeCatalog {
    recipes: Arc<[Recipe]>,
}

impl RecipeCatalog {
    /// Creates a catalog from recipes, lowercasing their ingredient names
    pub fn new(recipes: Vec<Recipe>) -> Self {
        let recipes: Vec<Recipe> = recipes
            .into_iter()
            .map(|mut recipe| {
                recipe.required_ingredients = recipe
                    .required_ingredients
                    .iter()
                    .map(|ingredient| normalize_label(ingredient))
                    .collect();
                recipe
            })
            .collect();

        RecipeCatalog {
            recipes: recipes.into(),
        }
    }

    /// The built-in sample catalog
    pub fn sample() -> Self {
        RecipeCatalog::new(vec![
            Recipe {
                id: 1,
                name: "Apple Crumble".to_string(),
                required_ingredients: strings(&["apple", "flour", "sugar", "butter", "cinnamon"]),
                instructions: "Slice apples, mix with sugar and cinnamon. Top with flour, sugar, butter crumble. Bake at 375F for 30-40 mins.".to_string(),
                image_url: "https://example.com/apple_crumble.jpg".to_string(),
            },
            Recipe {
                id: 2,
                name: "Tomato Pasta".to_string(),
                required_ingredients: strings(&["tomato", "pasta", "onion", "garlic", "olive oil"]),
                instructions: "Cook pasta. Sauté onion and garlic, add diced tomatoes. Mix with pasta.".to_string(),
                image_url: "https://example.com/tomato_pasta.jpg".to_string(),
            },
            Recipe {
                id: 3,
                name: "Scrambled Eggs".to_string(),
                required_ingredients: strings(&["egg", "butter", "milk"]),
                instructions: "Whisk eggs with milk. Melt butter in pan, pour eggs, scramble until cooked.".to_string(),
                image_url: "https://example.com/scrambled_eggs.jpg".to_string(),
            },
            Recipe {
                id: 4,
                name: "Chicken Stir-fry".to_string(),
                required_ingredients: strings(&[
                    "chicken", "broccoli", "carrot", "soy sauce", "ginger", "garlic",
                ]),
                instructions: "Cut chicken and vegetables. Stir-fry chicken, then add veggies. Add sauce and serve.".to_string(),
                image_url: "https://example.com/chicken_stirfry.jpg".to_string(),
            },
        ])
    }

    /// Parses a JSON array of recipes
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let recipes: Vec<Recipe> = serde_json::from_str(json)?;

        if recipes.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for recipe in &recipes {
            if !seen.insert(recipe.id) {
                return Err(CatalogError::DuplicateId(recipe.id));
            }
        }

        Ok(RecipeCatalog::new(recipes))
    }

    /// Loads a catalog from a JSON file
    pub async fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let json = tokio::fs::read_to_string(path).await?;
        let catalog = Self::from_json_str(&json)?;
        info!(
            "Loaded {} recipes from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Recipes sharing at least one ingredient with `labels`, in catalog order
    pub fn matching<S: AsRef<str>>(&self, labels: &[S]) -> Vec<&Recipe> {
        match_recipes(labels, &self.recipes)
    }
}

impl Default for RecipeCatalog {
    fn default() -> Self {
        Self::sample()
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_catalog() {
        let catalog = RecipeCatalog::sample();
        assert_eq!(catalog.len(), 4);

        let names: Vec<&str> = catalog.recipes().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Apple Crumble", "Tomato Pasta", "Scrambled Eggs", "Chicken Stir-fry"]
        );
        assert_eq!(
            catalog.recipes()[3].required_ingredients,
            vec!["chicken", "broccoli", "carrot", "soy sauce", "ginger", "garlic"]
        );
    }

    #[test]
    fn test_clones_share_recipes() {
        let catalog = RecipeCatalog::sample();
        let clone = catalog.clone();
        assert!(std::ptr::eq(catalog.recipes(), clone.recipes()));
    }

    #[test]
    fn test_from_json_lowercases_ingredients() {
        let json = r#"[
            {
                "id": 10,
                "name": "Guacamole",
                "requiredIngredients": ["Avocado", "LIME", "onion"],
                "instructions": "Mash everything.",
                "imageUrl": "https://example.com/guac.jpg"
            }
        ]"#;

        let catalog = RecipeCatalog::from_json_str(json).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.recipes()[0].required_ingredients,
            vec!["avocado", "lime", "onion"]
        );
        assert_eq!(catalog.matching(&["Lime"]).len(), 1);
    }

    #[test]
    fn test_from_json_rejects_duplicate_ids() {
        let json = r#"[
            {"id": 1, "name": "A", "requiredIngredients": ["a"], "instructions": "", "imageUrl": ""},
            {"id": 1, "name": "B", "requiredIngredients": ["b"], "instructions": "", "imageUrl": ""}
        ]"#;

        let result = RecipeCatalog::from_json_str(json);
        assert!(matches!(result, Err(CatalogError::DuplicateId(1))));
    }

    #[test]
    fn test_from_json_rejects_empty_catalog() {
        assert!(matches!(
            RecipeCatalog::from_json_str("[]"),
            Err(CatalogError::Empty)
        ));
    }

    #[test]
    fn test_from_json_rejects_malformed_input() {
        let result = RecipeCatalog::from_json_str(r#"{"id": 1}"#);
        assert!(matches!(result, Err(CatalogError::Parse(_))));
    }

    #[tokio::test]
    async fn test_from_file() {
        let path = std::env::temp_dir().join(format!(
            "recipe-vision-catalog-{}.json",
            std::process::id()
        ));
        tokio::fs::write(
            &path,
            r#"[{"id": 5, "name": "Toast", "requiredIngredients": ["bread"], "instructions": "Toast it.", "imageUrl": "https://example.com/toast.jpg"}]"#,
        )
        .await
        .unwrap();

        let catalog = RecipeCatalog::from_file(&path).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(catalog.recipes()[0].name, "Toast");
    }

    #[tokio::test]
    async fn test_from_missing_file() {
        let result = RecipeCatalog::from_file(Path::new("/nonexistent/catalog.json")).await;
        assert!(matches!(result, Err(CatalogError::Io(_))));
    }
}

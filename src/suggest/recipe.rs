use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};

/// How strictly suggested recipes must stick to the listed ingredients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MatchMode {
    /// Only the listed ingredients.
    #[default]
    Exact,
    /// The listed ingredients plus at most two extras.
    Few,
    /// At least half of the listed ingredients.
    Flexible,
}

/// One recipe suggestion parsed from a completion reply. Field names
/// follow the wire schema the prompt asks the model to produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub name: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub cooking_time: String,
    pub servings: u32,
    pub difficulty: String,
    #[serde(deserialize_with = "score_from_wire")]
    pub match_score: u8,
}

/// Scores live on a 0-100 scale; the model occasionally overshoots, so
/// anything above 100 is clamped on parse.
fn score_from_wire<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = u64::deserialize(deserializer)?;
    Ok(raw.min(100) as u8)
}

impl Recipe {
    /// Sentinel shown when a reply does not parse as the expected envelope,
    /// so the UI always has something displayable.
    pub fn processing_error() -> Self {
        Self {
            name: "Processing error".into(),
            description: "The model reply could not be interpreted. Please try again.".into(),
            ..Self::error_shell()
        }
    }

    /// Sentinel shown when the completion service cannot be reached at all.
    pub fn connection_error() -> Self {
        Self {
            name: "Connection error".into(),
            description: "Could not reach the recipe service. Please try again.".into(),
            ..Self::error_shell()
        }
    }

    fn error_shell() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            ingredients: Vec::new(),
            instructions: Vec::new(),
            cooking_time: "N/A".into(),
            servings: 0,
            difficulty: "N/A".into(),
            match_score: 0,
        }
    }
}

/// The envelope a completion reply must parse into, strictly.
#[derive(Debug, Deserialize)]
pub struct RecipeReply {
    pub recipes: Vec<Recipe>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_wire_field_names() {
        let raw = r#"{
            "name": "Tomato omelette",
            "description": "Quick and light.",
            "ingredients": ["tomato", "egg"],
            "instructions": ["Beat the eggs.", "Cook with the tomato."],
            "cookingTime": "10 minutes",
            "servings": 2,
            "difficulty": "Easy",
            "matchScore": 95
        }"#;

        let recipe: Recipe = serde_json::from_str(raw).unwrap();
        assert_eq!(recipe.cooking_time, "10 minutes");
        assert_eq!(recipe.match_score, 95);

        let back = serde_json::to_value(&recipe).unwrap();
        assert!(back.get("cookingTime").is_some());
        assert!(back.get("matchScore").is_some());
    }

    #[test]
    fn test_reply_requires_recipes_field() {
        assert!(serde_json::from_str::<RecipeReply>(r#"{"results":[]}"#).is_err());
    }

    #[test]
    fn test_match_score_clamped_to_100() {
        let raw = r#"{
            "name": "Stew",
            "description": "Hearty.",
            "ingredients": [],
            "instructions": [],
            "cookingTime": "1 hour",
            "servings": 4,
            "difficulty": "Medium",
            "matchScore": 250
        }"#;

        let recipe: Recipe = serde_json::from_str(raw).unwrap();
        assert_eq!(recipe.match_score, 100);
    }

    #[test]
    fn test_sentinels_are_distinct_but_share_shape() {
        let parse = Recipe::processing_error();
        let connect = Recipe::connection_error();

        assert_ne!(parse.name, connect.name);
        for sentinel in [parse, connect] {
            assert!(sentinel.ingredients.is_empty());
            assert!(sentinel.instructions.is_empty());
            assert_eq!(sentinel.match_score, 0);
        }
    }
}

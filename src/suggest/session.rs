use std::sync::Arc;

use tracing::warn;

use super::prompt::build_prompt;
use super::recipe::{MatchMode, Recipe, RecipeReply};
use super::Completion;

/// One user session: the ingredient set, the matching mode, and whatever
/// the last search produced.
pub struct RecipeSession {
    completion: Arc<dyn Completion>,
    ingredients: Vec<String>,
    mode: MatchMode,
    recipes: Vec<Recipe>,
    loading: bool,
    generation: u64,
}

impl RecipeSession {
    pub fn new(completion: Arc<dyn Completion>) -> Self {
        Self {
            completion,
            ingredients: Vec::new(),
            mode: MatchMode::default(),
            recipes: Vec::new(),
            loading: false,
            generation: 0,
        }
    }

    /// Add an ingredient, normalized to trimmed lowercase. Returns false
    /// for blank input or a duplicate, in which case nothing changes.
    pub fn add_ingredient(&mut self, text: &str) -> bool {
        let normalized = text.trim().to_lowercase();
        if normalized.is_empty() || self.ingredients.contains(&normalized) {
            return false;
        }
        self.ingredients.push(normalized);
        true
    }

    /// Remove an ingredient by its normalized value. Absent values are a no-op.
    pub fn remove_ingredient(&mut self, text: &str) {
        let normalized = text.trim().to_lowercase();
        self.ingredients.retain(|item| item != &normalized);
    }

    pub fn set_mode(&mut self, mode: MatchMode) {
        self.mode = mode;
    }

    pub fn ingredients(&self) -> &[String] {
        &self.ingredients
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Run a search over the current ingredient set. Failures commit a
    /// single sentinel record instead of surfacing an error: a reply that
    /// does not parse gets the processing sentinel, a completion call that
    /// fails outright gets the connection sentinel.
    pub async fn search(&mut self) {
        let Some(ticket) = self.begin_search() else {
            return;
        };

        let prompt = build_prompt(&self.ingredients, self.mode);
        let completion = self.completion.clone();

        let recipes = match completion.complete(&prompt).await {
            Ok(reply) => {
                parse_reply(&reply).unwrap_or_else(|| vec![Recipe::processing_error()])
            }
            Err(e) => {
                warn!(error = %e, "completion request failed");
                vec![Recipe::connection_error()]
            }
        };

        self.commit(ticket, recipes);
    }

    /// Enter the loading state and hand out a ticket for the new search.
    /// Returns None when the ingredient set is empty; no request is made
    /// and the loading state is never entered.
    fn begin_search(&mut self) -> Option<u64> {
        if self.ingredients.is_empty() {
            return None;
        }
        self.loading = true;
        self.recipes.clear();
        self.generation += 1;
        Some(self.generation)
    }

    /// Commit a search outcome. A ticket from a superseded search is
    /// discarded; the newer search owns the result set and the loading flag.
    fn commit(&mut self, ticket: u64, recipes: Vec<Recipe>) {
        if ticket != self.generation {
            return;
        }
        self.recipes = recipes;
        self.loading = false;
    }
}

/// Strictly parse a reply into recipe records. The prompt forbids fences
/// and surrounding prose, so anything that is not the exact envelope is
/// treated as a failure.
fn parse_reply(raw: &str) -> Option<Vec<Recipe>> {
    match serde_json::from_str::<RecipeReply>(raw) {
        Ok(reply) => Some(reply.recipes),
        Err(e) => {
            warn!(error = %e, "completion reply was not the expected JSON shape");
            None
        }
    }
}

pub mod completion;
pub mod prompt;
pub mod recipe;
pub mod session;

pub use completion::{Completion, CompletionError, RelayCompletion};
pub use recipe::{MatchMode, Recipe};
pub use session::RecipeSession;

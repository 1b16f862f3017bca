//! Fetch and view-state orchestration for a recipe browser.
//!
//! Two controllers sit between the screens and the remote recipe catalog:
//! [`CatalogController`] for the recipe grid and [`DetailController`] for the
//! random "surprise" recipe page. Each publishes a [`ViewState`] the screen
//! renders from, and can drive a [`RevealSequencer`] that times the visual
//! entrance of whatever was just loaded.

pub mod catalog;
pub mod config;
pub mod detail;
pub mod error;
pub mod ingredients;
pub mod model;
pub mod reveal;
pub mod service;
pub mod uniffi_bindings;
pub mod view_state;

pub use catalog::{CatalogController, CatalogState};
pub use config::{load_config, AppConfig, RevealConfig, RevealTimingConfig, ServiceConfig};
pub use detail::{DetailController, DetailState, RecipeView};
pub use error::{FailureKind, RecipeError};
pub use ingredients::extract;
pub use model::{Ingredient, IngredientSlot, RecipeDetail, RecipeSummary, SLOT_COUNT};
pub use reveal::{
    reveal_channel, RevealBoard, RevealEvent, RevealSequencer, RevealSignal, RevealStream,
    RevealTiming,
};
pub use service::{MealDbClient, RecipeService};
pub use view_state::{ViewError, ViewState};

/// Initialize `env_logger` from `RUST_LOG`, defaulting to `info`.
/// Safe to call more than once.
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    let _ = env_logger::Builder::from_env(env).try_init();
}

//! UniFFI bindings for the recipe controllers
//!
//! This module provides FFI-compatible types and objects for use with iOS and Android.
//! Each controller object owns a tokio runtime; its methods block the calling
//! (background) thread until the request cycle finishes, while reveal
//! sequences keep running on the runtime's worker threads.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Runtime;

use crate::{
    AppConfig, CatalogController, CatalogState, DetailController, DetailState, FailureKind,
    Ingredient, RecipeError, RecipeSummary, RecipeView, RevealEvent, RevealSignal,
    RevealStream, RevealTiming, ViewError,
};

#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();

/// FFI-compatible recipe card
#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiRecipeSummary {
    pub id: String,
    pub name: String,
    pub thumbnail_url: Option<String>,
    pub category: Option<String>,
    pub area: Option<String>,
}

impl From<RecipeSummary> for FfiRecipeSummary {
    fn from(summary: RecipeSummary) -> Self {
        FfiRecipeSummary {
            id: summary.id,
            name: summary.name,
            thumbnail_url: summary.thumbnail_url,
            category: summary.category,
            area: summary.area,
        }
    }
}

/// FFI-compatible ingredient line
#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiIngredient {
    pub name: String,
    pub measure: String,
    /// "{measure} {name}", ready to display
    pub line: String,
}

impl From<Ingredient> for FfiIngredient {
    fn from(ingredient: Ingredient) -> Self {
        let line = ingredient.to_string();
        FfiIngredient {
            name: ingredient.name,
            measure: ingredient.measure,
            line,
        }
    }
}

/// FFI-compatible recipe page
#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiRecipeDetail {
    pub id: String,
    pub name: String,
    pub thumbnail_url: Option<String>,
    pub category: Option<String>,
    pub area: Option<String>,
    pub instructions: Option<String>,
    pub video_url: Option<String>,
    pub ingredients: Vec<FfiIngredient>,
}

impl From<RecipeView> for FfiRecipeDetail {
    fn from(view: RecipeView) -> Self {
        let recipe = view.recipe;
        FfiRecipeDetail {
            id: recipe.id,
            name: recipe.name,
            thumbnail_url: recipe.thumbnail_url,
            category: recipe.category,
            area: recipe.area,
            instructions: recipe.instructions,
            video_url: recipe.video_url,
            ingredients: view.ingredients.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
pub enum FfiFailureKind {
    EmptyResult,
    TransportFailure,
}

impl From<FailureKind> for FfiFailureKind {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::EmptyResult => FfiFailureKind::EmptyResult,
            FailureKind::TransportFailure => FfiFailureKind::TransportFailure,
        }
    }
}

/// Failure shown over a list that stays on screen
#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiViewNotice {
    pub kind: FfiFailureKind,
    pub message: String,
}

impl From<ViewError> for FfiViewNotice {
    fn from(err: ViewError) -> Self {
        FfiViewNotice {
            kind: err.kind.into(),
            message: err.message,
        }
    }
}

/// FFI-compatible catalog screen state
#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
pub enum FfiCatalogState {
    Loading,
    Ready {
        recipes: Vec<FfiRecipeSummary>,
        is_refreshing: bool,
        notice: Option<FfiViewNotice>,
    },
    Error {
        kind: FfiFailureKind,
        message: String,
    },
}

impl From<CatalogState> for FfiCatalogState {
    fn from(state: CatalogState) -> Self {
        match state {
            CatalogState::Loading => FfiCatalogState::Loading,
            CatalogState::Ready {
                data,
                is_refreshing,
                notice,
            } => FfiCatalogState::Ready {
                recipes: data.into_iter().map(Into::into).collect(),
                is_refreshing,
                notice: notice.map(Into::into),
            },
            CatalogState::Error(err) => FfiCatalogState::Error {
                kind: err.kind.into(),
                message: err.message,
            },
        }
    }
}

/// FFI-compatible detail screen state
#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
pub enum FfiDetailState {
    Loading,
    Ready { recipe: FfiRecipeDetail },
    Error {
        kind: FfiFailureKind,
        message: String,
    },
}

impl From<DetailState> for FfiDetailState {
    fn from(state: DetailState) -> Self {
        match state {
            DetailState::Loading => FfiDetailState::Loading,
            DetailState::Ready { data, .. } => FfiDetailState::Ready {
                recipe: data.into(),
            },
            DetailState::Error(err) => FfiDetailState::Error {
                kind: err.kind.into(),
                message: err.message,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
pub enum FfiRevealSignal {
    ContainerVisible,
    ImageVisible,
    TextVisible,
}

impl From<RevealSignal> for FfiRevealSignal {
    fn from(signal: RevealSignal) -> Self {
        match signal {
            RevealSignal::ContainerVisible => FfiRevealSignal::ContainerVisible,
            RevealSignal::ImageVisible => FfiRevealSignal::ImageVisible,
            RevealSignal::TextVisible => FfiRevealSignal::TextVisible,
        }
    }
}

/// FFI-compatible reveal event
#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiRevealEvent {
    pub item_id: String,
    pub position: u32,
    pub generation: u64,
    pub signal: FfiRevealSignal,
    pub duration_ms: u64,
}

impl From<RevealEvent> for FfiRevealEvent {
    fn from(event: RevealEvent) -> Self {
        FfiRevealEvent {
            item_id: event.item_id,
            position: u32::try_from(event.position).unwrap_or(u32::MAX),
            generation: event.generation,
            signal: event.signal.into(),
            duration_ms: u64::try_from(event.duration.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// FFI-compatible error type
#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Error))]
pub enum FfiRecipeError {
    /// Configuration could not be loaded
    ConfigError { message: String },
    /// The HTTP client could not be created
    ClientError { message: String },
    /// Runtime error (tokio)
    RuntimeError { message: String },
}

impl fmt::Display for FfiRecipeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FfiRecipeError::ConfigError { message } => write!(f, "Config error: {}", message),
            FfiRecipeError::ClientError { message } => write!(f, "Client error: {}", message),
            FfiRecipeError::RuntimeError { message } => write!(f, "Runtime error: {}", message),
        }
    }
}

impl std::error::Error for FfiRecipeError {}

impl From<RecipeError> for FfiRecipeError {
    fn from(err: RecipeError) -> Self {
        match err {
            RecipeError::ConfigError(e) => FfiRecipeError::ConfigError {
                message: e.to_string(),
            },
            other => FfiRecipeError::ClientError {
                message: other.to_string(),
            },
        }
    }
}

/// Create a new tokio runtime for a controller object
fn create_runtime() -> Result<Runtime, FfiRecipeError> {
    Runtime::new().map_err(|e| FfiRecipeError::RuntimeError {
        message: format!("Failed to create async runtime: {}", e),
    })
}

fn load_app_config(base_url: Option<String>) -> Result<AppConfig, FfiRecipeError> {
    let mut config = AppConfig::load().map_err(RecipeError::from)?;
    if let Some(base_url) = base_url {
        config.service.base_url = base_url;
    }
    Ok(config)
}

fn next_event(
    runtime: &Runtime,
    reveals: &Mutex<RevealStream>,
    timeout_ms: u64,
) -> Option<FfiRevealEvent> {
    let mut stream = reveals.lock().ok()?;
    runtime
        .block_on(async {
            tokio::time::timeout(Duration::from_millis(timeout_ms), stream.recv())
                .await
                .ok()
                .flatten()
        })
        .map(Into::into)
}

/// Recipe grid controller for the native shell
#[cfg_attr(feature = "uniffi", derive(uniffi::Object))]
pub struct FfiCatalogController {
    runtime: Runtime,
    controller: CatalogController,
    reveals: Mutex<RevealStream>,
}

#[cfg_attr(feature = "uniffi", uniffi::export)]
impl FfiCatalogController {
    /// Create a controller from `config.toml`/environment, optionally
    /// pointing it at another catalog base URL
    #[cfg_attr(feature = "uniffi", uniffi::constructor)]
    pub fn new(base_url: Option<String>) -> Result<Arc<Self>, FfiRecipeError> {
        let config = load_app_config(base_url)?;
        let runtime = create_runtime()?;
        let (controller, reveals) = CatalogController::from_config(&config)?
            .with_reveals(
                RevealTiming::from(&config.reveal.catalog),
                RevealTiming::from(&config.reveal.header),
            );

        Ok(Arc::new(FfiCatalogController {
            runtime,
            controller,
            reveals: Mutex::new(reveals),
        }))
    }

    pub fn load(&self) -> FfiCatalogState {
        self.runtime.block_on(self.controller.load());
        self.state()
    }

    pub fn refresh(&self) -> FfiCatalogState {
        self.runtime.block_on(self.controller.refresh());
        self.state()
    }

    pub fn retry(&self) -> FfiCatalogState {
        self.runtime.block_on(self.controller.retry());
        self.state()
    }

    pub fn state(&self) -> FfiCatalogState {
        self.controller.state().into()
    }

    pub fn cancel(&self) {
        self.controller.cancel();
    }

    /// Wait up to `timeout_ms` for the next card reveal signal
    pub fn next_reveal_event(&self, timeout_ms: u64) -> Option<FfiRevealEvent> {
        next_event(&self.runtime, &self.reveals, timeout_ms)
    }
}

/// Surprise recipe page controller for the native shell
#[cfg_attr(feature = "uniffi", derive(uniffi::Object))]
pub struct FfiDetailController {
    runtime: Runtime,
    controller: DetailController,
    reveals: Mutex<RevealStream>,
}

#[cfg_attr(feature = "uniffi", uniffi::export)]
impl FfiDetailController {
    #[cfg_attr(feature = "uniffi", uniffi::constructor)]
    pub fn new(base_url: Option<String>) -> Result<Arc<Self>, FfiRecipeError> {
        let config = load_app_config(base_url)?;
        let runtime = create_runtime()?;
        let (controller, reveals) = DetailController::from_config(&config)?
            .with_reveals(RevealTiming::from(&config.reveal.detail));

        Ok(Arc::new(FfiDetailController {
            runtime,
            controller,
            reveals: Mutex::new(reveals),
        }))
    }

    pub fn load(&self) -> FfiDetailState {
        self.runtime.block_on(self.controller.load());
        self.state()
    }

    pub fn reroll(&self) -> FfiDetailState {
        self.runtime.block_on(self.controller.reroll());
        self.state()
    }

    pub fn retry(&self) -> FfiDetailState {
        self.runtime.block_on(self.controller.retry());
        self.state()
    }

    pub fn state(&self) -> FfiDetailState {
        self.controller.state().into()
    }

    pub fn cancel(&self) {
        self.controller.cancel();
    }

    /// Wait up to `timeout_ms` for the next page reveal signal
    pub fn next_reveal_event(&self, timeout_ms: u64) -> Option<FfiRevealEvent> {
        next_event(&self.runtime, &self.reveals, timeout_ms)
    }
}

/// Initialize logging for the native shell
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn init_logging() {
    crate::init_logging();
}

/// Get the library version
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

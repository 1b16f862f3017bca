use std::sync::{Arc, Mutex};

use log::{debug, error, info};
use tokio::sync::watch;

use crate::config::AppConfig;
use crate::error::RecipeError;
use crate::ingredients::extract;
use crate::model::{Ingredient, RecipeDetail};
use crate::reveal::{reveal_channel, RevealSequencer, RevealStream, RevealTiming};
use crate::service::{MealDbClient, RecipeService};
use crate::view_state::{
    StateCell, ViewError, ViewState, DETAIL_EMPTY_MESSAGE, DETAIL_TRANSPORT_MESSAGE,
};

/// A recipe ready to render, with its ingredient list already derived
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeView {
    pub recipe: RecipeDetail,
    pub ingredients: Vec<Ingredient>,
}

impl RecipeView {
    pub fn new(recipe: RecipeDetail) -> Self {
        let ingredients = extract(&recipe);
        RecipeView {
            recipe,
            ingredients,
        }
    }
}

pub type DetailState = ViewState<RecipeView>;

/// Backs the surprise-recipe page: one random recipe per cycle.
///
/// Every cycle is a full replacement. The page goes back to loading, the
/// previous reveal sequence is cancelled, and only the newest cycle may
/// publish its outcome.
pub struct DetailController {
    service: Arc<dyn RecipeService>,
    cell: StateCell<RecipeView>,
    reveal: Option<Mutex<RevealSequencer>>,
}

impl DetailController {
    pub fn new(service: Arc<dyn RecipeService>) -> Self {
        DetailController {
            service,
            cell: StateCell::new(),
            reveal: None,
        }
    }

    /// Controller talking to the configured catalog service
    pub fn from_config(config: &AppConfig) -> Result<Self, RecipeError> {
        let client = MealDbClient::new(&config.service)?;
        Ok(Self::new(Arc::new(client)))
    }

    /// Drive the page entrance once a recipe is published.
    /// Reveal sequences are spawned on the tokio runtime the loads run on.
    pub fn with_reveals(mut self, timing: RevealTiming) -> (Self, RevealStream) {
        let (tx, rx) = reveal_channel();
        self.reveal = Some(Mutex::new(RevealSequencer::new(timing, tx)));
        (self, rx)
    }

    pub fn state(&self) -> DetailState {
        self.cell.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.cell.subscribe()
    }

    /// Generation of the page's reveal sequence, if reveals are enabled
    pub fn reveal_generation(&self) -> Option<u64> {
        let reveal = self.reveal.as_ref()?;
        reveal.lock().ok().map(|sequencer| sequencer.generation())
    }

    /// Fetch a random recipe
    pub async fn load(&self) {
        let ticket = self.cell.begin(|_| ViewState::Loading);
        self.with_sequencer(RevealSequencer::cancel);
        debug!(
            "Requesting random recipe from {} (request {})",
            self.service.service_name(),
            ticket
        );

        let terminal = match self.service.random_recipe().await {
            Ok(recipe) => {
                info!("Loaded recipe '{}' ({})", recipe.name, recipe.id);
                ViewState::ready(RecipeView::new(recipe))
            }
            Err(e) => {
                error!("Error fetching random recipe: {}", e);
                ViewState::Error(ViewError::from_error(
                    &e,
                    DETAIL_EMPTY_MESSAGE,
                    DETAIL_TRANSPORT_MESSAGE,
                ))
            }
        };

        if !self.cell.finish(ticket, terminal) {
            debug!("Discarding recipe response for superseded request {}", ticket);
            return;
        }

        if let Some(view) = self.cell.borrow().data() {
            let id = view.recipe.id.as_str();
            self.with_sequencer(|sequencer| {
                sequencer.start(id, 0);
            });
        }
    }

    /// "Another surprise recipe": same as a fresh load
    pub async fn reroll(&self) {
        self.load().await;
    }

    /// Retry after an error
    pub async fn retry(&self) {
        self.load().await;
    }

    /// Teardown: in-flight responses will no longer touch the state and
    /// the pending reveal is dropped.
    pub fn cancel(&self) {
        self.cell.invalidate();
        self.with_sequencer(RevealSequencer::cancel);
    }

    fn with_sequencer(&self, f: impl FnOnce(&mut RevealSequencer)) {
        if let Some(reveal) = &self.reveal {
            if let Ok(mut sequencer) = reveal.lock() {
                f(&mut sequencer);
            }
        }
    }
}

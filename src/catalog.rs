use std::sync::{Arc, Mutex};

use log::{debug, error, info};
use tokio::sync::watch;

use crate::config::AppConfig;
use crate::error::RecipeError;
use crate::model::RecipeSummary;
use crate::reveal::{reveal_channel, RevealBoard, RevealSequencer, RevealStream, RevealTiming};
use crate::service::{MealDbClient, RecipeService};
use crate::view_state::{
    StateCell, ViewError, ViewState, CATALOG_EMPTY_MESSAGE, CATALOG_TRANSPORT_MESSAGE,
};

pub type CatalogState = ViewState<Vec<RecipeSummary>>;

/// Item id carried by the grid header's reveal events
pub const HEADER_REVEAL_ID: &str = "catalog-header";

/// Card cascade plus the one-off header entrance
struct CatalogReveals {
    cards: RevealBoard,
    header: RevealSequencer,
    header_started: bool,
}

/// Backs the recipe grid: one list query per cycle, filtered by first letter.
///
/// Overlapping cycles are not serialized. Each cycle takes a ticket and only
/// the most recently started one may publish its outcome, so an older
/// response arriving late is discarded instead of overwriting newer data.
pub struct CatalogController {
    service: Arc<dyn RecipeService>,
    letter: String,
    cell: StateCell<Vec<RecipeSummary>>,
    reveals: Option<Mutex<CatalogReveals>>,
}

impl CatalogController {
    pub fn new(service: Arc<dyn RecipeService>, letter: impl Into<String>) -> Self {
        CatalogController {
            service,
            letter: letter.into(),
            cell: StateCell::new(),
            reveals: None,
        }
    }

    /// Controller talking to the configured catalog service
    pub fn from_config(config: &AppConfig) -> Result<Self, RecipeError> {
        let client = MealDbClient::new(&config.service)?;
        Ok(Self::new(
            Arc::new(client),
            config.service.catalog_letter.clone(),
        ))
    }

    /// Drive a staggered card entrance whenever a list is published, and the
    /// header entrance once, when the first cycle ends. Reveal sequences are
    /// spawned on the tokio runtime the loads run on.
    pub fn with_reveals(
        mut self,
        cards: RevealTiming,
        header: RevealTiming,
    ) -> (Self, RevealStream) {
        let (tx, rx) = reveal_channel();
        self.reveals = Some(Mutex::new(CatalogReveals {
            cards: RevealBoard::new(cards, tx.clone()),
            header: RevealSequencer::new(header, tx),
            header_started: false,
        }));
        (self, rx)
    }

    /// Snapshot of the current state
    pub fn state(&self) -> CatalogState {
        self.cell.borrow().clone()
    }

    /// Change notifications for the grid screen
    pub fn subscribe(&self) -> watch::Receiver<CatalogState> {
        self.cell.subscribe()
    }

    /// Fetch the list, showing the loading state until it lands
    pub async fn load(&self) {
        let ticket = self.cell.begin(|_| ViewState::Loading);
        self.run(ticket).await;
    }

    /// Pull-to-refresh. The current list stays visible, flagged as
    /// refreshing, until a new list replaces it. A failed refresh keeps the
    /// list and reports the failure as the state's notice. Without a list on
    /// screen this is the same as [`load`](Self::load).
    pub async fn refresh(&self) {
        let ticket = self.cell.begin(|previous| match previous {
            ViewState::Ready { data, .. } => ViewState::Ready {
                data,
                is_refreshing: true,
                notice: None,
            },
            _ => ViewState::Loading,
        });
        self.run(ticket).await;
    }

    /// Retry after an error
    pub async fn retry(&self) {
        self.load().await;
    }

    /// Teardown: in-flight responses will no longer touch the state and
    /// pending card reveals are dropped.
    pub fn cancel(&self) {
        self.cell.invalidate();
        self.with_reveals_locked(|reveals| {
            reveals.cards.cancel_all();
            reveals.header.cancel();
        });
    }

    async fn run(&self, ticket: u64) {
        self.with_reveals_locked(|reveals| reveals.cards.cancel_all());
        debug!(
            "Loading catalog for letter '{}' from {} (request {})",
            self.letter,
            self.service.service_name(),
            ticket
        );

        let outcome = match self.service.search_by_first_letter(&self.letter).await {
            Ok(recipes) => {
                info!("Loaded {} recipes", recipes.len());
                Ok(recipes)
            }
            Err(e) => {
                error!("Error fetching recipes: {}", e);
                Err(ViewError::from_error(
                    &e,
                    CATALOG_EMPTY_MESSAGE,
                    CATALOG_TRANSPORT_MESSAGE,
                ))
            }
        };

        let applied = self.cell.finish_with(ticket, |pending| match (outcome, pending) {
            (Ok(recipes), _) => ViewState::ready(recipes),
            (Err(err), ViewState::Ready { data, .. }) => ViewState::Ready {
                data,
                is_refreshing: false,
                notice: Some(err),
            },
            (Err(err), _) => ViewState::Error(err),
        });
        if !applied {
            debug!("Discarding catalog response for superseded request {}", ticket);
            return;
        }

        let state = self.cell.borrow();
        self.with_reveals_locked(|reveals| {
            if !reveals.header_started {
                reveals.header_started = true;
                reveals.header.start(HEADER_REVEAL_ID, 0);
            }
            if let Some(recipes) = state.data() {
                reveals.cards.reveal(recipes);
            }
        });
    }

    fn with_reveals_locked(&self, f: impl FnOnce(&mut CatalogReveals)) {
        if let Some(reveals) = &self.reveals {
            if let Ok(mut reveals) = reveals.lock() {
                f(&mut reveals);
            }
        }
    }
}

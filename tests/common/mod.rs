#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use recipe_surprise::{
    IngredientSlot, RecipeDetail, RecipeError, RecipeService, RecipeSummary, SLOT_COUNT,
};
use tokio::sync::oneshot;

type ListReply = Result<Vec<RecipeSummary>, RecipeError>;
type RecipeReply = Result<RecipeDetail, RecipeError>;

/// Fake catalog whose responses are released by the test, one per request,
/// in the order the requests were made
#[derive(Default)]
pub struct GatedService {
    lists: Mutex<VecDeque<oneshot::Receiver<ListReply>>>,
    recipes: Mutex<VecDeque<oneshot::Receiver<RecipeReply>>>,
}

impl GatedService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Gate for the next list request
    pub fn next_list(&self) -> oneshot::Sender<ListReply> {
        let (tx, rx) = oneshot::channel();
        self.lists.lock().unwrap().push_back(rx);
        tx
    }

    /// Gate for the next random-recipe request
    pub fn next_recipe(&self) -> oneshot::Sender<RecipeReply> {
        let (tx, rx) = oneshot::channel();
        self.recipes.lock().unwrap().push_back(rx);
        tx
    }
}

#[async_trait]
impl RecipeService for GatedService {
    fn service_name(&self) -> &str {
        "gated"
    }

    async fn search_by_first_letter(&self, _letter: &str) -> ListReply {
        let gate = self
            .lists
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected list request");
        gate.await.unwrap_or(Err(RecipeError::EmptyResult))
    }

    async fn random_recipe(&self) -> RecipeReply {
        let gate = self
            .recipes
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected recipe request");
        gate.await.unwrap_or(Err(RecipeError::EmptyResult))
    }
}

pub fn summary(id: &str, name: &str) -> RecipeSummary {
    RecipeSummary {
        id: id.to_string(),
        name: name.to_string(),
        thumbnail_url: Some(format!("https://example.com/{}.jpg", id)),
        category: Some("Dessert".to_string()),
        area: Some("British".to_string()),
    }
}

/// A recipe whose ingredients are named after the recipe, so a mix-up between
/// two recipes shows in the ingredient list
pub fn recipe(id: &str, name: &str) -> RecipeDetail {
    let mut slots = vec![IngredientSlot::default(); SLOT_COUNT];
    slots[0] = IngredientSlot {
        ingredient: Some(format!("{} base", name)),
        measure: Some("1 cup".to_string()),
    };
    slots[1] = IngredientSlot {
        ingredient: Some(format!("{} topping", name)),
        measure: None,
    };
    RecipeDetail {
        id: id.to_string(),
        name: name.to_string(),
        instructions: Some(format!("Make {}.", name)),
        slots,
        ..Default::default()
    }
}

/// Status code error the way a failed connection surfaces
pub fn transport_error() -> RecipeError {
    RecipeError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE)
}

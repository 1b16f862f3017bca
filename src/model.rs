//! Recipe records as the catalog service delivers them.
//!
//! The service is loose about its payloads: any field may be missing, `null`,
//! or an empty string. Decoding never fails on a single field; absent values
//! simply become `None` (or an empty string for the identity fields).

use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Number of numbered ingredient/measure slots on a recipe record
pub const SLOT_COUNT: usize = 20;

/// A recipe as listed in the catalog grid
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeSummary {
    pub id: String,
    pub name: String,
    pub thumbnail_url: Option<String>,
    pub category: Option<String>,
    /// Cuisine region
    pub area: Option<String>,
}

/// One numbered (ingredient, measure) position on a recipe record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientSlot {
    pub ingredient: Option<String>,
    pub measure: Option<String>,
}

/// A full recipe, as returned by the random-recipe query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeDetail {
    pub id: String,
    pub name: String,
    pub thumbnail_url: Option<String>,
    pub category: Option<String>,
    pub area: Option<String>,
    pub instructions: Option<String>,
    /// Video tutorial link
    pub video_url: Option<String>,
    /// Slots 1..=20, stored at index 0..20
    pub slots: Vec<IngredientSlot>,
}

/// An ingredient line derived from a recipe's slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    pub name: String,
    /// Empty when the recipe gives no measure
    pub measure: String,
}

impl RecipeSummary {
    fn from_fields(fields: &Map<String, Value>) -> Self {
        RecipeSummary {
            id: text(fields, "idMeal").unwrap_or_default(),
            name: text(fields, "strMeal").unwrap_or_default(),
            thumbnail_url: non_blank(fields, "strMealThumb"),
            category: non_blank(fields, "strCategory"),
            area: non_blank(fields, "strArea"),
        }
    }
}

impl RecipeDetail {
    fn from_fields(fields: &Map<String, Value>) -> Self {
        let summary = RecipeSummary::from_fields(fields);
        let slots = (1..=SLOT_COUNT)
            .map(|i| IngredientSlot {
                ingredient: text(fields, &format!("strIngredient{}", i)),
                measure: text(fields, &format!("strMeasure{}", i)),
            })
            .collect();

        RecipeDetail {
            id: summary.id,
            name: summary.name,
            thumbnail_url: summary.thumbnail_url,
            category: summary.category,
            area: summary.area,
            instructions: non_blank(fields, "strInstructions"),
            video_url: non_blank(fields, "strYoutube"),
            slots,
        }
    }

    /// Slot by its 1-based position. Positions outside 1..=20 have no slot.
    pub fn slot(&self, index: usize) -> Option<&IngredientSlot> {
        if index == 0 {
            return None;
        }
        self.slots.get(index - 1)
    }

    /// The grid-card view of this recipe
    pub fn summary(&self) -> RecipeSummary {
        RecipeSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            thumbnail_url: self.thumbnail_url.clone(),
            category: self.category.clone(),
            area: self.area.clone(),
        }
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.measure.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} {}", self.measure, self.name)
        }
    }
}

impl<'de> Deserialize<'de> for RecipeSummary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields: Map<String, Value> = Map::deserialize(deserializer)?;
        Ok(Self::from_fields(&fields))
    }
}

impl<'de> Deserialize<'de> for RecipeDetail {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields: Map<String, Value> = Map::deserialize(deserializer)?;
        Ok(Self::from_fields(&fields))
    }
}

/// Raw string value of a field. Numbers are kept as text; anything else is absent.
fn text(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_blank(fields: &Map<String, Value>, key: &str) -> Option<String> {
    text(fields, key).filter(|s| !s.trim().is_empty())
}

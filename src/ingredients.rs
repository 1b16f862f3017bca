use crate::model::{Ingredient, RecipeDetail, SLOT_COUNT};

/// Build the ingredient list shown on the detail page.
///
/// Walks slots 1 through 20 in order and keeps every slot whose ingredient
/// name is non-empty after trimming. Measures are trimmed; a missing measure
/// becomes an empty string. Nothing is deduplicated or reordered.
pub fn extract(detail: &RecipeDetail) -> Vec<Ingredient> {
    (1..=SLOT_COUNT)
        .filter_map(|index| detail.slot(index))
        .filter_map(|slot| {
            let name = slot.ingredient.as_deref()?.trim();
            if name.is_empty() {
                return None;
            }
            Some(Ingredient {
                name: name.to_string(),
                measure: slot
                    .measure
                    .as_deref()
                    .map(str::trim)
                    .unwrap_or_default()
                    .to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IngredientSlot;

    fn detail_with(slots: &[(usize, Option<&str>, Option<&str>)]) -> RecipeDetail {
        let mut detail = RecipeDetail {
            slots: vec![IngredientSlot::default(); SLOT_COUNT],
            ..Default::default()
        };
        for (index, ingredient, measure) in slots {
            detail.slots[index - 1] = IngredientSlot {
                ingredient: ingredient.map(String::from),
                measure: measure.map(String::from),
            };
        }
        detail
    }

    #[test]
    fn test_all_blank_slots_yield_empty_list() {
        let detail = detail_with(&[(1, Some(""), Some("")), (2, Some("   "), Some("1 tsp"))]);
        assert!(extract(&detail).is_empty());
        assert!(extract(&RecipeDetail::default()).is_empty());
    }

    #[test]
    fn test_trimmed_name_with_missing_measure() {
        let detail = detail_with(&[
            (1, Some("Flour"), Some("200g")),
            (2, None, Some("orphan measure")),
            (3, Some("  Salt "), None),
        ]);

        let ingredients = extract(&detail);
        assert_eq!(ingredients.len(), 2);
        assert_eq!(
            ingredients[1],
            Ingredient {
                name: "Salt".to_string(),
                measure: String::new(),
            }
        );
    }

    #[test]
    fn test_order_follows_slot_index() {
        let detail = detail_with(&[
            (20, Some("Zest"), Some(" 1 ")),
            (5, Some("Eggs"), Some("2")),
            (11, Some("Milk"), Some("1 cup")),
        ]);

        let names: Vec<_> = extract(&detail).into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["Eggs", "Milk", "Zest"]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let detail = detail_with(&[
            (1, Some("Butter"), Some("50g")),
            (2, Some("Butter"), Some("50g")),
        ]);
        assert_eq!(extract(&detail).len(), 2);
    }

    #[test]
    fn test_full_record_is_bounded_and_clean() {
        let filled: Vec<_> = (1..=SLOT_COUNT)
            .map(|i| (i, if i % 3 == 0 { Some(" ") } else { Some("x") }, Some(" m ")))
            .collect();
        let ingredients = extract(&detail_with(&filled));

        assert!(ingredients.len() <= SLOT_COUNT);
        assert_eq!(ingredients.len(), SLOT_COUNT - SLOT_COUNT / 3);
        assert!(ingredients.iter().all(|i| !i.name.trim().is_empty()));
        assert!(ingredients.iter().all(|i| i.measure == "m"));
    }

    #[test]
    fn test_measure_whitespace_only_becomes_empty() {
        let detail = detail_with(&[(1, Some("Water"), Some("   "))]);
        assert_eq!(extract(&detail)[0].measure, "");
    }
}

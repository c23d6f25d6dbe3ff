//! Shopping list grouped by dish.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::plan::Ingredient;

/// Everything to buy for one dish across the week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DishGroup {
    pub dish_name: String,
    /// Ingredients from every occurrence of the dish, in meal order.
    pub ingredients: Vec<Ingredient>,
    /// Number of meal slots that serve this dish.
    pub occurrences: usize,
}

/// Ingredients grouped by dish, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupedShoppingList {
    groups: Vec<DishGroup>,
}

impl GroupedShoppingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `ingredients` to the group named `dish_name`, creating the
    /// group at the end of the list if it does not exist yet.
    pub(crate) fn add_dish(&mut self, dish_name: &str, ingredients: &[Ingredient]) {
        let group = match self.groups.iter().position(|g| g.dish_name == dish_name) {
            Some(idx) => &mut self.groups[idx],
            None => {
                self.groups.push(DishGroup {
                    dish_name: dish_name.to_string(),
                    ingredients: Vec::new(),
                    occurrences: 0,
                });
                let last = self.groups.len() - 1;
                &mut self.groups[last]
            }
        };
        group.ingredients.extend_from_slice(ingredients);
        group.occurrences += 1;
    }

    pub fn groups(&self) -> &[DishGroup] {
        &self.groups
    }

    pub fn group(&self, dish_name: &str) -> Option<&DishGroup> {
        self.groups.iter().find(|g| g.dish_name == dish_name)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total ingredient lines across all groups.
    pub fn ingredient_count(&self) -> usize {
        self.groups.iter().map(|g| g.ingredients.len()).sum()
    }

    /// Sorted, de-duplicated ingredient lines for a single shopping pass.
    pub fn consolidated(&self) -> Vec<String> {
        self.groups
            .iter()
            .flat_map(|g| g.ingredients.iter().map(|i| i.to_string()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

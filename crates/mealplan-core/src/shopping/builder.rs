//! Derives a [`GroupedShoppingList`] from a [`WeeklyMealPlan`].
//!
//! Pure and deterministic: meals are visited Monday breakfast through
//! Sunday dinner, groups keep first-seen order, and a dish served more than
//! once contributes its ingredients once per serving (concatenated, not
//! merged by quantity).

use tracing::debug;

use crate::plan::{ParseError, WeeklyMealPlan};

use super::list::GroupedShoppingList;

#[derive(Debug, Clone, Copy, Default)]
pub struct ShoppingListBuilderAgent;

impl ShoppingListBuilderAgent {
    pub fn new() -> Self {
        Self
    }

    /// Build the grouped list. Fails only if a dish in the plan has no
    /// name or no ingredients.
    pub fn build(&self, plan: &WeeklyMealPlan) -> Result<GroupedShoppingList, ParseError> {
        plan.validate()?;

        let mut list = GroupedShoppingList::new();
        for (day, slot, dish) in plan.meals() {
            debug!(day = %day, slot = %slot, dish = %dish.name, "adding dish");
            list.add_dish(&dish.name, &dish.ingredients);
        }

        debug!(
            groups = list.len(),
            ingredients = list.ingredient_count(),
            "shopping list built"
        );
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{DayPlan, Dish, Ingredient, Weekday};

    fn ing(name: &str) -> Ingredient {
        Ingredient::new(name, "")
    }

    fn unique_plan() -> WeeklyMealPlan {
        WeeklyMealPlan::from_days(Weekday::ALL.map(|d| {
            DayPlan::new(
                Dish::new(format!("{d} breakfast"), vec![ing("eggs")]),
                Dish::new(format!("{d} dinner"), vec![ing("pork"), ing("lotus root")]),
            )
        }))
    }

    #[test]
    fn one_group_per_meal_when_all_dishes_differ() {
        let list = ShoppingListBuilderAgent::new().build(&unique_plan()).unwrap();
        assert_eq!(list.len(), 14);
        assert_eq!(list.groups()[0].dish_name, "Monday breakfast");
        assert_eq!(list.groups()[1].dish_name, "Monday dinner");
        assert_eq!(list.groups()[13].dish_name, "Sunday dinner");
        assert_eq!(list.ingredient_count(), 7 * 3);
    }

    #[test]
    fn repeated_dish_concatenates_ingredients() {
        let mut days = unique_plan_days();
        for day in days.iter_mut() {
            day.breakfast = Dish::new("Toast", vec![ing("bread"), ing("butter")]);
        }
        let list = ShoppingListBuilderAgent::new()
            .build(&WeeklyMealPlan::from_days(days))
            .unwrap();

        assert_eq!(list.len(), 8);
        let toast = list.group("Toast").unwrap();
        assert_eq!(toast.occurrences, 7);
        assert_eq!(toast.ingredients.len(), 14);
        assert_eq!(list.groups()[0].dish_name, "Toast");
        assert_eq!(list.groups()[1].dish_name, "Monday dinner");
    }

    #[test]
    fn build_is_idempotent() {
        let plan = unique_plan();
        let builder = ShoppingListBuilderAgent::new();
        assert_eq!(builder.build(&plan).unwrap(), builder.build(&plan).unwrap());
    }

    #[test]
    fn rejects_hand_built_plan_with_empty_dish() {
        let mut days = unique_plan_days();
        days[6].dinner.ingredients.clear();
        let err = ShoppingListBuilderAgent::new()
            .build(&WeeklyMealPlan::from_days(days))
            .unwrap_err();
        assert!(matches!(err, ParseError::NoIngredients { day: Weekday::Sunday, .. }));
    }

    fn unique_plan_days() -> [DayPlan; 7] {
        Weekday::ALL.map(|d| unique_plan().day(d).clone())
    }
}

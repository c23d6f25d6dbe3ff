//! Typed weekly meal plan.
//!
//! A [`WeeklyMealPlan`] stores one [`DayPlan`] per [`Weekday`] in a fixed
//! array, so a plan value always has all seven days with both meal slots
//! filled. Values coming from the model are built by
//! [`super::parser::parse_meal_plan_json`].

use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::parser::ParseError;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Day of the week, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All days in calendar order.
    pub const ALL: [Weekday; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// Position in [`Weekday::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = WeekdayParseError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|day| day.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| WeekdayParseError(s.to_owned()))
    }
}

/// Error returned when parsing an invalid [`Weekday`] string.
#[derive(Debug, Clone)]
pub struct WeekdayParseError(pub String);

impl fmt::Display for WeekdayParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid weekday: {:?}", self.0)
    }
}

impl std::error::Error for WeekdayParseError {}

// ---------------------------------------------------------------------------

/// Meal slot within a day. Breakfast comes before dinner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MealSlot {
    Breakfast,
    Dinner,
}

impl MealSlot {
    pub const ALL: [MealSlot; 2] = [Self::Breakfast, Self::Dinner];

    /// Key used for this slot in the model's JSON.
    pub fn key(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Dinner => "dinner",
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Breakfast => "Breakfast",
            Self::Dinner => "Dinner",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Dishes
// ---------------------------------------------------------------------------

/// One ingredient line. The quantity is free-form ("2 cups", "300g").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default)]
    pub quantity: String,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
        }
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quantity = self.quantity.trim();
        if quantity.is_empty() {
            f.write_str(self.name.trim())
        } else {
            write!(f, "{} {}", quantity, self.name.trim())
        }
    }
}

/// A named recipe with its ingredient list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dish {
    pub name: String,
    pub ingredients: Vec<Ingredient>,
    /// Cooking instructions, when the model supplied them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl Dish {
    pub fn new(name: impl Into<String>, ingredients: Vec<Ingredient>) -> Self {
        Self {
            name: name.into(),
            ingredients,
            instructions: None,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }
}

/// Breakfast and dinner for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayPlan {
    pub breakfast: Dish,
    pub dinner: Dish,
}

impl DayPlan {
    pub fn new(breakfast: Dish, dinner: Dish) -> Self {
        Self { breakfast, dinner }
    }

    pub fn meal(&self, slot: MealSlot) -> &Dish {
        match slot {
            MealSlot::Breakfast => &self.breakfast,
            MealSlot::Dinner => &self.dinner,
        }
    }
}

// ---------------------------------------------------------------------------
// Weekly plan
// ---------------------------------------------------------------------------

/// Seven days of breakfast and dinner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyMealPlan {
    days: [DayPlan; 7],
}

impl WeeklyMealPlan {
    /// Build a plan from days in calendar order (Monday first).
    pub fn from_days(days: [DayPlan; 7]) -> Self {
        Self { days }
    }

    pub fn day(&self, day: Weekday) -> &DayPlan {
        &self.days[day.index()]
    }

    /// Days in calendar order.
    pub fn days(&self) -> impl Iterator<Item = (Weekday, &DayPlan)> {
        Weekday::ALL.into_iter().zip(self.days.iter())
    }

    /// All 14 meal slots, Monday breakfast through Sunday dinner.
    pub fn meals(&self) -> impl Iterator<Item = (Weekday, MealSlot, &Dish)> {
        self.days().flat_map(|(day, plan)| {
            MealSlot::ALL
                .into_iter()
                .map(move |slot| (day, slot, plan.meal(slot)))
        })
    }

    /// Check the per-dish invariants that the type itself cannot enforce:
    /// every dish is named and lists at least one named ingredient.
    pub fn validate(&self) -> Result<(), ParseError> {
        for (day, slot, dish) in self.meals() {
            if dish.name.trim().is_empty() {
                return Err(ParseError::MissingDishName { day, slot });
            }
            if dish.ingredients.is_empty() {
                return Err(ParseError::NoIngredients {
                    day,
                    slot,
                    dish: dish.name.clone(),
                });
            }
            if dish.ingredients.iter().any(|i| i.name.trim().is_empty()) {
                return Err(ParseError::BlankIngredient {
                    day,
                    slot,
                    dish: dish.name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Serializes in the same shape the model is asked to produce:
/// `{"Monday": {"breakfast": {...}, "dinner": {...}}, ...}`.
impl Serialize for WeeklyMealPlan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.days.len()))?;
        for (day, plan) in self.days() {
            map.serialize_entry(day.as_str(), plan)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dish(name: &str) -> Dish {
        Dish::new(name, vec![Ingredient::new("rice", "1 cup")])
    }

    fn plan() -> WeeklyMealPlan {
        WeeklyMealPlan::from_days(Weekday::ALL.map(|d| {
            DayPlan::new(dish(&format!("{d} breakfast")), dish(&format!("{d} dinner")))
        }))
    }

    #[test]
    fn weekday_parse_is_case_insensitive() {
        assert_eq!("monday".parse::<Weekday>().unwrap(), Weekday::Monday);
        assert_eq!(" SUNDAY ".parse::<Weekday>().unwrap(), Weekday::Sunday);
        assert!("Funday".parse::<Weekday>().is_err());
    }

    #[test]
    fn weekday_index_matches_all_order() {
        for (i, day) in Weekday::ALL.into_iter().enumerate() {
            assert_eq!(day.index(), i);
        }
    }

    #[test]
    fn ingredient_display_omits_blank_quantity() {
        assert_eq!(Ingredient::new("rice", "2 cups").to_string(), "2 cups rice");
        assert_eq!(Ingredient::new("salt", "  ").to_string(), "salt");
    }

    #[test]
    fn meals_traverse_day_then_slot() {
        let plan = plan();
        let order: Vec<(Weekday, MealSlot)> = plan.meals().map(|(d, s, _)| (d, s)).collect();
        assert_eq!(order.len(), 14);
        assert_eq!(order[0], (Weekday::Monday, MealSlot::Breakfast));
        assert_eq!(order[1], (Weekday::Monday, MealSlot::Dinner));
        assert_eq!(order[2], (Weekday::Tuesday, MealSlot::Breakfast));
        assert_eq!(order[13], (Weekday::Sunday, MealSlot::Dinner));
    }

    #[test]
    fn validate_rejects_dish_without_ingredients() {
        let mut days = Weekday::ALL.map(|_| DayPlan::new(dish("a"), dish("b")));
        days[3].dinner.ingredients.clear();
        let err = WeeklyMealPlan::from_days(days).validate().unwrap_err();
        assert!(
            matches!(err, ParseError::NoIngredients { day: Weekday::Thursday, slot: MealSlot::Dinner, .. }),
            "expected NoIngredients, got: {err}"
        );
    }

    #[test]
    fn validate_rejects_blank_dish_name() {
        let mut days = Weekday::ALL.map(|_| DayPlan::new(dish("a"), dish("b")));
        days[0].breakfast.name = "   ".to_string();
        let err = WeeklyMealPlan::from_days(days).validate().unwrap_err();
        assert!(matches!(err, ParseError::MissingDishName { .. }));
    }

    #[test]
    fn serializes_with_day_names_in_order() {
        let json = serde_json::to_value(plan()).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 7);
        assert_eq!(
            json["Wednesday"]["dinner"]["name"],
            serde_json::json!("Wednesday dinner")
        );
        assert!(json["Monday"]["breakfast"].get("instructions").is_none());
    }
}

//! Meal plan JSON parser with validation.
//!
//! Parses the model's JSON payload into a [`WeeklyMealPlan`] and validates:
//! - Every key is a weekday name, and no day appears twice.
//! - All seven days are present.
//! - Each day has both a breakfast and a dinner.
//! - Each dish has a name and at least one named ingredient.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use super::model::{DayPlan, Dish, Ingredient, MealSlot, WeeklyMealPlan, Weekday};

/// Errors that can occur during meal plan parsing and validation.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown day {0:?} in meal plan")]
    UnknownDay(String),

    #[error("day {0} appears more than once")]
    DuplicateDay(Weekday),

    #[error("meal plan is missing {0}")]
    MissingDay(Weekday),

    #[error("{day} is missing its {slot} dish")]
    MissingMeal { day: Weekday, slot: MealSlot },

    #[error("{day} {slot} has no dish name")]
    MissingDishName { day: Weekday, slot: MealSlot },

    #[error("{day} {slot} dish {dish:?} lists no ingredients")]
    NoIngredients {
        day: Weekday,
        slot: MealSlot,
        dish: String,
    },

    #[error("{day} {slot} dish {dish:?} has an ingredient with no name")]
    BlankIngredient {
        day: Weekday,
        slot: MealSlot,
        dish: String,
    },
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct WireDay {
    #[serde(default, alias = "Breakfast")]
    breakfast: Option<WireDish>,
    #[serde(default, alias = "Dinner")]
    dinner: Option<WireDish>,
}

#[derive(Debug, Deserialize)]
struct WireDish {
    #[serde(default, alias = "dish")]
    name: Option<String>,
    #[serde(default)]
    ingredients: Option<Vec<WireIngredient>>,
    #[serde(default)]
    instructions: Option<String>,
}

/// Either `{"name": ..., "quantity": ...}` or a bare string such as
/// `"2 cups rice"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireIngredient {
    Detailed {
        name: String,
        #[serde(default)]
        quantity: String,
    },
    Plain(String),
}

impl From<WireIngredient> for Ingredient {
    fn from(wire: WireIngredient) -> Self {
        match wire {
            WireIngredient::Detailed { name, quantity } => Ingredient::new(name.trim(), quantity.trim()),
            WireIngredient::Plain(text) => Ingredient::new(text.trim(), ""),
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse and validate a meal plan JSON payload.
///
/// Returns a validated [`WeeklyMealPlan`] or a descriptive error.
pub fn parse_meal_plan_json(content: &str) -> Result<WeeklyMealPlan, ParseError> {
    let body = strip_code_fence(content);
    if body.is_empty() {
        return Err(ParseError::EmptyResponse);
    }

    let wire: BTreeMap<String, WireDay> = serde_json::from_str(body)?;
    let mut by_day = index_days(wire)?;

    let mut days = Vec::with_capacity(Weekday::ALL.len());
    for day in Weekday::ALL {
        let wire_day = by_day.remove(&day).ok_or(ParseError::MissingDay(day))?;
        let breakfast = convert_dish(day, MealSlot::Breakfast, wire_day.breakfast)?;
        let dinner = convert_dish(day, MealSlot::Dinner, wire_day.dinner)?;
        days.push(DayPlan::new(breakfast, dinner));
    }

    let days: [DayPlan; 7] = match days.try_into() {
        Ok(days) => days,
        Err(partial) => {
            let partial: Vec<DayPlan> = partial;
            return Err(ParseError::MissingDay(Weekday::ALL[partial.len().min(6)]));
        }
    };
    let plan = WeeklyMealPlan::from_days(days);
    plan.validate()?;
    Ok(plan)
}

/// Map raw keys to weekdays, rejecting unknown and repeated days.
fn index_days(wire: BTreeMap<String, WireDay>) -> Result<BTreeMap<Weekday, WireDay>, ParseError> {
    let mut by_day = BTreeMap::new();
    for (key, value) in wire {
        let day: Weekday = key.parse().map_err(|_| ParseError::UnknownDay(key.clone()))?;
        if by_day.insert(day, value).is_some() {
            return Err(ParseError::DuplicateDay(day));
        }
    }
    Ok(by_day)
}

fn convert_dish(day: Weekday, slot: MealSlot, wire: Option<WireDish>) -> Result<Dish, ParseError> {
    let wire = wire.ok_or(ParseError::MissingMeal { day, slot })?;

    let name = wire
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or(ParseError::MissingDishName { day, slot })?;

    let ingredients: Vec<Ingredient> = wire
        .ingredients
        .unwrap_or_default()
        .into_iter()
        .map(Ingredient::from)
        .collect();

    let instructions = wire
        .instructions
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty());

    Ok(Dish {
        name,
        ingredients,
        instructions,
    })
}

/// Drop a surrounding Markdown code fence (```` ```json ... ``` ````).
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the info string ("json") on the opening line.
    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

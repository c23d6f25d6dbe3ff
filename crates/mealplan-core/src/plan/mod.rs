//! Meal plans: request, typed model, JSON parsing, and generation.

pub mod generate;
pub mod model;
pub mod parser;
pub mod request;

pub use generate::{
    CreateError, MealPlanCreatorAgent, PLAN_TEMPERATURE, build_structured_request,
    build_system_instruction, build_user_prompt, meal_plan_schema,
};
pub use model::{DayPlan, Dish, Ingredient, MealSlot, WeeklyMealPlan, Weekday};
pub use parser::{ParseError, parse_meal_plan_json};
pub use request::{
    DEFAULT_CUISINE_CONSTRAINTS, DEFAULT_PREFERENCES, MealPlanRequest, RequestError,
};

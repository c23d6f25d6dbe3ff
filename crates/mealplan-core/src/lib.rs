//! Weekly meal planning: ask a generative model for a structured 7-day
//! plan, aggregate its ingredients into a shopping list grouped by dish,
//! and deliver both by email.
//!
//! ```text
//! MealPlanRequest
//!     |
//!     v
//! MealPlanCreatorAgent --generate()--> dyn TextModel (Gemini)
//!     |  parse_meal_plan_json()
//!     v
//! WeeklyMealPlan --ShoppingListBuilderAgent::build()--> GroupedShoppingList
//!     |                                                     |
//!     +------------------- render ---------------------------+
//!                            |
//!                            v
//!                     dyn Delivery (SMTP)
//! ```

pub mod delivery;
pub mod llm;
pub mod orchestrator;
pub mod plan;
pub mod render;
pub mod shopping;

pub use orchestrator::{DeliveryTarget, Pipeline, PipelineError, RunSummary};

//! Meal plan generation: prompt construction, response schema, and the
//! agent that calls the model and validates its answer.

use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, info};

use crate::llm::{GenerationError, StructuredRequest, TextModel};
use crate::plan::model::{MealSlot, WeeklyMealPlan, Weekday};
use crate::plan::parser::{ParseError, parse_meal_plan_json};
use crate::plan::request::MealPlanRequest;

/// Sampling temperature for plan generation.
pub const PLAN_TEMPERATURE: f32 = 0.7;

/// Errors from [`MealPlanCreatorAgent::generate`].
#[derive(Debug, Error)]
pub enum CreateError {
    #[error("meal plan generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("model returned an invalid meal plan: {0}")]
    Parse(#[from] ParseError),
}

// ---------------------------------------------------------------------------
// Prompt construction
// ---------------------------------------------------------------------------

/// Output contract appended to every system instruction.
const OUTPUT_RULES: &str = "\
ONLY respond with a valid, clean JSON object that strictly adheres to the provided schema. \
Use the day names Monday through Sunday as keys, each with a `breakfast` and a `dinner` dish. \
Every dish needs a `name` and a non-empty `ingredients` list of `{name, quantity}` objects. \
Do not include any explanations, greetings, or formatting outside the JSON.";

/// Build the system instruction: role, house rules, and output contract.
pub fn build_system_instruction(request: &MealPlanRequest) -> String {
    let mut prompt = String::with_capacity(1024);

    prompt.push_str(
        "You are an expert, helpful meal planning assistant for a Singaporean Chinese family. ",
    );
    prompt.push_str(&format!(
        "Your task is to generate a complete 7-day meal plan for a family of {}, \
         including Breakfast and Dinner.\n\n",
        request.family_size()
    ));

    if !request.cuisine_constraints().is_empty() {
        prompt.push_str("Mandatory constraints:\n");
        for (i, constraint) in request.cuisine_constraints().iter().enumerate() {
            prompt.push_str(&format!("{}. {}\n", i + 1, constraint));
        }
        prompt.push('\n');
    }

    prompt.push_str(OUTPUT_RULES);
    prompt
}

/// Build the user prompt carrying the family's free-text preferences.
pub fn build_user_prompt(request: &MealPlanRequest) -> String {
    format!(
        "Generate a 7-day family meal plan for {} people. \
         The user has the following preferences/restrictions: '{}'. \
         Ensure the plan strictly follows every mandatory constraint, \
         and give ingredient quantities suitable for {} people.",
        request.family_size(),
        request.preferences(),
        request.family_size()
    )
}

// ---------------------------------------------------------------------------
// Response schema
// ---------------------------------------------------------------------------

/// Schema for the whole week, in the OpenAPI subset Gemini accepts.
pub fn meal_plan_schema(family_size: u32) -> Value {
    let ingredient = json!({
        "type": "OBJECT",
        "properties": {
            "name": {"type": "STRING", "description": "Ingredient name."},
            "quantity": {"type": "STRING", "description": "Amount with unit, e.g. '2 cups'."}
        },
        "required": ["name", "quantity"],
        "propertyOrdering": ["name", "quantity"]
    });

    let dish = json!({
        "type": "OBJECT",
        "properties": {
            "name": {"type": "STRING", "description": "The name of the dish."},
            "ingredients": {
                "type": "ARRAY",
                "items": ingredient,
                "description": format!(
                    "List of ingredients with quantities suitable for {family_size} people."
                )
            },
            "instructions": {"type": "STRING", "description": "Short cooking instructions."}
        },
        "required": ["name", "ingredients"],
        "propertyOrdering": ["name", "ingredients", "instructions"]
    });

    let slot_keys: Vec<&str> = MealSlot::ALL.iter().map(|s| s.key()).collect();
    let mut day_properties = serde_json::Map::new();
    for slot in MealSlot::ALL {
        day_properties.insert(slot.key().to_string(), dish.clone());
    }
    let day = json!({
        "type": "OBJECT",
        "properties": day_properties,
        "required": slot_keys,
        "propertyOrdering": slot_keys
    });

    let day_names: Vec<&str> = Weekday::ALL.iter().map(|d| d.as_str()).collect();
    let mut week_properties = serde_json::Map::new();
    for name in &day_names {
        week_properties.insert(name.to_string(), day.clone());
    }

    json!({
        "type": "OBJECT",
        "properties": week_properties,
        "required": day_names,
        "propertyOrdering": day_names
    })
}

/// Assemble the full structured request for one generation call.
pub fn build_structured_request(request: &MealPlanRequest) -> StructuredRequest {
    StructuredRequest {
        system_instruction: build_system_instruction(request),
        prompt: build_user_prompt(request),
        response_schema: meal_plan_schema(request.family_size()),
        temperature: PLAN_TEMPERATURE,
    }
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// Asks a [`TextModel`] for a week of meals and validates the answer.
pub struct MealPlanCreatorAgent {
    model: Box<dyn TextModel>,
}

impl MealPlanCreatorAgent {
    pub fn new(model: Box<dyn TextModel>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Generate a plan with a single model call. Failures are returned to
    /// the caller as-is; nothing is retried.
    pub async fn generate(&self, request: &MealPlanRequest) -> Result<WeeklyMealPlan, CreateError> {
        info!(
            model = %self.model.name(),
            family_size = request.family_size(),
            "requesting weekly meal plan"
        );

        let structured = build_structured_request(request);
        let raw = self.model.generate(&structured).await?;
        debug!(raw = %raw, "raw meal plan response");

        let plan = parse_meal_plan_json(&raw)?;
        for (day, meals) in plan.days() {
            info!(
                day = %day,
                breakfast = %meals.breakfast.name,
                dinner = %meals.dinner.name,
                "planned"
            );
        }
        Ok(plan)
    }
}

impl std::fmt::Debug for MealPlanCreatorAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MealPlanCreatorAgent")
            .field("model", &self.model.name())
            .finish()
    }
}

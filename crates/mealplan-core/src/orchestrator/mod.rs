//! Runs one planning pass: generate the plan, build the shopping list,
//! show both, then hand them to delivery.

use std::io::Write;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::info;

use crate::delivery::{Delivery, DeliveryError, Email};
use crate::plan::{CreateError, MealPlanCreatorAgent, MealPlanRequest, ParseError, WeeklyMealPlan};
use crate::render;
use crate::shopping::{GroupedShoppingList, ShoppingListBuilderAgent};

/// Where and how to send the finished plan.
pub struct DeliveryTarget {
    pub delivery: Box<dyn Delivery>,
    pub from: String,
    pub to: String,
}

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Create(#[from] CreateError),

    #[error("cannot build shopping list: {0}")]
    ShoppingList(#[from] ParseError),

    #[error("failed to write plan output: {0}")]
    Io(#[from] std::io::Error),

    /// Raised after the plan and list were already written to the output.
    #[error("email delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub plan: WeeklyMealPlan,
    pub shopping_list: GroupedShoppingList,
    pub delivered: bool,
}

/// The planning pipeline. Each collaborator is supplied at construction.
pub struct Pipeline {
    creator: MealPlanCreatorAgent,
    builder: ShoppingListBuilderAgent,
    target: Option<DeliveryTarget>,
    week_start: NaiveDate,
}

impl Pipeline {
    /// `target = None` skips delivery (the plan is only printed).
    pub fn new(
        creator: MealPlanCreatorAgent,
        target: Option<DeliveryTarget>,
        week_start: NaiveDate,
    ) -> Self {
        Self {
            creator,
            builder: ShoppingListBuilderAgent::new(),
            target,
            week_start,
        }
    }

    /// Run the pipeline, writing the human-readable plan and shopping list
    /// to `out` before any delivery is attempted.
    pub async fn run<W: Write>(
        &self,
        request: &MealPlanRequest,
        out: &mut W,
    ) -> Result<RunSummary, PipelineError> {
        // 1. Generate.
        let plan = self.creator.generate(request).await?;

        // 2. Aggregate.
        let shopping_list = self.builder.build(&plan)?;
        info!(
            dishes = shopping_list.len(),
            ingredients = shopping_list.ingredient_count(),
            "shopping list ready"
        );

        // 3. Show.
        writeln!(out, "\n--- Weekly Meal Plan (family of {}) ---", request.family_size())?;
        write!(out, "{}", render::render_plan(&plan))?;
        writeln!(out, "\n--- Shopping List ---")?;
        write!(out, "{}", render::render_shopping_list(&shopping_list))?;
        out.flush()?;

        // 4. Deliver.
        let delivered = match &self.target {
            Some(target) => {
                let email = Email {
                    from: target.from.clone(),
                    to: target.to.clone(),
                    subject: render::email_subject(self.week_start, request.family_size()),
                    body: render::email_body(&plan, &shopping_list, request.family_size()),
                };
                info!(
                    transport = %target.delivery.name(),
                    to = %email.to,
                    subject = %email.subject,
                    "delivering plan"
                );
                target.delivery.deliver(&email).await?;
                true
            }
            None => {
                info!("delivery disabled; plan printed only");
                false
            }
        };

        Ok(RunSummary {
            plan,
            shopping_list,
            delivered,
        })
    }
}

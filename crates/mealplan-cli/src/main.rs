mod config;
mod prompt;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use mealplan_core::delivery::SmtpDelivery;
use mealplan_core::llm::GeminiClient;
use mealplan_core::plan::{MealPlanCreatorAgent, MealPlanRequest};
use mealplan_core::render::planning_week_start;
use mealplan_core::{DeliveryTarget, Pipeline};

use config::{CliOverrides, ResolvedConfig};

#[derive(Parser)]
#[command(
    name = "mealplan",
    about = "Plan a week of family meals with Gemini and email the shopping list"
)]
struct Cli {
    /// Dishes, allergies, or dietary goals (skips the interactive prompt)
    #[arg(long)]
    preferences: Option<String>,

    /// Number of people to plan for (overrides FAMILY_SIZE)
    #[arg(long)]
    family_size: Option<u32>,

    /// Print the plan without sending email (SMTP settings not required)
    #[arg(long)]
    no_email: bool,

    /// Config file path (default: ~/.config/mealplan/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Gemini model name (overrides GEMINI_MODEL)
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Before the subscriber so RUST_LOG can come from .env.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let overrides = CliOverrides {
        family_size: cli.family_size,
        model: cli.model,
        no_email: cli.no_email,
    };
    let resolved = ResolvedConfig::resolve(cli.config.as_deref(), &overrides)
        .context("configuration error")?;
    info!(
        family_size = resolved.family_size,
        model = %resolved.gemini.model,
        email = resolved.smtp.is_some(),
        "configuration loaded"
    );

    let preferences = match cli.preferences {
        Some(p) => p,
        None => {
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            prompt::collect_preferences(stdin.lock(), &mut stdout, resolved.family_size)
                .context("failed to read preferences")?
        }
    };
    let request = MealPlanRequest::new(resolved.family_size, preferences)?;

    let client = GeminiClient::new(resolved.gemini).context("failed to build Gemini client")?;
    let target = match &resolved.smtp {
        Some(smtp) => Some(DeliveryTarget {
            delivery: Box::new(SmtpDelivery::new(smtp).context("failed to configure SMTP")?),
            from: smtp.address.clone(),
            to: smtp.recipient.clone(),
        }),
        None => None,
    };

    let week_start = planning_week_start(chrono::Local::now().date_naive());
    let pipeline = Pipeline::new(
        MealPlanCreatorAgent::new(Box::new(client)),
        target,
        week_start,
    );

    let mut stdout = io::stdout();
    let summary = pipeline
        .run(&request, &mut stdout)
        .await
        .context("meal planning failed")?;

    match (&resolved.smtp, summary.delivered) {
        (Some(smtp), true) => writeln!(
            stdout,
            "\nMeal plan for the week of {week_start} emailed to {}.",
            smtp.recipient
        )?,
        _ => writeln!(stdout, "\nEmail disabled; plan printed only.")?,
    }

    Ok(())
}

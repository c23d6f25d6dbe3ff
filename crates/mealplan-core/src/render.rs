//! Plain-text rendering of plans and shopping lists for the terminal and
//! the email body.

use std::fmt::Write as _;
use std::sync::LazyLock;

use chrono::{Datelike, Duration, NaiveDate};
use regex::Regex;

use crate::plan::{MealSlot, WeeklyMealPlan};
use crate::shopping::GroupedShoppingList;

const RULE: &str = "================================";

/// Sentence end followed by whitespace and the start of the next sentence.
static SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([.?!])\s+(["A-Z0-9])"#).expect("valid sentence regex"));

/// Split instructions into one bulleted sentence per line.
pub fn format_instructions(instructions: &str, indent: &str) -> String {
    let split = SENTENCE_BREAK.replace_all(instructions.trim(), "$1\n$2");
    split
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| format!("{indent}- {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The week's meals, one block per day.
pub fn render_plan(plan: &WeeklyMealPlan) -> String {
    let mut out = String::new();
    for (day, meals) in plan.days() {
        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(out, "{day}:");
        for slot in MealSlot::ALL {
            let dish = meals.meal(slot);
            let _ = writeln!(out, "   - {slot}: {}", dish.name);
            if let Some(instructions) = dish.instructions.as_deref() {
                let formatted = format_instructions(instructions, "        ");
                if !formatted.is_empty() {
                    let _ = writeln!(out, "     * Instructions:");
                    let _ = writeln!(out, "{formatted}");
                }
            }
        }
    }
    let _ = writeln!(out, "{RULE}");
    out
}

/// Ingredients grouped under each dish.
pub fn render_shopping_list(list: &GroupedShoppingList) -> String {
    if list.is_empty() {
        return "The shopping list is empty.\n".to_string();
    }
    let mut out = String::new();
    for group in list.groups() {
        if group.occurrences > 1 {
            let _ = writeln!(out, "\n{} (x{}) ingredients:", group.dish_name, group.occurrences);
        } else {
            let _ = writeln!(out, "\n{} ingredients:", group.dish_name);
        }
        for ingredient in &group.ingredients {
            let _ = writeln!(out, "  - {ingredient}");
        }
    }
    out
}

/// Numbered, de-duplicated ingredient lines.
pub fn render_consolidated(list: &GroupedShoppingList) -> String {
    let mut out = String::new();
    for (i, item) in list.consolidated().iter().enumerate() {
        let _ = writeln!(out, "{}. {item}", i + 1);
    }
    out
}

/// The Monday the plan is for: `today` if it is a Monday, else the next one.
pub fn planning_week_start(today: NaiveDate) -> NaiveDate {
    let days_until_monday = (7 - today.weekday().num_days_from_monday()) % 7;
    today + Duration::days(i64::from(days_until_monday))
}

pub fn email_subject(week_start: NaiveDate, family_size: u32) -> String {
    format!(
        "Weekly Meal Plan & Shopping List: week of {} ({} people)",
        week_start.format("%Y-%m-%d"),
        family_size
    )
}

/// Full email body: plan, grouped list, then consolidated totals.
pub fn email_body(plan: &WeeklyMealPlan, list: &GroupedShoppingList, family_size: u32) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "WEEKLY MEAL PLAN (Family of {family_size})\n");
    out.push_str(&render_plan(plan));
    out.push_str("\n\nSHOPPING LIST BY DISH\n");
    out.push_str(&render_shopping_list(list));
    out.push_str("\n--- CONSOLIDATED TOTALS (for the shopping cart) ---\n");
    out.push_str(&render_consolidated(list));
    out
}

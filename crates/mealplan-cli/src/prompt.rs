//! Interactive preference prompt.

use std::io::{self, BufRead, Write};

use mealplan_core::plan::DEFAULT_PREFERENCES;

/// Ask for dishes, allergies, or dietary goals and read one line.
///
/// EOF or a blank answer yields [`DEFAULT_PREFERENCES`].
pub fn collect_preferences<R: BufRead, W: Write>(
    mut input: R,
    output: &mut W,
    family_size: u32,
) -> io::Result<String> {
    writeln!(output, "--- Weekly Meal Planner ---")?;
    writeln!(
        output,
        "Planning 7 days of Breakfast and Dinner for a family of {family_size}."
    )?;
    write!(
        output,
        "Enter preferred dishes, allergies, or dietary goals \
         (e.g., 'Tacos, Chicken, no nuts, high protein'):\n> "
    )?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let answer = line.trim();
    if answer.is_empty() {
        Ok(DEFAULT_PREFERENCES.to_string())
    } else {
        Ok(answer.to_string())
    }
}

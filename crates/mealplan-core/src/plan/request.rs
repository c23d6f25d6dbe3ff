//! What the family asked for.

use thiserror::Error;

/// Preferences used when the user gives none.
pub const DEFAULT_PREFERENCES: &str = "No specific preferences.";

/// House rules baked into every plan.
pub const DEFAULT_CUISINE_CONSTRAINTS: &[&str] = &[
    "Prioritize Singaporean Chinese home-cooked dishes (e.g. stir-fried vegetables, steamed fish, Tau Yew Bak).",
    "Every dinner must include a Chinese soup (e.g. ABC soup, lotus root soup, old cucumber soup).",
    "Monday breakfast must be 'Ham and Cheese Sandwich'.",
    "Wednesday breakfast must be 'Steamed Pau'.",
    "All other breakfasts should be simple, non-soup, fast-cooking options (e.g. soft boiled eggs, toast, congee).",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("family size must be greater than zero")]
    ZeroFamilySize,
}

/// Input to meal plan generation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealPlanRequest {
    family_size: u32,
    preferences: String,
    cuisine_constraints: Vec<String>,
}

impl MealPlanRequest {
    /// Build a request with the default cuisine constraints.
    ///
    /// Blank preferences are replaced with [`DEFAULT_PREFERENCES`].
    pub fn new(family_size: u32, preferences: impl Into<String>) -> Result<Self, RequestError> {
        Self::with_constraints(
            family_size,
            preferences,
            DEFAULT_CUISINE_CONSTRAINTS.iter().map(|c| c.to_string()).collect(),
        )
    }

    pub fn with_constraints(
        family_size: u32,
        preferences: impl Into<String>,
        cuisine_constraints: Vec<String>,
    ) -> Result<Self, RequestError> {
        if family_size == 0 {
            return Err(RequestError::ZeroFamilySize);
        }
        let preferences = preferences.into().trim().to_string();
        let preferences = if preferences.is_empty() {
            DEFAULT_PREFERENCES.to_string()
        } else {
            preferences
        };
        Ok(Self {
            family_size,
            preferences,
            cuisine_constraints,
        })
    }

    pub fn family_size(&self) -> u32 {
        self.family_size
    }

    pub fn preferences(&self) -> &str {
        &self.preferences
    }

    pub fn cuisine_constraints(&self) -> &[String] {
        &self.cuisine_constraints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_family_size() {
        assert_eq!(
            MealPlanRequest::new(0, "anything").unwrap_err(),
            RequestError::ZeroFamilySize
        );
    }

    #[test]
    fn blank_preferences_fall_back_to_default() {
        let req = MealPlanRequest::new(5, "   ").unwrap();
        assert_eq!(req.preferences(), DEFAULT_PREFERENCES);
    }

    #[test]
    fn preferences_are_trimmed() {
        let req = MealPlanRequest::new(3, "  no nuts, high protein \n").unwrap();
        assert_eq!(req.preferences(), "no nuts, high protein");
        assert_eq!(req.family_size(), 3);
    }

    #[test]
    fn default_constraints_are_kept_in_order() {
        let req = MealPlanRequest::new(5, "").unwrap();
        assert_eq!(req.cuisine_constraints().len(), DEFAULT_CUISINE_CONSTRAINTS.len());
        assert!(req.cuisine_constraints()[1].contains("soup"));
    }
}

//! Drug information lookups against a public regulatory drug API.
//!
//! The API takes free-text boolean search expressions (`field:"term"` joined
//! with `AND`/`OR`). The builders here own quoting so adapters never splice
//! raw user input into a query.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rows returned by a name search when the caller does not choose a limit.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Upper bound the public API accepts for `limit`.
pub const MAX_SEARCH_LIMIT: u32 = 1000;

/// Validation errors for drug search input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrugQueryError {
    /// A search term was blank once trimmed.
    #[error("drug search term must not be empty")]
    EmptyTerm,
    /// An interaction search needs at least one drug name.
    #[error("interaction search needs at least one drug name")]
    NoDrugNames,
}

/// Active ingredient and its labelled strength.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveIngredient {
    /// Ingredient name.
    pub name: String,
    /// Labelled strength, e.g. `500 mg/1`.
    #[serde(default)]
    pub strength: Option<String>,
}

/// Product directory entry returned by a name search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugProduct {
    /// National product code used for detail lookups.
    pub product_ndc: String,
    /// Generic name.
    #[serde(default)]
    pub generic_name: Option<String>,
    /// Brand name.
    #[serde(default)]
    pub brand_name: Option<String>,
    /// Manufacturer or labeler.
    #[serde(default)]
    pub labeler_name: Option<String>,
    /// Dosage form, e.g. `TABLET`.
    #[serde(default)]
    pub dosage_form: Option<String>,
    /// Routes of administration.
    #[serde(default)]
    pub route: Vec<String>,
    /// Active ingredients.
    #[serde(default)]
    pub active_ingredients: Vec<ActiveIngredient>,
}

impl DrugProduct {
    /// Brand name, then generic name, then the product code.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.brand_name
            .as_deref()
            .or(self.generic_name.as_deref())
            .unwrap_or(self.product_ndc.as_str())
    }
}

/// Label sections for one product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugLabel {
    /// Label revision date as published (`YYYYMMDD`).
    #[serde(default)]
    pub effective_time: Option<String>,
    /// Indications and usage.
    #[serde(default, rename = "indications_and_usage")]
    pub indications: Vec<String>,
    /// Dosage and administration.
    #[serde(default, rename = "dosage_and_administration")]
    pub dosage: Vec<String>,
    /// General warnings.
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Contraindications.
    #[serde(default)]
    pub contraindications: Vec<String>,
    /// Drug interactions.
    #[serde(default, rename = "drug_interactions")]
    pub interactions: Vec<String>,
    /// Adverse reactions.
    #[serde(default)]
    pub adverse_reactions: Vec<String>,
    /// Boxed warning, present only on some labels.
    #[serde(default)]
    pub boxed_warning: Option<Vec<String>>,
}

impl DrugLabel {
    /// Whether the label carries a boxed warning.
    #[must_use]
    pub fn has_boxed_warning(&self) -> bool {
        self.boxed_warning
            .as_ref()
            .is_some_and(|sections| !sections.is_empty())
    }
}

/// Search expression: generic or brand name equals `name`.
///
/// # Errors
///
/// Returns [`DrugQueryError::EmptyTerm`] for a blank name.
///
/// # Examples
/// ```
/// use frontend::domain::drugs::name_search_expression;
///
/// assert_eq!(
///     name_search_expression("aspirin").unwrap(),
///     r#"(generic_name:"aspirin" OR brand_name:"aspirin")"#
/// );
/// ```
pub fn name_search_expression(name: &str) -> Result<String, DrugQueryError> {
    let term = quoted(name)?;
    Ok(format!("(generic_name:{term} OR brand_name:{term})"))
}

/// Search expression: label for product code `ndc`.
///
/// # Errors
///
/// Returns [`DrugQueryError::EmptyTerm`] for a blank code.
pub fn product_search_expression(ndc: &str) -> Result<String, DrugQueryError> {
    Ok(format!("product_ndc:{}", quoted(ndc)?))
}

/// Search expression: labels whose interaction section mentions every name.
///
/// # Errors
///
/// Returns [`DrugQueryError::NoDrugNames`] for an empty list and
/// [`DrugQueryError::EmptyTerm`] when any name is blank.
pub fn interaction_search_expression<S: AsRef<str>>(names: &[S]) -> Result<String, DrugQueryError> {
    if names.is_empty() {
        return Err(DrugQueryError::NoDrugNames);
    }
    let clauses = names
        .iter()
        .map(|name| quoted(name.as_ref()).map(|term| format!("drug_interactions:{term}")))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(clauses.join(" AND "))
}

/// Search expression: labels for brand `name` that list adverse reactions.
///
/// # Errors
///
/// Returns [`DrugQueryError::EmptyTerm`] for a blank name.
pub fn adverse_effects_search_expression(name: &str) -> Result<String, DrugQueryError> {
    Ok(format!(
        "brand_name:{} AND adverse_reactions:[*]",
        quoted(name)?
    ))
}

fn quoted(term: &str) -> Result<String, DrugQueryError> {
    let trimmed = term.trim();
    if trimmed.is_empty() {
        return Err(DrugQueryError::EmptyTerm);
    }
    let escaped = trimmed.replace('\\', r"\\").replace('"', "\\\"");
    Ok(format!("\"{escaped}\""))
}

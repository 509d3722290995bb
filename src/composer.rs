//! Outfit composition state: the set of catalog items picked for one
//! outfit in progress, priced against a single theme's budget.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::product::{Product, ProductCategory};
use crate::models::theme::Theme;

/// Reasons a selection cannot be submitted to a theme
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("Outfit has no items")]
    EmptySelection,

    #[error("Outfit must contain at least one clothing item")]
    MissingClothing,

    #[error("Outfit costs {total} which exceeds the budget of {budget}")]
    OverBudget { total: i64, budget: i64 },
}

/// Snapshot of a selection priced against a theme
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    pub theme_id: String,
    pub selected: Vec<Uuid>,
    pub total_cost: i64,
    pub budget: i64,
    /// Negative when over budget
    pub remaining_budget: i64,
    pub can_submit: bool,
    /// Why the selection cannot be submitted, if it cannot
    pub blocker: Option<String>,
}

/// Selection set for one outfit-creation session.
///
/// `total_cost` is updated on every mutation so it always equals the sum of
/// the selected prices. It is kept in 128 bits, so no number of `i64` prices
/// can overflow it; accessors saturate into `i64`.
#[derive(Debug, Clone, Default)]
pub struct OutfitComposer {
    theme_id: Option<String>,
    selected: Vec<Product>,
    total_cost: i128,
}

fn saturate(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}

impl OutfitComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Composer already bound to a theme
    pub fn for_theme(theme: &Theme) -> Self {
        Self {
            theme_id: Some(theme.id.clone()),
            ..Self::default()
        }
    }

    pub fn theme_id(&self) -> Option<&str> {
        self.theme_id.as_deref()
    }

    /// Switches the active theme. Changing to a different theme drops the
    /// current selection so nothing carries over between budgets.
    pub fn set_theme(&mut self, theme: &Theme) {
        if self.theme_id.as_deref() != Some(theme.id.as_str()) {
            self.theme_id = Some(theme.id.clone());
            self.clear();
        }
    }

    /// Adds the item if absent, removes it if present
    pub fn toggle(&mut self, item: &Product) {
        if self.is_selected(item.id) {
            self.remove(item.id);
        } else {
            self.insert(item);
        }
    }

    /// Adds the item unless it is already selected
    pub fn add(&mut self, item: &Product) {
        if !self.is_selected(item.id) {
            self.insert(item);
        }
    }

    /// Removes the item with the given id; absent ids are ignored
    pub fn remove(&mut self, item_id: Uuid) {
        if let Some(pos) = self.selected.iter().position(|p| p.id == item_id) {
            let removed = self.selected.remove(pos);
            self.total_cost -= i128::from(removed.price);
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.total_cost = 0;
    }

    pub fn is_selected(&self, item_id: Uuid) -> bool {
        self.selected.iter().any(|p| p.id == item_id)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn selected(&self) -> &[Product] {
        &self.selected
    }

    pub fn selected_ids(&self) -> Vec<Uuid> {
        self.selected.iter().map(|p| p.id).collect()
    }

    pub fn total_cost(&self) -> i64 {
        saturate(self.total_cost)
    }

    pub fn remaining_budget(&self, theme: &Theme) -> i64 {
        saturate(self.remaining(theme))
    }

    /// Selected items stay selectable (for removal) even when over budget
    pub fn can_afford(&self, item: &Product, theme: &Theme) -> bool {
        i128::from(item.price) <= self.remaining(theme) || self.is_selected(item.id)
    }

    pub fn check_submission(&self, theme: &Theme) -> Result<(), SubmissionError> {
        if self.selected.is_empty() {
            return Err(SubmissionError::EmptySelection);
        }
        if !self
            .selected
            .iter()
            .any(|p| p.category == ProductCategory::Clothing)
        {
            return Err(SubmissionError::MissingClothing);
        }
        if self.total_cost > i128::from(theme.budget) {
            return Err(SubmissionError::OverBudget {
                total: self.total_cost(),
                budget: theme.budget,
            });
        }
        Ok(())
    }

    pub fn can_submit(&self, theme: &Theme) -> bool {
        self.check_submission(theme).is_ok()
    }

    pub fn summary(&self, theme: &Theme) -> BudgetSummary {
        let check = self.check_submission(theme);
        BudgetSummary {
            theme_id: theme.id.clone(),
            selected: self.selected_ids(),
            total_cost: self.total_cost(),
            budget: theme.budget,
            remaining_budget: self.remaining_budget(theme),
            can_submit: check.is_ok(),
            blocker: check.err().map(|e| e.to_string()),
        }
    }

    fn remaining(&self, theme: &Theme) -> i128 {
        i128::from(theme.budget) - self.total_cost
    }

    fn insert(&mut self, item: &Product) {
        self.total_cost += i128::from(item.price);
        self.selected.push(item.clone());
    }
}

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejection reasons for a new ad-hoc entry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LineItemError {
    #[error("a label is required")]
    EmptyLabel,

    #[error("amount must be greater than 0, got {0}")]
    NonPositiveAmount(Decimal),
}

/// A user-named, one-off amount (an ad-hoc expense or an extra income entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub label: String,
    pub amount: Decimal,
}

impl LineItem {
    /// Validates and builds an entry. The label is trimmed.
    pub fn new(
        label: &str,
        amount: Decimal,
    ) -> Result<Self, LineItemError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(LineItemError::EmptyLabel);
        }
        if amount <= Decimal::ZERO {
            return Err(LineItemError::NonPositiveAmount(amount));
        }
        Ok(Self {
            label: label.to_string(),
            amount,
        })
    }
}

/// Ordered list of [`LineItem`]s. Only valid entries can be pushed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItems(Vec<LineItem>);

impl LineItems {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and appends an entry. On error the list is left untouched.
    pub fn add(
        &mut self,
        label: &str,
        amount: Decimal,
    ) -> Result<&LineItem, LineItemError> {
        let item = LineItem::new(label, amount)?;
        self.0.push(item);
        Ok(&self.0[self.0.len() - 1])
    }

    /// Removes the entry at `index`, returning it. Out-of-range indexes are a no-op.
    pub fn remove(
        &mut self,
        index: usize,
    ) -> Option<LineItem> {
        (index < self.0.len()).then(|| self.0.remove(index))
    }

    /// Sum of all amounts, saturating at the decimal range.
    pub fn total(&self) -> Decimal {
        self.0
            .iter()
            .fold(Decimal::ZERO, |acc, item| acc.saturating_add(item.amount))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl FromIterator<LineItem> for LineItems {
    fn from_iter<I: IntoIterator<Item = LineItem>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a LineItems {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

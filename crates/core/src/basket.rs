//! The session basket.
//!
//! A basket is the ordered list of product identifiers a visitor has added,
//! one entry per unit. Identifiers are kept exactly as they arrived in the
//! `pk` query parameter; they are only parsed into [`ProductId`]s when the
//! basket is priced or checked out.

use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// Errors raised while turning basket entries into catalog references.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BasketError {
    /// An entry is not a valid product identifier.
    #[error("basket entry {0:?} is not a product id")]
    InvalidProductId(String),
}

/// What a basket change request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasketAction {
    Add,
    Remove,
}

impl BasketAction {
    /// `"add"` adds; any other value, or none at all, removes.
    #[must_use]
    pub fn from_param(action: Option<&str>) -> Self {
        match action {
            Some("add") => Self::Add,
            _ => Self::Remove,
        }
    }
}

/// Ordered product identifiers, duplicates allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Basket(Vec<String>);

impl Basket {
    /// Create an empty basket.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append one unit of `product_id`.
    pub fn add(&mut self, product_id: impl Into<String>) {
        self.0.push(product_id.into());
    }

    /// Remove the first occurrence of `product_id`.
    ///
    /// Returns `false` (and leaves the basket untouched) if it is not present.
    pub fn remove_first(&mut self, product_id: &str) -> bool {
        match self.0.iter().position(|entry| entry == product_id) {
            Some(index) => {
                self.0.remove(index);
                true
            }
            None => false,
        }
    }

    /// Apply a change request.
    pub fn apply(&mut self, action: BasketAction, product_id: &str) {
        match action {
            BasketAction::Add => self.add(product_id),
            BasketAction::Remove => {
                self.remove_first(product_id);
            }
        }
    }

    /// Number of units in the basket.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The raw entries, in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.0
    }

    /// Count units per distinct identifier, in order of first appearance.
    #[must_use]
    pub fn totals(&self) -> Vec<(&str, u32)> {
        let mut totals: Vec<(&str, u32)> = Vec::new();
        for entry in &self.0 {
            match totals.iter_mut().find(|(id, _)| *id == entry.as_str()) {
                Some((_, quantity)) => *quantity += 1,
                None => totals.push((entry.as_str(), 1)),
            }
        }
        totals
    }

    /// Per-product quantities with identifiers parsed.
    ///
    /// # Errors
    ///
    /// Returns [`BasketError::InvalidProductId`] for the first entry that is
    /// not an integer id.
    pub fn lines(&self) -> Result<Vec<BasketLine>, BasketError> {
        self.totals()
            .into_iter()
            .map(|(raw, quantity)| {
                raw.parse::<ProductId>()
                    .map(|product_id| BasketLine {
                        product_id,
                        quantity,
                    })
                    .map_err(|_| BasketError::InvalidProductId(raw.to_owned()))
            })
            .collect()
    }
}

impl From<Vec<String>> for Basket {
    fn from(entries: Vec<String>) -> Self {
        Self(entries)
    }
}

/// One distinct product in the basket and how many units of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasketLine {
    pub product_id: ProductId,
    /// Always at least 1.
    pub quantity: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn basket(entries: &[&str]) -> Basket {
        Basket::from(entries.iter().map(|s| (*s).to_owned()).collect::<Vec<_>>())
    }

    #[test]
    fn test_action_from_param() {
        assert_eq!(BasketAction::from_param(Some("add")), BasketAction::Add);
        assert_eq!(BasketAction::from_param(Some("remove")), BasketAction::Remove);
        assert_eq!(BasketAction::from_param(Some("ADD")), BasketAction::Remove);
        assert_eq!(BasketAction::from_param(None), BasketAction::Remove);
    }

    #[test]
    fn test_remove_first_only_drops_one_occurrence() {
        let mut b = basket(&["1", "2", "1", "3"]);
        assert!(b.remove_first("1"));
        assert_eq!(b, basket(&["2", "1", "3"]));
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut b = basket(&["1", "2"]);
        assert!(!b.remove_first("9"));
        assert_eq!(b, basket(&["1", "2"]));
    }

    #[test]
    fn test_replaying_operations() {
        let ops = [
            (BasketAction::Add, "A"),
            (BasketAction::Add, "B"),
            (BasketAction::Add, "A"),
            (BasketAction::Remove, "C"),
            (BasketAction::Remove, "A"),
            (BasketAction::Add, "C"),
        ];
        let mut b = Basket::new();
        for (action, id) in ops {
            b.apply(action, id);
        }
        assert_eq!(b, basket(&["B", "A", "C"]));
        assert_eq!(b.len(), 3);
    }

    #[test]
    fn test_totals_keep_first_appearance_order() {
        let b = basket(&["2", "1", "2", "3", "1", "2"]);
        assert_eq!(b.totals(), vec![("2", 3), ("1", 2), ("3", 1)]);
    }

    #[test]
    fn test_lines_parse_ids() {
        let b = basket(&["10", "10", "5"]);
        let lines = b.lines().unwrap();
        assert_eq!(
            lines,
            vec![
                BasketLine {
                    product_id: ProductId::new(10),
                    quantity: 2
                },
                BasketLine {
                    product_id: ProductId::new(5),
                    quantity: 1
                },
            ]
        );
    }

    #[test]
    fn test_lines_reject_garbage() {
        let b = basket(&["1", "oops"]);
        assert_eq!(
            b.lines(),
            Err(BasketError::InvalidProductId("oops".to_owned()))
        );
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let b = basket(&["1", "1"]);
        assert_eq!(serde_json::to_string(&b).unwrap(), r#"["1","1"]"#);
    }
}

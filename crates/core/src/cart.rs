//! Session-persisted shopping cart.
//!
//! The cart lives in the visitor's session, not in the external API. Line
//! items are identified by the full (product, size, color) selection, so
//! the same product in two sizes occupies two lines, while adding the same
//! selection twice merges into one line with a summed quantity.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// Identity of a cart line: the product plus the exact variant selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartKey {
    pub product_id: ProductId,
    pub size: Option<String>,
    pub color: Option<String>,
}

/// One line of the cart, snapshotting display data at add time.
///
/// Price and name are snapshots; the checkout handoff re-reads nothing, so
/// a catalog price change after adding does not reprice the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: String,
    pub size: Option<String>,
    pub color: Option<String>,
    pub quantity: u32,
}

impl CartItem {
    /// The identity this line merges on.
    #[must_use]
    pub fn key(&self) -> CartKey {
        CartKey {
            product_id: self.product_id.clone(),
            size: self.size.clone(),
            color: self.color.clone(),
        }
    }

    /// Line subtotal: unit price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price.times(self.quantity)
    }

    /// "M / Negro" style selection label, or `None` for a plain product.
    #[must_use]
    pub fn selection_label(&self) -> Option<String> {
        match (self.size.as_deref(), self.color.as_deref()) {
            (Some(s), Some(c)) => Some(format!("{s} / {c}")),
            (Some(s), None) => Some(s.to_owned()),
            (None, Some(c)) => Some(c.to_owned()),
            (None, None) => None,
        }
    }
}

/// The visitor's cart. Totals are always recomputed from the lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// The cart lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Sum of line subtotals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    /// Add a line, merging quantities when the same selection is already
    /// present. A non-positive quantity on the incoming item is ignored.
    pub fn add(&mut self, item: CartItem) {
        if item.quantity == 0 {
            return;
        }
        let key = item.key();
        if let Some(existing) = self.items.iter_mut().find(|i| i.key() == key) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            self.items.push(item);
        }
    }

    /// Set the quantity of a line; zero removes it. Unknown keys are a
    /// no-op.
    pub fn set_quantity(&mut self, key: &CartKey, quantity: u32) {
        if quantity == 0 {
            self.remove(key);
        } else if let Some(item) = self.items.iter_mut().find(|i| &i.key() == key) {
            item.quantity = quantity;
        }
    }

    /// Remove a line entirely.
    pub fn remove(&mut self, key: &CartKey) {
        self.items.retain(|i| &i.key() != key);
    }

    /// Drop all lines.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, size: Option<&str>, color: Option<&str>, qty: u32) -> CartItem {
        CartItem {
            product_id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Price::new(10_000),
            image: String::new(),
            size: size.map(str::to_owned),
            color: color.map(str::to_owned),
            quantity: qty,
        }
    }

    #[test]
    fn test_add_merges_same_selection() {
        let mut cart = Cart::default();
        cart.add(item("p-1", Some("M"), Some("Negro"), 1));
        cart.add(item("p-1", Some("M"), Some("Negro"), 1));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.count(), 2);
        assert_eq!(cart.total(), Price::new(20_000));
    }

    #[test]
    fn test_different_selections_are_distinct_lines() {
        let mut cart = Cart::default();
        cart.add(item("p-1", Some("M"), Some("Negro"), 1));
        cart.add(item("p-1", Some("S"), Some("Negro"), 1));
        cart.add(item("p-1", Some("M"), Some("Blanco"), 1));
        assert_eq!(cart.items().len(), 3);
        assert_eq!(cart.count(), 3);
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let mut cart = Cart::default();
        cart.add(item("p-1", Some("M"), None, 2));
        let key = cart.items()[0].key();

        cart.set_quantity(&key, 5);
        assert_eq!(cart.items()[0].quantity, 5);

        cart.set_quantity(&key, 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_unknown_key_is_noop() {
        let mut cart = Cart::default();
        cart.add(item("p-1", None, None, 1));
        let missing = CartKey {
            product_id: ProductId::new("p-2"),
            size: None,
            color: None,
        };
        cart.set_quantity(&missing, 3);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::default();
        cart.add(item("p-1", Some("S"), None, 1));
        cart.add(item("p-2", None, None, 1));

        cart.remove(&cart.items()[0].key().clone());
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].product_id.as_str(), "p-2");

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Price::ZERO);
    }

    #[test]
    fn test_add_zero_quantity_is_ignored() {
        let mut cart = Cart::default();
        cart.add(item("p-1", None, None, 0));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_selection_label() {
        assert_eq!(
            item("p", Some("M"), Some("Negro"), 1).selection_label(),
            Some("M / Negro".to_owned())
        );
        assert_eq!(
            item("p", Some("M"), None, 1).selection_label(),
            Some("M".to_owned())
        );
        assert_eq!(item("p", None, None, 1).selection_label(), None);
    }
}

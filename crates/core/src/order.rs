//! Order snapshots and the WhatsApp handoff message.
//!
//! Checkout does not take payment. The storefront records the order via the
//! external API, then hands the customer to WhatsApp with a pre-filled
//! message listing the order; a human confirms and collects payment there.

use serde::{Deserialize, Serialize};

use crate::cart::CartItem;
use crate::product::Product;
use crate::types::{Price, ProductId};

/// One line of a placed order, snapshotted from the cart at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl OrderItem {
    /// Line subtotal: unit price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price.times(self.quantity)
    }
}

impl From<CartItem> for OrderItem {
    fn from(item: CartItem) -> Self {
        Self {
            product_id: item.product_id,
            name: item.name,
            price: item.price,
            quantity: item.quantity,
            size: item.size,
            color: item.color,
        }
    }
}

/// Build the pre-filled WhatsApp message for a placed order.
///
/// Lines are numbered, size and color only appear when selected, and the
/// order reference falls back to `none` when the API returned no number.
/// The caller URL-encodes the result into a `wa.me` link.
#[must_use]
pub fn order_message(reference: Option<&str>, items: &[OrderItem], total: Price) -> String {
    let mut msg = String::from("Hello! I would like to place the following order:\n\n");
    msg.push_str(&format!("Order ref: {}\n\n", reference.unwrap_or("none")));
    for (idx, item) in items.iter().enumerate() {
        msg.push_str(&format!("{}. *{}*\n", idx + 1, item.name));
        if let Some(size) = &item.size {
            msg.push_str(&format!("   Size: {size}\n"));
        }
        if let Some(color) = &item.color {
            msg.push_str(&format!("   Color: {color}\n"));
        }
        msg.push_str(&format!("   Quantity: {}\n", item.quantity));
        msg.push_str(&format!("   Price: {}\n", item.price));
        msg.push_str(&format!("   Subtotal: {}\n\n", item.subtotal()));
    }
    msg.push_str(&format!("*Total: {total}*"));
    msg
}

/// Build the WhatsApp message for the single-product "buy via WhatsApp"
/// button on cards and the detail page.
#[must_use]
pub fn product_message(product: &Product, product_url: &str) -> String {
    format!(
        "Hello, I am interested in this product:\n\n*{}*\nPrice: {}\nLink: {}\n\nIs it available?",
        product.name, product.price, product_url
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, ProductId};

    fn item(name: &str, price: i64, qty: u32, size: Option<&str>, color: Option<&str>) -> OrderItem {
        OrderItem {
            product_id: ProductId::new("p-1"),
            name: name.to_owned(),
            price: Price::new(price),
            quantity: qty,
            size: size.map(str::to_owned),
            color: color.map(str::to_owned),
        }
    }

    #[test]
    fn test_order_message_full() {
        let items = vec![
            item("Linen Shirt", 89_900, 2, Some("M"), Some("Negro")),
            item("Tote Bag", 45_000, 1, None, None),
        ];
        let total: Price = items.iter().map(OrderItem::subtotal).sum();
        let msg = order_message(Some("ORD-0042"), &items, total);

        assert!(msg.starts_with("Hello! I would like to place the following order:\n\n"));
        assert!(msg.contains("Order ref: ORD-0042\n"));
        assert!(msg.contains("1. *Linen Shirt*\n   Size: M\n   Color: Negro\n   Quantity: 2\n"));
        assert!(msg.contains("   Subtotal: $179.800\n"));
        // No size/color lines for the plain product.
        assert!(msg.contains("2. *Tote Bag*\n   Quantity: 1\n"));
        assert!(msg.ends_with("*Total: $224.800*"));
    }

    #[test]
    fn test_order_message_reference_fallback() {
        let msg = order_message(None, &[], Price::ZERO);
        assert!(msg.contains("Order ref: none\n"));
    }

    #[test]
    fn test_product_message() {
        let p = Product {
            id: ProductId::new("66f1"),
            name: "Tote Bag".to_owned(),
            sku: None,
            description: String::new(),
            price: Price::new(45_000),
            original_price: None,
            category: Category::Accessories,
            image: String::new(),
            images: Vec::new(),
            badge: None,
            featured: false,
            on_sale: false,
            active: true,
            rating: 0.0,
            reviews_count: 0,
            stock: 3,
            sizes: Vec::new(),
            colors: Vec::new(),
            variants: Vec::new(),
            details: None,
        };
        let msg = product_message(&p, "https://amaranta.shop/products/66f1");
        assert!(msg.contains("*Tote Bag*"));
        assert!(msg.contains("Price: $45.000"));
        assert!(msg.contains("Link: https://amaranta.shop/products/66f1"));
    }

    #[test]
    fn test_order_item_from_cart_item() {
        let cart_item = CartItem {
            product_id: ProductId::new("p-9"),
            name: "Scarf".to_owned(),
            price: Price::new(30_000),
            image: "/images/scarf.jpg".to_owned(),
            size: None,
            color: Some("Rojo".to_owned()),
            quantity: 3,
        };
        let order_item = OrderItem::from(cart_item);
        assert_eq!(order_item.subtotal(), Price::new(90_000));
        assert_eq!(order_item.color.as_deref(), Some("Rojo"));
    }
}

//! Catalog product model and variant stock resolution.
//!
//! A product declares ordered `sizes` and `colors` option sets plus a sparse
//! `variants` list mapping (size, color) pairs to stock counts. The resolver
//! answers, for a candidate selection, how many units are available and
//! whether a given size or color is still sellable - the logic driving the
//! selector buttons on the product detail page.

use serde::{Deserialize, Serialize};

use crate::types::{Badge, Category, Price, ProductId};

/// A concrete (size, color) purchasable configuration of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub size: String,
    pub color: String,
    /// Units available for this configuration.
    #[serde(default)]
    pub stock: u32,
    /// Stock-keeping unit code, free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
}

impl Variant {
    /// Create a zero-stock variant for a (size, color) pair.
    #[must_use]
    pub fn empty(size: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            size: size.into(),
            color: color.into(),
            stock: 0,
            sku: None,
        }
    }

    /// Whether this variant matches a (size, color) pair exactly.
    ///
    /// Label matching is case-sensitive; "Negro" and "negro" are distinct.
    #[must_use]
    pub fn matches(&self, size: &str, color: &str) -> bool {
        self.size == size && self.color == color
    }
}

/// Free-text product details shown on the detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProductDetails {
    #[serde(default)]
    pub materials: String,
    #[serde(default)]
    pub care: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub fit: String,
}

impl ProductDetails {
    /// Whether there is anything worth rendering.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
            && self.care.is_empty()
            && self.features.is_empty()
            && self.fit.is_empty()
    }
}

/// A catalog product as served by the external API.
///
/// Created and mutated only through the admin editing flow; read-only
/// everywhere else.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    /// Strike-through reference price, shown when higher than `price`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Price>,
    pub category: Category,
    /// Primary image reference.
    #[serde(default)]
    pub image: String,
    /// Additional image references, in gallery order.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<Badge>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub on_sale: bool,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Average rating, 0.0-5.0.
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub reviews_count: u32,
    /// Legacy product-level stock, used when the product declares no
    /// variants or when only one axis is selected.
    #[serde(default)]
    pub stock: u32,
    /// Declared size labels, ordered.
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Declared color labels, ordered.
    #[serde(default)]
    pub colors: Vec<String>,
    /// Sparse variant list; at most one record per (size, color) pair.
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ProductDetails>,
}

const fn default_active() -> bool {
    true
}

impl Product {
    /// Find the unique variant matching a (size, color) pair exactly.
    #[must_use]
    pub fn find_variant(&self, size: &str, color: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.matches(size, color))
    }

    /// Available stock for a candidate selection.
    ///
    /// With both axes selected, this is the stock of the unique matching
    /// variant, or 0 when no such variant exists. With either axis missing
    /// (including products that declare no sizes or no colors), it falls
    /// back to the legacy product-level stock.
    #[must_use]
    pub fn stock_for(&self, size: Option<&str>, color: Option<&str>) -> u32 {
        match (size, color) {
            (Some(s), Some(c)) => self.find_variant(s, c).map_or(0, |v| v.stock),
            _ => self.stock,
        }
    }

    /// Whether a size is sellable given the currently chosen color.
    ///
    /// With a color chosen, some variant must match both labels with
    /// stock > 0. With no color chosen yet, any in-stock variant of that
    /// size counts. A product with no variants at all falls back to the
    /// product-level stock rather than reporting every size available.
    #[must_use]
    pub fn size_in_stock(&self, size: &str, chosen_color: Option<&str>) -> bool {
        if self.variants.is_empty() {
            return self.stock > 0;
        }
        match chosen_color {
            Some(color) => self
                .variants
                .iter()
                .any(|v| v.matches(size, color) && v.stock > 0),
            None => self.variants.iter().any(|v| v.size == size && v.stock > 0),
        }
    }

    /// Whether a color is sellable given the currently chosen size.
    ///
    /// Symmetric to [`Self::size_in_stock`].
    #[must_use]
    pub fn color_in_stock(&self, color: &str, chosen_size: Option<&str>) -> bool {
        if self.variants.is_empty() {
            return self.stock > 0;
        }
        match chosen_size {
            Some(size) => self
                .variants
                .iter()
                .any(|v| v.matches(size, color) && v.stock > 0),
            None => self
                .variants
                .iter()
                .any(|v| v.color == color && v.stock > 0),
        }
    }

    /// SKU of the selected variant, if any.
    #[must_use]
    pub fn variant_sku(&self, size: &str, color: &str) -> Option<&str> {
        self.find_variant(size, color)?.sku.as_deref()
    }

    /// Default selection for the detail page: the first declared label on
    /// each axis, when present.
    #[must_use]
    pub fn default_selection(&self) -> (Option<&str>, Option<&str>) {
        (
            self.sizes.first().map(String::as_str),
            self.colors.first().map(String::as_str),
        )
    }

    /// Gallery image references: the primary image followed by the
    /// additional images, duplicates removed.
    #[must_use]
    pub fn gallery(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for img in std::iter::once(self.image.as_str()).chain(self.images.iter().map(String::as_str))
        {
            if !img.is_empty() && !seen.contains(&img) {
                seen.push(img);
            }
        }
        seen
    }

    /// Whether the strike-through reference price should be shown. Only a
    /// positive selling price can be discounted.
    #[must_use]
    pub fn has_discount(&self) -> bool {
        self.price.is_positive() && self.original_price.is_some_and(|op| op > self.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_with_variants(variants: Vec<Variant>) -> Product {
        Product {
            id: ProductId::new("p-1"),
            name: "Linen Shirt".to_owned(),
            sku: None,
            description: String::new(),
            price: Price::new(89_900),
            original_price: None,
            category: Category::Women,
            image: "/images/shirt.jpg".to_owned(),
            images: Vec::new(),
            badge: None,
            featured: false,
            on_sale: false,
            active: true,
            rating: 0.0,
            reviews_count: 0,
            stock: 7,
            sizes: vec!["S".to_owned(), "M".to_owned()],
            colors: vec!["Negro".to_owned(), "Blanco".to_owned()],
            variants,
            details: None,
        }
    }

    fn variant(size: &str, color: &str, stock: u32) -> Variant {
        Variant {
            size: size.to_owned(),
            color: color.to_owned(),
            stock,
            sku: None,
        }
    }

    #[test]
    fn test_stock_for_exact_match() {
        let p = product_with_variants(vec![variant("S", "Negro", 2), variant("M", "Negro", 0)]);
        assert_eq!(p.stock_for(Some("S"), Some("Negro")), 2);
        assert_eq!(p.stock_for(Some("M"), Some("Negro")), 0);
    }

    #[test]
    fn test_stock_for_missing_pair_is_zero() {
        let p = product_with_variants(vec![variant("S", "Negro", 2)]);
        assert_eq!(p.stock_for(Some("S"), Some("Blanco")), 0);
        assert_eq!(p.stock_for(Some("XL"), Some("Negro")), 0);
    }

    #[test]
    fn test_stock_for_is_case_sensitive() {
        let p = product_with_variants(vec![variant("S", "Negro", 2)]);
        assert_eq!(p.stock_for(Some("S"), Some("negro")), 0);
        assert_eq!(p.stock_for(Some("s"), Some("Negro")), 0);
    }

    #[test]
    fn test_stock_for_falls_back_to_product_stock() {
        // Either axis absent means the legacy product-level stock applies.
        let p = product_with_variants(vec![variant("S", "Negro", 2)]);
        assert_eq!(p.stock_for(None, Some("Negro")), 7);
        assert_eq!(p.stock_for(Some("S"), None), 7);
        assert_eq!(p.stock_for(None, None), 7);
    }

    #[test]
    fn test_size_in_stock_with_chosen_color() {
        // S/Negro has stock, M/Negro does not. Size "M" is
        // sellable only if some other color at size M has stock.
        let p = product_with_variants(vec![variant("S", "Negro", 2), variant("M", "Negro", 0)]);
        assert!(p.size_in_stock("S", Some("Negro")));
        assert!(!p.size_in_stock("M", Some("Negro")));
        assert!(!p.size_in_stock("M", None));

        let p = product_with_variants(vec![
            variant("S", "Negro", 2),
            variant("M", "Negro", 0),
            variant("M", "Blanco", 4),
        ]);
        assert!(!p.size_in_stock("M", Some("Negro")));
        assert!(p.size_in_stock("M", Some("Blanco")));
        assert!(p.size_in_stock("M", None));
    }

    #[test]
    fn test_color_in_stock_symmetry() {
        let p = product_with_variants(vec![variant("S", "Negro", 2), variant("M", "Blanco", 0)]);
        assert!(p.color_in_stock("Negro", Some("S")));
        assert!(!p.color_in_stock("Blanco", Some("M")));
        assert!(p.color_in_stock("Negro", None));
        assert!(!p.color_in_stock("Blanco", None));
    }

    #[test]
    fn test_no_variants_falls_back_to_product_stock() {
        // A legacy product without variants is sellable only while the
        // product-level stock holds out.
        let mut p = product_with_variants(Vec::new());
        assert!(p.size_in_stock("S", None));
        assert!(p.color_in_stock("Negro", Some("S")));

        p.stock = 0;
        assert!(!p.size_in_stock("S", None));
        assert!(!p.color_in_stock("Negro", Some("S")));
    }

    #[test]
    fn test_variant_sku() {
        let mut v = variant("S", "Negro", 2);
        v.sku = Some("SH-S-NG".to_owned());
        let p = product_with_variants(vec![v, variant("M", "Negro", 1)]);
        assert_eq!(p.variant_sku("S", "Negro"), Some("SH-S-NG"));
        assert_eq!(p.variant_sku("M", "Negro"), None);
        assert_eq!(p.variant_sku("M", "Blanco"), None);
    }

    #[test]
    fn test_gallery_dedups_primary() {
        let mut p = product_with_variants(Vec::new());
        p.images = vec![
            "/images/shirt.jpg".to_owned(),
            "/images/shirt-back.jpg".to_owned(),
        ];
        assert_eq!(p.gallery(), vec!["/images/shirt.jpg", "/images/shirt-back.jpg"]);
    }

    #[test]
    fn test_has_discount() {
        let mut p = product_with_variants(Vec::new());
        assert!(!p.has_discount());
        p.original_price = Some(Price::new(50_000));
        assert!(!p.has_discount());
        p.original_price = Some(Price::new(120_000));
        assert!(p.has_discount());

        p.price = Price::ZERO;
        assert!(!p.has_discount());
    }

    #[test]
    fn test_wire_format_camel_case() {
        let json = r#"{
            "_id": "66f1",
            "name": "Bag",
            "price": 120000,
            "originalPrice": 150000,
            "category": "accessories",
            "onSale": true,
            "reviewsCount": 3,
            "variants": [{"size": "U", "color": "Negro", "stock": 5, "sku": "BG-U-NG"}]
        }"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.id.as_str(), "66f1");
        assert_eq!(p.original_price, Some(Price::new(150_000)));
        assert!(p.on_sale);
        assert!(p.active, "active defaults to true");
        assert_eq!(p.reviews_count, 3);
        assert_eq!(p.stock_for(Some("U"), Some("Negro")), 5);
    }
}

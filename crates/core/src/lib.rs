//! Amaranta Core - Shared domain types and logic.
//!
//! This crate provides the domain model used by the storefront binary:
//! products with their size/color variants, the client-side shopping cart,
//! and the WhatsApp order handoff.
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no sessions. All persistence and business rules (inventory,
//! pricing, order lifecycle) live in the external API the storefront talks
//! to; this crate models the data and the few client-side invariants worth
//! enforcing:
//!
//! - [`product`] - catalog model and variant stock resolution
//! - [`matrix`] - the admin size x color variant matrix reconciler
//! - [`cart`] - line-item cart with merge-by-selection semantics
//! - [`order`] - order snapshots and WhatsApp message building
//! - [`types`] - newtype IDs, minor-unit prices, category/status enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod matrix;
pub mod order;
pub mod product;
pub mod types;

pub use cart::{Cart, CartItem, CartKey};
pub use matrix::VariantMatrix;
pub use order::{OrderItem, order_message, product_message};
pub use product::{Product, ProductDetails, Variant};
pub use types::*;

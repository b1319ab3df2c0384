//! Supporting services for the storefront.

pub mod jwt;
pub mod whatsapp;

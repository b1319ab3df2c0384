//! WhatsApp deep links.
//!
//! Checkout hands the customer to a human over WhatsApp with a pre-filled
//! message; the message builders live in `amaranta_core::order`, this module
//! only wraps them into `wa.me` URLs.

/// Build a `wa.me` deep link with a pre-filled, URL-encoded message.
#[must_use]
pub fn wa_link(phone: &str, message: &str) -> String {
    format!("https://wa.me/{phone}?text={}", urlencoding::encode(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wa_link_encodes_message() {
        let link = wa_link("573001234567", "Hello! Total: $125.000 & more");
        assert!(link.starts_with("https://wa.me/573001234567?text="));
        assert!(link.contains("Hello%21"));
        assert!(link.contains("%24125.000"));
        assert!(link.contains("%26"));
        assert!(!link.contains(' '));
    }
}

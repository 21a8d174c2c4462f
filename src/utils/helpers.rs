//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the core.

use std::sync::OnceLock;
use regex::Regex;

/// Calculate pagination offset for a 1-based page
pub fn calculate_offset(page: u32, page_size: u32) -> i64 {
    i64::from(page.saturating_sub(1)) * i64::from(page_size)
}

/// Number of pages needed to show `total_items`
pub fn total_pages(total_items: i64, page_size: u32) -> i64 {
    if page_size == 0 || total_items <= 0 {
        return 0;
    }
    (total_items + i64::from(page_size) - 1) / i64::from(page_size)
}

/// Generate a random alphanumeric string
pub fn generate_random_string(length: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\
                            abcdefghijklmnopqrstuvwxyz\
                            0123456789";
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Check a taxonomy code such as `street_food` or `backpacking`
pub fn is_valid_tag_code(code: &str) -> bool {
    static TAG_CODE: OnceLock<Regex> = OnceLock::new();
    TAG_CODE
        .get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9_]{0,62}$").expect("static regex"))
        .is_match(code)
}

/// Check that a string is an absolute http(s) URL
pub fn is_http_url(value: &str) -> bool {
    match url::Url::parse(value) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.host().is_some(),
        Err(_) => false,
    }
}

/// File extension for the image content types accepted for uploads
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    match content_type.trim().to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

//! Scopes and sheet rows shared by the tests of every crate.
use once_cell::sync::Lazy;

use crate::Scope;

pub use crate::util::logging::discard_logger;

pub static DUMMY_SCOPE: Lazy<Scope> =
    Lazy::new(|| Scope::new("tenant-1", "user-1", "sheet-1").expect("Valid scope"));

/// Same user & sheet ids as [`DUMMY_SCOPE`] under a different tenant.
pub static OTHER_TENANT_SCOPE: Lazy<Scope> =
    Lazy::new(|| Scope::new("tenant-2", "user-1", "sheet-1").expect("Valid scope"));

/// A different sheet of the same tenant & user as [`DUMMY_SCOPE`].
pub static OTHER_SHEET_SCOPE: Lazy<Scope> =
    Lazy::new(|| Scope::new("tenant-1", "user-1", "sheet-2").expect("Valid scope"));

/// Builds the raw rows of a range read.
pub fn rows(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

/// `Kampagner` rows 2..=4, row `3` is missing its start date.
pub fn campaign_rows() -> Vec<Vec<String>> {
    rows(&[
        &["Summer sale", "ENABLED", "150", "2024-06-01", "2024-08-31"],
        &["Winter sale", "PAUSED", "200", "", "2024-12-31"],
        &["Spring sale", "paused", "", "2024-03-01", "2024-05-31"],
    ])
}

/// `Annoncer` rows 2..=6, all valid.
pub fn ad_rows() -> Vec<Vec<String>> {
    rows(&[
        &["Shoes", "Red shoes", "Free shipping", "Buy red shoes", "https://shop.example/red", "shoes", "red"],
        &["Shoes", "Blue shoes", "", "Buy blue shoes", "https://shop.example/blue"],
        &["Hats", "Sun hats", "Summer", "Stay cool", "https://shop.example/hats", "hats"],
        &["Hats", "Wool hats", "", "Stay warm", "https://shop.example/wool"],
        &["Bags", "Bags", "Big bags", "All the bags", "https://shop.example/bags", "", "big"],
    ])
}

/// `Keywords` rows 2..=4, row `3` is missing its keyword.
pub fn keyword_rows() -> Vec<Vec<String>> {
    rows(&[
        &["Shoes", "red shoes", "EXACT", "1.5"],
        &["Shoes", "", "PHRASE", "0.8"],
        &["Hats", "sun hat", "", "abc"],
    ])
}

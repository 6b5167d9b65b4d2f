use std::sync::LazyLock;

use regex::Regex;

// ============================================================================
// Scalar aliases
// ============================================================================

/// Canonical (normalized) item name, e.g. `"fire // ice"`.
pub type ItemName = String;
pub type SellerName = String;
/// Money in the catalog's currency. Rounded to cents only where noted.
pub type Price = f64;
pub type Quantity = u32;

// ============================================================================
// Money
// ============================================================================

/// Round to two decimal places (cents).
pub fn round_cents(value: Price) -> Price {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// Item names
// ============================================================================

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));
static SPLIT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.*?[^/]) *//? *([^/].*)").expect("static regex"));

/// Normalize an item name into its canonical key form.
///
/// Whitespace runs collapse to one space, split names (`Fire/Ice`, `Fire//Ice`,
/// `Fire // Ice`) become `fire // ice`, and the result is lowercased.
pub fn normalize_item_name(raw: &str) -> ItemName {
    let collapsed = WHITESPACE.replace_all(raw, " ");
    let trimmed = collapsed.trim();
    SPLIT_NAME.replace(trimmed, "$1 // $2").to_lowercase()
}

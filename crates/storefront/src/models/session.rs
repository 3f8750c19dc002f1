//! Session-related types.
//!
//! Everything the storefront keeps per visitor lives in the session under
//! the keys below. Values are JSON-serialized by tower-sessions.

/// Session keys for basket and visit data.
pub mod keys {
    /// Ordered list of product ids in the basket, one entry per unit.
    pub const PRODUCTS: &str = "products";

    /// Number of entries in [`PRODUCTS`], shown as the basket badge.
    pub const PRODUCTS_COUNT: &str = "products_count";

    /// Visit history, a list of `[page, elapsed_seconds, index]` triples.
    pub const VISITS: &str = "visits";

    /// Page remembered by the visit tracker.
    pub const OLD_PAGE: &str = "old_page";

    /// Timestamp remembered by the visit tracker (`%Y-%m-%d %H:%M:%S`).
    pub const OLD_TIME: &str = "old_time";
}

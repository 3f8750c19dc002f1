//! Storefront models.
//!
//! Catalog records come from `corner_shop_core::models`; this module only
//! holds what is specific to the storefront session.

pub mod session;

pub use session::keys as session_keys;

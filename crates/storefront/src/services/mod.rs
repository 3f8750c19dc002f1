//! Business logic services for storefront.
//!
//! # Services
//!
//! - `basket` - Typed access to the session basket
//! - `checkout` - Pricing the basket and turning it into an order
//! - `media` - Storage for uploaded product photos

pub mod basket;
pub mod checkout;
pub mod media;

pub use basket::BasketSession;
pub use checkout::{BasketSummary, CheckoutOutcome, SummaryLine};
pub use media::{MediaError, MediaStore, PhotoRejection};

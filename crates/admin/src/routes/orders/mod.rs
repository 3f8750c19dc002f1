//! Orders management route handlers.
//!
//! Listing and detail pages, plus the actions available from the detail
//! page: status changes, line item edits and deletion.

mod actions;
mod detail;
mod list;
pub mod types;

pub use actions::{AddLineInput, StatusInput, add_line, delete, remove_line, update_status};
pub use detail::{OrderShowTemplate, ProductOption, show};
pub use list::{OrdersIndexTemplate, OrdersQuery, index};
pub use types::{LineItemView, OrderView, StatusOption};

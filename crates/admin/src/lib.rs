//! Corner Shop Admin library.
//!
//! Back-office handlers for the catalog and for orders placed through the
//! storefront, exposed as a library so the router can be tested.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

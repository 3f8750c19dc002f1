//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//! 5. Visit tracking (catalog and basket pages only)

pub mod request_id;
pub mod session;
pub mod visits;

pub use request_id::request_id_middleware;
pub use session::create_session_layer;
pub use visits::track_visits;

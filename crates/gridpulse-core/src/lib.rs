//! # gridpulse-core - Core Domain Types
//!
//! Foundation crate for GridPulse. Provides records and datasets,
//! decorated-value parsing, routing slugs, notifications, error handling,
//! and logging bootstrap.
//!
//! This crate has **zero internal dependencies** -- it only depends on
//! external crates (serde, chrono, thiserror, regex, tracing).
//!
//! ## Public API
//!
//! ### Records (`record`)
//! - [`Record`] - One grid row: field name → value mapping
//! - [`RowSet`] - Shared row collection (`Vec<Arc<Record>>`), replaced
//!   wholesale on every mutation pass (copy-on-write contract)
//! - [`DatasetId`], [`DatasetSpec`] - Dataset identity and grid wiring
//!
//! ### Values (`value`)
//! - [`SortKey`] - Dual-mode comparison key (parsed magnitude before text)
//! - [`parse_decorated`] - `"$1,234"` / `"($456)"` / `"+1.5%"` → f64
//! - [`format_dollar`], [`format_signed_pct`] - Feed-side formatters
//!
//! ### Routing (`route`)
//! - [`Route`], [`slugify`] - Stable module/subtab → path mapping
//!
//! ### Notifications (`notification`)
//! - [`Notification`], [`NotificationDraft`], [`NotificationKind`]
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with transient vs fatal classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use gridpulse_core::prelude::*;
//! ```

pub mod error;
pub mod logging;
pub mod notification;
pub mod record;
pub mod route;
pub mod value;

/// Prelude for common imports used throughout all GridPulse crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use error::{Error, Result, ResultExt};
pub use notification::{Notification, NotificationDraft, NotificationKind};
pub use record::{DatasetId, DatasetSpec, Record, RowSet};
pub use route::{slugify, Route};
pub use value::{display_text, format_dollar, format_signed_pct, parse_decorated, SortKey};

//! # gridpulse-engine - Live Grid State & Notification Navigation
//!
//! The single-threaded state owner for GridPulse: per-dataset table views,
//! the refresh scheduler, the notification store, and the notification → row
//! navigation protocol with its cross-page highlight handoff.
//!
//! ## Architecture
//!
//! [`Engine::update`] consumes [`Message`]s from one mpsc channel and returns
//! [`Effect`]s for the shell to perform. Periodic work (auto-refresh loops,
//! force-refresh fetches) runs in spawned tasks that only ever send messages;
//! all mutation happens on the owner, so refresh passes for a dataset are
//! strictly serialized.
//!
//! ## Public API
//!
//! - [`Engine`], [`Message`], [`Effect`] - the update loop
//! - [`TableView`] - search/sort/pagination state per dataset
//! - [`RefreshScheduler`] - cooperative auto-refresh + debounced force refresh
//! - [`NotificationStore`] - ingestion, read state, filter, pagination
//! - [`NavigationRouter`], [`HandoffSlot`] - same-page vs cross-page decision
//! - [`RowHighlighter`], [`RenderingSurface`] - the highlight command protocol
//! - [`HeadlessSurface`] - in-memory surface for tests and headless demos
//! - [`Settings`] - `.gridpulse/config.toml`

pub mod config;
pub mod engine;
pub mod highlight;
pub mod message;
pub mod navigation;
pub mod notifications;
pub mod scheduler;
pub mod surface;
pub mod view;

pub use config::{load_default_settings, load_settings, Settings};
pub use engine::{Effect, Engine};
pub use highlight::{ActiveHighlight, RowHighlighter};
pub use message::Message;
pub use navigation::{HandoffSlot, NavigationOutcome, NavigationRouter, PendingHighlight};
pub use notifications::{NotificationFilter, NotificationStore};
pub use scheduler::{RefreshHandle, RefreshScheduler, MIN_AUTO_REFRESH_MS};
pub use surface::{HeadlessSurface, RenderingSurface};
pub use view::{SortDirection, TableView};

//! # gridpulse-feed - Data Feed Layer
//!
//! The external-world seam for GridPulse: the [`DataService`] contract the
//! engine fetches through, a seedable [`DemoFeed`] standing in for a real
//! backend, and the tick simulation ([`apply_tick`]) that produces bounded
//! copy-on-write mutations for auto-refresh.

pub mod demo;
pub mod service;
pub mod simulate;

pub use demo::DemoFeed;
pub use service::DataService;
pub use simulate::{apply_tick, TickProfile};

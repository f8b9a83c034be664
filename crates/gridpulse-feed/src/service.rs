//! The DataService contract.
//!
//! The engine never fetches data itself; it asks a [`DataService`] for the
//! full collection of a dataset and does all filtering, sorting, and
//! pagination locally. Implementations may be real backends or the demo feed.

use gridpulse_core::prelude::*;
use gridpulse_core::{DatasetId, RowSet};

/// Async source of full dataset collections.
///
/// `fetch_all` replaces the entire collection; there is no pushdown of
/// filtering or pagination. Failures are transient ([`Error::Fetch`]) and
/// callers keep their last known good collection.
#[trait_variant::make(DataService: Send)]
pub trait LocalDataService {
    async fn fetch_all(&self, dataset: &DatasetId) -> Result<RowSet>;
}

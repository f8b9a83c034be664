//! Notification → row navigation and the cross-page highlight handoff.
//!
//! A navigation either resolves on the current page (the target grid is
//! mounted) or requires a route change. Cross-page targets are parked in a
//! single-entry handoff slot: last write wins, and the first grid that
//! mounts with a matching id consumes the entry exactly once.

use gridpulse_core::prelude::*;
use gridpulse_core::Route;

use crate::highlight::RowHighlighter;
use crate::surface::RenderingSurface;

/// A highlight target awaiting its grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingHighlight {
    pub grid_id: String,
    pub row_key: String,
    pub row_key_field: String,
}

/// Single-entry mailbox carrying a pending highlight across a route change.
///
/// There is deliberately no queue: a newer cross-page navigation replaces an
/// unconsumed older one, so only the most recent target is ever honored.
#[derive(Debug, Default)]
pub struct HandoffSlot {
    entry: Option<PendingHighlight>,
}

impl HandoffSlot {
    /// Park a pending highlight, replacing any unconsumed entry.
    pub fn store(&mut self, pending: PendingHighlight) {
        if let Some(old) = self.entry.replace(pending) {
            debug!(
                grid_id = %old.grid_id,
                row_key = %old.row_key,
                "unconsumed pending highlight replaced"
            );
        }
    }

    /// Consume the entry if it targets `grid_id`; entries for other grids
    /// are left untouched.
    pub fn consume(&mut self, grid_id: &str) -> Option<PendingHighlight> {
        if self.entry.as_ref()?.grid_id == grid_id {
            self.entry.take()
        } else {
            None
        }
    }

    pub fn peek(&self) -> Option<&PendingHighlight> {
        self.entry.as_ref()
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }
}

/// What a navigation request resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Target notification was absent; nothing happened.
    Ignored,
    /// Same-page: the row was highlighted directly (or silently missed).
    Highlighted { found: bool },
    /// Cross-page: the shell must perform this route change; the highlight
    /// is parked in the handoff slot.
    Redirect(Route),
}

/// A fully resolved navigation request.
#[derive(Debug, Clone)]
pub struct NavigationTarget {
    pub route: Route,
    pub grid_id: String,
    pub row_key: String,
    pub row_key_field: String,
}

/// Decides same-page vs cross-page and owns the handoff slot.
#[derive(Debug, Default)]
pub struct NavigationRouter {
    current_route: Route,
    slot: HandoffSlot,
}

impl NavigationRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_route(&self) -> &Route {
        &self.current_route
    }

    /// Record a completed route change.
    pub fn set_route(&mut self, route: Route) {
        self.current_route = route;
    }

    pub fn pending(&self) -> Option<&PendingHighlight> {
        self.slot.peek()
    }

    /// Resolve a navigation request against the current surface.
    ///
    /// Same-page when the target grid is mounted (strict check), or when the
    /// current route already matches the target route and some grid is
    /// mounted (lenient fallback, kept from the original behavior but gated
    /// on the route so an unrelated page can never swallow the jump).
    pub fn navigate<S: RenderingSurface>(
        &mut self,
        target: NavigationTarget,
        surface: &mut S,
        highlighter: &mut RowHighlighter,
    ) -> NavigationOutcome {
        let same_page = surface.has_grid(&target.grid_id)
            || (self.current_route == target.route && surface.has_any_grid());

        if same_page {
            let found = highlighter.jump_to_row(
                surface,
                &target.grid_id,
                &target.row_key,
                &target.row_key_field,
            );
            return NavigationOutcome::Highlighted { found };
        }

        info!(
            route = %target.route,
            grid_id = %target.grid_id,
            row_key = %target.row_key,
            "cross-page navigation, parking highlight"
        );
        self.slot.store(PendingHighlight {
            grid_id: target.grid_id,
            row_key: target.row_key,
            row_key_field: target.row_key_field,
        });
        NavigationOutcome::Redirect(target.route)
    }

    /// A grid finished mounting: consume a matching pending highlight and
    /// forward it to the highlighter exactly once.
    pub fn grid_ready<S: RenderingSurface>(
        &mut self,
        grid_id: &str,
        surface: &mut S,
        highlighter: &mut RowHighlighter,
    ) -> bool {
        let Some(pending) = self.slot.consume(grid_id) else {
            return false;
        };
        highlighter.jump_to_row(surface, grid_id, &pending.row_key, &pending.row_key_field)
    }
}

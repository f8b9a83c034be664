//! Row highlighting: locate, flash, and persistently mark a target row.
//!
//! The persistent marker must survive virtualization re-mounts, so the
//! highlighter keeps the active target and re-applies the marker on every
//! engine tick until explicitly cleared. A missing row is an expected,
//! non-fatal condition (filtered out, different page) and stays silent.

use gridpulse_core::prelude::*;

use crate::surface::RenderingSurface;

/// The currently highlighted row, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveHighlight {
    pub grid_id: String,
    pub row_id: String,
}

/// Executes highlight commands against the rendering surface.
#[derive(Debug, Default)]
pub struct RowHighlighter {
    active: Option<ActiveHighlight>,
}

impl RowHighlighter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&ActiveHighlight> {
        self.active.as_ref()
    }

    /// Locate a row and highlight it: identity lookup first, then a linear
    /// scan matching `row_key_field`. On a hit the row is scrolled into
    /// view, flashed, and persistently marked. Returns whether a row was
    /// found; a miss is logged at debug and nothing else happens.
    pub fn jump_to_row<S: RenderingSurface>(
        &mut self,
        surface: &mut S,
        grid_id: &str,
        row_key: &str,
        row_key_field: &str,
    ) -> bool {
        let row_id = surface
            .find_row(grid_id, row_key)
            .or_else(|| surface.find_row_by_field(grid_id, row_key_field, row_key));

        let Some(row_id) = row_id else {
            debug!(
                grid_id,
                row_key, row_key_field, "highlight target not found, skipping"
            );
            return false;
        };

        // Replace any previous highlight before decorating the new row.
        if let Some(prev) = self.active.take() {
            surface.clear_marker(&prev.grid_id);
        }

        surface.ensure_visible(grid_id, &row_id);
        surface.flash(grid_id, &row_id);
        surface.apply_marker(grid_id, &row_id);

        info!(grid_id, row_id = %row_id, "row highlighted");
        self.active = Some(ActiveHighlight {
            grid_id: grid_id.to_string(),
            row_id,
        });
        true
    }

    /// Re-apply the persistent marker. Called on every engine tick; rows are
    /// destroyed and recreated as the user scrolls a virtualized grid, so a
    /// one-shot application would not stick.
    pub fn reapply<S: RenderingSurface>(&self, surface: &mut S) {
        if let Some(active) = &self.active {
            if !surface.apply_marker(&active.grid_id, &active.row_id) {
                debug!(
                    grid_id = %active.grid_id,
                    row_id = %active.row_id,
                    "highlighted row currently absent from surface"
                );
            }
        }
    }

    /// Remove the marker and stop re-applying it.
    pub fn clear<S: RenderingSurface>(&mut self, surface: &mut S) {
        if let Some(active) = self.active.take() {
            surface.clear_marker(&active.grid_id);
        }
    }
}

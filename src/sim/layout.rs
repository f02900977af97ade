//! Grid slot geometry
//!
//! Envelopes sit in a 3-column grid. While idle the grid is plain flow
//! layout; when the shuffle starts every envelope is pinned to fixed
//! coordinates so positions can be exchanged independently. `slot_origin`
//! is the single source of those coordinates.

use glam::Vec2;

use crate::consts::{CELL_GAP, CELL_HEIGHT, CELL_WIDTH, GRID_COLS};

/// Top-left origin of a grid slot, in CSS pixels relative to the grid
pub fn slot_origin(slot: usize) -> Vec2 {
    let col = (slot % GRID_COLS) as f32;
    let row = (slot / GRID_COLS) as f32;
    Vec2::new(col * (CELL_WIDTH + CELL_GAP), row * (CELL_HEIGHT + CELL_GAP))
}

/// Total pixel size of a grid holding `n` slots
pub fn grid_size(n: usize) -> Vec2 {
    let cols = GRID_COLS.min(n.max(1));
    let rows = n.div_ceil(GRID_COLS).max(1);
    Vec2::new(
        cols as f32 * CELL_WIDTH + (cols - 1) as f32 * CELL_GAP,
        rows as f32 * CELL_HEIGHT + (rows - 1) as f32 * CELL_GAP,
    )
}

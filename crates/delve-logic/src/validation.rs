//! Structural validation for generated dungeon layouts.
//!
//! Pure functions that take a finished layout and return validation errors.
//! Used by the integration tests and the headless harness to check every
//! layout a sweep produces.

use crate::layout::DungeonLayout;
use crate::room::{Direction, RoomRole};
use std::collections::HashMap;

/// A layout validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

/// Error severity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Error,
    Warning,
}

fn error(category: &'static str, message: String) -> ValidationError {
    ValidationError {
        category,
        severity: Severity::Error,
        message,
    }
}

// ── A. Per-instance ─────────────────────────────────────────────────────

/// Check that every instance sits inside the grid.
pub fn check_bounds(layout: &DungeonLayout) -> Vec<ValidationError> {
    layout
        .rooms
        .iter()
        .filter(|r| !layout.grid.in_bounds(r.grid_x, r.grid_z))
        .map(|r| {
            error(
                "bounds",
                format!(
                    "Room #{} at ({}, {}) is outside the {}×{} grid",
                    r.id, r.grid_x, r.grid_z, layout.dungeon_size, layout.dungeon_size
                ),
            )
        })
        .collect()
}

/// Check that every instance's cell is marked in the occupancy grid.
pub fn check_occupancy(layout: &DungeonLayout) -> Vec<ValidationError> {
    layout
        .rooms
        .iter()
        .filter(|r| layout.grid.in_bounds(r.grid_x, r.grid_z))
        .filter(|r| !layout.grid.is_occupied(r.grid_x, r.grid_z))
        .map(|r| {
            error(
                "occupancy",
                format!("Room #{} at ({}, {}) is not marked occupied", r.id, r.grid_x, r.grid_z),
            )
        })
        .collect()
}

/// Check that no two instances share a cell.
pub fn check_no_overlaps(layout: &DungeonLayout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen: HashMap<(i32, i32), u32> = HashMap::new();
    for r in &layout.rooms {
        if let Some(other) = seen.insert(r.cell(), r.id) {
            errors.push(error(
                "overlap",
                format!(
                    "Rooms #{} and #{} both occupy ({}, {})",
                    other, r.id, r.grid_x, r.grid_z
                ),
            ));
        }
    }
    errors
}

// ── B. Parent/child links ───────────────────────────────────────────────

/// Check every instance chains back to the start through adjacent cells.
pub fn check_connectivity(layout: &DungeonLayout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if layout.start().map(|r| r.role()) != Some(RoomRole::Start) {
        errors.push(error("connectivity", "Layout has no start room".to_string()));
        return errors;
    }

    for r in layout.rooms.iter().skip(1) {
        match layout.path_to_start(r.id) {
            Some(path) if path.last() == Some(&0) => {}
            _ => {
                errors.push(error(
                    "connectivity",
                    format!("Room #{} is not reachable from the start room", r.id),
                ));
                continue;
            }
        }

        let (Some(parent), Some(dir)) = (r.parent.and_then(|p| layout.get(p)), r.entered_from)
        else {
            continue;
        };
        let (dx, dz) = dir.offset();
        if (parent.grid_x + dx, parent.grid_z + dz) != r.cell() {
            errors.push(error(
                "connectivity",
                format!(
                    "Room #{} is not {:?} of its parent #{}",
                    r.id, dir, parent.id
                ),
            ));
        }
        if r.distance_from_start != parent.distance_from_start + 1 {
            errors.push(error(
                "connectivity",
                format!(
                    "Room #{} has distance {} but its parent #{} has {}",
                    r.id, r.distance_from_start, parent.id, parent.distance_from_start
                ),
            ));
        }
    }
    errors
}

/// Check rooms and connectors alternate along every link.
///
/// Dead ends are exempt: they may cap any door.
pub fn check_alternation(layout: &DungeonLayout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for r in &layout.rooms {
        if r.role() == RoomRole::DeadEnd {
            continue;
        }
        let Some(parent) = r.parent.and_then(|p| layout.get(p)) else {
            continue;
        };
        if r.is_connector == parent.is_connector {
            let kind = if r.is_connector { "connectors" } else { "rooms" };
            errors.push(error(
                "alternation",
                format!("Rooms #{} and #{} are adjacent {kind}", parent.id, r.id),
            ));
        }
    }
    errors
}

/// Check that every child's door back toward its parent is closed.
pub fn check_doors_consumed(layout: &DungeonLayout) -> Vec<ValidationError> {
    layout
        .rooms
        .iter()
        .filter_map(|r| r.entered_from.map(|dir| (r, Direction::opposite(dir))))
        .filter(|(r, back)| r.doors.is_open(*back))
        .map(|(r, back)| {
            error(
                "doors",
                format!("Room #{} still has its {back:?} door open toward its parent", r.id),
            )
        })
        .collect()
}

// ── C. Whole-layout ─────────────────────────────────────────────────────

/// Check there is exactly one ending room.
pub fn check_single_ending(layout: &DungeonLayout) -> Vec<ValidationError> {
    let count = layout.count_role(RoomRole::Ending);
    if count == 1 {
        Vec::new()
    } else {
        vec![error(
            "ending",
            format!("Expected exactly one ending room, found {count}"),
        )]
    }
}

/// Check the ending room hangs off a connector at least `chain_length` deep.
pub fn check_ending_distance(layout: &DungeonLayout, chain_length: u32) -> Vec<ValidationError> {
    let Some(ending) = layout.ending() else {
        return Vec::new();
    };
    match ending.parent.and_then(|p| layout.get(p)) {
        Some(parent) if parent.distance_from_start >= chain_length => Vec::new(),
        Some(parent) => vec![error(
            "ending",
            format!(
                "Ending room #{} placed at distance {} (< chain length {chain_length})",
                ending.id, parent.distance_from_start
            ),
        )],
        None => vec![error(
            "ending",
            format!("Ending room #{} has no parent", ending.id),
        )],
    }
}

/// Warn when the layout is nothing but the start and the ending branch.
pub fn check_sparse(layout: &DungeonLayout) -> Vec<ValidationError> {
    let branch = layout
        .ending()
        .and_then(|e| layout.path_to_start(e.id))
        .map_or(0, |p| p.len());
    if branch > 0 && layout.rooms.len() == branch {
        vec![ValidationError {
            category: "shape",
            severity: Severity::Warning,
            message: format!("Layout is a single corridor of {branch} instances"),
        }]
    } else {
        Vec::new()
    }
}

/// Run every check.
pub fn validate_layout(layout: &DungeonLayout, chain_length: u32) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    errors.extend(check_bounds(layout));
    errors.extend(check_occupancy(layout));
    errors.extend(check_no_overlaps(layout));
    errors.extend(check_connectivity(layout));
    errors.extend(check_alternation(layout));
    errors.extend(check_doors_consumed(layout));
    errors.extend(check_single_ending(layout));
    errors.extend(check_ending_distance(layout, chain_length));
    errors.extend(check_sparse(layout));
    errors
}

/// Only the `Error`-severity entries.
pub fn hard_errors(errors: &[ValidationError]) -> Vec<&ValidationError> {
    errors
        .iter()
        .filter(|e| e.severity == Severity::Error)
        .collect()
}

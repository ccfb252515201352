//! Pure dungeon layout generation for Delve.
//!
//! This crate grows a connected dungeon on a square grid from a catalog of
//! room prototypes. It is independent of any engine or renderer: the host
//! receives spawned rooms through the [`service::PlacementService`] trait
//! and gets a plain [`layout::DungeonLayout`] back, which makes everything
//! here unit-testable and deterministic for a given seed.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`catalog`] | Room prototypes and the ordered room/connector catalog |
//! | [`config`] | Generation settings, JSON loading, validation |
//! | [`decay`] | Placement-count → catalog index range schedule |
//! | [`error`] | Generation and persistence errors |
//! | [`frontier`] | Stack/queue work lists of rooms awaiting expansion |
//! | [`generator`] | Driver: validation, retry loop, start/regenerate hooks |
//! | [`grid`] | Occupancy map over dungeon cells |
//! | [`layout`] | Finished layout queries and ASCII map |
//! | [`persistence`] | Binary save/load of layouts |
//! | [`placement`] | One attempt: room selection, rotation, occupancy |
//! | [`room`] | Directions, door sets, placed instances |
//! | [`service`] | Host-side placement seam (spawn, rotate, clear) |
//! | [`validation`] | Structural checks over finished layouts |

pub mod catalog;
pub mod config;
pub mod decay;
pub mod error;
pub mod frontier;
pub mod generator;
pub mod grid;
pub mod layout;
pub mod persistence;
pub mod placement;
pub mod room;
pub mod service;
pub mod validation;

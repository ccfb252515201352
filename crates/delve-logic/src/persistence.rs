//! Save/Load for generated layouts.
//!
//! Uses bincode for a compact binary snapshot, prefixed by a format version
//! so stale files are rejected instead of misread.

use crate::error::PersistenceError;
use crate::layout::DungeonLayout;
use serde::Serialize;
use std::io::{Read, Write};

/// Version number for the layout file format (increment when it changes)
const LAYOUT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SaveData<'a> {
    version: u32,
    layout: &'a DungeonLayout,
}

/// Write a layout to `writer`.
pub fn save_layout<W: Write>(writer: W, layout: &DungeonLayout) -> Result<(), PersistenceError> {
    let data = SaveData {
        version: LAYOUT_VERSION,
        layout,
    };
    bincode::serialize_into(writer, &data)?;
    Ok(())
}

/// Read a layout previously written by [`save_layout`].
pub fn load_layout<R: Read>(mut reader: R) -> Result<DungeonLayout, PersistenceError> {
    // Check the version before decoding a body whose shape may have changed
    let version: u32 = bincode::deserialize_from(&mut reader)?;
    if version != LAYOUT_VERSION {
        return Err(PersistenceError::VersionMismatch {
            expected: LAYOUT_VERSION,
            found: version,
        });
    }
    let layout: DungeonLayout = bincode::deserialize_from(reader)?;
    Ok(layout)
}

/// Encode a layout into a byte vector.
pub fn layout_to_bytes(layout: &DungeonLayout) -> Result<Vec<u8>, PersistenceError> {
    let mut bytes = Vec::new();
    save_layout(&mut bytes, layout)?;
    Ok(bytes)
}

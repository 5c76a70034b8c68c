//! JSON interchange for drawings and derived labels.
//!
//! A drawing file holds the regions and texts a CAD exporter extracted:
//!
//! ```json
//! {
//!   "info": { "name": "level-2" },
//!   "regions": [
//!     { "id": "1F", "kind": "slab", "slab_type": "solid",
//!       "polygon": [{"x": 0, "y": 0}, {"x": 4, "y": 0}, {"x": 4, "y": 3}] },
//!     { "id": "2A", "kind": "zone", "orientation": "horizontal",
//!       "polygon": [{"x": 0.5, "y": 0.5}, {"x": 3.5, "y": 0.5}, {"x": 3.5, "y": 1.5}] }
//!   ],
//!   "texts": [ { "insertion": {"x": 1, "y": 1}, "content": "1%%C3/8\"@20" } ]
//! }
//! ```
//!
//! Labels are written as a JSON array of
//! [`LabelPlacement`](crate::sink::LabelPlacement)s.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use super::model::Drawing;
use crate::error::PrelosaError;
use crate::sink::LabelPlacement;

/// Reads a drawing from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn read_drawing_json(path: &Path) -> Result<Drawing, PrelosaError> {
    let file = File::open(path).map_err(PrelosaError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| PrelosaError::DrawingJsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a drawing to a JSON file.
pub fn write_drawing_json(path: &Path, drawing: &Drawing) -> Result<(), PrelosaError> {
    let file = File::create(path).map_err(PrelosaError::Io)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, drawing).map_err(|source| PrelosaError::JsonWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a drawing from a JSON string.
pub fn from_json_str(json: &str) -> Result<Drawing, serde_json::Error> {
    serde_json::from_str(json)
}

/// Reads a drawing from JSON bytes.
pub fn from_json_slice(bytes: &[u8]) -> Result<Drawing, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Writes a drawing to a pretty-printed JSON string.
pub fn to_json_string(drawing: &Drawing) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(drawing)
}

/// Writes label placements to a JSON file.
pub fn write_labels_json(path: &Path, placements: &[LabelPlacement]) -> Result<(), PrelosaError> {
    let file = File::create(path).map_err(PrelosaError::Io)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, placements).map_err(|source| {
        PrelosaError::JsonWrite {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Label placements as a pretty-printed JSON array.
pub fn labels_to_json_string(placements: &[LabelPlacement]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(placements)
}

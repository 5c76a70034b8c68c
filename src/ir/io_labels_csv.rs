//! CSV writer for derived labels.
//!
//! One row per placement, in slab order:
//!
//! ```text
//! slab,slab_type,x,y,angle,longitudinal,transverse1,transverse2
//! 1F,solid,5.0,2.0,90.0,"1Ø3/8""@.20","1Ø3/8""@.20",
//! ```
//!
//! `transverse2` is empty when the slab type has no second transverse label.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::PrelosaError;
use crate::sink::LabelPlacement;

#[derive(Debug, Serialize)]
struct LabelRow<'a> {
    slab: &'a str,
    slab_type: &'a str,
    x: f64,
    y: f64,
    angle: f64,
    longitudinal: &'a str,
    transverse1: &'a str,
    transverse2: Option<&'a str>,
}

impl<'a> From<&'a LabelPlacement> for LabelRow<'a> {
    fn from(p: &'a LabelPlacement) -> Self {
        Self {
            slab: p.slab.as_str(),
            slab_type: &p.slab_type,
            x: p.insertion.x,
            y: p.insertion.y,
            angle: p.angle_degrees,
            longitudinal: &p.label.longitudinal_text,
            transverse1: &p.label.transverse1_text,
            transverse2: p.label.transverse2_text.as_deref(),
        }
    }
}

fn write_rows<W: Write>(
    writer: W,
    placements: &[LabelPlacement],
    path: &Path,
) -> Result<W, PrelosaError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for placement in placements {
        csv_writer
            .serialize(LabelRow::from(placement))
            .map_err(|source| PrelosaError::LabelsCsvWrite {
                path: path.to_path_buf(),
                source,
            })?;
    }
    csv_writer
        .into_inner()
        .map_err(|e| PrelosaError::Io(e.into_error()))
}

/// Writes label placements to a CSV file.
pub fn write_labels_csv(path: &Path, placements: &[LabelPlacement]) -> Result<(), PrelosaError> {
    let file = File::create(path).map_err(PrelosaError::Io)?;
    write_rows(BufWriter::new(file), placements, path)?
        .flush()
        .map_err(PrelosaError::Io)
}

/// Label placements as a CSV string.
pub fn to_labels_csv_string(placements: &[LabelPlacement]) -> Result<String, PrelosaError> {
    let dummy_path = Path::new("<string>");
    let bytes = write_rows(Vec::new(), placements, dummy_path)?;

    String::from_utf8(bytes).map_err(|e| PrelosaError::LabelsCsvInvalid {
        path: dummy_path.to_path_buf(),
        message: format!("Invalid UTF-8 in output: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::DerivedLabel;
    use crate::ir::{Point, SourceId};

    fn placement(slab: &str, transverse2: Option<&str>) -> LabelPlacement {
        LabelPlacement {
            slab: SourceId::new(slab),
            slab_type: "lightened-two-direction".into(),
            insertion: Point::new(5.0, 2.0),
            angle_degrees: 90.0,
            label: DerivedLabel {
                longitudinal_text: "1Ø3/8\"@.20".into(),
                transverse1_text: "1Ø3/8\"@.250".into(),
                transverse2_text: transverse2.map(str::to_string),
            },
        }
    }

    #[test]
    fn test_header_and_rows() {
        let csv = to_labels_csv_string(&[
            placement("1F", Some("1Ø3/8\"@.250")),
            placement("2F", None),
        ])
        .unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "slab,slab_type,x,y,angle,longitudinal,transverse1,transverse2"
        );
        assert_eq!(
            lines[1],
            "1F,lightened-two-direction,5.0,2.0,90.0,\"1Ø3/8\"\"@.20\",\"1Ø3/8\"\"@.250\",\"1Ø3/8\"\"@.250\""
        );
        assert!(lines[2].ends_with(','));
    }

    #[test]
    fn test_empty_input_writes_nothing() {
        assert_eq!(to_labels_csv_string(&[]).unwrap(), "");
    }

    #[test]
    fn test_rows_parse_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.csv");
        write_labels_csv(&path, &[placement("1F", None)]).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(&records[0][0], "1F");
        assert_eq!(&records[0][5], "1Ø3/8\"@.20");
        assert_eq!(&records[0][7], "");
    }
}

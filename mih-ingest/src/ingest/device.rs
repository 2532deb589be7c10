//! Device-format (wide) CSV: one row per device, one column per day
//!
//! ```text
//! device,2024-01-01,2024-01-02
//! PlayerX,100,
//! ```
//!
//! melts into `(PlayerX, 2024-01-01, 100)`. Empty and unparseable cells
//! produce no point at all, unlike the artist path which zero-fills.

use serde::Serialize;
use tracing::trace;

use super::encoding::{self, Encoding};
use super::numeric;
use super::IngestError;

/// One (device, day) observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DevicePoint {
    pub device_name: String,
    pub day_label: String,
    pub streams: i64,
}

/// Parsed device upload
#[derive(Debug, Clone)]
pub struct DeviceBatch {
    pub points: Vec<DevicePoint>,
    pub encoding: Encoding,
}

/// Melt raw rows (header first) into points
///
/// The header needs a label column plus at least one day column.
pub fn pivot_rows(rows: &[Vec<String>]) -> Result<Vec<DevicePoint>, IngestError> {
    let header = match rows.first() {
        Some(header) if header.len() >= 2 => header,
        Some(header) => {
            return Err(IngestError::MalformedHeader {
                columns: header.len(),
            })
        }
        None => return Err(IngestError::MalformedHeader { columns: 0 }),
    };

    let day_labels: Vec<&str> = header[1..].iter().map(|label| label.trim()).collect();
    let mut points = Vec::new();

    for row in &rows[1..] {
        if row.len() < 2 {
            continue;
        }

        let device_name = row[0].trim();
        if device_name.is_empty() {
            continue;
        }

        // Cells past the last header column have no day to attach to
        for (day_label, cell) in day_labels.iter().zip(&row[1..]) {
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }

            match numeric::parse_count(cell) {
                Ok(streams) => points.push(DevicePoint {
                    device_name: device_name.to_string(),
                    day_label: (*day_label).to_string(),
                    streams,
                }),
                Err(e) => trace!(device = device_name, day = *day_label, %e, "Dropping cell"),
            }
        }
    }

    Ok(points)
}

/// Decode and melt a device CSV
pub fn parse_device_csv(bytes: &[u8]) -> Result<DeviceBatch, IngestError> {
    let decoded = encoding::resolve_rows(bytes)?;
    let points = pivot_rows(&decoded.value)?;

    Ok(DeviceBatch {
        points,
        encoding: decoded.encoding,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(device: &str, day: &str, streams: i64) -> DevicePoint {
        DevicePoint {
            device_name: device.to_string(),
            day_label: day.to_string(),
            streams,
        }
    }

    #[test]
    fn test_empty_cell_produces_no_point() {
        let batch = parse_device_csv(b"device,2024-01-01,2024-01-02\nPlayerX,100,\n").unwrap();
        assert_eq!(batch.points, vec![point("PlayerX", "2024-01-01", 100)]);
    }

    #[test]
    fn test_pivot_two_by_three() {
        let csv = "Dispositivo,d1,d2,d3\nAlexa,1,2,3\nRoku,4,5,6\n";
        let points = parse_device_csv(csv.as_bytes()).unwrap().points;

        assert_eq!(points.len(), 6);
        assert_eq!(points[0], point("Alexa", "d1", 1));
        assert_eq!(points[5], point("Roku", "d3", 6));
    }

    #[test]
    fn test_unparseable_cell_dropped() {
        let csv = "device,d1,d2\nTV,n/a,1.200\n";
        let points = parse_device_csv(csv.as_bytes()).unwrap().points;
        assert_eq!(points, vec![point("TV", "d2", 1200)]);
    }

    #[test]
    fn test_labels_and_names_trimmed() {
        let csv = "device, 2024-01-01 \n  Echo  , 7 \n";
        let points = parse_device_csv(csv.as_bytes()).unwrap().points;
        assert_eq!(points, vec![point("Echo", "2024-01-01", 7)]);
    }

    #[test]
    fn test_short_and_nameless_rows_skipped() {
        let csv = "device,d1\nlonely\n ,5\nOk,9\n";
        let points = parse_device_csv(csv.as_bytes()).unwrap().points;
        assert_eq!(points, vec![point("Ok", "d1", 9)]);
    }

    #[test]
    fn test_surplus_cells_ignored() {
        let csv = "device,d1\nTV,1,2,3\n";
        let points = parse_device_csv(csv.as_bytes()).unwrap().points;
        assert_eq!(points, vec![point("TV", "d1", 1)]);
    }

    #[test]
    fn test_single_column_header_rejected() {
        let err = parse_device_csv(b"device\nTV\n").unwrap_err();
        assert!(matches!(err, IngestError::MalformedHeader { columns: 1 }));
    }

    #[test]
    fn test_empty_file_rejected() {
        let err = parse_device_csv(b"").unwrap_err();
        assert!(matches!(err, IngestError::MalformedHeader { columns: 0 }));
    }

    #[test]
    fn test_zero_is_kept() {
        let points = parse_device_csv(b"device,d1\nTV,0\n").unwrap().points;
        assert_eq!(points, vec![point("TV", "d1", 0)]);
    }
}

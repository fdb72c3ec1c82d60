//! Stroke file reader and writer.
//!
//! A stroke file is comma-separated text with one row per sample:
//!
//! ```text
//! time,strokeIdx,pointIdx,posX,posY,posZ,rotX,rotY,rotZ,rotW,width,colR,colG,colB,colA
//! 0.5,1,1,0.1,1.2,-0.3,0,0,0,1,0.02,1,0.5,0,1
//! ```
//!
//! Rows are grouped into strokes by runs of equal `strokeIdx`: whenever the
//! value changes a new stroke starts, even if that value was seen before.
//! Stroke and point indices are renumbered from 1 on every write.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use nalgebra::Quaternion;
use vstroke_math::{Aabb, Point3, Quat, Rgba, Vec3};

use crate::collection::StrokeCollection;
use crate::error::{CodecError, Result};
use crate::record::StrokeRecord;
use crate::sample::StrokeSample;

/// The exact first line of every stroke file.
pub const HEADER: &str =
    "time,strokeIdx,pointIdx,posX,posY,posZ,rotX,rotY,rotZ,rotW,width,colR,colG,colB,colA";

/// Column names in file order.
const COLUMNS: [&str; 15] = [
    "time", "strokeIdx", "pointIdx", "posX", "posY", "posZ", "rotX", "rotY", "rotZ", "rotW",
    "width", "colR", "colG", "colB", "colA",
];

/// File extension used for stroke files.
pub const EXTENSION: &str = "csv";

/// Read a stroke file from disk.
///
/// A `.csv` extension is appended when `path` does not already end in one.
pub fn decode_path(path: impl AsRef<Path>) -> Result<StrokeCollection> {
    let path = with_extension(path.as_ref());
    log::debug!("reading strokes from {}", path.display());
    let file = File::open(&path)?;
    decode_from(BufReader::new(file))
}

/// Read stroke data from any buffered reader.
///
/// Either the whole input decodes or an error is returned; nothing is
/// returned for a partially valid file.
pub fn decode_from<R: BufRead>(reader: R) -> Result<StrokeCollection> {
    let mut lines = reader.lines();

    let header = match lines.next() {
        Some(line) => line?,
        None => String::new(),
    };
    if header != HEADER {
        return Err(CodecError::Format { found: header });
    }

    let mut records: Vec<StrokeRecord> = Vec::new();
    let mut current: Option<(i64, StrokeRecord)> = None;
    let mut bounds = Aabb::empty();
    let mut sum = Vec3::zeros();
    let mut count = 0usize;
    let mut blank_line: Option<usize> = None;

    for (idx, line) in lines.enumerate() {
        let line_no = idx + 2;
        let line = line?;
        if line.trim().is_empty() {
            if blank_line.is_none() {
                blank_line = Some(line_no);
            }
            continue;
        }
        if let Some(blank) = blank_line {
            return Err(CodecError::Parse {
                line: blank,
                field: COLUMNS[0],
                message: "empty row".into(),
            });
        }

        let (stroke_idx, sample) = parse_row(&line, line_no)?;

        match &mut current {
            Some((key, record)) if *key == stroke_idx => record.push(sample),
            slot => {
                if let Some((_, finished)) = slot.take() {
                    records.push(finished);
                }
                *slot = Some((stroke_idx, StrokeRecord::from_samples(vec![sample])));
            }
        }

        bounds.encapsulate(&sample.position);
        sum += sample.position.coords;
        count += 1;
    }

    if let Some((_, finished)) = current {
        records.push(finished);
    }

    let (bounds, average) = if count == 0 {
        (Aabb::zero(), Point3::origin())
    } else {
        (bounds, Point3::from(sum / count as f64))
    };

    log::debug!("decoded {} strokes with {} samples", records.len(), count);
    Ok(StrokeCollection::with_aggregates(records, bounds, average))
}

/// Write a stroke file to disk.
///
/// A `.csv` extension is appended as in [`decode_path`]. The file is
/// written in place; a failure part way through can leave a truncated file
/// behind.
pub fn encode_path(strokes: &StrokeCollection, path: impl AsRef<Path>) -> Result<()> {
    let path = with_extension(path.as_ref());
    let file = File::create(&path)?;
    let mut writer = BufWriter::new(file);
    encode_to(strokes, &mut writer)?;
    writer.flush()?;
    log::info!(
        "wrote {} strokes ({} samples) to {}",
        strokes.len(),
        strokes.sample_count(),
        path.display()
    );
    Ok(())
}

/// Write stroke data to any writer.
pub fn encode_to<W: Write>(strokes: &StrokeCollection, writer: &mut W) -> Result<()> {
    writeln!(writer, "{}", HEADER)?;
    for (stroke_idx, record) in strokes.iter().enumerate() {
        for (point_idx, s) in record.samples().iter().enumerate() {
            let q = s.orientation.quaternion();
            // f64 Display is the shortest text that parses back to the same value
            writeln!(
                writer,
                "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
                s.time,
                stroke_idx + 1,
                point_idx + 1,
                s.position.x,
                s.position.y,
                s.position.z,
                q.i,
                q.j,
                q.k,
                q.w,
                s.width,
                s.color.r,
                s.color.g,
                s.color.b,
                s.color.a,
            )?;
        }
    }
    Ok(())
}

fn with_extension(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == EXTENSION) {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(EXTENSION);
    PathBuf::from(name)
}

fn parse_row(line: &str, line_no: usize) -> Result<(i64, StrokeSample)> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < COLUMNS.len() {
        return Err(CodecError::Parse {
            line: line_no,
            field: COLUMNS[fields.len()],
            message: format!("expected {} fields, found {}", COLUMNS.len(), fields.len()),
        });
    }

    let float = |col: usize| -> Result<f64> {
        let raw = fields[col].trim();
        raw.parse::<f64>().map_err(|e| CodecError::Parse {
            line: line_no,
            field: COLUMNS[col],
            message: format!("{:?}: {}", raw, e),
        })
    };
    let int = |col: usize| -> Result<i64> {
        let raw = fields[col].trim();
        raw.parse::<i64>().map_err(|e| CodecError::Parse {
            line: line_no,
            field: COLUMNS[col],
            message: format!("{:?}: {}", raw, e),
        })
    };

    let time = float(0)?;
    let stroke_idx = int(1)?;
    int(2)?;
    let mut v = [0.0f64; 12];
    for (slot, col) in v.iter_mut().zip(3..) {
        *slot = float(col)?;
    }

    // Stored as written; the file is trusted to carry unit quaternions.
    let orientation = Quat::new_unchecked(Quaternion::new(v[6], v[3], v[4], v[5]));

    let sample = StrokeSample {
        time,
        position: Point3::new(v[0], v[1], v[2]),
        orientation,
        width: v[7],
        color: Rgba::new(v[8], v[9], v[10], v[11]),
    };
    Ok((stroke_idx, sample))
}

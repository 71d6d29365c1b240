//! Detection table parser.
//!
//! Reads comma-separated rows with a header line. Columns are located by name,
//! so their order does not matter and unknown columns are ignored:
//! `frame,track_id,class_id,confidence,x1,y1,x2,y2`

use std::io::{BufRead, BufReader, Read};

use crate::table::{BoundingBox, Detection, MAX_FRAME_INDEX};
use crate::{Error, Result};

/// Columns every detection table must carry, in the order they are written.
pub(crate) const COLUMNS: [&str; 8] = [
    "frame",
    "track_id",
    "class_id",
    "confidence",
    "x1",
    "y1",
    "x2",
    "y2",
];

/// Position of each required column within a row.
struct ColumnIndex {
    positions: [usize; COLUMNS.len()],
    width: usize,
}

impl ColumnIndex {
    fn from_header(header: &str, line: usize) -> Result<Self> {
        let names: Vec<&str> = header.split(',').map(clean_cell).collect();
        let mut positions = [0; COLUMNS.len()];

        for (slot, column) in positions.iter_mut().zip(COLUMNS) {
            *slot = names
                .iter()
                .position(|name| *name == column)
                .ok_or_else(|| Error::malformed(line, column, "required column missing"))?;
        }

        Ok(Self {
            positions,
            width: names.len(),
        })
    }

    fn cell<'a>(&self, cells: &[&'a str], column: usize) -> &'a str {
        cells[self.positions[column]]
    }
}

/// Parse every row of a detection table, preserving row order.
///
/// Fails on the first malformed row; no partial result is returned.
pub(crate) fn read_rows<R: Read>(reader: R) -> Result<Vec<Detection>> {
    let mut lines = BufReader::new(reader).lines().enumerate();

    let columns = loop {
        match lines.next() {
            Some((idx, line)) => {
                let line = line?;
                let line = line.trim_start_matches('\u{feff}');
                if line.trim().is_empty() {
                    continue;
                }
                break ColumnIndex::from_header(line, idx + 1)?;
            }
            None => return Err(Error::malformed(1, "frame", "missing header row")),
        }
    };

    let mut rows = Vec::new();
    for (idx, line) in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        rows.push(parse_row(&columns, &line, idx + 1)?);
    }

    Ok(rows)
}

fn parse_row(columns: &ColumnIndex, line: &str, line_no: usize) -> Result<Detection> {
    let cells: Vec<&str> = line.split(',').map(clean_cell).collect();
    if cells.len() != columns.width {
        return Err(Error::malformed(
            line_no,
            "*",
            format!("expected {} cells, found {}", columns.width, cells.len()),
        ));
    }

    let frame = parse_int(columns.cell(&cells, 0), line_no, COLUMNS[0])?;
    let frame_index = usize::try_from(frame)
        .map_err(|_| Error::malformed(line_no, COLUMNS[0], "frame index must be non-negative"))?;
    if frame_index > MAX_FRAME_INDEX {
        return Err(Error::malformed(
            line_no,
            COLUMNS[0],
            format!("frame index {} exceeds {}", frame_index, MAX_FRAME_INDEX),
        ));
    }
    let track_id = parse_int(columns.cell(&cells, 1), line_no, COLUMNS[1])?;
    let class_id = parse_int(columns.cell(&cells, 2), line_no, COLUMNS[2])?;
    let confidence = parse_float(columns.cell(&cells, 3), line_no, COLUMNS[3])?;

    let bbox = BoundingBox::new(
        parse_float(columns.cell(&cells, 4), line_no, COLUMNS[4])?,
        parse_float(columns.cell(&cells, 5), line_no, COLUMNS[5])?,
        parse_float(columns.cell(&cells, 6), line_no, COLUMNS[6])?,
        parse_float(columns.cell(&cells, 7), line_no, COLUMNS[7])?,
    );
    if bbox.is_inverted() {
        let (column, reason) = if bbox.x1 > bbox.x2 {
            ("x2", "box is inverted (x1 > x2)")
        } else {
            ("y2", "box is inverted (y1 > y2)")
        };
        return Err(Error::malformed(line_no, column, reason));
    }

    Ok(Detection::new(frame_index, track_id, class_id, confidence, bbox))
}

fn clean_cell(cell: &str) -> &str {
    cell.trim().trim_matches('"')
}

/// Parse an integer cell, accepting integral floats such as `7.0`.
fn parse_int(cell: &str, line: usize, column: &str) -> Result<i64> {
    if let Ok(value) = cell.parse::<i64>() {
        return Ok(value);
    }

    match cell.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 => {
            Ok(value as i64)
        }
        _ => Err(Error::malformed(
            line,
            column,
            format!("expected an integer, found `{}`", cell),
        )),
    }
}

fn parse_float(cell: &str, line: usize, column: &str) -> Result<f64> {
    match cell.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(Error::malformed(
            line,
            column,
            format!("expected a finite number, found `{}`", cell),
        )),
    }
}

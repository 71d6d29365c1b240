//! Detection table writer.

use std::io::{BufWriter, Write};

use super::reader::COLUMNS;
use crate::table::Detection;
use crate::Result;

/// Write rows in table format, header first.
///
/// Floats use the shortest representation that parses back to the same value,
/// so a write/read cycle is lossless.
pub(crate) fn write_rows<W: Write>(rows: &[Detection], writer: W) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    writeln!(writer, "{}", COLUMNS.join(","))?;

    for det in rows {
        let [x1, y1, x2, y2] = det.bbox.to_tlbr();
        writeln!(
            writer,
            "{},{},{},{},{},{},{},{}",
            det.frame_index, det.track_id, det.class_id, det.confidence, x1, y1, x2, y2
        )?;
    }

    writer.flush()?;
    Ok(())
}

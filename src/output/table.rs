//! The running resource table printed while sampling.
//!
//! Layout is fixed-width ASCII: a 9-character time column and six
//! 11-character value columns (average and current for CPU, memory and
//! handles/FDs).

use std::io::{self, Write};

use super::format::{format_bytes, format_time};
use crate::monitor::{Averages, Sample};

pub const TABLE_HEADER: [&str; 5] = [
    "+----------+-------------------------+-------------------------+-------------------------+",
    "+          |          CPU %          |          Memory         |       Handle / FDS      |",
    "+   Time   +------------+------------+------------+------------+------------+------------+",
    "+          |    AVG     |    CUR     |    AVG     |    CUR     |    AVG     |    CUR     |",
    "+----------+------------+------------+------------+------------+------------+------------+",
];

/// Print the table header.
pub fn write_header<W: Write>(out: &mut W) -> io::Result<()> {
    for line in TABLE_HEADER {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

/// One row for `sample`, with `averages` over every sample so far.
pub fn format_row(sample: &Sample, averages: &Averages) -> String {
    let cells = [
        format!("{:.2}", averages.cpu_percent),
        format!("{:.2}", sample.cpu_percent),
        // whole bytes are enough for display
        format_bytes(averages.private_memory_bytes as u64),
        format_bytes(sample.private_memory_bytes),
        (averages.handle_count as u64).to_string(),
        sample.handle_count.to_string(),
    ];

    let mut row = format!("|{:>9} |", format_time(&sample.timestamp));
    for cell in &cells {
        row.push_str(&format!("{:>11} |", cell));
    }
    row
}

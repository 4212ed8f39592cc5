//! CSV serialization of the pipeline's terminal [`AfkPoint`] results.
//!
//! Uses the `csv` crate's own field escaping for the `monuments` column
//! (a semicolon-joined list of `(cx,cz)` pairs, each containing a comma)
//! rather than hand-rolling quoting.

use std::io::Write;

use guardian_afk_core::config::GroupKind;
use guardian_afk_core::types::AfkPoint;

const HEADER: [&str; 13] = [
    "type",
    "afkX",
    "afkY",
    "afkZ",
    "netherX",
    "netherY",
    "netherZ",
    "placeBlockX",
    "placeBlockY",
    "placeBlockZ",
    "totalCovered",
    "count",
    "monuments",
];

/// `round(overworld / 8)`, ties rounding away from zero, matching the
/// overworld-to-nether coordinate convention named in the CSV format.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn nether_coord(overworld: i64) -> i64 {
    (overworld as f64 / 8.0).round() as i64
}

fn group_kind_label(kind: GroupKind) -> &'static str {
    match kind {
        GroupKind::Double => "double",
        GroupKind::Triple => "triple",
        GroupKind::Quad => "quad",
    }
}

fn monuments_field(afk: &AfkPoint) -> String {
    afk.group
        .centers
        .iter()
        .map(|&(x, z)| format!("({x},{z})"))
        .collect::<Vec<_>>()
        .join(";")
}

/// Writes `results` as CSV to `writer`, one record per [`AfkPoint`], in the
/// order already established by the orchestrator's final sort.
///
/// # Errors
/// Propagates any underlying I/O or CSV-encoding error.
pub fn write_csv(
    writer: impl Write,
    group_kind: GroupKind,
    results: &[AfkPoint],
) -> csv::Result<()> {
    let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);
    csv_writer.write_record(HEADER)?;

    for afk in results {
        let nether_x = nether_coord(afk.x);
        let nether_y = nether_coord(i64::from(afk.y));
        let nether_z = nether_coord(afk.z);

        csv_writer.write_record(&[
            group_kind_label(group_kind).to_string(),
            afk.x.to_string(),
            afk.y.to_string(),
            afk.z.to_string(),
            nether_x.to_string(),
            nether_y.to_string(),
            nether_z.to_string(),
            afk.x.to_string(),
            afk.place_block_y().to_string(),
            afk.z.to_string(),
            afk.coverage.total.to_string(),
            afk.group.len().to_string(),
            monuments_field(afk),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

use crate::error::Result;
use crate::schema::Dataset;
use log::info;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Default filename for the item-wise sales export.
pub const ITEM_SALES_EXPORT: &str = "item_sales.csv";

/// Writes `dataset` as CSV: a header row of column names, one line per row,
/// no index column. Dates are written `YYYY-MM-DD`, empty cells as empty
/// fields.
pub fn write_dataset<W: Write>(dataset: &Dataset, writer: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    writer.write_record(dataset.columns()).map_err(io::Error::from)?;
    for row in dataset.rows() {
        writer
            .write_record(row.iter().map(|cell| cell.to_string()))
            .map_err(io::Error::from)?;
    }
    writer.flush()?;

    Ok(())
}

pub fn to_csv_bytes(dataset: &Dataset) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_dataset(dataset, &mut buf)?;
    Ok(buf)
}

/// Writes `dataset` to `path`, replacing any existing file.
pub fn write_csv(dataset: &Dataset, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_dataset(dataset, file)?;
    info!("Wrote {} rows to {}", dataset.len(), path.display());
    Ok(())
}

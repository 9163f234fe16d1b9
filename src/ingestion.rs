use crate::error::{ReportError, Result};
use crate::schema::{Cell, Dataset};
use csv::StringRecord;
use std::io;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parses an uploaded CSV (UTF-8, comma-delimited, header row) into a
/// [`Dataset`].
///
/// Column types are inferred the way a dataframe reader does it: a column
/// whose non-empty fields all parse as finite numbers becomes numeric,
/// anything else stays text. Empty fields become [`Cell::Empty`]. Dates are
/// left as text for the normalizer.
pub fn parse_csv(bytes: &[u8], filename: &str) -> Result<Dataset> {
    let parse_error = |source: csv::Error| ReportError::Parse {
        filename: filename.to_string(),
        source,
    };

    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let columns: Vec<String> = reader
        .headers()
        .map_err(parse_error)?
        .iter()
        .map(str::to_string)
        .collect();
    if columns.iter().all(String::is_empty) {
        return Err(parse_error(csv::Error::from(io::Error::new(
            io::ErrorKind::InvalidData,
            "no columns in header row",
        ))));
    }

    let records = reader
        .records()
        .collect::<std::result::Result<Vec<StringRecord>, _>>()
        .map_err(parse_error)?;

    let numeric: Vec<bool> = (0..columns.len())
        .map(|idx| is_numeric_column(&records, idx))
        .collect();

    let rows = records
        .iter()
        .map(|record| {
            record
                .iter()
                .zip(&numeric)
                .map(|(field, is_numeric)| to_cell(field, *is_numeric))
                .collect()
        })
        .collect();

    Ok(Dataset::new(columns, rows))
}

fn parse_number(field: &str) -> Option<f64> {
    field.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn is_numeric_column(records: &[StringRecord], idx: usize) -> bool {
    let mut fields = records
        .iter()
        .filter_map(|r| r.get(idx))
        .filter(|f| !f.is_empty())
        .peekable();

    fields.peek().is_some() && fields.all(|f| parse_number(f).is_some())
}

fn to_cell(field: &str, numeric: bool) -> Cell {
    if field.is_empty() {
        return Cell::Empty;
    }
    match numeric.then(|| parse_number(field)).flatten() {
        Some(n) => Cell::Number(n),
        None => Cell::Text(field.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infers_column_types() {
        let csv = "Date,Item Name,Amount,Note\n01/02/2024,Pen,10,\n02/02/2024,Book,2.5,gift\n";
        let ds = parse_csv(csv.as_bytes(), "sales.csv").unwrap();

        assert_eq!(ds.columns(), ["Date", "Item Name", "Amount", "Note"]);
        assert_eq!(ds.len(), 2);
        assert_eq!(
            ds.rows()[0],
            vec![
                Cell::Text("01/02/2024".to_string()),
                Cell::Text("Pen".to_string()),
                Cell::Number(10.0),
                Cell::Empty,
            ]
        );
        assert_eq!(ds.rows()[1][2], Cell::Number(2.5));
    }

    #[test]
    fn test_mixed_column_stays_text() {
        let csv = "Item Name,Amount\nPen,10\nBook,n/a\n";
        let ds = parse_csv(csv.as_bytes(), "sales.csv").unwrap();
        assert_eq!(ds.rows()[0][1], Cell::Text("10".to_string()));
        assert_eq!(ds.rows()[1][1], Cell::Text("n/a".to_string()));
    }

    #[test]
    fn test_keeps_fields_verbatim() {
        let csv = "Item Name,Amount\n\"Pen, blue\",1\n Pen ,2\n";
        let ds = parse_csv(csv.as_bytes(), "sales.csv").unwrap();
        assert_eq!(ds.rows()[0][0], Cell::Text("Pen, blue".to_string()));
        assert_eq!(ds.rows()[1][0], Cell::Text(" Pen ".to_string()));
    }

    #[test]
    fn test_strips_bom() {
        let csv = b"\xEF\xBB\xBFDate,Amount\n01/02/2024,1\n";
        let ds = parse_csv(csv, "excel.csv").unwrap();
        assert!(ds.has_column("Date"));
    }

    #[test]
    fn test_header_only() {
        let ds = parse_csv(b"Date,Item Name,Amount\n", "empty.csv").unwrap();
        assert_eq!(ds.columns().len(), 3);
        assert!(ds.is_empty());
    }

    #[test]
    fn test_malformed_csv() {
        let ragged = "Item Name,Amount\nPen,10\nBook,20,extra\n";
        let err = parse_csv(ragged.as_bytes(), "bad.csv").unwrap_err();
        match err {
            ReportError::Parse { filename, .. } => assert_eq!(filename, "bad.csv"),
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(matches!(
            parse_csv(b"Item Name,Amount\n\xff\xfe,1\n", "bin.csv"),
            Err(ReportError::Parse { .. })
        ));
        assert!(matches!(
            parse_csv(b"\n\n", "blank.csv"),
            Err(ReportError::Parse { .. })
        ));
    }
}

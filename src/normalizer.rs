use crate::error::{ReportError, Result};
use crate::schema::{Cell, Dataset, DateFailurePolicy, ReportConfig};
use crate::utils::parse_day_first;
use log::{debug, warn};

/// Coerces the configured date column to [`Cell::Date`] values, reading
/// ambiguous dates day first.
///
/// Cells that already hold a date are kept, so running this twice changes
/// nothing. Empty cells stay empty. With [`DateFailurePolicy::Abort`] the
/// first unparseable value fails the whole call and the column is left
/// untouched; with [`DateFailurePolicy::Blank`] it becomes [`Cell::Empty`].
///
/// Returns `false` without doing anything when the column is absent.
pub fn normalize_dates(dataset: &mut Dataset, config: &ReportConfig) -> Result<bool> {
    let Some(idx) = dataset.column_index(&config.date_column) else {
        debug!(
            "No '{}' column, skipping date normalization",
            config.date_column
        );
        return Ok(false);
    };

    let mut normalized = Vec::with_capacity(dataset.len());
    let mut blanked = 0usize;

    for (row, cell) in dataset.column(idx).enumerate() {
        let text = match cell {
            Cell::Date(_) | Cell::Empty => {
                normalized.push(cell.clone());
                continue;
            }
            Cell::Text(s) if s.trim().is_empty() => {
                normalized.push(Cell::Empty);
                continue;
            }
            other => other.to_string(),
        };

        match parse_day_first(&text) {
            Some(date) => normalized.push(Cell::Date(date)),
            None => match config.date_failure_policy {
                DateFailurePolicy::Abort => {
                    return Err(ReportError::DateParse {
                        row: row + 1,
                        value: text,
                    })
                }
                DateFailurePolicy::Blank => {
                    warn!("Row {}: unparseable date '{}' left empty", row + 1, text);
                    blanked += 1;
                    normalized.push(Cell::Empty);
                }
            },
        }
    }

    dataset.replace_column(idx, normalized);
    debug!(
        "Normalized '{}' over {} rows ({} blanked)",
        config.date_column,
        dataset.len(),
        blanked
    );

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dataset(dates: &[&str]) -> Dataset {
        Dataset::new(
            vec!["Date".to_string(), "Amount".to_string()],
            dates
                .iter()
                .map(|d| {
                    let cell = if d.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(d.to_string())
                    };
                    vec![cell, Cell::Number(1.0)]
                })
                .collect(),
        )
    }

    fn date(y: i32, m: u32, d: u32) -> Cell {
        Cell::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_day_first_normalization() {
        let mut ds = dataset(&["03/04/2024", "1-Apr-2024", ""]);
        assert!(normalize_dates(&mut ds, &ReportConfig::default()).unwrap());

        let dates: Vec<&Cell> = ds.column(0).collect();
        assert_eq!(dates, vec![&date(2024, 4, 3), &date(2024, 4, 1), &Cell::Empty]);
        // other columns untouched
        assert_eq!(ds.rows()[0][1], Cell::Number(1.0));
    }

    #[test]
    fn test_idempotent() {
        let config = ReportConfig::default();
        let mut once = dataset(&["01/02/2024", "15/03/2024"]);
        normalize_dates(&mut once, &config).unwrap();

        let mut twice = once.clone();
        normalize_dates(&mut twice, &config).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_abort_leaves_column_untouched() {
        let mut ds = dataset(&["01/02/2024", "not a date", "03/02/2024"]);
        let before = ds.clone();

        let err = normalize_dates(&mut ds, &ReportConfig::default()).unwrap_err();
        match err {
            ReportError::DateParse { row, value } => {
                assert_eq!(row, 2);
                assert_eq!(value, "not a date");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(ds, before);
    }

    #[test]
    fn test_blank_policy() {
        let config = ReportConfig {
            date_failure_policy: DateFailurePolicy::Blank,
            ..ReportConfig::default()
        };
        let mut ds = dataset(&["01/02/2024", "not a date"]);
        normalize_dates(&mut ds, &config).unwrap();

        let dates: Vec<&Cell> = ds.column(0).collect();
        assert_eq!(dates, vec![&date(2024, 2, 1), &Cell::Empty]);
    }

    #[test]
    fn test_missing_column_is_noop() {
        let mut ds = Dataset::new(
            vec!["Item Name".to_string()],
            vec![vec![Cell::Text("Pen".to_string())]],
        );
        let before = ds.clone();
        assert!(!normalize_dates(&mut ds, &ReportConfig::default()).unwrap());
        assert_eq!(ds, before);
    }
}

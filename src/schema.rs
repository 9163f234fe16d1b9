use crate::error::{ReportError, Result};
use crate::utils::{DATE_FORMAT, TIMESTAMP_FORMAT};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single value of an uploaded table.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum Cell {
    /// An empty CSV field, or a date blanked by the normalizer
    Empty,
    Number(f64),
    /// Only produced by the date normalizer
    Date(NaiveDate),
    Text(String),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(date) => Some(*date),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

/// An in-memory table: named columns and rows of cells.
///
/// Every row holds exactly one cell per column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == columns.len()));
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Number of data rows (the header is not counted).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Iterates over the cells of one column, top to bottom.
    pub fn column(&self, idx: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().map(move |row| &row[idx])
    }

    /// Resolves every named column to its index, or fails with
    /// [`ReportError::MissingColumn`] naming the first one that is absent.
    pub fn require_columns<const N: usize>(
        &self,
        report: &'static str,
        columns: [&str; N],
    ) -> Result<[usize; N]> {
        let mut indices = [0usize; N];
        for (slot, column) in indices.iter_mut().zip(columns) {
            *slot = self
                .column_index(column)
                .ok_or_else(|| ReportError::MissingColumn {
                    report,
                    column: column.to_string(),
                })?;
        }
        Ok(indices)
    }

    /// Replaces the cells of column `idx`. `cells` must hold one cell per row.
    pub(crate) fn replace_column(&mut self, idx: usize, cells: Vec<Cell>) {
        debug_assert_eq!(cells.len(), self.rows.len());
        for (row, cell) in self.rows.iter_mut().zip(cells) {
            row[idx] = cell;
        }
    }
}

/// A calendar month, used as the grouping key of the turnover report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One accepted upload: when it happened, what it was called, and its table.
///
/// The latest entry's table is the session's loaded dataset, so date
/// normalization shows up here too.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    uploaded_at: NaiveDateTime,
    filename: String,
    dataset: Dataset,
}

impl HistoryEntry {
    pub(crate) fn new(uploaded_at: NaiveDateTime, filename: String, dataset: Dataset) -> Self {
        Self {
            uploaded_at,
            filename,
            dataset,
        }
    }

    pub fn uploaded_at(&self) -> NaiveDateTime {
        self.uploaded_at
    }

    /// The upload time rendered as `YYYY-MM-DD HH:MM:SS`.
    pub fn timestamp(&self) -> String {
        self.uploaded_at.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub(crate) fn dataset_mut(&mut self) -> &mut Dataset {
        &mut self.dataset
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum AmountPolicy {
    /// An empty or non-numeric amount fails the report
    #[default]
    Reject,
    /// An empty or non-numeric amount counts as zero
    TreatAsZero,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum DateFailurePolicy {
    /// The first unparseable date aborts normalization, leaving the column as it was
    #[default]
    Abort,
    /// Unparseable dates become empty cells
    Blank,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ReportConfig {
    #[schemars(description = "Column holding the transaction date, parsed day first")]
    pub date_column: String,

    #[schemars(description = "Column holding the item name used by the item-wise report")]
    pub item_column: String,

    #[schemars(description = "Column holding the numeric amount summed by both reports")]
    pub amount_column: String,

    pub amount_policy: AmountPolicy,

    pub date_failure_policy: DateFailurePolicy,

    #[schemars(
        description = "If true, every upload replaces the loaded dataset. If false, only the first upload of a session is accepted."
    )]
    pub allow_reupload: bool,

    #[schemars(description = "Prefix prepended to the original filename when exporting a history entry")]
    pub export_prefix: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            date_column: "Date".to_string(),
            item_column: "Item Name".to_string(),
            amount_column: "Amount".to_string(),
            amount_policy: AmountPolicy::default(),
            date_failure_policy: DateFailurePolicy::default(),
            allow_reupload: false,
            export_prefix: "downloaded_".to_string(),
        }
    }
}

impl ReportConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(
            vec!["Item Name".to_string(), "Amount".to_string()],
            vec![
                vec![Cell::Text("Pen".to_string()), Cell::Number(10.0)],
                vec![Cell::Text("Book".to_string()), Cell::Empty],
            ],
        )
    }

    #[test]
    fn test_require_columns() {
        let dataset = sample();
        let [item, amount] = dataset
            .require_columns("Item-wise sales", ["Item Name", "Amount"])
            .unwrap();
        assert_eq!((item, amount), (0, 1));

        let err = dataset
            .require_columns("Month-wise turnover", ["Date", "Amount"])
            .unwrap_err();
        match err {
            ReportError::MissingColumn { report, column } => {
                assert_eq!(report, "Month-wise turnover");
                assert_eq!(column, "Date");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_column_iteration() {
        let dataset = sample();
        let amounts: Vec<&Cell> = dataset.column(1).collect();
        assert_eq!(amounts, vec![&Cell::Number(10.0), &Cell::Empty]);
    }

    #[test]
    fn test_month_ordering_and_display() {
        let jan = Month::from_date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        let dec = Month::from_date(NaiveDate::from_ymd_opt(2023, 12, 1).unwrap());
        assert!(dec < jan);
        assert_eq!(jan.to_string(), "2024-01");
        assert_eq!(dec.to_string(), "2023-12");
        assert_eq!((dec.year(), dec.month()), (2023, 12));
        assert_eq!(
            Month::from_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            jan
        );
    }

    #[test]
    fn test_cell_json() {
        let row = vec![
            Cell::Empty,
            Cell::Number(2.5),
            Cell::Date(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()),
            Cell::Text("Pen".to_string()),
        ];
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"[null,2.5,"2024-02-01","Pen"]"#);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config =
            ReportConfig::from_json(r#"{"amount_column": "Value", "amount_policy": "TreatAsZero"}"#)
                .unwrap();
        assert_eq!(config.amount_column, "Value");
        assert_eq!(config.amount_policy, AmountPolicy::TreatAsZero);
        assert_eq!(config.date_column, "Date");
        assert!(!config.allow_reupload);

        assert!(ReportConfig::from_json("{not json").is_err());
    }
}

//! # Sales Report Builder
//!
//! A library for turning an uploaded sales register CSV (e.g. a Tally Prime
//! export) into the reports a sales dashboard shows: the raw table, month-wise
//! turnover, item-wise sales, and the upload history.
//!
//! ## Core Concepts
//!
//! - **Session**: one user's state, holding the loaded dataset and every accepted upload
//! - **Dataset**: the uploaded table, with numeric columns inferred on load
//! - **Date normalization**: the `Date` column is parsed day first (`03/04/2024` is 3 April)
//! - **Aggregates**: item-wise and month-wise sums of `Amount`
//! - **Views**: what a UI host asks for, returned as data plus a chart hint
//!
//! Rendering is left to the host: it calls [`derive_view`] on every
//! interaction and draws whatever comes back.
//!
//! ## Example
//!
//! ```rust
//! use sales_report_builder::*;
//!
//! let mut session = Session::new();
//! let csv = "Date,Item Name,Amount\n01/02/2024,Pen,10\n02/02/2024,Pen,5\n01/03/2024,Book,20\n";
//! session.ingest(csv.as_bytes(), "sales.csv").unwrap();
//!
//! let totals = derive_view(&mut session, View::ItemWiseSales).unwrap();
//! let csv_out = to_csv_bytes(totals.table().unwrap()).unwrap();
//! assert_eq!(csv_out, b"Item Name,Amount\nBook,20\nPen,15\n");
//! ```

pub mod aggregate;
pub mod error;
pub mod export;
pub mod ingestion;
pub mod normalizer;
pub mod report;
pub mod schema;
pub mod session;
pub mod utils;

pub use aggregate::{
    grand_total, item_sales_table, item_wise_sales, monthly_turnover, monthly_turnover_table,
    ItemSales, MonthlyTurnover,
};
pub use error::{ReportError, Result};
pub use export::{to_csv_bytes, write_csv, write_dataset, ITEM_SALES_EXPORT};
pub use ingestion::parse_csv;
pub use normalizer::normalize_dates;
pub use report::{derive_view, derive_view_by_id, ChartHint, HistorySummary, View, ViewResult};
pub use schema::*;
pub use session::{IngestOutcome, Session};
pub use utils::parse_day_first;

#[cfg(test)]
mod tests {
    use super::*;

    const SALES: &str = "Date,Item Name,Amount\n01/02/2024,Pen,10\n02/02/2024,Pen,5\n01/03/2024,Book,20\n";

    #[test]
    fn test_end_to_end_processing() {
        let mut session = Session::new();
        session.ingest(SALES.as_bytes(), "sales.csv").unwrap();

        let months = derive_view(&mut session, View::MonthWiseTurnover).unwrap();
        let table = months.table().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0][0], Cell::Text("2024-02".to_string()));
        assert_eq!(table.rows()[0][1], Cell::Number(15.0));

        // the dataset itself now carries dates
        let dataset = session.dataset().unwrap();
        let date_idx = dataset.column_index("Date").unwrap();
        assert!(dataset.column(date_idx).all(|c| c.as_date().is_some()));
    }

    #[test]
    fn test_raw_view_survives_missing_amount() {
        let mut session = Session::new();
        session
            .ingest(b"Date,Item Name\n01/02/2024,Pen\n", "no_amount.csv")
            .unwrap();

        assert!(matches!(
            derive_view(&mut session, View::RawData).unwrap(),
            ViewResult::Table { .. }
        ));
        assert!(matches!(
            derive_view(&mut session, View::ItemWiseSales),
            Err(ReportError::MissingColumn { .. })
        ));
        assert!(matches!(
            derive_view_by_id(&mut session, "month-wise-turnover"),
            Err(ReportError::MissingColumn { .. })
        ));
    }
}

use crate::aggregate::{
    grand_total, item_sales_table, item_wise_sales, monthly_turnover, monthly_turnover_table,
    MONTH_COLUMN,
};
use crate::error::{ReportError, Result};
use crate::schema::{Dataset, HistoryEntry};
use crate::session::Session;
use crate::utils::TIMESTAMP_FORMAT;
use chrono::NaiveDateTime;
use log::debug;
use schemars::JsonSchema;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A report the host can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    RawData,
    MonthWiseTurnover,
    ItemWiseSales,
    UploadHistory,
}

impl View {
    pub const ALL: [View; 4] = [
        View::RawData,
        View::MonthWiseTurnover,
        View::ItemWiseSales,
        View::UploadHistory,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            View::RawData => "raw-data",
            View::MonthWiseTurnover => "month-wise-turnover",
            View::ItemWiseSales => "item-wise-sales",
            View::UploadHistory => "upload-history",
        }
    }

    /// Menu label shown by the host.
    pub fn label(&self) -> &'static str {
        match self {
            View::RawData => "Raw Data",
            View::MonthWiseTurnover => "Month-wise Turnover",
            View::ItemWiseSales => "Item Name-wise Sales",
            View::UploadHistory => "Upload History",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for View {
    type Err = ReportError;

    /// Accepts either the identifier (`item-wise-sales`) or the menu label
    /// (`Item Name-wise Sales`).
    fn from_str(s: &str) -> Result<Self> {
        View::ALL
            .into_iter()
            .find(|view| view.id() == s || view.label() == s)
            .ok_or_else(|| ReportError::UnknownView(s.to_string()))
    }
}

/// How the host should draw a chart view.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(tag = "chart", rename_all = "snake_case")]
pub enum ChartHint {
    /// Nested boxes sized by `values`, one per `path` key, coloured by magnitude
    Treemap {
        title: String,
        path: String,
        values: String,
        color: String,
        color_scale: String,
        /// Number format for the value shown on hover
        value_format: String,
        /// Which parts of each box are written on it
        text_info: String,
    },
    Bar {
        title: String,
        index: String,
        values: String,
    },
}

fn format_timestamp<S>(ts: &NaiveDateTime, s: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.collect_str(&ts.format(TIMESTAMP_FORMAT))
}

/// One line of the upload history view.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct HistorySummary {
    pub index: usize,
    #[serde(serialize_with = "format_timestamp")]
    #[schemars(with = "String")]
    pub timestamp: NaiveDateTime,
    pub filename: String,
    pub rows: usize,
}

impl HistorySummary {
    fn from_entry(index: usize, entry: &HistoryEntry) -> Self {
        Self {
            index,
            timestamp: entry.uploaded_at(),
            filename: entry.filename().to_string(),
            rows: entry.dataset().len(),
        }
    }
}

/// What the host gets back for a view.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewResult {
    /// Nothing is loaded yet
    Empty,
    Table { table: Dataset },
    /// An aggregate table, the sum of its amounts, and how to draw it
    Chart {
        table: Dataset,
        total: f64,
        hint: ChartHint,
    },
    History { entries: Vec<HistorySummary> },
}

impl ViewResult {
    /// The table behind a table or chart view, for display or export.
    pub fn table(&self) -> Option<&Dataset> {
        match self {
            ViewResult::Table { table } | ViewResult::Chart { table, .. } => Some(table),
            ViewResult::Empty | ViewResult::History { .. } => None,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ViewResult)
    }

    pub fn schema_as_json() -> Result<String> {
        let schema = Self::generate_json_schema();
        Ok(serde_json::to_string_pretty(&schema)?)
    }
}

/// Computes `view` for the session.
///
/// The date normalizer always runs first, whichever view is asked for, so a
/// bad date fails every view under [`DateFailurePolicy::Abort`].
///
/// [`DateFailurePolicy::Abort`]: crate::schema::DateFailurePolicy::Abort
pub fn derive_view(session: &mut Session, view: View) -> Result<ViewResult> {
    session.normalize_dates()?;
    debug!("Deriving view {}", view);

    let config = session.config();
    let result = match (view, session.dataset()) {
        (View::UploadHistory, _) => ViewResult::History {
            entries: session
                .history()
                .iter()
                .enumerate()
                .map(|(idx, entry)| HistorySummary::from_entry(idx, entry))
                .collect(),
        },
        (_, None) => ViewResult::Empty,
        (View::RawData, Some(dataset)) => ViewResult::Table {
            table: dataset.clone(),
        },
        (View::MonthWiseTurnover, Some(dataset)) => {
            let totals = monthly_turnover(dataset, config)?;
            ViewResult::Chart {
                table: monthly_turnover_table(&totals, config),
                total: grand_total(&totals),
                hint: ChartHint::Treemap {
                    title: "Month-wise Turnover".to_string(),
                    path: MONTH_COLUMN.to_string(),
                    values: config.amount_column.clone(),
                    color: config.amount_column.clone(),
                    color_scale: "RdBu".to_string(),
                    value_format: ":,.2f".to_string(),
                    text_info: "label+value".to_string(),
                },
            }
        }
        (View::ItemWiseSales, Some(dataset)) => {
            let totals = item_wise_sales(dataset, config)?;
            ViewResult::Chart {
                table: item_sales_table(&totals, config),
                total: grand_total(&totals),
                hint: ChartHint::Bar {
                    title: "Item Name-wise Sales Report".to_string(),
                    index: config.item_column.clone(),
                    values: config.amount_column.clone(),
                },
            }
        }
    };

    Ok(result)
}

/// Parses `view_id` and computes it. Unknown ids fail with
/// [`ReportError::UnknownView`].
pub fn derive_view_by_id(session: &mut Session, view_id: &str) -> Result<ViewResult> {
    derive_view(session, view_id.parse()?)
}

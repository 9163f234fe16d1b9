use crate::error::{ReportError, Result};
use crate::schema::{AmountPolicy, Cell, Dataset, Month, ReportConfig};
use log::{debug, warn};
use std::collections::BTreeMap;

pub const ITEM_WISE_REPORT: &str = "Item-wise sales";
pub const MONTH_WISE_REPORT: &str = "Month-wise turnover";

/// Column name of the month key in the exported turnover table
pub const MONTH_COLUMN: &str = "Month";

/// Item name -> total amount, ascending by item name
pub type ItemSales = BTreeMap<String, f64>;

/// Month -> total amount, chronological
pub type MonthlyTurnover = BTreeMap<Month, f64>;

/// Sums the amount column per exact item name.
///
/// Item names are compared as-is: case-sensitive and untrimmed. Rows without
/// an item name are dropped.
pub fn item_wise_sales(dataset: &Dataset, config: &ReportConfig) -> Result<ItemSales> {
    let [item_idx, amount_idx] = dataset.require_columns(
        ITEM_WISE_REPORT,
        [config.item_column.as_str(), config.amount_column.as_str()],
    )?;

    let mut totals = ItemSales::new();
    for (row, cells) in dataset.rows().iter().enumerate() {
        let item = &cells[item_idx];
        if item.is_empty() {
            continue;
        }

        let amount = amount_of(&cells[amount_idx], row + 1, config.amount_policy)?;
        *totals.entry(item.to_string()).or_insert(0.0) += amount;
    }

    debug!(
        "{}: {} rows grouped into {} items",
        ITEM_WISE_REPORT,
        dataset.len(),
        totals.len()
    );
    Ok(totals)
}

/// Sums the amount column per calendar month of the date column.
///
/// The date column has to be normalized first; a non-empty cell that is not
/// a date fails with [`ReportError::DateNotNormalized`]. Rows without a date
/// are dropped.
pub fn monthly_turnover(dataset: &Dataset, config: &ReportConfig) -> Result<MonthlyTurnover> {
    let [date_idx, amount_idx] = dataset.require_columns(
        MONTH_WISE_REPORT,
        [config.date_column.as_str(), config.amount_column.as_str()],
    )?;

    let mut totals = MonthlyTurnover::new();
    for (row, cells) in dataset.rows().iter().enumerate() {
        let month = match &cells[date_idx] {
            Cell::Empty => continue,
            Cell::Date(date) => Month::from_date(*date),
            other => {
                return Err(ReportError::DateNotNormalized {
                    row: row + 1,
                    value: other.to_string(),
                })
            }
        };

        let amount = amount_of(&cells[amount_idx], row + 1, config.amount_policy)?;
        *totals.entry(month).or_insert(0.0) += amount;
    }

    debug!(
        "{}: {} rows grouped into {} months",
        MONTH_WISE_REPORT,
        dataset.len(),
        totals.len()
    );
    Ok(totals)
}

fn amount_of(cell: &Cell, row: usize, policy: AmountPolicy) -> Result<f64> {
    let parsed = match cell {
        Cell::Number(n) => Some(*n),
        Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        Cell::Empty | Cell::Date(_) => None,
    };

    match (parsed, policy) {
        (Some(amount), _) => Ok(amount),
        (None, AmountPolicy::TreatAsZero) => {
            warn!("Row {}: amount '{}' counted as zero", row, cell);
            Ok(0.0)
        }
        (None, AmountPolicy::Reject) => Err(ReportError::InvalidAmount {
            row,
            value: cell.to_string(),
        }),
    }
}

pub fn grand_total<K>(totals: &BTreeMap<K, f64>) -> f64 {
    totals.values().sum()
}

/// Lays the item totals out as an `Item Name,Amount` table.
pub fn item_sales_table(totals: &ItemSales, config: &ReportConfig) -> Dataset {
    Dataset::new(
        vec![config.item_column.clone(), config.amount_column.clone()],
        totals
            .iter()
            .map(|(item, amount)| vec![Cell::Text(item.clone()), Cell::Number(*amount)])
            .collect(),
    )
}

/// Lays the month totals out as a `Month,Amount` table, months rendered `YYYY-MM`.
pub fn monthly_turnover_table(totals: &MonthlyTurnover, config: &ReportConfig) -> Dataset {
    Dataset::new(
        vec![MONTH_COLUMN.to_string(), config.amount_column.clone()],
        totals
            .iter()
            .map(|(month, amount)| vec![Cell::Text(month.to_string()), Cell::Number(*amount)])
            .collect(),
    )
}

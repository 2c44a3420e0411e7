use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;

use crate::error::LoadError;

pub const COL_REVENUES: &str = "Revenues";
pub const COL_TOTAL_COST: &str = "Total Cost (Sales & Marketing)";
pub const COL_ORDERS_PLACED: &str = "Orders Placed";
pub const COL_CUSTOMERS: &str = "Customers";
pub const COL_PURCHASED_ITEMS: &str = "Purchased Items";
pub const COL_INQUIRIES: &str = "Inquiries";

/// One month of raw figures, exactly as loaded from the sales sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseRow {
    pub month: String,
    pub revenues: i64,
    pub total_cost: i64,
    pub orders_placed: i64,
    pub customers: i64,
    pub purchased_items: i64,
    pub inquiries: i64,
}

/// Immutable table of monthly rows in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    rows: Vec<BaseRow>,
}

#[derive(Deserialize)]
struct CsvRow {
    #[serde(rename = "Months")]
    months: String,
    #[serde(rename = "Revenues")]
    revenues: String,
    #[serde(rename = "Total Cost (Sales & Marketing)")]
    total_cost: String,
    #[serde(rename = "Orders Placed")]
    orders_placed: String,
    #[serde(rename = "Customers")]
    customers: String,
    #[serde(rename = "Purchased Items")]
    purchased_items: String,
    #[serde(rename = "Inquiries")]
    inquiries: String,
}

impl Dataset {
    pub fn load(path: impl AsRef<Path>) -> Result<Dataset, LoadError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let dataset = Self::from_reader(file)?;
        tracing::info!(
            path = %path.display(),
            months = dataset.len(),
            "sales dataset loaded"
        );
        Ok(dataset)
    }

    /// Parses CSV content. The last record is a totals footer and is always dropped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Dataset, LoadError> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);
        let headers = reader.headers()?.clone();
        let mut records = reader.records().collect::<Result<Vec<StringRecord>, _>>()?;
        records.pop();
        if records.is_empty() {
            return Err(LoadError::MissingRows);
        }

        let mut seen = HashSet::new();
        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            let line = record.position().map(|pos| pos.line()).unwrap_or_default();
            let raw: CsvRow = record.deserialize(Some(&headers))?;
            if !seen.insert(raw.months.clone()) {
                return Err(LoadError::DuplicateMonth {
                    line,
                    month: raw.months,
                });
            }
            rows.push(BaseRow {
                revenues: parse_int(line, COL_REVENUES, &strip_grouping(&raw.revenues))?,
                total_cost: parse_int(line, COL_TOTAL_COST, &strip_grouping(&raw.total_cost))?,
                orders_placed: parse_int(line, COL_ORDERS_PLACED, &raw.orders_placed)?,
                customers: parse_int(line, COL_CUSTOMERS, &raw.customers)?,
                purchased_items: parse_int(line, COL_PURCHASED_ITEMS, &raw.purchased_items)?,
                inquiries: parse_int(line, COL_INQUIRIES, &raw.inquiries)?,
                month: raw.months,
            });
        }
        Ok(Dataset { rows })
    }

    pub fn rows(&self) -> &[BaseRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Distinct month labels in file order.
    pub fn months(&self) -> Vec<String> {
        self.rows.iter().map(|row| row.month.clone()).collect()
    }
}

fn strip_grouping(value: &str) -> String {
    value.replace(',', "")
}

fn parse_int(line: u64, column: &'static str, value: &str) -> Result<i64, LoadError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| LoadError::InvalidNumber {
            line,
            column,
            value: value.to_string(),
        })
}

use std::collections::HashMap;

use serde::Serialize;

use crate::dataset::{BaseRow, Dataset};

/// The six tracked quantities, in dashboard order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Revenues,
    Profit,
    OrdersPlaced,
    Customers,
    PurchasedItems,
    ConversionRate,
}

/// How a metric's figures are presented on its card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayKind {
    Currency,
    Count,
    Rate,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Revenues,
        Metric::Profit,
        Metric::OrdersPlaced,
        Metric::Customers,
        Metric::PurchasedItems,
        Metric::ConversionRate,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Metric::Revenues => "Revenues",
            Metric::Profit => "Profit",
            Metric::OrdersPlaced => "Orders Placed",
            Metric::Customers => "Customers",
            Metric::PurchasedItems => "Purchased Items",
            Metric::ConversionRate => "Conversion Rate",
        }
    }

    pub fn display_kind(&self) -> DisplayKind {
        match self {
            Metric::Revenues | Metric::Profit => DisplayKind::Currency,
            Metric::OrdersPlaced | Metric::Customers | Metric::PurchasedItems => {
                DisplayKind::Count
            }
            Metric::ConversionRate => DisplayKind::Rate,
        }
    }

    fn index(&self) -> usize {
        match self {
            Metric::Revenues => 0,
            Metric::Profit => 1,
            Metric::OrdersPlaced => 2,
            Metric::Customers => 3,
            Metric::PurchasedItems => 4,
            Metric::ConversionRate => 5,
        }
    }

    fn raw_value(&self, row: &BaseRow) -> f64 {
        match self {
            Metric::Revenues => row.revenues as f64,
            Metric::Profit => row.revenues as f64 - row.total_cost as f64,
            Metric::OrdersPlaced => row.orders_placed as f64,
            Metric::Customers => row.customers as f64,
            Metric::PurchasedItems => row.purchased_items as f64,
            Metric::ConversionRate => {
                let sales = row.orders_placed;
                (sales as f64 / row.inquiries as f64) * 100.0
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricPoint {
    pub value: f64,
    pub difference: f64,
    /// NaN on the first row.
    pub pct_change: f64,
}

/// Derived view: per-metric value, difference and percent-change columns plus
/// a month index. Rebuilt from the base table, never updated in place.
#[derive(Debug, Clone)]
pub struct DerivedTable {
    months: Vec<String>,
    index: HashMap<String, usize>,
    columns: [Vec<MetricPoint>; 6],
}

impl DerivedTable {
    pub fn derive(dataset: &Dataset) -> DerivedTable {
        let rows = dataset.rows();
        let months: Vec<String> = rows.iter().map(|row| row.month.clone()).collect();
        let index = months
            .iter()
            .enumerate()
            .map(|(idx, month)| (month.clone(), idx))
            .collect();
        let columns = Metric::ALL.map(|metric| {
            let values: Vec<f64> = rows.iter().map(|row| metric.raw_value(row)).collect();
            derive_column(&values)
        });
        DerivedTable {
            months,
            index,
            columns,
        }
    }

    pub fn row_index(&self, month: &str) -> Option<usize> {
        self.index.get(month).copied()
    }

    pub fn column(&self, metric: Metric) -> &[MetricPoint] {
        &self.columns[metric.index()]
    }

    pub fn point(&self, metric: Metric, month: &str) -> Option<MetricPoint> {
        let idx = self.row_index(month)?;
        self.column(metric).get(idx).copied()
    }

    pub fn series(&self, metric: Metric) -> Vec<(String, f64)> {
        self.months
            .iter()
            .zip(self.column(metric))
            .map(|(month, point)| (month.clone(), point.value))
            .collect()
    }
}

/// Difference is zero-filled on the first row; percent change is left NaN.
fn derive_column(values: &[f64]) -> Vec<MetricPoint> {
    values
        .iter()
        .enumerate()
        .map(|(idx, value)| match idx.checked_sub(1).map(|prev| values[prev]) {
            Some(prev) => MetricPoint {
                value: *value,
                difference: value - prev,
                pct_change: ((value / prev) - 1.0) * 100.0,
            },
            None => MetricPoint {
                value: *value,
                difference: 0.0,
                pct_change: f64::NAN,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::{SAMPLE, sample_dataset};

    #[test]
    fn difference_matches_previous_row_and_first_is_zero() {
        let table = DerivedTable::derive(&sample_dataset());
        for metric in Metric::ALL {
            let column = table.column(metric);
            assert_eq!(column[0].difference, 0.0, "{metric:?}");
            assert!(column[0].pct_change.is_nan(), "{metric:?}");
            for idx in 1..column.len() {
                assert_eq!(
                    column[idx].difference,
                    column[idx].value - column[idx - 1].value
                );
            }
        }
    }

    #[test]
    fn composite_metrics_follow_raw_columns() {
        let dataset = sample_dataset();
        let table = DerivedTable::derive(&dataset);
        for (row, (profit, conversion)) in dataset.rows().iter().zip(
            table
                .column(Metric::Profit)
                .iter()
                .zip(table.column(Metric::ConversionRate)),
        ) {
            assert_eq!(profit.value, row.revenues as f64 - row.total_cost as f64);
            assert_eq!(
                conversion.value,
                row.orders_placed as f64 / row.inquiries as f64 * 100.0
            );
        }
    }

    #[test]
    fn percent_change_is_relative_to_previous_value() {
        let table = DerivedTable::derive(&sample_dataset());
        let mar = table.point(Metric::Revenues, "MAR").expect("MAR present");
        assert_eq!(mar.value, 120_000.0);
        assert_eq!(mar.difference, 20_000.0);
        assert!((mar.pct_change - 20.0).abs() < 1e-9);
    }

    #[test]
    fn zero_previous_value_is_not_special_cased() {
        let csv = "\
Months,Revenues,Total Cost (Sales & Marketing),Orders Placed,Customers,Purchased Items,Inquiries
JAN,0,0,0,0,0,10
FEB,10,0,0,5,0,10
Total,0,0,0,0,0,0
";
        let dataset = Dataset::from_reader(csv.as_bytes()).expect("parses");
        let table = DerivedTable::derive(&dataset);
        assert_eq!(table.column(Metric::Revenues)[1].pct_change, f64::INFINITY);
        assert!(table.column(Metric::OrdersPlaced)[1].pct_change.is_nan());
    }

    #[test]
    fn extreme_values_do_not_overflow_profit() {
        let csv = "\
Months,Revenues,Total Cost (Sales & Marketing),Orders Placed,Customers,Purchased Items,Inquiries
JAN,9223372036854775807,-1,1,1,1,1
FEB,-9223372036854775808,9223372036854775807,1,1,1,1
Total,0,0,0,0,0,0
";
        let dataset = Dataset::from_reader(csv.as_bytes()).expect("parses");
        let table = DerivedTable::derive(&dataset);
        let profit = table.column(Metric::Profit);
        assert!(profit[0].value > 9.2e18);
        assert!(profit[1].value < -1.8e19);
        assert!(profit[1].difference.is_finite());
    }

    #[test]
    fn derive_is_deterministic() {
        let first = DerivedTable::derive(&Dataset::from_reader(SAMPLE.as_bytes()).unwrap());
        let second = DerivedTable::derive(&Dataset::from_reader(SAMPLE.as_bytes()).unwrap());
        for metric in Metric::ALL {
            assert_eq!(first.series(metric), second.series(metric));
        }
    }

    #[test]
    fn unknown_month_has_no_point() {
        let table = DerivedTable::derive(&sample_dataset());
        assert!(table.point(Metric::Customers, "DEC").is_none());
    }
}

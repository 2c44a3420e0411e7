use std::sync::Arc;

use serde::Serialize;

use crate::card::{MetricCard, render_card};
use crate::chart::{TrendChart, render_chart};
use crate::dataset::Dataset;
use crate::error::{DashboardError, DashboardResult};
use crate::metrics::{DerivedTable, Metric};

pub const TITLE: &str = "KPI Sales Dashboard";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricPanel {
    pub card: MetricCard,
    pub chart: TrendChart,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub month: String,
    pub panels: Vec<MetricPanel>,
}

/// Shares the immutable base table and derives a fresh view on every render.
#[derive(Debug, Clone)]
pub struct Dashboard {
    base: Arc<Dataset>,
}

impl Dashboard {
    pub fn new(base: Arc<Dataset>) -> Dashboard {
        Dashboard { base }
    }

    pub fn months(&self) -> Vec<String> {
        self.base.months()
    }

    /// `Ok(None)` when nothing is selected; callers keep their prior display.
    pub fn render(&self, selection: Option<&str>) -> DashboardResult<Option<DashboardView>> {
        let Some(month) = selection.filter(|month| !month.is_empty()) else {
            tracing::debug!("no month selected, skipping render");
            return Ok(None);
        };
        let table = DerivedTable::derive(&self.base);
        if table.row_index(month).is_none() {
            return Err(DashboardError::RowNotFound(month.to_string()));
        }
        let panels = Metric::ALL
            .iter()
            .map(|metric| {
                let point = table
                    .point(*metric, month)
                    .ok_or_else(|| DashboardError::RowNotFound(month.to_string()))?;
                Ok(MetricPanel {
                    card: render_card(*metric, point),
                    chart: render_chart(&table, *metric),
                })
            })
            .collect::<DashboardResult<Vec<_>>>()?;
        tracing::info!(month, "dashboard rendered");
        Ok(Some(DashboardView {
            month: month.to_string(),
            panels,
        }))
    }
}

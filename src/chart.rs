use serde::Serialize;

use crate::metrics::{DerivedTable, Metric};

pub const LINE_COLOR: &str = "#00b300";

/// Minimal sparkline look: no grid, no axis lines, no hover.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub line_width: u16,
    pub color: &'static str,
    pub height: u16,
    pub width: u16,
    pub show_grid: bool,
    pub show_axis_line: bool,
    pub hover: bool,
}

impl Default for LineStyle {
    fn default() -> Self {
        LineStyle {
            line_width: 3,
            color: LINE_COLOR,
            height: 50,
            width: 150,
            show_grid: false,
            show_axis_line: false,
            hover: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendChart {
    pub metric: Metric,
    pub title: String,
    pub points: Vec<(String, f64)>,
    pub style: LineStyle,
}

impl TrendChart {
    /// Plot coordinates with the month position as x.
    pub fn plot_points(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .enumerate()
            .map(|(idx, (_, value))| (idx as f64, *value))
            .collect()
    }

    /// Finite min/max of the series, padded when flat.
    pub fn y_bounds(&self) -> [f64; 2] {
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for (_, y) in &self.points {
            if y.is_finite() {
                min_y = min_y.min(*y);
                max_y = max_y.max(*y);
            }
        }
        if !min_y.is_finite() || !max_y.is_finite() {
            [0.0, 1.0]
        } else if (max_y - min_y).abs() < f64::EPSILON {
            let padding = (max_y.abs() * 0.05).max(1.0);
            [min_y - padding, max_y + padding]
        } else {
            [min_y, max_y]
        }
    }
}

/// Always plots the full series; the month selection plays no part.
pub fn render_chart(table: &DerivedTable, metric: Metric) -> TrendChart {
    TrendChart {
        metric,
        title: metric.title().to_string(),
        points: table.series(metric),
        style: LineStyle::default(),
    }
}

use serde::Serialize;

use crate::metrics::{DisplayKind, Metric, MetricPoint};

pub const COLOR_UP: &str = "#00cc00";
pub const COLOR_DOWN: &str = "#EC1E3D";
pub const COLOR_FLAT: &str = "white";
pub const CAPTION: &str = "vs previous month";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl Direction {
    /// Only an exact zero difference counts as flat.
    pub fn classify(difference: f64) -> Direction {
        if difference > 0.0 {
            Direction::Up
        } else if difference < 0.0 {
            Direction::Down
        } else {
            Direction::Flat
        }
    }

    pub fn indicator(&self) -> Option<&'static str> {
        match self {
            Direction::Up => Some("▲"),
            Direction::Down => Some("▼"),
            Direction::Flat => None,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Direction::Up => COLOR_UP,
            Direction::Down => COLOR_DOWN,
            Direction::Flat => COLOR_FLAT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub metric: Metric,
    pub title: String,
    pub value: String,
    pub delta: String,
    pub pct_change: String,
    pub direction: Direction,
}

pub fn render_card(metric: Metric, point: MetricPoint) -> MetricCard {
    let kind = metric.display_kind();
    let direction = Direction::classify(point.difference);
    let (delta, pct_change) = match direction {
        Direction::Up => (
            format_delta(kind, point.difference),
            format!("+{}%", group_thousands(point.pct_change, 1)),
        ),
        Direction::Down => (
            format_delta(kind, point.difference),
            format!("{}%", group_thousands(point.pct_change, 1)),
        ),
        Direction::Flat => {
            let zero = match kind {
                DisplayKind::Rate => "0.00%",
                DisplayKind::Currency | DisplayKind::Count => "0.00",
            };
            (zero.to_string(), "0.0%".to_string())
        }
    };
    MetricCard {
        metric,
        title: metric.title().to_string(),
        value: format_value(kind, point.value),
        delta,
        pct_change,
        direction,
    }
}

pub fn format_value(kind: DisplayKind, value: f64) -> String {
    match kind {
        DisplayKind::Currency => format!("${}", group_thousands(value, 0)),
        DisplayKind::Count => group_thousands(value, 0),
        DisplayKind::Rate => format!("{}%", group_thousands(value, 1)),
    }
}

fn format_delta(kind: DisplayKind, difference: f64) -> String {
    let sign = if difference < 0.0 { "-" } else { "+" };
    let magnitude = group_thousands(difference.abs(), 2);
    match kind {
        DisplayKind::Currency => format!("{sign}${magnitude}"),
        DisplayKind::Count => format!("{sign}{magnitude}"),
        DisplayKind::Rate => format!("{sign}{magnitude}%"),
    }
}

/// Fixed-point formatting with `,` grouping in the integer part.
pub fn group_thousands(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return format!("{value}");
    }
    let formatted = format!("{value:.decimals$}");
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (unsigned, None),
    };
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(value: f64, difference: f64, pct_change: f64) -> MetricPoint {
        MetricPoint {
            value,
            difference,
            pct_change,
        }
    }

    #[test]
    fn revenue_increase_card() {
        let card = render_card(Metric::Revenues, point(120_000.0, 20_000.0, 20.0));
        assert_eq!(card.title, "Revenues");
        assert_eq!(card.value, "$120,000");
        assert_eq!(card.delta, "+$20,000.00");
        assert_eq!(card.pct_change, "+20.0%");
        assert_eq!(card.direction, Direction::Up);
    }

    #[test]
    fn profit_decrease_uses_magnitude_after_sign() {
        let card = render_card(Metric::Profit, point(60_000.0, -12_345.5, -17.07));
        assert_eq!(card.value, "$60,000");
        assert_eq!(card.delta, "-$12,345.50");
        assert_eq!(card.pct_change, "-17.1%");
        assert_eq!(card.direction, Direction::Down);
    }

    #[test]
    fn flat_count_card_uses_literal_zeroes() {
        let card = render_card(Metric::OrdersPlaced, point(500.0, 0.0, 0.0));
        assert_eq!(card.value, "500");
        assert_eq!(card.delta, "0.00");
        assert_eq!(card.pct_change, "0.0%");
        assert_eq!(card.direction, Direction::Flat);
        assert!(card.direction.indicator().is_none());
    }

    #[test]
    fn flat_first_row_hides_nan_percent() {
        let card = render_card(Metric::Customers, point(300.0, 0.0, f64::NAN));
        assert_eq!(card.pct_change, "0.0%");
    }

    #[test]
    fn count_deltas_carry_two_decimals() {
        let up = render_card(Metric::PurchasedItems, point(1_050.0, 70.0, 7.142857));
        assert_eq!(up.delta, "+70.00");
        assert_eq!(up.pct_change, "+7.1%");
        let down = render_card(Metric::Customers, point(1_200.0, -1_500.0, -55.5));
        assert_eq!(down.value, "1,200");
        assert_eq!(down.delta, "-1,500.00");
    }

    #[test]
    fn rate_card_renders_percentages() {
        let up = render_card(Metric::ConversionRate, point(12.5, 1.25, 11.11));
        assert_eq!(up.value, "12.5%");
        assert_eq!(up.delta, "+1.25%");
        assert_eq!(up.pct_change, "+11.1%");
        let down = render_card(Metric::ConversionRate, point(11.25, -1.25, -10.0));
        assert_eq!(down.delta, "-1.25%");
        assert_eq!(down.pct_change, "-10.0%");
        let flat = render_card(Metric::ConversionRate, point(11.25, 0.0, 0.0));
        assert_eq!(flat.delta, "0.00%");
        assert_eq!(flat.pct_change, "0.0%");
    }

    #[test]
    fn tiny_nonzero_difference_is_not_flat() {
        assert_eq!(Direction::classify(1e-15), Direction::Up);
        assert_eq!(Direction::classify(-1e-15), Direction::Down);
        assert_eq!(Direction::classify(0.0), Direction::Flat);
        assert_eq!(Direction::classify(-0.0), Direction::Flat);
    }

    #[test]
    fn grouping_handles_signs_and_widths() {
        assert_eq!(group_thousands(0.0, 0), "0");
        assert_eq!(group_thousands(999.0, 0), "999");
        assert_eq!(group_thousands(1_000.0, 0), "1,000");
        assert_eq!(group_thousands(1_234_567.891, 2), "1,234,567.89");
        assert_eq!(group_thousands(-45_000.0, 0), "-45,000");
        assert_eq!(group_thousands(f64::INFINITY, 1), "inf");
        assert_eq!(group_thousands(f64::NEG_INFINITY, 1), "-inf");
        assert_eq!(group_thousands(f64::NAN, 1), "nan");
    }
}

pub const DEFAULT_MONTH: &str = "MAR";
pub const PLACEHOLDER: &str = "Select Month";

/// Single-select month dropdown. Options keep file order; clearing is allowed.
#[derive(Debug, Clone)]
pub struct MonthSelector {
    options: Vec<String>,
    default: Option<String>,
    selected: Option<String>,
}

impl MonthSelector {
    pub fn new(months: &[String], default_month: &str) -> MonthSelector {
        let mut options: Vec<String> = Vec::with_capacity(months.len());
        for month in months {
            if !options.contains(month) {
                options.push(month.clone());
            }
        }
        let default = options
            .iter()
            .find(|month| month.as_str() == default_month)
            .cloned();
        if default.is_none() {
            tracing::warn!(
                month = default_month,
                "default month missing from dataset, starting without selection"
            );
        }
        MonthSelector {
            options,
            selected: default.clone(),
            default,
        }
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Returns false and keeps the current selection for unknown labels.
    pub fn select(&mut self, month: &str) -> bool {
        if !self.options.iter().any(|option| option == month) {
            return false;
        }
        self.selected = Some(month.to_string());
        true
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn reset(&mut self) {
        self.selected = self.default.clone();
    }

    pub fn next(&mut self) -> Option<&str> {
        self.step(1)
    }

    pub fn previous(&mut self) -> Option<&str> {
        self.step(-1)
    }

    fn step(&mut self, delta: isize) -> Option<&str> {
        if self.options.is_empty() {
            return None;
        }
        let len = self.options.len() as isize;
        let next_idx = match self.selected_index() {
            Some(idx) => (idx as isize + delta).rem_euclid(len) as usize,
            None if delta >= 0 => 0,
            None => self.options.len() - 1,
        };
        self.selected = Some(self.options[next_idx].clone());
        self.selected()
    }

    fn selected_index(&self) -> Option<usize> {
        let selected = self.selected.as_deref()?;
        self.options.iter().position(|option| option == selected)
    }

    pub fn label(&self) -> &str {
        self.selected().unwrap_or(PLACEHOLDER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn months() -> Vec<String> {
        ["JAN", "FEB", "MAR", "APR"]
            .iter()
            .map(|m| m.to_string())
            .collect()
    }

    #[test]
    fn defaults_to_mar_when_present() {
        let selector = MonthSelector::new(&months(), DEFAULT_MONTH);
        assert_eq!(selector.selected(), Some("MAR"));
        assert_eq!(selector.options().len(), 4);
    }

    #[test]
    fn missing_default_starts_without_selection() {
        let selector = MonthSelector::new(&months()[..2], DEFAULT_MONTH);
        assert_eq!(selector.selected(), None);
        assert_eq!(selector.label(), PLACEHOLDER);
    }

    #[test]
    fn unknown_label_is_rejected() {
        let mut selector = MonthSelector::new(&months(), DEFAULT_MONTH);
        assert!(!selector.select("DEC"));
        assert_eq!(selector.selected(), Some("MAR"));
        assert!(selector.select("JAN"));
        assert_eq!(selector.selected(), Some("JAN"));
    }

    #[test]
    fn cycling_wraps_and_recovers_from_clear() {
        let mut selector = MonthSelector::new(&months(), DEFAULT_MONTH);
        assert_eq!(selector.next(), Some("APR"));
        assert_eq!(selector.next(), Some("JAN"));
        assert_eq!(selector.previous(), Some("APR"));
        selector.clear();
        assert_eq!(selector.selected(), None);
        assert_eq!(selector.previous(), Some("APR"));
        selector.clear();
        assert_eq!(selector.next(), Some("JAN"));
        selector.reset();
        assert_eq!(selector.selected(), Some("MAR"));
    }

    #[test]
    fn duplicate_labels_collapse_to_distinct_options() {
        let mut input = months();
        input.push("JAN".to_string());
        let selector = MonthSelector::new(&input, DEFAULT_MONTH);
        assert_eq!(selector.options().len(), 4);
    }
}

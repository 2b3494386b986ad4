//! Price movement alerting rule.
//!
//! Decides, per tick, whether a price change is significant enough to
//! notify the user. The rule is stateless: the previous price comes
//! from the store at call time, there is no evaluator-owned history
//! and no debounce window. Sustained volatility therefore produces an
//! alert on every qualifying tick.

/// Evaluates relative price movement against a fixed threshold.
#[derive(Debug, Clone)]
pub struct AlertEvaluator {
    /// Relative-change threshold; movement must be strictly greater
    /// to alert. Default 0.01 (1%).
    threshold: f64,
}

impl AlertEvaluator {
    /// Create an evaluator with the given relative-change threshold.
    pub fn new(threshold: f64) -> Self {
        assert!(
            threshold > 0.0 && threshold < 1.0,
            "alert threshold must be in (0, 1)"
        );
        Self { threshold }
    }

    /// Evaluate a price movement for the named asset.
    ///
    /// Returns the notification message if `|new - previous| / previous`
    /// strictly exceeds the threshold, `None` otherwise. Callers skip
    /// evaluation entirely when there is no previous price (first tick
    /// for an asset).
    pub fn evaluate(&self, name: &str, previous: f64, new: f64) -> Option<String> {
        if previous <= 0.0 {
            return None;
        }

        let change = (new - previous).abs() / previous;
        if change <= self.threshold {
            return None;
        }

        let direction = if new > previous { "surged" } else { "dropped" };
        Some(format!(
            "{name} price {direction} to ${}!",
            format_usd(new)
        ))
    }
}

impl Default for AlertEvaluator {
    fn default() -> Self {
        Self::new(0.01)
    }
}

/// Format a USD amount with thousands separators and two decimals,
/// e.g. `65432.5` → `"65,432.50"`.
pub fn format_usd(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped}.{frac:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_over_threshold_alerts() {
        let eval = AlertEvaluator::default();
        // 1.5% > 1%
        let msg = eval.evaluate("Bitcoin", 100.0, 101.5);
        assert_eq!(msg.as_deref(), Some("Bitcoin price surged to $101.50!"));
    }

    #[test]
    fn movement_under_threshold_is_silent() {
        let eval = AlertEvaluator::default();
        assert!(eval.evaluate("Bitcoin", 100.0, 100.5).is_none());
    }

    #[test]
    fn exact_threshold_is_silent() {
        // Strictly greater than 1%, so exactly 1% does not alert.
        let eval = AlertEvaluator::default();
        assert!(eval.evaluate("Bitcoin", 100.0, 101.0).is_none());
    }

    #[test]
    fn drop_direction_wording() {
        let eval = AlertEvaluator::default();
        let msg = eval.evaluate("Ethereum", 100.0, 90.0);
        assert_eq!(msg.as_deref(), Some("Ethereum price dropped to $90.00!"));
    }

    #[test]
    fn nonpositive_previous_is_silent() {
        let eval = AlertEvaluator::default();
        assert!(eval.evaluate("Bitcoin", 0.0, 50.0).is_none());
    }

    #[test]
    fn usd_formatting_groups_thousands() {
        assert_eq!(format_usd(65432.5), "65,432.50");
        assert_eq!(format_usd(1_234_567.891), "1,234,567.89");
        assert_eq!(format_usd(140.0), "140.00");
        assert_eq!(format_usd(0.07), "0.07");
    }
}

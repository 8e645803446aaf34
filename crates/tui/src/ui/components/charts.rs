use ratatui::symbols;

/// Creates a simple ASCII-based horizontal bar for inline use.
///
/// Returns a string like `████████░░░░░░░░░░░░` representing the ratio.
#[must_use]
pub fn ascii_bar(value: u64, max: u64, width: usize) -> String {
    if max == 0 {
        return "░".repeat(width);
    }

    let ratio = (value as f64 / max as f64).clamp(0.0, 1.0);
    let filled = ((ratio * width as f64) as usize).min(width);
    let empty = width.saturating_sub(filled);

    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Creates a percentage bar with label.
///
/// Returns something like `████████░░ 80%`
#[must_use]
pub fn percentage_bar(percentage: u16, width: usize) -> String {
    let filled = ((percentage as usize * width) / 100).min(width);
    let empty = width.saturating_sub(filled);
    format!(
        "{}{} {:>3}%",
        "█".repeat(filled),
        "░".repeat(empty),
        percentage
    )
}

/// Creates a mini bar chart representation as a string.
///
/// Returns something like `▁▂▃▅▇▅▃▂▁` for a series of values.
#[must_use]
pub fn mini_bar_chart(values: &[u64]) -> String {
    if values.is_empty() {
        return String::new();
    }

    let max = *values.iter().max().unwrap_or(&1);
    if max == 0 {
        return " ".repeat(values.len());
    }

    let bars = [
        symbols::bar::ONE_EIGHTH,
        symbols::bar::ONE_QUARTER,
        symbols::bar::THREE_EIGHTHS,
        symbols::bar::HALF,
        symbols::bar::FIVE_EIGHTHS,
        symbols::bar::THREE_QUARTERS,
        symbols::bar::SEVEN_EIGHTHS,
        symbols::bar::FULL,
    ];

    values
        .iter()
        .map(|&v| {
            if v == 0 {
                " "
            } else {
                let index = ((v as f64 / max as f64) * 7.0) as usize;
                bars[index.min(7)]
            }
        })
        .collect()
}

/// Computes the percentage of value relative to max.
#[must_use]
pub fn compute_percentage(value: i64, max: i64) -> u16 {
    if max == 0 {
        return 0;
    }
    ((value.abs() as f64 / max.abs() as f64) * 100.0).min(100.0) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bars_handle_zero_max() {
        assert_eq!(ascii_bar(5, 0, 4), "░░░░");
        assert_eq!(compute_percentage(10, 0), 0);
    }

    #[test]
    fn percentage_clamps_to_100() {
        assert_eq!(compute_percentage(250, 100), 100);
        assert_eq!(compute_percentage(50, 100), 50);
    }
}

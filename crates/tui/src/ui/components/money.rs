use engine::{Currency, Money};
use ratatui::{
    style::{Modifier, Style},
    text::Span,
};

use crate::ui::theme::Theme;

/// Creates a styled span for a money amount with semantic coloring.
///
/// - Positive amounts: green with `+` prefix
/// - Negative amounts: red (negative sign shown)
/// - Zero: neutral text color
#[must_use]
pub fn styled_amount(amount_minor: i64, currency: Currency, theme: &Theme) -> Span<'static> {
    let formatted = Money::new(amount_minor).format(currency);

    let (color, prefix) = if amount_minor > 0 {
        (theme.positive, "+")
    } else if amount_minor < 0 {
        (theme.negative, "")
    } else {
        (theme.text, "")
    };

    Span::styled(format!("{prefix}{formatted}"), Style::default().fg(color))
}

/// Like [`styled_amount`] without the `+` prefix, for contexts where the sign
/// is already clear (e.g. `Income: 1,234€`).
#[must_use]
pub fn styled_amount_no_sign(
    amount_minor: i64,
    currency: Currency,
    theme: &Theme,
) -> Span<'static> {
    let formatted = Money::new(amount_minor.abs()).format(currency);

    let color = if amount_minor > 0 {
        theme.positive
    } else if amount_minor < 0 {
        theme.negative
    } else {
        theme.text
    };

    Span::styled(formatted, Style::default().fg(color))
}

/// Creates a bold styled span for emphasis (e.g. totals).
#[must_use]
pub fn styled_amount_bold(amount_minor: i64, currency: Currency, theme: &Theme) -> Span<'static> {
    let span = styled_amount(amount_minor, currency, theme);
    Span::styled(
        span.content.clone(),
        span.style.add_modifier(Modifier::BOLD),
    )
}

/// Neutral (uncolored) formatted amount.
#[must_use]
pub fn plain_amount(amount_minor: i64, currency: Currency, theme: &Theme) -> Span<'static> {
    Span::styled(
        Money::new(amount_minor).format(currency),
        Style::default().fg(theme.text),
    )
}

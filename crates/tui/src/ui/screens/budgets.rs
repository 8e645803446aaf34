use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{
    app::AppState,
    ui::{
        Theme,
        components::{card::Card, charts, money},
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();

    let title = format!("Budgets — {}", state.period.label());
    let card = Card::new(&title, &theme).focused(true);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    let overview = &state.budgets.overview;
    if overview.lines.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::raw("No budgets for this month. Press "),
                Span::styled("a", Style::default().fg(theme.accent)),
                Span::raw(" and enter e.g. "),
                Span::styled("Groceries 300", Style::default().fg(theme.accent)),
                Span::raw("."),
            ])),
            inner,
        );
        return;
    }

    let bar_width = 16usize;
    let mut lines: Vec<Line<'_>> = Vec::new();

    for (index, line) in overview.lines.iter().enumerate() {
        let selected = index == state.budgets.selected;
        let percentage = charts::compute_percentage(line.spent_minor, line.budget_minor);
        let remaining = line.budget_minor - line.spent_minor;

        let marker = if selected { "▸ " } else { "  " };
        let mut row = Line::from(vec![
            Span::styled(marker, Style::default().fg(theme.accent)),
            Span::raw(format!("{} ", line.category_emoji)),
            Span::raw(format!("{:<16}", line.category_name)),
            Span::styled(
                charts::percentage_bar(percentage, bar_width),
                Style::default().fg(usage_color(percentage, &theme)),
            ),
            Span::raw("  "),
            money::styled_amount_no_sign(-line.spent_minor, state.currency, &theme),
            Span::styled(" / ", Style::default().fg(theme.dim)),
            money::plain_amount(line.budget_minor, state.currency, &theme),
            Span::styled(
                format!("  ({} left)", engine::Money::new(remaining).format(state.currency)),
                Style::default().fg(theme.dim),
            ),
        ]);
        if selected {
            row.style = Style::default().bg(theme.surface);
        }
        lines.push(row);
    }

    lines.push(Line::default());
    let total_pct =
        charts::compute_percentage(overview.total_spent_minor, overview.total_budget_minor);
    lines.push(Line::from(vec![
        Span::styled(
            format!("  {:<18}", "Total"),
            Style::default()
                .fg(theme.text)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            charts::percentage_bar(total_pct, bar_width),
            Style::default().fg(usage_color(total_pct, &theme)),
        ),
        Span::raw("  "),
        money::styled_amount_bold(-overview.total_spent_minor, state.currency, &theme),
        Span::styled(" / ", Style::default().fg(theme.dim)),
        money::plain_amount(overview.total_budget_minor, state.currency, &theme),
    ]));

    frame.render_widget(Paragraph::new(lines), inner);
}

fn usage_color(percentage: u16, theme: &Theme) -> ratatui::style::Color {
    if percentage < 70 {
        theme.positive
    } else if percentage < 90 {
        theme.accent
    } else {
        theme.negative
    }
}

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
        components::{card::Card, money},
        theme::color_from_hex,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();

    let title = format!("Transactions — {}", state.period.label());
    let card = Card::new(&title, &theme).focused(true);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    if state.transactions.items.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::raw("Nothing recorded this month. Press "),
                Span::styled("a", Style::default().fg(theme.accent)),
                Span::raw(" to add a transaction."),
            ])),
            inner,
        );
        return;
    }

    let mut lines: Vec<Line<'_>> = Vec::new();
    for (day, indices) in state.transactions.grouped_by_day(state.timezone) {
        lines.push(Line::from(Span::styled(
            day.format("%a %-d %B").to_string(),
            Style::default().fg(theme.dim).add_modifier(Modifier::BOLD),
        )));

        for index in indices {
            let item = &state.transactions.items[index];
            let selected = index == state.transactions.selected;

            let marker = if selected { "▸ " } else { "  " };
            let category_color =
                color_from_hex(&item.category_color).unwrap_or(theme.text);

            let mut spans = vec![
                Span::styled(marker, Style::default().fg(theme.accent)),
                Span::raw(format!("{} ", item.category_emoji)),
                Span::styled(
                    format!("{:<16}", item.category_name),
                    Style::default().fg(category_color),
                ),
                Span::styled(
                    format!("{:<12}", item.account_name),
                    Style::default().fg(theme.dim),
                ),
                money::styled_amount(item.signed_amount(), state.currency, &theme),
            ];
            if let Some(note) = &item.note {
                spans.push(Span::styled(
                    format!("  {note}"),
                    Style::default().fg(theme.dim),
                ));
            }

            let mut line = Line::from(spans);
            if selected {
                line.style = Style::default().bg(theme.surface);
            }
            lines.push(line);
        }
    }

    // Keep the selected row visible in tall months.
    let selected_line = lines
        .iter()
        .take_while(|line| line.style.bg.is_none())
        .count();
    let visible = inner.height as usize;
    let scroll = selected_line.saturating_sub(visible.saturating_sub(2)) as u16;

    frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), inner);
}

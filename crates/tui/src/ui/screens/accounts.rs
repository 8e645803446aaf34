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
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();

    let card = Card::new("Accounts", &theme).focused(true);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    if state.accounts.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::raw("No accounts yet. Press "),
                Span::styled("a", Style::default().fg(theme.accent)),
                Span::raw(" and enter e.g. "),
                Span::styled("Banks/Checking 250", Style::default().fg(theme.accent)),
                Span::raw("."),
            ])),
            inner,
        );
        return;
    }

    let mut lines: Vec<Line<'_>> = Vec::new();
    for (group_name, members) in state.accounts_by_group() {
        let group_total: i64 = members.iter().map(|account| account.balance_minor).sum();
        lines.push(Line::from(vec![
            Span::styled(
                format!("{group_name:<24}"),
                Style::default().fg(theme.dim).add_modifier(Modifier::BOLD),
            ),
            money::styled_amount_no_sign(group_total, state.currency, &theme),
        ]));

        for account in members {
            lines.push(Line::from(vec![
                Span::raw(format!("  {:<22}", account.name)),
                money::styled_amount_no_sign(account.balance_minor, state.currency, &theme),
            ]));
        }
        lines.push(Line::default());
    }

    lines.push(Line::from(vec![
        Span::styled(
            format!("{:<24}", "Net worth"),
            Style::default()
                .fg(theme.text)
                .add_modifier(Modifier::BOLD),
        ),
        money::styled_amount_bold(state.net_worth_minor(), state.currency, &theme),
    ]));

    frame.render_widget(Paragraph::new(lines), inner);
}

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{
    app::AppState,
    ui::{
        Theme,
        components::{
            card::{Card, StatCard},
            charts, money,
        },
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Month stat cards
            Constraint::Min(0),    // Accounts + budget status
        ])
        .split(area);

    render_stat_row(frame, layout[0], state, &theme);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(layout[1]);

    render_accounts_card(frame, columns[0], state, &theme);
    render_budget_status_card(frame, columns[1], state, &theme);
}

fn render_stat_row(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(area);

    let summary = state.summary;
    StatCard::new(
        "Income",
        money::styled_amount_no_sign(summary.income_minor, state.currency, theme),
        theme,
    )
    .render(frame, cells[0]);
    StatCard::new(
        "Expenses",
        money::styled_amount_no_sign(-summary.expenses_minor, state.currency, theme),
        theme,
    )
    .render(frame, cells[1]);
    StatCard::new(
        "Net",
        money::styled_amount(summary.net_minor(), state.currency, theme),
        theme,
    )
    .subtitle(state.period.label())
    .render(frame, cells[2]);
}

fn render_accounts_card(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let card = Card::new("Accounts", theme);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    if state.accounts.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::raw("No accounts yet. Press "),
                Span::styled("w", Style::default().fg(theme.accent)),
                Span::raw(" then "),
                Span::styled("a", Style::default().fg(theme.accent)),
                Span::raw(" to add one."),
            ])),
            inner,
        );
        return;
    }

    let mut lines = Vec::new();
    for (group_name, members) in state.accounts_by_group() {
        lines.push(Line::from(Span::styled(
            group_name.to_string(),
            Style::default().fg(theme.dim).add_modifier(Modifier::BOLD),
        )));
        for account in members {
            lines.push(Line::from(vec![
                Span::raw(format!("  {:<20}", account.name)),
                money::styled_amount_no_sign(account.balance_minor, state.currency, theme),
            ]));
        }
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_budget_status_card(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let card = Card::new("Budget status", theme);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    let overview = &state.budgets.overview;
    if overview.lines.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::raw("No budgets this month. Press "),
                Span::styled("b", Style::default().fg(theme.accent)),
                Span::raw(" then "),
                Span::styled("a", Style::default().fg(theme.accent)),
                Span::raw(" to create one."),
            ])),
            inner,
        );
        return;
    }

    let percentage =
        charts::compute_percentage(overview.total_spent_minor, overview.total_budget_minor);
    let bar_width = (inner.width as usize).saturating_sub(8).max(10);

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Spent ", Style::default().fg(theme.dim)),
            money::styled_amount_no_sign(-overview.total_spent_minor, state.currency, theme),
            Span::styled(" of ", Style::default().fg(theme.dim)),
            money::plain_amount(overview.total_budget_minor, state.currency, theme),
        ]),
        Line::from(Span::styled(
            charts::percentage_bar(percentage, bar_width),
            Style::default().fg(usage_color(percentage, theme)),
        )),
        Line::default(),
    ];

    for line in overview.lines.iter().take(inner.height.saturating_sub(3) as usize) {
        let pct = charts::compute_percentage(line.spent_minor, line.budget_minor);
        lines.push(Line::from(vec![
            Span::raw(format!("{} {:<14}", line.category_emoji, line.category_name)),
            Span::styled(
                format!("{pct:>3}%"),
                Style::default().fg(usage_color(pct, theme)),
            ),
        ]));
    }

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

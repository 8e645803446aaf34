use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use engine::{TransactionKind, month_name};

use crate::{
    app::AppState,
    ui::{
        Theme,
        components::{card::Card, charts, money},
        theme::color_from_hex,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Month summary
            Constraint::Min(6),    // Category breakdown
            Constraint::Length(6), // Trailing trend
        ])
        .split(area);

    render_summary(frame, layout[0], state, &theme);
    render_breakdown(frame, layout[1], state, &theme);
    render_trend(frame, layout[2], state, &theme);
}

fn render_summary(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let title = format!("Summary — {}", state.period.label());
    let card = Card::new(&title, theme);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    let summary = state.summary;
    let lines = vec![
        Line::from(vec![
            Span::styled("Income   ", Style::default().fg(theme.dim)),
            money::styled_amount_no_sign(summary.income_minor, state.currency, theme),
            Span::styled("    Expenses ", Style::default().fg(theme.dim)),
            money::styled_amount_no_sign(-summary.expenses_minor, state.currency, theme),
        ]),
        Line::from(vec![
            Span::styled("Net      ", Style::default().fg(theme.dim)),
            money::styled_amount_bold(summary.net_minor(), state.currency, theme),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_breakdown(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let kind_label = match state.analytics.kind {
        TransactionKind::Expense => "expenses",
        TransactionKind::Income => "income",
    };
    let title = format!("By category ({kind_label})");
    let card = Card::new(&title, theme).focused(true);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    if state.analytics.shares.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::raw(format!("No {kind_label} this month. Press ")),
                Span::styled("i", Style::default().fg(theme.accent)),
                Span::raw(" to switch kind."),
            ])),
            inner,
        );
        return;
    }

    let bar_width = 20usize;
    let mut lines: Vec<Line<'_>> = Vec::new();
    for share in &state.analytics.shares {
        let percentage = (share.share * 100.0).round() as u16;
        let color = color_from_hex(&share.category_color).unwrap_or(theme.accent);
        lines.push(Line::from(vec![
            Span::raw(format!("{} ", share.category_emoji)),
            Span::styled(format!("{:<16}", share.category_name), Style::default().fg(color)),
            Span::styled(
                charts::ascii_bar(percentage as u64, 100, bar_width),
                Style::default().fg(color),
            ),
            Span::styled(
                format!(" {:>5.1}%  ", share.share * 100.0),
                Style::default()
                    .fg(theme.text)
                    .add_modifier(Modifier::BOLD),
            ),
            money::plain_amount(share.total_minor, state.currency, theme),
        ]));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_trend(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let card = Card::new("Trend", theme);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    if state.analytics.trend.is_empty() {
        return;
    }

    let income: Vec<u64> = state
        .analytics
        .trend
        .iter()
        .map(|month| month.income_minor.max(0) as u64)
        .collect();
    let expenses: Vec<u64> = state
        .analytics
        .trend
        .iter()
        .map(|month| month.expenses_minor.max(0) as u64)
        .collect();
    let labels: Vec<String> = state
        .analytics
        .trend
        .iter()
        .map(|month| month_name(month.period.month())[..3].to_string())
        .collect();

    let lines = vec![
        Line::from(vec![
            Span::styled("income   ", Style::default().fg(theme.positive)),
            Span::styled(
                charts::mini_bar_chart(&income),
                Style::default().fg(theme.positive),
            ),
        ]),
        Line::from(vec![
            Span::styled("expenses ", Style::default().fg(theme.negative)),
            Span::styled(
                charts::mini_bar_chart(&expenses),
                Style::default().fg(theme.negative),
            ),
        ]),
        Line::from(vec![
            Span::raw("         "),
            Span::styled(
                labels
                    .iter()
                    .map(|label| label.chars().next().unwrap_or(' ').to_string())
                    .collect::<String>(),
                Style::default().fg(theme.dim),
            ),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines), inner);
}

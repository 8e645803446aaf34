pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{AppState, InputState, Section};

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let theme = Theme::default();
    let area = frame.area();

    let input_height = match &state.input {
        Some(input) if input.error.is_some() => 3,
        Some(_) => 2,
        None => 0,
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),            // Info bar
            Constraint::Length(2),            // Tab bar
            Constraint::Min(0),               // Main content
            Constraint::Length(input_height), // Modal input, when active
            Constraint::Length(1),            // Bottom bar
        ])
        .split(area);

    render_info_bar(frame, layout[0], state, &theme);
    components::tabs::render_tabs(frame, layout[1], state.section, &theme);

    match state.section {
        Section::Home => screens::home::render(frame, layout[2], state),
        Section::Transactions => screens::transactions::render(frame, layout[2], state),
        Section::Accounts => screens::accounts::render(frame, layout[2], state),
        Section::Budgets => screens::budgets::render(frame, layout[2], state),
        Section::Analytics => screens::analytics::render(frame, layout[2], state),
    }

    if let Some(input) = &state.input {
        render_input_bar(frame, layout[3], input, &theme);
    }
    render_bottom_bar(frame, layout[4], state, &theme);

    components::toast::render(frame, layout[2], state.toast.as_ref());
}

fn render_info_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let line = Line::from(vec![
        Span::styled(
            " bilancio ",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("· ", Style::default().fg(theme.dim)),
        Span::styled(
            state.period.label(),
            Style::default()
                .fg(theme.text)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("  ·  net worth ", Style::default().fg(theme.dim)),
        components::money::styled_amount_no_sign(state.net_worth_minor(), state.currency, theme),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_input_bar(frame: &mut Frame<'_>, area: Rect, input: &InputState, theme: &Theme) {
    let mut lines = vec![
        Line::from(Span::styled(
            input.prompt,
            Style::default().fg(theme.dim),
        )),
        Line::from(vec![
            Span::styled("> ", Style::default().fg(theme.accent)),
            Span::styled(input.buffer.as_str(), Style::default().fg(theme.text)),
            Span::styled("▏", Style::default().fg(theme.accent)),
        ]),
    ];
    if let Some(error) = &input.error {
        lines.push(Line::from(Span::styled(
            error.as_str(),
            Style::default().fg(theme.error),
        )));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let mut spans: Vec<Span<'static>> = Vec::new();

    if state.input.is_some() {
        spans.push(Span::styled("Enter", Style::default().fg(theme.accent)));
        spans.push(Span::raw(" submit  "));
        spans.push(Span::styled("Esc", Style::default().fg(theme.accent)));
        spans.push(Span::raw(" cancel"));
    } else {
        spans.push(Span::raw(" "));
        spans.extend(components::tabs::tab_shortcuts(theme));
        spans.push(Span::raw("  "));
        for (key, label) in section_hints(state.section) {
            spans.push(Span::styled(*key, Style::default().fg(theme.accent)));
            spans.push(Span::raw(format!(" {label}  ")));
        }
        spans.push(Span::styled("q", Style::default().fg(theme.accent)));
        spans.push(Span::raw(" quit"));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn section_hints(section: Section) -> &'static [(&'static str, &'static str)] {
    match section {
        Section::Home => &[("a", "add"), ("p/n", "month")],
        Section::Transactions => &[
            ("a", "add"),
            ("d", "delete"),
            ("j/k", "select"),
            ("p/n", "month"),
        ],
        Section::Accounts => &[("a", "add account")],
        Section::Budgets => &[
            ("a", "new budget"),
            ("e", "edit month"),
            ("d", "delete"),
            ("j/k", "select"),
            ("p/n", "month"),
        ],
        Section::Analytics => &[("i", "income/expenses"), ("p/n", "month")],
    }
}

use std::time::{Duration, Instant};

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use crossterm::event::{self, Event, KeyEvent};
use uuid::Uuid;

use engine::{
    AccountView, BudgetOverview, CategoryShare, Currency, Engine, Money, MonthPeriod, MonthTotals,
    MonthlySummary, NewTransaction, TransactionKind, TransactionView,
};

use crate::{
    error::{AppError, Result},
    local_state::{self, LocalState},
    quick_add, ui,
};

const TOAST_TTL: Duration = Duration::from_secs(4);
const TREND_MONTHS: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Home,
    Transactions,
    Accounts,
    Budgets,
    Analytics,
}

impl Section {
    pub fn label(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Transactions => "Transactions",
            Self::Accounts => "Accounts",
            Self::Budgets => "Budgets",
            Self::Analytics => "Analytics",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug)]
pub struct ToastState {
    pub message: String,
    pub level: ToastLevel,
    expires_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTarget {
    QuickAdd,
    NewBudget,
    EditBudgetEntry { budget_id: Uuid },
    NewAccount,
}

/// A modal one-line input, the app's only dialog shape.
#[derive(Debug)]
pub struct InputState {
    pub target: InputTarget,
    pub prompt: &'static str,
    pub buffer: String,
    pub error: Option<String>,
}

impl InputState {
    fn new(target: InputTarget, prompt: &'static str) -> Self {
        Self {
            target,
            prompt,
            buffer: String::new(),
            error: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct TransactionsState {
    pub items: Vec<TransactionView>,
    pub selected: usize,
}

impl TransactionsState {
    pub fn select_next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selected = (self.selected + 1).min(self.items.len() - 1);
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_item(&self) -> Option<&TransactionView> {
        self.items.get(self.selected)
    }

    /// Consecutive day groups (items are already newest-first), as
    /// `(local date, indices into items)`.
    pub fn grouped_by_day(&self, timezone: Tz) -> Vec<(NaiveDate, Vec<usize>)> {
        let mut groups: Vec<(NaiveDate, Vec<usize>)> = Vec::new();
        for (index, item) in self.items.iter().enumerate() {
            let date = item.occurred_at.with_timezone(&timezone).date_naive();
            match groups.last_mut() {
                Some((day, indices)) if *day == date => indices.push(index),
                _ => groups.push((date, vec![index])),
            }
        }
        groups
    }
}

#[derive(Debug, Default)]
pub struct BudgetsState {
    pub overview: BudgetOverview,
    pub selected: usize,
}

impl BudgetsState {
    pub fn select_next(&mut self) {
        if self.overview.lines.is_empty() {
            return;
        }
        self.selected = (self.selected + 1).min(self.overview.lines.len() - 1);
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_line(&self) -> Option<&engine::BudgetLine> {
        self.overview.lines.get(self.selected)
    }
}

#[derive(Debug)]
pub struct AnalyticsState {
    pub kind: TransactionKind,
    pub shares: Vec<CategoryShare>,
    pub trend: Vec<MonthTotals>,
}

impl Default for AnalyticsState {
    fn default() -> Self {
        Self {
            kind: TransactionKind::Expense,
            shares: Vec::new(),
            trend: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct AppState {
    pub section: Section,
    pub period: MonthPeriod,
    pub timezone: Tz,
    pub currency: Currency,
    pub summary: MonthlySummary,
    pub accounts: Vec<AccountView>,
    pub transactions: TransactionsState,
    pub budgets: BudgetsState,
    pub analytics: AnalyticsState,
    pub input: Option<InputState>,
    pub toast: Option<ToastState>,
}

impl AppState {
    /// Accounts split by their group, in the engine's group/name order.
    pub fn accounts_by_group(&self) -> Vec<(&str, Vec<&AccountView>)> {
        let mut groups: Vec<(&str, Vec<&AccountView>)> = Vec::new();
        for account in &self.accounts {
            match groups.last_mut() {
                Some((name, members)) if *name == account.group_name => members.push(account),
                _ => groups.push((account.group_name.as_str(), vec![account])),
            }
        }
        groups
    }

    pub fn net_worth_minor(&self) -> i64 {
        self.accounts.iter().map(|a| a.balance_minor).sum()
    }
}

pub struct App {
    engine: Engine,
    pub state: AppState,
    local_state: LocalState,
    should_quit: bool,
}

impl App {
    pub fn new(engine: Engine, currency: Currency) -> Result<Self> {
        let timezone = engine.timezone();
        let local_state = LocalState::load(local_state::default_state_path()).unwrap_or_else(|err| {
            tracing::warn!("failed to load local state: {err}");
            LocalState::default()
        });

        let state = AppState {
            section: Section::Home,
            period: MonthPeriod::current(timezone),
            timezone,
            currency,
            summary: MonthlySummary::default(),
            accounts: Vec::new(),
            transactions: TransactionsState::default(),
            budgets: BudgetsState::default(),
            analytics: AnalyticsState::default(),
            input: None,
            toast: None,
        };

        Ok(Self {
            engine,
            state,
            local_state,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(200);
        self.refresh_all().await;

        while !self.should_quit {
            self.expire_toast();

            terminal
                .draw(|frame| ui::render(frame, &self.state))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            if event::poll(tick_rate)? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key).await,
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }
        }

        Ok(())
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        if self.state.input.is_some() {
            self.handle_input_key(key).await;
            return;
        }

        match ui::keymap::map_key(key) {
            ui::keymap::AppAction::Quit => self.should_quit = true,
            ui::keymap::AppAction::Up => self.select_prev(),
            ui::keymap::AppAction::Down => self.select_next(),
            ui::keymap::AppAction::Input(ch) => self.handle_normal_key(ch).await,
            _ => {}
        }
    }

    async fn handle_input_key(&mut self, key: KeyEvent) {
        match ui::keymap::map_key(key) {
            ui::keymap::AppAction::Cancel => {
                self.state.input = None;
            }
            ui::keymap::AppAction::Submit => self.submit_input().await,
            ui::keymap::AppAction::Backspace => {
                if let Some(input) = self.state.input.as_mut() {
                    input.buffer.pop();
                }
            }
            ui::keymap::AppAction::Input(ch) => {
                if let Some(input) = self.state.input.as_mut() {
                    input.buffer.push(ch);
                }
            }
            ui::keymap::AppAction::Quit => self.should_quit = true,
            _ => {}
        }
    }

    async fn handle_normal_key(&mut self, ch: char) {
        match ch.to_ascii_lowercase() {
            'q' => self.should_quit = true,
            'h' => self.state.section = Section::Home,
            't' => self.state.section = Section::Transactions,
            'w' => self.state.section = Section::Accounts,
            'b' => self.state.section = Section::Budgets,
            's' => self.state.section = Section::Analytics,
            'p' => {
                self.state.period = self.state.period.prev();
                self.refresh_all().await;
            }
            'n' => {
                self.state.period = self.state.period.next();
                self.refresh_all().await;
            }
            'c' => {
                self.state.period = MonthPeriod::current(self.state.timezone);
                self.refresh_all().await;
            }
            'r' => {
                self.refresh_all().await;
                self.toast(ToastLevel::Info, "Refreshed.");
            }
            'j' => self.select_next(),
            'k' => self.select_prev(),
            'i' => {
                if self.state.section == Section::Analytics {
                    self.state.analytics.kind = match self.state.analytics.kind {
                        TransactionKind::Expense => TransactionKind::Income,
                        TransactionKind::Income => TransactionKind::Expense,
                    };
                    self.refresh_analytics().await;
                }
            }
            'a' => self.open_add_input(),
            'e' => self.open_edit_input(),
            'd' => self.delete_selected().await,
            _ => {}
        }
    }

    fn select_next(&mut self) {
        match self.state.section {
            Section::Transactions => self.state.transactions.select_next(),
            Section::Budgets => self.state.budgets.select_next(),
            _ => {}
        }
    }

    fn select_prev(&mut self) {
        match self.state.section {
            Section::Transactions => self.state.transactions.select_prev(),
            Section::Budgets => self.state.budgets.select_prev(),
            _ => {}
        }
    }

    fn open_add_input(&mut self) {
        let input = match self.state.section {
            Section::Home | Section::Transactions => InputState::new(
                InputTarget::QuickAdd,
                "add: [+|-]amount [#category] [@account] [note]",
            ),
            Section::Budgets => {
                InputState::new(InputTarget::NewBudget, "new budget: category amount")
            }
            Section::Accounts => InputState::new(
                InputTarget::NewAccount,
                "new account: group/name [opening balance]",
            ),
            Section::Analytics => return,
        };
        self.state.input = Some(input);
    }

    fn open_edit_input(&mut self) {
        if self.state.section != Section::Budgets {
            return;
        }
        let Some(line) = self.state.budgets.selected_line() else {
            return;
        };
        self.state.input = Some(InputState::new(
            InputTarget::EditBudgetEntry {
                budget_id: line.budget_id,
            },
            "set this month's budget: amount",
        ));
    }

    async fn delete_selected(&mut self) {
        match self.state.section {
            Section::Transactions => {
                let Some(id) = self.state.transactions.selected_item().map(|item| item.id) else {
                    return;
                };
                match self.engine.delete_transaction(id).await {
                    Ok(()) => self.toast(ToastLevel::Success, "Transaction deleted."),
                    Err(err) => self.engine_error("delete transaction", &err),
                }
                self.refresh_all().await;
            }
            Section::Budgets => {
                let Some(id) = self.state.budgets.selected_line().map(|line| line.budget_id)
                else {
                    return;
                };
                match self.engine.delete_budget(id).await {
                    Ok(()) => self.toast(ToastLevel::Success, "Budget deleted."),
                    Err(err) => self.engine_error("delete budget", &err),
                }
                self.refresh_all().await;
            }
            _ => {}
        }
    }

    async fn submit_input(&mut self) {
        let Some(input) = self.state.input.take() else {
            return;
        };

        let outcome = match input.target {
            InputTarget::QuickAdd => self.submit_quick_add(&input.buffer).await,
            InputTarget::NewBudget => self.submit_new_budget(&input.buffer).await,
            InputTarget::EditBudgetEntry { budget_id } => {
                self.submit_budget_entry(budget_id, &input.buffer).await
            }
            InputTarget::NewAccount => self.submit_new_account(&input.buffer).await,
        };

        match outcome {
            Ok(message) => {
                self.toast(ToastLevel::Success, &message);
                self.refresh_all().await;
            }
            Err(SubmitError::Validation(message)) => {
                // Keep the dialog open so the line can be fixed in place.
                let mut input = input;
                input.error = Some(message);
                self.state.input = Some(input);
            }
            Err(SubmitError::Engine(err)) => {
                self.engine_error("write", &err);
                self.refresh_all().await;
            }
        }
    }

    async fn submit_quick_add(&mut self, buffer: &str) -> SubmitResult {
        let parsed = quick_add::parse(buffer, self.state.currency)
            .map_err(SubmitError::Validation)?;

        let account_id = self.pick_account(parsed.account.as_deref())?;
        let category_name = parsed.category.as_deref().unwrap_or("Uncategorized");
        let category_id = self.engine.resolve_category(category_name).await?;

        self.engine
            .add_transaction(NewTransaction {
                kind: parsed.kind,
                amount_minor: parsed.amount_minor,
                note: parsed.note.clone(),
                occurred_at: Utc::now(),
                category_id,
                account_id,
            })
            .await?;

        // Remember the account for the next tag-less quick add.
        if self.local_state.default_account_id != Some(account_id) {
            self.local_state.default_account_id = Some(account_id);
            if let Err(err) = self.local_state.save(local_state::default_state_path()) {
                tracing::warn!("failed to save local state: {err}");
            }
        }

        let signed = parsed.kind.sign() * parsed.amount_minor;
        Ok(format!(
            "Recorded {} on {category_name}.",
            Money::new(signed).format(self.state.currency)
        ))
    }

    async fn submit_new_budget(&mut self, buffer: &str) -> SubmitResult {
        let trimmed = buffer.trim();
        let Some((name, amount_raw)) = trimmed.rsplit_once(' ') else {
            return Err(SubmitError::Validation(
                "Use: category amount (e.g. Groceries 300).".to_string(),
            ));
        };

        let amount = Money::parse_major(amount_raw.trim(), self.state.currency)
            .map_err(|_| SubmitError::Validation("Invalid amount.".to_string()))?;
        if amount.is_negative() {
            return Err(SubmitError::Validation(
                "Budget amount must be >= 0.".to_string(),
            ));
        }

        let category_id = self.engine.resolve_category(name).await?;
        self.engine
            .new_budget(category_id, self.state.period.year(), amount.minor())
            .await?;

        Ok(format!(
            "Budget for {} seeded at {} per month.",
            name.trim(),
            amount.format(self.state.currency)
        ))
    }

    async fn submit_budget_entry(&mut self, budget_id: Uuid, buffer: &str) -> SubmitResult {
        let amount = Money::parse_major(buffer.trim(), self.state.currency)
            .map_err(|_| SubmitError::Validation("Invalid amount.".to_string()))?;
        if amount.is_negative() {
            return Err(SubmitError::Validation(
                "Budget amount must be >= 0.".to_string(),
            ));
        }

        self.engine
            .set_budget_entry(
                budget_id,
                self.state.period.year(),
                self.state.period.month(),
                amount.minor(),
            )
            .await?;

        Ok(format!(
            "{} budget set to {}.",
            self.state.period.label(),
            amount.format(self.state.currency)
        ))
    }

    async fn submit_new_account(&mut self, buffer: &str) -> SubmitResult {
        let trimmed = buffer.trim();
        let (spec, opening_raw) = match trimmed.split_once(' ') {
            Some((spec, rest)) => (spec, Some(rest.trim())),
            None => (trimmed, None),
        };

        let Some((group_name, account_name)) = spec.split_once('/') else {
            return Err(SubmitError::Validation(
                "Use: group/name [opening balance] (e.g. Banks/Checking 250).".to_string(),
            ));
        };
        if group_name.trim().is_empty() || account_name.trim().is_empty() {
            return Err(SubmitError::Validation(
                "Both group and account name are required.".to_string(),
            ));
        }

        let opening = match opening_raw {
            Some(raw) if !raw.is_empty() => Money::parse_major(raw, self.state.currency)
                .map_err(|_| SubmitError::Validation("Invalid opening balance.".to_string()))?,
            _ => Money::ZERO,
        };

        let group_id = match self
            .state
            .accounts
            .iter()
            .find(|account| account.group_name.eq_ignore_ascii_case(group_name.trim()))
        {
            Some(account) => account.group_id,
            None => {
                match self
                    .engine
                    .account_groups()
                    .await?
                    .into_iter()
                    .find(|group| group.name.eq_ignore_ascii_case(group_name.trim()))
                {
                    Some(group) => group.id,
                    None => self.engine.new_account_group(group_name).await?,
                }
            }
        };

        self.engine
            .new_account(group_id, account_name, opening.minor())
            .await?;

        Ok(format!(
            "Account {}/{} opened at {}.",
            group_name.trim(),
            account_name.trim(),
            opening.format(self.state.currency)
        ))
    }

    /// Picks the account a quick add posts to: the `@tag`, the remembered
    /// default, or the only account there is.
    fn pick_account(&self, tag: Option<&str>) -> std::result::Result<Uuid, SubmitError> {
        if let Some(tag) = tag {
            return self
                .state
                .accounts
                .iter()
                .find(|account| account.name.eq_ignore_ascii_case(tag))
                .map(|account| account.id)
                .ok_or_else(|| SubmitError::Validation(format!("No account named '{tag}'.")));
        }

        if let Some(default_id) = self.local_state.default_account_id
            && self.state.accounts.iter().any(|a| a.id == default_id)
        {
            return Ok(default_id);
        }

        match self.state.accounts.as_slice() {
            [] => Err(SubmitError::Validation(
                "Create an account first (w, then a).".to_string(),
            )),
            [only] => Ok(only.id),
            _ => Err(SubmitError::Validation(
                "More than one account: add @account.".to_string(),
            )),
        }
    }

    async fn refresh_all(&mut self) {
        let period = self.state.period;

        match self.engine.monthly_summary(period).await {
            Ok(summary) => self.state.summary = summary,
            Err(err) => self.engine_error("load summary", &err),
        }

        match self.engine.accounts().await {
            Ok(accounts) => self.state.accounts = accounts,
            Err(err) => self.engine_error("load accounts", &err),
        }

        match self.engine.transactions(period).await {
            Ok(items) => {
                let len = items.len();
                self.state.transactions.items = items;
                if len == 0 {
                    self.state.transactions.selected = 0;
                } else {
                    self.state.transactions.selected =
                        self.state.transactions.selected.min(len - 1);
                }
            }
            Err(err) => self.engine_error("load transactions", &err),
        }

        match self.engine.budget_overview(period).await {
            Ok(overview) => {
                let len = overview.lines.len();
                self.state.budgets.overview = overview;
                if len == 0 {
                    self.state.budgets.selected = 0;
                } else {
                    self.state.budgets.selected = self.state.budgets.selected.min(len - 1);
                }
            }
            Err(err) => self.engine_error("load budgets", &err),
        }

        self.refresh_analytics().await;
    }

    async fn refresh_analytics(&mut self) {
        let period = self.state.period;
        let kind = self.state.analytics.kind;

        match self.engine.analytics(period, kind).await {
            Ok(shares) => self.state.analytics.shares = shares,
            Err(err) => self.engine_error("load analytics", &err),
        }

        match self.engine.monthly_trend(period, TREND_MONTHS).await {
            Ok(trend) => self.state.analytics.trend = trend,
            Err(err) => self.engine_error("load trend", &err),
        }
    }

    fn engine_error(&mut self, action: &str, err: &engine::EngineError) {
        tracing::error!("failed to {action}: {err}");
        self.toast(ToastLevel::Error, &err.to_string());
    }

    fn toast(&mut self, level: ToastLevel, message: &str) {
        self.state.toast = Some(ToastState {
            message: message.to_string(),
            level,
            expires_at: Instant::now() + TOAST_TTL,
        });
    }

    fn expire_toast(&mut self) {
        if let Some(toast) = &self.state.toast
            && toast.expires_at <= Instant::now()
        {
            self.state.toast = None;
        }
    }
}

enum SubmitError {
    Validation(String),
    Engine(engine::EngineError),
}

impl From<engine::EngineError> for SubmitError {
    fn from(err: engine::EngineError) -> Self {
        Self::Engine(err)
    }
}

type SubmitResult = std::result::Result<String, SubmitError>;

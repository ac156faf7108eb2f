//! Application state for the terminal dashboard.
//!
//! Everything here runs on the UI loop. Network calls are spawned as tasks that report back
//! through a [`TaskResult`] channel; the chart feed's tickets decide whether a late answer
//! still applies.

use std::{collections::VecDeque, future::Future, time::Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;
use tracing::{debug, info};
use tradely_data::{
    AlertEvent, ApiClient, ChartFeed, DataError, HubReader, HubState, SeriesType, Symbol,
    chart::{AnalysisState, AnalysisTicket, FeedState, LoadOutcome, LoadTicket},
    model::{Bar, NewsItem, PerformanceSummary, Transaction, ValuePoint},
    rest::{Ack, AlertCondition},
    view::{FlashTracker, JsonFilePinStore, Pins, pinned_ticks, sorted_ticks},
};

/// Alerts kept on screen.
const MAX_ALERTS: usize = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Page {
    #[default]
    Watchlist,
    Pinned,
}

/// What the line editor is collecting input for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    Buy,
    Sell,
    PriceAlert,
    Ask,
}

impl Prompt {
    pub fn label(&self) -> &'static str {
        match self {
            Prompt::Buy => "Buy quantity",
            Prompt::Sell => "Sell quantity",
            Prompt::PriceAlert => "Alert (above|below PRICE)",
            Prompt::Ask => "Ask AI",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub prompt: Prompt,
    pub symbol: Option<Symbol>,
    pub buffer: String,
}

/// A read-only REST result shown on screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetch<T> {
    Idle,
    Pending,
    Ready(T),
    Failed(String),
}

impl<T> Fetch<T> {
    fn from_result(result: Result<T, DataError>) -> Self {
        match result {
            Ok(value) => Fetch::Ready(value),
            Err(error) => Fetch::Failed(error.to_string()),
        }
    }
}

/// Everything the report view shows, fetched together.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub summary: PerformanceSummary,
    pub history: Vec<ValuePoint>,
    pub transactions: Vec<Transaction>,
}

/// Result of a background request, applied on the UI loop.
#[derive(Debug)]
pub enum TaskResult {
    History(LoadTicket, Result<Vec<Bar>, DataError>),
    Analysis(AnalysisTicket, Result<String, DataError>),
    Briefing(u64, Result<String, DataError>),
    Answer(u64, Result<String, DataError>),
    News(u64, Symbol, Result<Vec<NewsItem>, DataError>),
    Report(u64, Result<Report, DataError>),
    Submitted(String, Result<Ack, DataError>),
}

#[derive(Debug)]
pub struct App {
    api: ApiClient,
    hub: HubReader,
    task_tx: mpsc::UnboundedSender<TaskResult>,
    pub state: HubState,
    pub flash: FlashTracker,
    pub pins: Pins<JsonFilePinStore>,
    pub chart: ChartFeed,
    pub series_type: SeriesType,
    pub page: Page,
    pub selected: Option<Symbol>,
    pub alerts: VecDeque<AlertEvent>,
    pub briefing: AnalysisState,
    briefing_request: u64,
    pub answer: AnalysisState,
    answer_request: u64,
    /// Symbol the news below belongs to
    pub news_symbol: Option<Symbol>,
    pub news: Fetch<Vec<NewsItem>>,
    news_request: u64,
    /// Report view replaces the price chart while shown
    pub show_report: bool,
    pub report: Fetch<Report>,
    report_request: u64,
    pub input: Option<Input>,
    pub status: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        api: ApiClient,
        hub: HubReader,
        pins: Pins<JsonFilePinStore>,
        flash: FlashTracker,
        task_tx: mpsc::UnboundedSender<TaskResult>,
    ) -> Self {
        let state = hub.snapshot();
        Self {
            api,
            hub,
            task_tx,
            state,
            flash,
            pins,
            chart: ChartFeed::new(),
            series_type: SeriesType::default(),
            page: Page::default(),
            selected: None,
            alerts: VecDeque::new(),
            briefing: AnalysisState::Idle,
            briefing_request: 0,
            answer: AnalysisState::Idle,
            answer_request: 0,
            news_symbol: None,
            news: Fetch::Idle,
            news_request: 0,
            show_report: false,
            report: Fetch::Idle,
            report_request: 0,
            input: None,
            status: None,
            should_quit: false,
        }
    }

    /// Symbols listed on the current page, in display order.
    pub fn rows(&self) -> Vec<Symbol> {
        match self.page {
            Page::Watchlist => sorted_ticks(&self.state.live)
                .into_iter()
                .map(|tick| tick.symbol.clone())
                .collect(),
            Page::Pinned => pinned_ticks(self.pins.set(), &self.state.live)
                .into_iter()
                .map(|(symbol, _)| symbol.clone())
                .collect(),
        }
    }

    pub fn selected_index(&self, rows: &[Symbol]) -> Option<usize> {
        let selected = self.selected.as_ref()?;
        rows.iter().position(|symbol| symbol == selected)
    }

    /// Pull whatever the hub published since the last frame.
    pub fn poll_hub(&mut self, now: Instant) {
        if let Some(state) = self.hub.snapshot_if_changed() {
            self.on_state(state, now);
        }
        while let Some(alert) = self.hub.try_next_alert() {
            self.on_alert(alert);
        }
        self.flash.prune(now);
    }

    pub fn on_state(&mut self, state: HubState, now: Instant) {
        self.flash.observe(&state.live, now);
        self.chart.apply_snapshot(&state.live);
        self.state = state;

        let rows = self.rows();
        if self.selected_index(&rows).is_none() {
            if let Some(first) = rows.first() {
                self.selected = Some(first.clone());
                self.load_selected();
            }
        }
    }

    pub fn on_alert(&mut self, alert: AlertEvent) {
        info!(severity = %alert.severity, message = %alert.message, "alert");
        self.alerts.push_front(alert);
        self.alerts.truncate(MAX_ALERTS);
    }

    pub fn on_task(&mut self, result: TaskResult) {
        match result {
            TaskResult::History(ticket, result) => match self.chart.complete_load(ticket, result) {
                LoadOutcome::Loaded { bars } => {
                    debug!(bars, "chart loaded");
                    self.chart.apply_snapshot(&self.state.live);
                }
                LoadOutcome::Failed(error) => {
                    self.status = Some(format!("Chart load failed: {error}"));
                }
                LoadOutcome::Stale => {}
            },
            TaskResult::Analysis(ticket, result) => {
                self.chart.complete_analysis(ticket, result);
            }
            TaskResult::Briefing(request, result) => {
                if request == self.briefing_request {
                    self.briefing = text_state(result);
                }
            }
            TaskResult::Answer(request, result) => {
                if request == self.answer_request {
                    self.answer = text_state(result);
                }
            }
            TaskResult::News(request, symbol, result) => {
                if request == self.news_request {
                    debug!(%symbol, ok = result.is_ok(), "news loaded");
                    self.news_symbol = Some(symbol);
                    self.news = Fetch::from_result(result);
                }
            }
            TaskResult::Report(request, result) => {
                if request == self.report_request {
                    self.report = Fetch::from_result(result);
                }
            }
            TaskResult::Submitted(action, result) => {
                self.status = Some(match result.and_then(Ack::into_result) {
                    Ok(message) => message,
                    Err(error) => format!("{action} failed: {error}"),
                });
            }
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.input.is_some() {
            self.on_input_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Tab => {
                self.page = match self.page {
                    Page::Watchlist => Page::Pinned,
                    Page::Pinned => Page::Watchlist,
                };
                self.selected = self.rows().first().cloned();
                self.load_selected();
            }
            KeyCode::Enter => self.load_selected(),
            KeyCode::Char('t') => {
                self.series_type = self.series_type.toggled();
                self.load_selected();
            }
            KeyCode::Char('p') => self.toggle_pin(),
            KeyCode::Char('a') => self.request_analysis(),
            KeyCode::Char('r') => self.request_briefing(),
            KeyCode::Char('n') => self.request_news(),
            KeyCode::Char('v') => self.toggle_report(),
            KeyCode::Char('b') => self.open_prompt(Prompt::Buy),
            KeyCode::Char('s') => self.open_prompt(Prompt::Sell),
            KeyCode::Char('l') => self.open_prompt(Prompt::PriceAlert),
            KeyCode::Char('?') => self.open_prompt(Prompt::Ask),
            _ => {}
        }
    }

    fn on_input_key(&mut self, key: KeyEvent) {
        let Some(input) = self.input.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.input = None,
            KeyCode::Enter => self.submit_input(),
            KeyCode::Backspace => {
                input.buffer.pop();
            }
            KeyCode::Char(c) => input.buffer.push(c),
            _ => {}
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let rows = self.rows();
        if rows.is_empty() {
            return;
        }
        let next = match self.selected_index(&rows) {
            Some(index) => index.saturating_add_signed(delta).min(rows.len() - 1),
            None => 0,
        };
        self.selected = Some(rows[next].clone());
        self.load_selected();
    }

    /// Point the chart at the selected symbol and series type, unless it already is.
    fn load_selected(&mut self) {
        let Some(symbol) = self.selected.clone() else {
            return;
        };
        let current = matches!(
            self.chart.state(),
            FeedState::Loading { .. } | FeedState::Loaded(_)
        ) && self.chart.symbol() == Some(&symbol)
            && self.chart.series_type() == Some(self.series_type);
        if current {
            return;
        }

        let ticket = self.chart.begin_load(symbol, self.series_type);
        let api = self.api.clone();
        self.spawn(async move {
            let result = api.historical(&ticket.symbol).await;
            TaskResult::History(ticket, result)
        });
    }

    fn toggle_pin(&mut self) {
        let Some(symbol) = self.selected.clone() else {
            return;
        };
        let pinned = self.pins.toggle(&symbol);
        self.status = Some(if pinned {
            format!("Pinned {symbol}")
        } else {
            format!("Unpinned {symbol}")
        });
    }

    fn request_analysis(&mut self) {
        let Some(ticket) = self.chart.begin_analysis() else {
            self.status = Some("Load a chart before requesting analysis".to_string());
            return;
        };
        let api = self.api.clone();
        self.spawn(async move {
            let result = api.chart_analysis(ticket.symbol(), ticket.bars()).await;
            TaskResult::Analysis(ticket, result)
        });
    }

    fn request_briefing(&mut self) {
        self.briefing_request += 1;
        self.briefing = AnalysisState::Pending;
        let request = self.briefing_request;
        let api = self.api.clone();
        self.spawn(async move { TaskResult::Briefing(request, api.portfolio_briefing().await) });
    }

    fn request_news(&mut self) {
        let Some(symbol) = self.selected.clone() else {
            self.status = Some("Select a symbol first".to_string());
            return;
        };
        self.news_request += 1;
        self.news_symbol = Some(symbol.clone());
        self.news = Fetch::Pending;
        let request = self.news_request;
        let api = self.api.clone();
        self.spawn(async move {
            let result = api.news(&symbol).await;
            TaskResult::News(request, symbol, result)
        });
    }

    /// Show the report view, refreshing it, or hide it again.
    fn toggle_report(&mut self) {
        self.show_report = !self.show_report;
        if !self.show_report {
            return;
        }

        self.report_request += 1;
        self.report = Fetch::Pending;
        let request = self.report_request;
        let api = self.api.clone();
        self.spawn(async move {
            let result = tokio::try_join!(
                api.performance_summary(),
                api.portfolio_history(),
                api.transactions()
            )
            .map(|(summary, history, transactions)| Report {
                summary,
                history,
                transactions,
            });
            TaskResult::Report(request, result)
        });
    }

    fn open_prompt(&mut self, prompt: Prompt) {
        let symbol = self.selected.clone();
        if prompt != Prompt::Ask && symbol.is_none() {
            self.status = Some("Select a symbol first".to_string());
            return;
        }
        self.input = Some(Input {
            prompt,
            symbol,
            buffer: String::new(),
        });
    }

    fn submit_input(&mut self) {
        let Some(input) = self.input.take() else {
            return;
        };
        let api = self.api.clone();
        let symbol = input.symbol.unwrap_or_default();

        match input.prompt {
            Prompt::Buy | Prompt::Sell => {
                let Ok(quantity) = input.buffer.trim().parse::<u32>() else {
                    self.status = Some(format!("Invalid quantity: {:?}", input.buffer));
                    return;
                };
                let buy = input.prompt == Prompt::Buy;
                let action = format!("{} {quantity} {symbol}", if buy { "Buy" } else { "Sell" });
                self.spawn(async move {
                    let result = if buy {
                        api.buy(&symbol, quantity).await
                    } else {
                        api.sell(&symbol, quantity).await
                    };
                    TaskResult::Submitted(action, result)
                });
            }
            Prompt::PriceAlert => {
                let (condition, target_price) = match parse_price_alert(&input.buffer) {
                    Ok(parsed) => parsed,
                    Err(error) => {
                        self.status = Some(error.to_string());
                        return;
                    }
                };
                let action = format!("Alert {symbol} {condition} {target_price}");
                self.spawn(async move {
                    let result = api.set_price_alert(&symbol, target_price, condition).await;
                    TaskResult::Submitted(action, result)
                });
            }
            Prompt::Ask => {
                let query = input.buffer.trim().to_string();
                if query.is_empty() {
                    return;
                }
                self.answer_request += 1;
                self.answer = AnalysisState::Pending;
                let request = self.answer_request;
                self.spawn(async move { TaskResult::Answer(request, api.ask(&query).await) });
            }
        }
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = TaskResult> + Send + 'static,
    {
        let task_tx = self.task_tx.clone();
        tokio::spawn(async move {
            // The UI loop may already be gone on shutdown
            let _ = task_tx.send(task.await);
        });
    }
}

fn text_state(result: Result<String, DataError>) -> AnalysisState {
    match result {
        Ok(text) => AnalysisState::Ready(text),
        Err(error) => AnalysisState::Failed(error.to_string()),
    }
}

/// Parse `above 200`, `below 180.5`, `> 200` or `< 180.5`.
pub fn parse_price_alert(raw: &str) -> Result<(AlertCondition, f64), DataError> {
    let raw = raw.trim();
    let (condition, price) = if let Some(rest) = raw.strip_prefix('>') {
        (AlertCondition::Above, rest)
    } else if let Some(rest) = raw.strip_prefix('<') {
        (AlertCondition::Below, rest)
    } else {
        let (word, rest) = raw.split_once(char::is_whitespace).unwrap_or((raw, ""));
        let condition = match word.to_ascii_lowercase().as_str() {
            "above" => AlertCondition::Above,
            "below" => AlertCondition::Below,
            _ => {
                return Err(DataError::Validation(format!(
                    "expected 'above PRICE' or 'below PRICE', got {raw:?}"
                )));
            }
        };
        (condition, rest)
    };

    let price = price
        .trim()
        .parse::<f64>()
        .map_err(|_| DataError::Validation(format!("invalid price: {:?}", price.trim())))?;
    if !price.is_finite() || price <= 0.0 {
        return Err(DataError::Validation(format!(
            "target price must be positive, got {price}"
        )));
    }
    Ok((condition, price))
}

//! Rendering. Every function here is a pure projection of [`App`] onto the frame.

use std::time::Instant;

use chrono::{DateTime, Utc};
use ratatui::{
    Frame,
    layout::{Constraint, Direction as LayoutDirection, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Cell, Chart, Dataset, GraphType, List, ListItem, Paragraph, Row,
        Sparkline, Table, Wrap,
    },
};
use tradely_data::{
    ConnectionStatus, Severity, Tick,
    chart::{AnalysisState, ChartSeries, FeedState, PriceTrace},
    model::{Sentiment, TradeAction},
    view::{Direction, Mover, pinned_ticks, sorted_ticks, top_movers},
};

use crate::app::{App, Fetch, Page, Report};

mod candles;

use candles::CandleChart;

// ============================================================================
// COLORS
// ============================================================================
pub const C_UP: Color = Color::Rgb(100, 220, 100);
pub const C_DOWN: Color = Color::Rgb(220, 100, 100);
const C_NEUTRAL: Color = Color::Rgb(180, 180, 100);
const C_DIM: Color = Color::Rgb(120, 120, 120);
const C_BRIGHT: Color = Color::Rgb(220, 220, 220);
const C_ACCENT: Color = Color::Rgb(100, 180, 220);
const C_HEADER: Color = Color::Rgb(180, 130, 220);
const C_FLASH_UP: Color = Color::Rgb(20, 70, 20);
const C_FLASH_DOWN: Color = Color::Rgb(80, 20, 20);

pub fn render_ui(f: &mut Frame, app: &App, now: Instant) {
    let chunks = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    let body = Layout::default()
        .direction(LayoutDirection::Horizontal)
        .constraints([Constraint::Length(36), Constraint::Min(0)])
        .split(chunks[1]);

    let right = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([
            Constraint::Percentage(50),
            Constraint::Length(5),
            Constraint::Min(0),
        ])
        .split(body[1]);

    let bottom = Layout::default()
        .direction(LayoutDirection::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(right[2]);

    let side = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Percentage(30),
            Constraint::Percentage(25),
        ])
        .split(bottom[1]);

    render_header(f, app, chunks[0]);
    render_watchlist(f, app, body[0], now);
    if app.show_report {
        render_report(f, app, right[0]);
    } else {
        render_price(f, app, right[0]);
    }
    render_volume(f, app, right[1]);
    render_portfolio(f, app, bottom[0]);
    render_insights(f, app, side[0]);
    render_news(f, app, side[1]);
    render_alerts(f, app, side[2]);
    render_footer(f, app, chunks[2]);
}

fn status_span(label: &str, status: ConnectionStatus) -> Span<'static> {
    let (text, color) = match status {
        ConnectionStatus::Connected => ("● LIVE", C_UP),
        ConnectionStatus::Reconnecting => ("◐ RECONNECTING", C_NEUTRAL),
        ConnectionStatus::Disconnected => ("○ OFFLINE", C_DOWN),
    };
    Span::styled(format!("{label} {text}  "), Style::default().fg(color))
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let page = match app.page {
        Page::Watchlist => "WATCHLIST",
        Page::Pinned => "PINNED",
    };
    let line = Line::from(vec![
        Span::styled(
            " TRADELY ",
            Style::default().fg(C_HEADER).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        status_span("market", app.state.market_status),
        status_span("alerts", app.state.alerts_status),
        Span::styled(format!("[{page}]  "), Style::default().fg(C_ACCENT)),
        Span::styled(
            Utc::now().format("%H:%M:%S UTC").to_string(),
            Style::default().fg(C_DIM),
        ),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn change_color(tick: &Tick) -> Color {
    match tick.change.or(tick.change_percent) {
        Some(change) if change > 0.0 => C_UP,
        Some(change) if change < 0.0 => C_DOWN,
        _ => C_BRIGHT,
    }
}

fn watchlist_row<'a>(app: &App, symbol: &str, tick: Option<&Tick>, now: Instant) -> Row<'a> {
    let pin = if app.pins.is_pinned(symbol) { "★" } else { " " };
    let selected = app.selected.as_deref() == Some(symbol);

    let mut style = Style::default();
    match app.flash.active(symbol, now) {
        Some(Direction::Up) => style = style.bg(C_FLASH_UP),
        Some(Direction::Down) => style = style.bg(C_FLASH_DOWN),
        _ => {}
    }
    if selected {
        style = style.add_modifier(Modifier::REVERSED);
    }

    let cells = match tick {
        Some(tick) => vec![
            Cell::from(format!("{pin}{symbol}")).style(Style::default().fg(C_BRIGHT)),
            Cell::from(format!("{:>10.2}", tick.price)),
            Cell::from(
                tick.change_percent
                    .map(|change| format!("{change:>+7.2}%"))
                    .unwrap_or_else(|| "      -".to_string()),
            )
            .style(Style::default().fg(change_color(tick))),
        ],
        None => vec![
            Cell::from(format!("{pin}{symbol}")).style(Style::default().fg(C_DIM)),
            Cell::from(format!("{:>10}", "-")),
            Cell::from(""),
        ],
    };
    Row::new(cells).style(style)
}

fn render_watchlist(f: &mut Frame, app: &App, area: Rect, now: Instant) {
    let (title, rows) = match app.page {
        Page::Watchlist => (
            " WATCHLIST ",
            sorted_ticks(&app.state.live)
                .into_iter()
                .map(|tick| watchlist_row(app, &tick.symbol, Some(tick), now))
                .collect::<Vec<_>>(),
        ),
        Page::Pinned => (
            " PINNED ",
            pinned_ticks(app.pins.set(), &app.state.live)
                .into_iter()
                .map(|(symbol, tick)| watchlist_row(app, symbol, tick, now))
                .collect::<Vec<_>>(),
        ),
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(C_DIM));

    if rows.is_empty() {
        let hint = match app.page {
            Page::Watchlist => "Waiting for market data...",
            Page::Pinned => "No pinned symbols. Press p on a row to pin it.",
        };
        f.render_widget(
            Paragraph::new(hint)
                .style(Style::default().fg(C_DIM))
                .wrap(Wrap { trim: true })
                .block(block),
            area,
        );
        return;
    }

    let header = Row::new(vec!["Symbol", "     Price", " Change"])
        .style(Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD));
    let table = Table::new(
        rows,
        [
            Constraint::Length(9),
            Constraint::Length(11),
            Constraint::Length(9),
        ],
    )
    .header(header)
    .block(block);
    f.render_widget(table, area);
}

fn format_time(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%m-%d %H:%M").to_string()
}

fn render_price(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).border_style(Style::default().fg(C_DIM));

    let series = match app.chart.state() {
        FeedState::Loaded(series) if !series.is_empty() => series,
        state => {
            let (title, text, color) = match state {
                FeedState::Empty => (" CHART ".to_string(), "Select a symbol".to_string(), C_DIM),
                FeedState::Loading { symbol, .. } => (
                    format!(" {symbol} "),
                    format!("Loading {symbol} history..."),
                    C_NEUTRAL,
                ),
                FeedState::Failed { symbol, error, .. } => {
                    let hint = if error.is_transient() { " Press Enter to retry." } else { "" };
                    (
                        format!(" {symbol} "),
                        format!("Failed to load history: {error}.{hint}"),
                        C_DOWN,
                    )
                }
                FeedState::Loaded(series) => (
                    format!(" {} ", series.symbol()),
                    "No history available".to_string(),
                    C_DIM,
                ),
            };
            f.render_widget(
                Paragraph::new(text)
                    .style(Style::default().fg(color))
                    .wrap(Wrap { trim: true })
                    .block(block.title(title)),
                area,
            );
            return;
        }
    };

    let title = format!(
        " {} · {} · {} bars ",
        series.symbol(),
        series.series_type(),
        series.len()
    );
    let block = block.title(Span::styled(
        title,
        Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
    ));

    match series.price() {
        PriceTrace::Candlestick {
            open,
            high,
            low,
            close,
            ..
        } => {
            let inner = block.inner(area);
            f.render_widget(block, area);

            let start = CandleChart::visible_start(close.len(), inner.width);
            let y_min = low[start..].iter().copied().fold(f64::MAX, f64::min);
            let y_max = high[start..].iter().copied().fold(f64::MIN, f64::max);
            let pad = (y_max - y_min).max(1e-3) * 0.05;

            f.render_widget(
                CandleChart::new(open, high, low, close).bounds(y_min - pad, y_max + pad),
                inner,
            );
        }
        PriceTrace::Line { y, .. } => {
            let points = y
                .iter()
                .enumerate()
                .map(|(index, price)| (index as f64, *price))
                .collect::<Vec<_>>();
            let (y_min, y_max) = series.price().bounds().unwrap_or((0.0, 1.0));
            let pad = (y_max - y_min).max(1e-3) * 0.05;

            let dataset = Dataset::default()
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(C_ACCENT))
                .data(&points);

            let chart = Chart::new(vec![dataset])
                .block(block)
                .x_axis(
                    Axis::default()
                        .style(Style::default().fg(C_DIM))
                        .bounds([0.0, (points.len().max(2) - 1) as f64])
                        .labels(time_labels(series)),
                )
                .y_axis(
                    Axis::default()
                        .style(Style::default().fg(C_DIM))
                        .bounds([y_min - pad, y_max + pad])
                        .labels([format!("{y_min:.2}"), format!("{y_max:.2}")]),
                );
            f.render_widget(chart, area);
        }
    }
}

fn time_labels(series: &ChartSeries) -> Vec<String> {
    let x = series.price().x();
    match (x.first(), x.last()) {
        (Some(first), Some(last)) => vec![format_time(*first), format_time(*last)],
        _ => vec![],
    }
}

fn pnl_color(pnl: f64) -> Color {
    if pnl > 0.0 {
        C_UP
    } else if pnl < 0.0 {
        C_DOWN
    } else {
        C_BRIGHT
    }
}

fn render_report(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" REPORT ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(C_DIM));

    let report = match &app.report {
        Fetch::Ready(report) => report,
        state => {
            let (text, color) = match state {
                Fetch::Failed(message) => (format!("Failed to load report: {message}"), C_DOWN),
                _ => ("Loading report...".to_string(), C_NEUTRAL),
            };
            f.render_widget(
                Paragraph::new(text)
                    .style(Style::default().fg(color))
                    .wrap(Wrap { trim: true })
                    .block(block),
                area,
            );
            return;
        }
    };

    let inner = block.inner(area);
    f.render_widget(block, area);
    let chunks = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Percentage(55),
            Constraint::Min(0),
        ])
        .split(inner);

    render_report_summary(f, report, chunks[0]);
    render_value_history(f, report, chunks[1]);
    render_transactions(f, report, chunks[2]);
}

fn render_report_summary(f: &mut Frame, report: &Report, area: Rect) {
    let summary = &report.summary;
    let line = Line::from(vec![
        Span::styled(
            format!(" Invested ${:.2}  ", summary.total_invested_capital),
            Style::default().fg(C_BRIGHT),
        ),
        Span::styled(
            format!("Value ${:.2}  ", summary.current_market_value),
            Style::default().fg(C_BRIGHT),
        ),
        Span::styled(
            format!("P&L {:+.2}  ", summary.total_pnl),
            Style::default().fg(pnl_color(summary.total_pnl)),
        ),
        Span::styled(
            format!("Today {:+.2}", summary.pnl_today),
            Style::default().fg(pnl_color(summary.pnl_today)),
        ),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_value_history(f: &mut Frame, report: &Report, area: Rect) {
    let points = report
        .history
        .iter()
        .enumerate()
        .map(|(index, point)| (index as f64, point.value))
        .collect::<Vec<_>>();
    if points.is_empty() {
        f.render_widget(
            Paragraph::new(" No portfolio history yet").style(Style::default().fg(C_DIM)),
            area,
        );
        return;
    }

    let (y_min, y_max) = points
        .iter()
        .fold((f64::MAX, f64::MIN), |(min, max), (_, value)| {
            (min.min(*value), max.max(*value))
        });
    let pad = (y_max - y_min).max(1e-3) * 0.05;
    let labels = match (report.history.first(), report.history.last()) {
        (Some(first), Some(last)) => vec![format_time(first.timestamp), format_time(last.timestamp)],
        _ => vec![],
    };

    let dataset = Dataset::default()
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(C_ACCENT))
        .data(&points);
    let chart = Chart::new(vec![dataset])
        .x_axis(
            Axis::default()
                .style(Style::default().fg(C_DIM))
                .bounds([0.0, (points.len().max(2) - 1) as f64])
                .labels(labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(C_DIM))
                .bounds([y_min - pad, y_max + pad])
                .labels([format!("{y_min:.0}"), format!("{y_max:.0}")]),
        );
    f.render_widget(chart, area);
}

fn render_transactions(f: &mut Frame, report: &Report, area: Rect) {
    let rows = report
        .transactions
        .iter()
        .map(|transaction| {
            let color = match transaction.action {
                TradeAction::Buy => C_UP,
                TradeAction::Sell => C_DOWN,
            };
            Row::new(vec![
                Cell::from(format_time(transaction.timestamp)),
                Cell::from(transaction.action.to_string()).style(Style::default().fg(color)),
                Cell::from(transaction.symbol.to_string()),
                Cell::from(format!("{:>8.0}", transaction.quantity)),
                Cell::from(format!("{:>9.2}", transaction.price)),
                Cell::from(format!("{:>11.2}", transaction.total_value)),
            ])
        })
        .collect::<Vec<_>>();

    let header = Row::new(vec!["Time", "Side", "Symbol", "     Qty", "    Price", "      Total"])
        .style(Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD));
    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Length(5),
            Constraint::Length(7),
            Constraint::Length(8),
            Constraint::Length(9),
            Constraint::Length(11),
        ],
    )
    .header(header)
    .block(Block::default().title(" TRANSACTIONS ").borders(Borders::TOP));
    f.render_widget(table, area);
}

fn render_volume(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" VOLUME ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(C_DIM));

    let Some(series) = app.chart.series() else {
        f.render_widget(block, area);
        return;
    };

    let width = block.inner(area).width as usize;
    let volume = &series.volume().y;
    let data = volume[volume.len().saturating_sub(width)..]
        .iter()
        .copied()
        .map(|volume| volume.max(0.0).round() as u64)
        .collect::<Vec<_>>();

    let sparkline = Sparkline::default()
        .block(block)
        .data(&data)
        .style(Style::default().fg(Color::Rgb(100, 149, 237)))
        .max(data.iter().max().copied().unwrap_or(1).max(1));
    f.render_widget(sparkline, area);
}

fn render_portfolio(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(C_DIM));

    let Some(portfolio) = app.state.portfolio.as_deref() else {
        f.render_widget(
            Paragraph::new("Waiting for portfolio...")
                .style(Style::default().fg(C_DIM))
                .block(block.title(" PORTFOLIO ")),
            area,
        );
        return;
    };

    let chunks = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(8)])
        .split(area);
    let area = chunks[0];

    let title = format!(
        " PORTFOLIO  total ${:.2}  cash ${:.2} ",
        portfolio.total_value, portfolio.cash
    );

    let rows = portfolio
        .holdings_by_value()
        .into_iter()
        .map(|(symbol, holding)| {
            let pnl = holding.unrealized_pnl();
            Row::new(vec![
                Cell::from(symbol.to_string()),
                Cell::from(format!("{:>8.0}", holding.shares)),
                Cell::from(format!("{:>9.2}", holding.avg_price)),
                Cell::from(format!("{:>9.2}", holding.market_price)),
                Cell::from(format!("{:>11.2}", holding.market_value())),
                Cell::from(format!("{pnl:>+10.2}")).style(Style::default().fg(pnl_color(pnl))),
            ])
        })
        .collect::<Vec<_>>();

    let header = Row::new(vec!["Symbol", "  Shares", "      Avg", "     Last", "      Value", "       P&L"])
        .style(Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD));

    let table = Table::new(
        rows,
        [
            Constraint::Length(7),
            Constraint::Length(8),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(11),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(block.title(title));
    f.render_widget(table, area);

    render_movers(f, app, chunks[1]);
}

fn mover_cell<'a>(mover: Option<&Mover>) -> Cell<'a> {
    match mover {
        Some(mover) => Cell::from(format!(
            "{:<6} {:+.2} ({:+.2}%)",
            mover.symbol, mover.pnl, mover.pnl_percent
        ))
        .style(Style::default().fg(pnl_color(mover.pnl))),
        None => Cell::from(""),
    }
}

fn render_movers(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" TODAY'S MOVERS ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(C_DIM));

    let movers = app
        .state
        .portfolio
        .as_deref()
        .map(|portfolio| top_movers(portfolio, &app.state.live))
        .unwrap_or_default();
    if movers.gainers.is_empty() && movers.losers.is_empty() {
        f.render_widget(
            Paragraph::new("No movers today")
                .style(Style::default().fg(C_DIM))
                .block(block),
            area,
        );
        return;
    }

    let rows = (0..movers.gainers.len().max(movers.losers.len()))
        .map(|index| {
            Row::new(vec![
                mover_cell(movers.gainers.get(index)),
                mover_cell(movers.losers.get(index)),
            ])
        })
        .collect::<Vec<_>>();
    let header = Row::new(vec!["Gainers", "Losers"])
        .style(Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD));
    let table = Table::new(rows, [Constraint::Percentage(50), Constraint::Percentage(50)])
        .header(header)
        .block(block);
    f.render_widget(table, area);
}

fn render_news(f: &mut Frame, app: &App, area: Rect) {
    let title = match &app.news_symbol {
        Some(symbol) => format!(" NEWS · {symbol} "),
        None => " NEWS ".to_string(),
    };
    let mut lines = Vec::new();
    match &app.news {
        Fetch::Idle => lines.push(Line::from(Span::styled(
            "Press n for headlines",
            Style::default().fg(C_DIM),
        ))),
        Fetch::Pending => lines.push(Line::from(Span::styled(
            "Working...",
            Style::default().fg(C_NEUTRAL),
        ))),
        Fetch::Failed(message) => lines.push(Line::from(Span::styled(
            format!("Failed: {message}"),
            Style::default().fg(C_DOWN),
        ))),
        Fetch::Ready(items) if items.is_empty() => lines.push(Line::from(Span::styled(
            "No recent headlines",
            Style::default().fg(C_DIM),
        ))),
        Fetch::Ready(items) => lines.extend(items.iter().map(|item| {
            let color = match item.sentiment {
                Sentiment::Bullish => C_UP,
                Sentiment::Bearish => C_DOWN,
                Sentiment::Neutral => C_NEUTRAL,
            };
            Line::from(vec![
                Span::styled(format!("[{}] ", item.sentiment), Style::default().fg(color)),
                Span::raw(item.headline.clone()),
            ])
        })),
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(C_DIM)),
    );
    f.render_widget(paragraph, area);
}

fn text_lines(label: &'static str, state: &AnalysisState, idle_hint: &'static str) -> Vec<Line<'static>> {
    let heading = Line::from(Span::styled(
        label,
        Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
    ));
    let body = match state {
        AnalysisState::Idle => Line::from(Span::styled(idle_hint, Style::default().fg(C_DIM))),
        AnalysisState::Pending => Line::from(Span::styled("Working...", Style::default().fg(C_NEUTRAL))),
        AnalysisState::Ready(text) => Line::from(text.clone()),
        AnalysisState::Failed(message) => Line::from(Span::styled(
            format!("Failed: {message}"),
            Style::default().fg(C_DOWN),
        )),
    };
    vec![heading, body, Line::from("")]
}

fn render_insights(f: &mut Frame, app: &App, area: Rect) {
    let mut lines = text_lines("Chart analysis", app.chart.analysis(), "Press a to analyse the chart");
    lines.extend(text_lines("Portfolio briefing", &app.briefing, "Press r for a briefing"));
    lines.extend(text_lines("Ask AI", &app.answer, "Press ? to ask a question"));

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .title(" INSIGHTS ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(C_DIM)),
    );
    f.render_widget(paragraph, area);
}

fn render_alerts(f: &mut Frame, app: &App, area: Rect) {
    let items = app
        .alerts
        .iter()
        .map(|alert| {
            let color = match alert.severity {
                Severity::Info => C_BRIGHT,
                Severity::Warning => C_NEUTRAL,
                Severity::Critical => C_DOWN,
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("[{}] ", alert.severity), Style::default().fg(color)),
                Span::raw(alert.message.replace("**", "")),
            ]))
        })
        .collect::<Vec<_>>();

    let list = List::new(items).block(
        Block::default()
            .title(format!(" ALERTS ({}) ", app.alerts.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(C_DIM)),
    );
    f.render_widget(list, area);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(input) = &app.input {
        let target = input
            .symbol
            .as_ref()
            .map(|symbol| format!(" [{symbol}]"))
            .unwrap_or_default();
        Line::from(vec![
            Span::styled(
                format!(" {}{target}: ", input.prompt.label()),
                Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("{}█", input.buffer)),
            Span::styled("  (Enter submit, Esc cancel)", Style::default().fg(C_DIM)),
        ])
    } else if let Some(status) = &app.status {
        Line::from(Span::styled(format!(" {status}"), Style::default().fg(C_NEUTRAL)))
    } else {
        Line::from(Span::styled(
            " ↑↓ select  Tab page  t chart type  p pin  a analyse  r briefing  n news  v report  b/s trade  l alert  ? ask  q quit",
            Style::default().fg(C_DIM),
        ))
    };
    f.render_widget(Paragraph::new(line), area);
}

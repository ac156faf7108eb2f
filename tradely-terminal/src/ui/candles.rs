use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};

use super::{C_DOWN, C_UP};

/// One-column-per-bar candlestick plot over columnar OHLC data. Shows the most recent bars
/// that fit the area.
#[derive(Debug)]
pub struct CandleChart<'a> {
    open: &'a [f64],
    high: &'a [f64],
    low: &'a [f64],
    close: &'a [f64],
    y_min: f64,
    y_max: f64,
}

impl<'a> CandleChart<'a> {
    pub fn new(open: &'a [f64], high: &'a [f64], low: &'a [f64], close: &'a [f64]) -> Self {
        Self {
            open,
            high,
            low,
            close,
            y_min: 0.0,
            y_max: 0.0,
        }
    }

    pub fn bounds(mut self, y_min: f64, y_max: f64) -> Self {
        self.y_min = y_min;
        self.y_max = y_max;
        self
    }

    /// Index of the first bar that fits in `width` columns.
    pub fn visible_start(len: usize, width: u16) -> usize {
        len.saturating_sub(width as usize)
    }
}

impl Widget for CandleChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let len = self
            .close
            .len()
            .min(self.open.len())
            .min(self.high.len())
            .min(self.low.len());
        if len == 0 || area.width == 0 || area.height == 0 {
            return;
        }

        let height = area.height as i32;
        let span = (self.y_max - self.y_min).max(1e-6);
        let y_min = self.y_min;
        let to_row = |price: f64| -> i32 {
            let ratio = ((price - y_min) / span).clamp(0.0, 1.0);
            let rel = (ratio * (height as f64 - 1.0)).round() as i32;
            (area.y as i32 + height - 1) - rel
        };

        let row_min = area.y as i32;
        let row_max = area.y as i32 + height - 1;

        // Grid
        for step in 0..=4 {
            let row = to_row(y_min + span * step as f64 / 4.0).clamp(row_min, row_max);
            for x in area.x..area.x + area.width {
                if let Some(cell) = buf.cell_mut((x, row as u16)) {
                    if cell.symbol() == " " {
                        cell.set_symbol("─").set_fg(Color::DarkGray);
                    }
                }
            }
        }

        let start = Self::visible_start(len, area.width);
        for (column, index) in (start..len).enumerate() {
            let x = area.x + column as u16;
            let (open, high, low, close) = (
                self.open[index],
                self.high[index],
                self.low[index],
                self.close[index],
            );
            let color = if close >= open { C_UP } else { C_DOWN };

            let (wick_top, wick_bottom) = (to_row(high), to_row(low));
            for y in wick_top.max(row_min)..=wick_bottom.min(row_max) {
                if let Some(cell) = buf.cell_mut((x, y as u16)) {
                    cell.set_symbol("│").set_fg(color);
                }
            }

            let (body_top, body_bottom) = {
                let (a, b) = (to_row(open), to_row(close));
                (a.min(b), a.max(b))
            };
            for y in body_top.max(row_min)..=body_bottom.min(row_max) {
                if let Some(cell) = buf.cell_mut((x, y as u16)) {
                    cell.set_symbol("█").set_fg(color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_start() {
        assert_eq!(CandleChart::visible_start(10, 4), 6);
        assert_eq!(CandleChart::visible_start(3, 80), 0);
    }

    #[test]
    fn test_renders_bull_and_bear_bodies() {
        let open = [10.0, 12.0];
        let high = [12.5, 12.5];
        let low = [9.5, 9.5];
        let close = [12.0, 10.0];

        let area = Rect::new(0, 0, 2, 8);
        let mut buf = Buffer::empty(area);
        CandleChart::new(&open, &high, &low, &close)
            .bounds(9.5, 12.5)
            .render(area, &mut buf);

        let bodies = |x: u16| {
            (0..8)
                .filter_map(|y| buf.cell((x, y)))
                .filter(|cell| cell.symbol() == "█")
                .map(|cell| cell.fg)
                .collect::<Vec<_>>()
        };
        assert!(!bodies(0).is_empty());
        assert!(bodies(0).iter().all(|fg| *fg == C_UP));
        assert!(bodies(1).iter().all(|fg| *fg == C_DOWN));
    }
}

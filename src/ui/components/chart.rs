use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::widgets::{Axis, Block, Chart, Dataset, GraphType, Paragraph, Widget};

use crate::ui::theme::Theme;

/// Rolling accuracy per attempt, in percent.
pub struct FluencyChart<'a> {
    pub data: &'a [(f64, f64)],
    pub window: usize,
    pub theme: &'a Theme,
}

impl<'a> FluencyChart<'a> {
    pub fn new(data: &'a [(f64, f64)], window: usize, theme: &'a Theme) -> Self {
        Self {
            data,
            window,
            theme,
        }
    }
}

impl Widget for FluencyChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let title = format!(" Fluency (last {} attempts) ", self.window);
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(colors.border()));

        if self.data.is_empty() {
            Paragraph::new("No attempts yet")
                .alignment(Alignment::Center)
                .style(Style::default().fg(colors.dim()))
                .block(block)
                .render(area, buf);
            return;
        }

        let max_x = self.data.last().map(|(x, _)| *x).unwrap_or(1.0).max(2.0);

        let dataset = Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(colors.accent()))
            .data(self.data);

        Chart::new(vec![dataset])
            .block(block)
            .x_axis(
                Axis::default()
                    .title("Attempt")
                    .style(Style::default().fg(colors.dim()))
                    .bounds([1.0, max_x]),
            )
            .y_axis(
                Axis::default()
                    .title("%")
                    .style(Style::default().fg(colors.dim()))
                    .bounds([0.0, 100.0])
                    .labels(["0", "50", "100"]),
            )
            .render(area, buf);
    }
}

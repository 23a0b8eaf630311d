use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Widget};

use crate::morse;
use crate::ui::theme::Theme;

/// Grid of `char code` cards for the characters in play.
pub struct ReferenceCards<'a> {
    pub characters: &'a [char],
    pub active: Option<char>,
    pub focused: Option<char>,
    /// Codes stay visible on every card except the active one when false.
    pub reveal_active: bool,
    pub theme: &'a Theme,
}

impl<'a> ReferenceCards<'a> {
    pub fn new(characters: &'a [char], theme: &'a Theme) -> Self {
        Self {
            characters,
            active: None,
            focused: None,
            reveal_active: true,
            theme,
        }
    }

    pub fn active(mut self, active: Option<char>, reveal: bool) -> Self {
        self.active = active;
        self.reveal_active = reveal;
        self
    }

    pub fn focused(mut self, focused: Option<char>) -> Self {
        self.focused = focused;
        self
    }
}

const CARD_WIDTH: u16 = 10;

fn card_label(ch: char, reveal: bool) -> String {
    let code = if reveal {
        morse::encode(ch).map(|c| c.to_string()).unwrap_or_default()
    } else {
        "?".to_string()
    };
    format!(" {ch} {code:<6}")
}

impl Widget for ReferenceCards<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Reference ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width < CARD_WIDTH || inner.height == 0 {
            return;
        }

        let per_row = (inner.width / CARD_WIDTH).max(1) as usize;
        for (i, &ch) in self.characters.iter().enumerate() {
            let row = (i / per_row) as u16;
            if row >= inner.height {
                break;
            }
            let x = inner.x + (i % per_row) as u16 * CARD_WIDTH;
            let y = inner.y + row;

            let is_active = self.active == Some(ch);
            let is_focused = self.focused == Some(ch);

            let style = if is_active {
                Style::default()
                    .fg(colors.bg())
                    .bg(colors.accent())
                    .add_modifier(Modifier::BOLD)
            } else if is_focused {
                Style::default().fg(colors.highlight())
            } else {
                Style::default().fg(colors.fg())
            };

            let reveal = !is_active || self.reveal_active;
            buf.set_string(x, y, card_label(ch, reveal), style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_label_pads_code() {
        assert_eq!(card_label('A', true), " A .-    ");
        assert_eq!(card_label('A', false), " A ?     ");
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    #[test]
    fn hidden_active_card_keeps_other_codes() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 30, 3);
        let mut buf = Buffer::empty(area);
        ReferenceCards::new(&['E', 'T'], &theme)
            .active(Some('E'), false)
            .render(area, &mut buf);

        let row = row_text(&buf, 1);
        assert!(row.contains(" E ? "));
        assert!(row.contains(" T - "));
        assert!(!row.contains(" E . "));
    }
}

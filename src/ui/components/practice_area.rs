use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::morse;
use crate::session::practice::{Feedback, PracticeMode, PracticeSession, SessionState};
use crate::ui::theme::Theme;

pub struct PracticeArea<'a> {
    session: &'a PracticeSession,
    theme: &'a Theme,
}

impl<'a> PracticeArea<'a> {
    pub fn new(session: &'a PracticeSession, theme: &'a Theme) -> Self {
        Self { session, theme }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SlotState {
    Matched,
    Wrong,
    Empty,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Slot {
    display: char,
    state: SlotState,
}

/// One slot per symbol of the target code: entered symbols marked against
/// the target, then placeholders for what is still required.
fn build_slots(buffer: &str, code: &str) -> Vec<Slot> {
    let mut slots: Vec<Slot> = buffer
        .chars()
        .zip(code.chars().map(Some).chain(std::iter::repeat(None)))
        .map(|(entered, expected)| Slot {
            display: entered,
            state: if Some(entered) == expected {
                SlotState::Matched
            } else {
                SlotState::Wrong
            },
        })
        .collect();
    let remaining = code.chars().count().saturating_sub(slots.len());
    slots.extend((0..remaining).map(|_| Slot {
        display: '_',
        state: SlotState::Empty,
    }));
    slots
}

fn spaced(code: &str) -> String {
    code.chars()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

impl Widget for PracticeArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let session = self.session;

        let Some(target) = session.target() else {
            return;
        };
        let code = target.code().as_str();
        let (entered, required) = session.progress();

        let mut lines: Vec<Line> = vec![
            Line::from(""),
            Line::from(Span::styled(
                target.character().to_string(),
                Style::default()
                    .fg(colors.highlight())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];

        if session.shows_code() {
            lines.push(Line::from(Span::styled(
                spaced(code),
                Style::default().fg(colors.dim()),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "? ".repeat(required).trim_end().to_string(),
                Style::default().fg(colors.dim()),
            )));
        }
        lines.push(Line::from(""));

        let mut slot_spans: Vec<Span> = Vec::new();
        for (i, slot) in build_slots(session.buffer(), code).into_iter().enumerate() {
            if i > 0 {
                slot_spans.push(Span::raw(" "));
            }
            let style = match slot.state {
                SlotState::Matched => Style::default()
                    .fg(colors.correct())
                    .add_modifier(Modifier::BOLD),
                SlotState::Wrong => Style::default()
                    .fg(colors.incorrect())
                    .add_modifier(Modifier::UNDERLINED),
                SlotState::Empty => Style::default().fg(colors.dim()),
            };
            slot_spans.push(Span::styled(slot.display.to_string(), style));
        }
        lines.push(Line::from(slot_spans));
        lines.push(Line::from(Span::styled(
            format!("{entered}/{required}"),
            Style::default().fg(colors.dim()),
        )));
        lines.push(Line::from(""));

        let feedback = match (session.feedback(), session.state()) {
            (Feedback::Correct, _) => Some(Span::styled(
                "Correct!",
                Style::default()
                    .fg(colors.correct())
                    .add_modifier(Modifier::BOLD),
            )),
            (Feedback::Incorrect, SessionState::LockedFailure) => Some(Span::styled(
                format!("Incorrect. {} is {}", target.character(), spaced(code)),
                Style::default()
                    .fg(colors.incorrect())
                    .add_modifier(Modifier::BOLD),
            )),
            (Feedback::Incorrect, _) => Some(Span::styled(
                "That does not lead to the target, backspace to fix",
                Style::default().fg(colors.warning()),
            )),
            (Feedback::Neutral, _) => None,
        };
        lines.push(feedback.map(Line::from).unwrap_or_default());

        if session.mode() == PracticeMode::FreeType
            && session.accepts_input()
            && !session.buffer().is_empty()
        {
            let matches: Vec<String> = morse::candidates(session.buffer())
                .into_iter()
                .map(|c| c.to_string())
                .collect();
            let hint = if matches.is_empty() {
                "No character starts with this".to_string()
            } else {
                format!("Could become: {}", matches.join(" "))
            };
            lines.push(Line::from(Span::styled(hint, Style::default().fg(colors.dim()))));
        }

        let block = Block::bordered()
            .title(format!(" {} ", session.mode().label()))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));

        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Cell, Paragraph, Row, Table, Widget};

use crate::engine::ledger::{CharacterStat, MasteryThresholds, QuizGate};
use crate::ui::components::chart::FluencyChart;
use crate::ui::theme::Theme;

pub struct StatsDashboard<'a> {
    pub stats: &'a [CharacterStat],
    pub thresholds: MasteryThresholds,
    pub fluency: &'a [(f64, f64)],
    pub fluency_window: usize,
    pub quiz_gate: QuizGate,
    pub unlocked: usize,
    pub total: usize,
    pub stale: bool,
    pub theme: &'a Theme,
}

fn accuracy_text(stat: &CharacterStat) -> String {
    stat.accuracy()
        .map(|acc| format!("{acc:.0}%"))
        .unwrap_or_else(|| "-".to_string())
}

fn gate_text(gate: QuizGate) -> String {
    match gate {
        QuizGate::Unlocked => "Quiz unlocked".to_string(),
        QuizGate::Locked { mastered, required } => {
            format!("Quiz locked: {mastered}/{required} characters mastered")
        }
    }
}

impl Widget for StatsDashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Statistics ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(6),
                Constraint::Length(1),
            ])
            .split(inner);

        let mastered = self
            .stats
            .iter()
            .filter(|s| s.is_mastered(&self.thresholds))
            .count();
        let attempts: u32 = self.stats.iter().map(|s| s.attempts).sum();
        let mut summary = vec![
            Span::styled(
                format!(
                    " {attempts} attempts  {mastered} mastered  {}/{} unlocked  ",
                    self.unlocked, self.total
                ),
                Style::default().fg(colors.fg()),
            ),
            Span::styled(
                gate_text(self.quiz_gate),
                Style::default().fg(if self.quiz_gate.is_unlocked() {
                    colors.correct()
                } else {
                    colors.dim()
                }),
            ),
        ];
        if self.stale {
            summary.push(Span::styled(
                "  (not saved, figures may be stale)",
                Style::default()
                    .fg(colors.warning())
                    .add_modifier(Modifier::BOLD),
            ));
        }
        Paragraph::new(Line::from(summary)).render(layout[0], buf);

        if self.stats.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                " No attempts yet. Start a drill!",
                Style::default().fg(colors.dim()),
            )))
            .render(layout[1], buf);
        } else {
            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(44), Constraint::Min(20)])
                .split(layout[1]);

            let header = Row::new(["Char", "Attempts", "Correct", "Accuracy", "Mastered"])
                .style(Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD));
            let rows: Vec<Row> = self
                .stats
                .iter()
                .map(|stat| {
                    let is_mastered = stat.is_mastered(&self.thresholds);
                    let style = if is_mastered {
                        Style::default().fg(colors.correct())
                    } else {
                        Style::default().fg(colors.fg())
                    };
                    Row::new(vec![
                        Cell::from(stat.character.to_string()),
                        Cell::from(stat.attempts.to_string()),
                        Cell::from(stat.successes.to_string()),
                        Cell::from(accuracy_text(stat)),
                        Cell::from(if is_mastered { "yes" } else { "" }),
                    ])
                    .style(style)
                })
                .collect();

            Table::new(
                rows,
                [
                    Constraint::Length(5),
                    Constraint::Length(9),
                    Constraint::Length(8),
                    Constraint::Length(9),
                    Constraint::Length(8),
                ],
            )
            .header(header)
            .block(
                Block::bordered()
                    .title(" Characters ")
                    .border_style(Style::default().fg(colors.border())),
            )
            .render(body[0], buf);

            FluencyChart::new(self.fluency, self.fluency_window, self.theme).render(body[1], buf);
        }

        Paragraph::new(Line::from(Span::styled(
            "  [ESC] Back",
            Style::default().fg(colors.accent()),
        )))
        .render(layout[2], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_text_without_attempts() {
        let stat = CharacterStat {
            character: 'A',
            attempts: 0,
            successes: 0,
        };
        assert_eq!(accuracy_text(&stat), "-");
    }

    #[test]
    fn gate_text_shows_progress() {
        let text = gate_text(QuizGate::Locked {
            mastered: 1,
            required: 3,
        });
        assert!(text.contains("1/3"));
    }
}

use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::session::practice::PracticeMode;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    Practice(PracticeMode),
    Stats,
    Settings,
}

pub struct MenuItem {
    pub key: char,
    pub label: &'static str,
    pub description: &'static str,
    pub action: MenuAction,
}

pub struct Menu<'a> {
    pub items: Vec<MenuItem>,
    pub selected: usize,
    pub theme: &'a Theme,
    /// Shown in place of the Quiz description while it is locked.
    pub quiz_note: Option<String>,
}

impl<'a> Menu<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self {
            items: vec![
                MenuItem {
                    key: '1',
                    label: "Drill",
                    description: "Key the shown character, mistakes retry it",
                    action: MenuAction::Practice(PracticeMode::Drill),
                },
                MenuItem {
                    key: '2',
                    label: "Free Typing",
                    description: "Key at your own pace, backspace allowed",
                    action: MenuAction::Practice(PracticeMode::FreeType),
                },
                MenuItem {
                    key: '3',
                    label: "Quiz",
                    description: "Mastered characters, codes hidden",
                    action: MenuAction::Practice(PracticeMode::Quiz),
                },
                MenuItem {
                    key: 's',
                    label: "Statistics",
                    description: "Accuracy per character and fluency",
                    action: MenuAction::Stats,
                },
                MenuItem {
                    key: 'c',
                    label: "Settings",
                    description: "Tone, timing and theme",
                    action: MenuAction::Settings,
                },
            ],
            selected: 0,
            theme,
            quiz_note: None,
        }
    }

    pub fn next(&mut self) {
        self.selected = (self.selected + 1) % self.items.len();
    }

    pub fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len() - 1;
        }
    }

    pub fn selected_action(&self) -> Option<MenuAction> {
        self.items.get(self.selected).map(|item| item.action)
    }

    pub fn action_for_key(&self, key: char) -> Option<MenuAction> {
        self.items
            .iter()
            .find(|item| item.key == key)
            .map(|item| item.action)
    }
}

impl Widget for &Menu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "-.. --- - -.. .- ... ....",
                Style::default().fg(colors.dim()),
            )),
            Line::from(Span::styled(
                "dotdash",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Morse Code Trainer",
                Style::default().fg(colors.fg()),
            )),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let menu_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                self.items
                    .iter()
                    .map(|_| Constraint::Length(3))
                    .collect::<Vec<_>>(),
            )
            .split(layout[2]);

        for (i, item) in self.items.iter().enumerate() {
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };

            let label_text = format!(" {indicator} [{}] {}", item.key, item.label);
            let description = match (item.action, &self.quiz_note) {
                (MenuAction::Practice(PracticeMode::Quiz), Some(note)) => note.as_str(),
                _ => item.description,
            };
            let desc_text = format!("     {description}");

            let label_style = Style::default()
                .fg(if is_selected { colors.accent() } else { colors.fg() })
                .add_modifier(if is_selected {
                    Modifier::BOLD
                } else {
                    Modifier::empty()
                });

            let lines = vec![
                Line::from(Span::styled(label_text, label_style)),
                Line::from(Span::styled(desc_text, Style::default().fg(colors.dim()))),
            ];

            if i < menu_layout.len() {
                Paragraph::new(lines).render(menu_layout[i], buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_wraps() {
        let theme = Theme::default();
        let mut menu = Menu::new(&theme);
        menu.prev();
        assert_eq!(menu.selected_action(), Some(MenuAction::Settings));
        menu.next();
        assert_eq!(
            menu.selected_action(),
            Some(MenuAction::Practice(PracticeMode::Drill))
        );
    }

    #[test]
    fn shortcut_keys_map_to_actions() {
        let theme = Theme::default();
        let menu = Menu::new(&theme);
        assert_eq!(
            menu.action_for_key('3'),
            Some(MenuAction::Practice(PracticeMode::Quiz))
        );
        assert_eq!(menu.action_for_key('x'), None);
    }
}

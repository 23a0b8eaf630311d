use ratatui::layout::{Constraint, Flex, Layout, Rect};

/// Terminals at least this wide get the reference card sidebar.
const SIDEBAR_MIN_WIDTH: u16 = 90;
/// Terminals at least this tall get the unlock progress bar.
const PROGRESS_MIN_HEIGHT: u16 = 20;

const PANEL_MIN_WIDTH: u16 = 48;
const PANEL_MIN_HEIGHT: u16 = 14;

/// Practice screen regions: one-line header and footer around the main
/// area, with the sidebar split off the right on wide terminals.
pub struct AppLayout {
    pub header: Rect,
    pub main: Rect,
    pub sidebar: Option<Rect>,
    pub footer: Rect,
    pub show_progress: bool,
}

impl AppLayout {
    pub fn new(area: Rect) -> Self {
        let [header, body, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(10),
            Constraint::Length(1),
        ])
        .areas(area);

        let (main, sidebar) = if area.width >= SIDEBAR_MIN_WIDTH {
            let [main, side] =
                Layout::horizontal([Constraint::Percentage(65), Constraint::Percentage(35)])
                    .areas(body);
            (main, Some(side))
        } else {
            (body, None)
        };

        Self {
            header,
            main,
            sidebar,
            footer,
            show_progress: area.height >= PROGRESS_MIN_HEIGHT,
        }
    }
}

/// Packs key hints into as few lines as fit in `width`. A hint wider than
/// the line still gets a line of its own.
pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }

    let mut lines: Vec<String> = Vec::new();
    for hint in hints.iter().filter(|h| !h.is_empty()) {
        match lines.last_mut() {
            Some(line) if line.chars().count() + 2 + hint.chars().count() <= width => {
                line.push_str("  ");
                line.push_str(hint);
            }
            _ => lines.push(format!(" {hint}")),
        }
    }
    lines
}

/// A panel of `percent_x` by `percent_y` of `area`, centered, grown to a
/// readable minimum but never past `area`.
pub fn centered_panel(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let scale =
        |len: u16, percent: u16| (u32::from(len) * u32::from(percent.min(100)) / 100) as u16;
    let width = scale(area.width, percent_x).max(PANEL_MIN_WIDTH).min(area.width);
    let height = scale(area.height, percent_y).max(PANEL_MIN_HEIGHT).min(area.height);

    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [panel] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    panel
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidebar_only_on_wide_terminals() {
        assert!(AppLayout::new(Rect::new(0, 0, 120, 30)).sidebar.is_some());
        assert!(AppLayout::new(Rect::new(0, 0, 60, 30)).sidebar.is_none());
    }

    #[test]
    fn progress_bar_needs_height() {
        assert!(AppLayout::new(Rect::new(0, 0, 100, 24)).show_progress);
        assert!(!AppLayout::new(Rect::new(0, 0, 100, 16)).show_progress);
    }

    #[test]
    fn hints_wrap_to_width() {
        let lines = pack_hint_lines(&["[Enter] Play", "[Esc] Back", "[Space] Key"], 26);
        assert_eq!(lines, vec![" [Enter] Play  [Esc] Back", " [Space] Key"]);
    }

    #[test]
    fn panel_stays_inside_small_area() {
        let area = Rect::new(0, 0, 40, 10);
        assert_eq!(centered_panel(area, 50, 50), area);
    }

    #[test]
    fn panel_is_centered() {
        let panel = centered_panel(Rect::new(0, 0, 200, 60), 50, 50);
        assert_eq!(panel, Rect::new(50, 15, 100, 30));
    }
}

use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use rust_i18n::t;

use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    Practice,
    Timed,
    Mistakes,
    Quit,
}

pub struct MenuItem {
    pub key: char,
    pub action: MenuAction,
}

impl MenuItem {
    fn label(&self) -> String {
        match self.action {
            MenuAction::Practice => t!("menu.practice"),
            MenuAction::Timed => t!("menu.timed"),
            MenuAction::Mistakes => t!("menu.mistakes"),
            MenuAction::Quit => t!("menu.quit"),
        }
        .into_owned()
    }

    fn description(&self, sprint_secs: u32) -> String {
        match self.action {
            MenuAction::Practice => t!("menu.practice_desc"),
            MenuAction::Timed => t!("menu.timed_desc", secs = sprint_secs),
            MenuAction::Mistakes => t!("menu.mistakes_desc"),
            MenuAction::Quit => t!("menu.quit_desc"),
        }
        .into_owned()
    }
}

pub struct Menu {
    pub items: Vec<MenuItem>,
    pub selected: usize,
    /// Shown in the timed sprint description.
    pub sprint_secs: u32,
}

impl Menu {
    pub fn new(sprint_secs: u32) -> Self {
        Self {
            items: vec![
                MenuItem { key: '1', action: MenuAction::Practice },
                MenuItem { key: '2', action: MenuAction::Timed },
                MenuItem { key: 'm', action: MenuAction::Mistakes },
                MenuItem { key: 'q', action: MenuAction::Quit },
            ],
            selected: 0,
            sprint_secs,
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

    pub fn selected_action(&self) -> MenuAction {
        self.items[self.selected].action
    }

    pub fn action_for_key(&self, key: char) -> Option<MenuAction> {
        self.items
            .iter()
            .find(|item| item.key == key)
            .map(|item| item.action)
    }

    pub fn widget<'a>(&'a self, theme: &'a Theme) -> MenuWidget<'a> {
        MenuWidget { menu: self, theme }
    }
}

pub struct MenuWidget<'a> {
    menu: &'a Menu,
    theme: &'a Theme,
}

impl Widget for MenuWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let menu = self.menu;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "conjugr",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(t!("app.tagline"), Style::default().fg(colors.fg()))),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let item_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                menu.items
                    .iter()
                    .map(|_| Constraint::Length(3))
                    .collect::<Vec<_>>(),
            )
            .split(layout[2]);

        for (i, item) in menu.items.iter().enumerate() {
            let is_selected = i == menu.selected;
            let indicator = if is_selected { ">" } else { " " };
            let label_text = format!(" {indicator} [{}] {}", item.key, item.label());
            let desc_text = format!("     {}", item.description(menu.sprint_secs));

            let label_style = if is_selected {
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };
            let lines = vec![
                Line::from(Span::styled(label_text, label_style)),
                Line::from(Span::styled(desc_text, Style::default().fg(colors.text_muted()))),
            ];

            if let Some(slot) = item_layout.get(i) {
                Paragraph::new(lines).render(*slot, buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_wraps() {
        let mut menu = Menu::new(60);
        menu.prev();
        assert_eq!(menu.selected_action(), MenuAction::Quit);
        menu.next();
        assert_eq!(menu.selected_action(), MenuAction::Practice);
        menu.next();
        assert_eq!(menu.selected_action(), MenuAction::Timed);
    }

    #[test]
    fn shortcut_keys() {
        let menu = Menu::new(60);
        assert_eq!(menu.action_for_key('2'), Some(MenuAction::Timed));
        assert_eq!(menu.action_for_key('m'), Some(MenuAction::Mistakes));
        assert_eq!(menu.action_for_key('x'), None);
    }
}

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::engine::review::ReviewItem;
use crate::ui::theme::Theme;

/// Most recent mistakes first, one line each.
pub struct ReviewList<'a> {
    items: Vec<&'a ReviewItem>,
    theme: &'a Theme,
}

impl<'a> ReviewList<'a> {
    pub fn new(items: impl IntoIterator<Item = &'a ReviewItem>, theme: &'a Theme) -> Self {
        Self {
            items: items.into_iter().collect(),
            theme,
        }
    }
}

impl Widget for ReviewList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", t!("mistakes.title")))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));

        let lines: Vec<Line> = if self.items.is_empty() {
            vec![Line::from(Span::styled(
                t!("mistakes.empty"),
                Style::default().fg(colors.correct()),
            ))]
        } else {
            self.items
                .iter()
                .map(|item| {
                    Line::from(vec![
                        Span::styled(
                            item.pronoun.as_str(),
                            Style::default().fg(colors.pronoun()),
                        ),
                        Span::raw(" "),
                        Span::styled(
                            item.answer.as_str(),
                            Style::default()
                                .fg(colors.correct())
                                .add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(
                            format!("  ({}, {})", item.verb, item.tense),
                            Style::default().fg(colors.text_muted()),
                        ),
                    ])
                })
                .collect()
        };

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}

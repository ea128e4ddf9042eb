use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::session::quiz::{CHEER_COUNT, Feedback, QuestionView, Tone};
use crate::ui::line_input::LineInput;
use crate::ui::theme::{Theme, ThemeColors};

pub fn cheer_text(index: usize) -> String {
    match index % CHEER_COUNT {
        0 => t!("cheer.0"),
        1 => t!("cheer.1"),
        2 => t!("cheer.2"),
        3 => t!("cheer.3"),
        _ => t!("cheer.4"),
    }
    .into_owned()
}

/// Localized text for the feedback line; empty when there is nothing to say.
pub fn feedback_text(feedback: &Feedback) -> String {
    match feedback {
        Feedback::None => String::new(),
        Feedback::Correct { xp, cheer } => {
            t!("feedback.correct", cheer = cheer_text(*cheer), xp = xp).into_owned()
        }
        Feedback::Incorrect { expected } => {
            t!("feedback.incorrect", answer = expected).into_owned()
        }
        Feedback::Skipped { expected } => t!("feedback.skipped", answer = expected).into_owned(),
        Feedback::SprintOver { score } => t!("feedback.sprint_over", score = score).into_owned(),
    }
}

fn tone_color(tone: Tone, colors: &ThemeColors) -> Color {
    match tone {
        Tone::Neutral => colors.warning(),
        Tone::Correct => colors.correct(),
        Tone::Incorrect => colors.incorrect(),
    }
}

pub struct QuizCard<'a> {
    view: Option<QuestionView<'a>>,
    input: &'a LineInput,
    feedback: &'a Feedback,
    locked: bool,
    theme: &'a Theme,
}

impl<'a> QuizCard<'a> {
    pub fn new(
        view: Option<QuestionView<'a>>,
        input: &'a LineInput,
        feedback: &'a Feedback,
        locked: bool,
        theme: &'a Theme,
    ) -> Self {
        Self {
            view,
            input,
            feedback,
            locked,
            theme,
        }
    }

    fn answer_spans(&self) -> Vec<Span<'a>> {
        let colors = &self.theme.colors;
        if self.locked {
            return vec![Span::styled(
                self.input.value(),
                Style::default().fg(colors.text_muted()),
            )];
        }
        let (before, cursor, after) = self.input.render_parts();
        let text_style = Style::default().fg(colors.fg());
        let cursor_style = Style::default().fg(colors.bg()).bg(colors.accent());
        vec![
            Span::styled(before, text_style),
            match cursor {
                Some(ch) => Span::styled(ch.to_string(), cursor_style),
                None => Span::styled(" ", cursor_style),
            },
            Span::styled(after, text_style),
        ]
    }
}

impl Widget for QuizCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", t!("card.title")))
            .border_style(Style::default().fg(if self.locked {
                colors.border()
            } else {
                colors.border_focused()
            }))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let Some(view) = self.view.as_ref() else {
            return;
        };
        let muted = Style::default().fg(colors.text_muted());

        let mut tense_line = vec![
            Span::styled(
                view.tense,
                Style::default()
                    .fg(colors.tense())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  ({})", view.tense_english), muted),
        ];
        if view.from_review {
            tense_line.push(Span::styled(
                format!("  [{}]", t!("card.review")),
                Style::default().fg(colors.warning()),
            ));
        }

        let mut answer_line = vec![
            Span::styled(
                view.pronoun_display,
                Style::default()
                    .fg(colors.pronoun())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
        ];
        answer_line.extend(self.answer_spans());

        let feedback = feedback_text(self.feedback);
        let feedback_style = Style::default()
            .fg(tone_color(self.feedback.tone(), colors))
            .add_modifier(Modifier::BOLD);

        let mut lines = vec![
            Line::from(""),
            Line::from(tense_line),
            Line::from(vec![
                Span::styled(
                    view.verb,
                    Style::default()
                        .fg(colors.verb())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  ({}, {})", view.verb_english, view.verb_group), muted),
            ]),
            Line::from(""),
            Line::from(answer_line),
            Line::from(Span::styled(format!("({})", view.pronoun_english), muted)),
            Line::from(""),
            Line::from(Span::styled(feedback, feedback_style)),
        ];
        if matches!(self.feedback, Feedback::SprintOver { .. }) {
            lines.push(Line::from(Span::styled(t!("feedback.sprint_hint"), muted)));
        }
        if let Some(example) = &view.tense_notes.example {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                t!("card.example", example = format!("{} ({})", example.fr, example.en)),
                muted,
            )));
        }

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_text_mentions_answer_and_xp() {
        assert!(feedback_text(&Feedback::None).is_empty());
        let correct = feedback_text(&Feedback::Correct { xp: 15, cheer: 2 });
        assert!(correct.contains("+15 XP"));
        let wrong = feedback_text(&Feedback::Incorrect {
            expected: "étais".to_string(),
        });
        assert!(wrong.contains("étais"));
        let over = feedback_text(&Feedback::SprintOver { score: 70 });
        assert!(over.contains("70"));
    }

    #[test]
    fn cheer_wraps_around() {
        assert_eq!(cheer_text(0), cheer_text(CHEER_COUNT));
        assert!(!cheer_text(3).is_empty());
    }
}

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use rust_i18n::t;

use crate::engine::scoring::SessionStats;
use crate::ui::theme::{Theme, ThemeColors};

pub struct StatsSidebar<'a> {
    stats: &'a SessionStats,
    countdown: Option<u32>,
    theme: &'a Theme,
}

impl<'a> StatsSidebar<'a> {
    pub fn new(stats: &'a SessionStats, countdown: Option<u32>, theme: &'a Theme) -> Self {
        Self {
            stats,
            countdown,
            theme,
        }
    }
}

fn accuracy_color(accuracy: u32, colors: &ThemeColors) -> Color {
    if accuracy >= 90 {
        colors.correct()
    } else if accuracy >= 70 {
        colors.warning()
    } else {
        colors.incorrect()
    }
}

fn stat_line<'a>(label: String, value: String, value_color: Color, colors: &ThemeColors) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(colors.fg())),
        Span::styled(value, Style::default().fg(value_color)),
    ])
}

impl Widget for StatsSidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let stats = self.stats;
        let accuracy = stats.accuracy();

        let mut lines = Vec::new();
        if let Some(secs) = self.countdown {
            let color = if secs <= 10 { colors.incorrect() } else { colors.accent() };
            lines.push(stat_line(t!("stats.time_left").into_owned(), format!("{secs}s"), color, colors));
            lines.push(Line::from(""));
        }
        lines.extend([
            stat_line(t!("stats.score").into_owned(), stats.score.to_string(), colors.accent(), colors),
            stat_line(
                t!("stats.answered").into_owned(),
                format!("{} / {}", stats.correct, stats.total),
                colors.fg(),
                colors,
            ),
            stat_line(
                t!("stats.accuracy").into_owned(),
                format!("{accuracy}%"),
                accuracy_color(accuracy, colors),
                colors,
            ),
            Line::from(""),
            stat_line(t!("stats.streak").into_owned(), stats.streak.to_string(), colors.correct(), colors),
            stat_line(
                t!("stats.best_streak").into_owned(),
                stats.max_streak.to_string(),
                colors.text_muted(),
                colors,
            ),
            Line::from(""),
            stat_line(t!("stats.level").into_owned(), stats.level.to_string(), colors.accent(), colors),
            stat_line(t!("stats.xp").into_owned(), stats.xp.to_string(), colors.fg(), colors),
        ]);

        let block = Block::bordered()
            .title(format!(" {} ", t!("stats.title")))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Clear, Paragraph, Row, Table};

use crate::game::GameOverCause;

const LEAF: Color = Color::LightGreen;
const BARK: Color = Color::Rgb(140, 95, 55);
const DANGER: Color = Color::Rgb(230, 70, 50);
const MUTED: Color = Color::DarkGray;

const START_SIZE: (u16, u16) = (34, 10);
const GAME_OVER_SIZE: (u16, u16) = (28, 10);

/// Draws the title card over the field.
pub fn render_start_menu(frame: &mut Frame<'_>, area: Rect, high_score: u32) {
    let card = centered_box(area, START_SIZE);
    frame.render_widget(Clear, card);

    let block = Block::bordered()
        .border_type(BorderType::Double)
        .border_style(Style::new().fg(LEAF))
        .title(
            Line::from(" JUNGLE SNAKE ")
                .centered()
                .style(Style::new().fg(LEAF).add_modifier(Modifier::BOLD)),
        )
        .title_bottom(
            Line::from(" eat fruit, dodge rocks ")
                .centered()
                .style(Style::new().fg(MUTED)),
        );

    let lines = vec![
        Line::from(""),
        Line::from(format!("High score: {high_score}")).centered(),
        Line::from(""),
        key_line("Enter", "play"),
        key_line("WASD", "steer"),
        key_line("m", "mute"),
        key_line("q", "quit"),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), card);
}

/// Draws the "press a direction" strip shown before the first move.
pub fn render_idle_hint(frame: &mut Frame<'_>, area: Rect) {
    let [_, strip, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(2),
    ])
    .areas(area);
    let [strip] = Layout::horizontal([Constraint::Length(30)])
        .flex(Flex::Center)
        .areas(strip);

    frame.render_widget(
        Paragraph::new(Line::from(" Press an arrow key to start ").centered())
            .style(Style::new().fg(Color::Black).bg(LEAF)),
        strip,
    );
}

/// Draws the game-over card: cause in the header, then a score table.
pub fn render_game_over_menu(
    frame: &mut Frame<'_>,
    area: Rect,
    score: u32,
    high_score: u32,
    new_high_score: bool,
    cause: Option<GameOverCause>,
) {
    let card = centered_box(area, GAME_OVER_SIZE);
    frame.render_widget(Clear, card);

    let block = Block::bordered()
        .border_type(BorderType::Thick)
        .border_style(Style::new().fg(DANGER))
        .title(
            Line::from(" GAME OVER ")
                .centered()
                .style(Style::new().fg(DANGER).add_modifier(Modifier::BOLD)),
        )
        .title_bottom(
            Line::from(cause_title(cause))
                .centered()
                .style(Style::new().fg(BARK)),
        );
    let inner = block.inner(card);
    frame.render_widget(block, card);

    let [_, table_row, badge_row, _, keys_row] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(2),
    ])
    .areas(inner);

    let best_style = if new_high_score {
        Style::new().fg(LEAF).add_modifier(Modifier::BOLD)
    } else {
        Style::new()
    };
    let rows = [
        Row::new(["Score".to_owned(), score.to_string()]),
        Row::new(["Best".to_owned(), high_score.to_string()]).style(best_style),
    ];
    let [table_row] = Layout::horizontal([Constraint::Length(17)])
        .flex(Flex::Center)
        .areas(table_row);
    frame.render_widget(
        Table::new(rows, [Constraint::Length(8), Constraint::Length(8)]),
        table_row,
    );

    if new_high_score {
        frame.render_widget(
            Paragraph::new(Line::from("New high score!").centered())
                .style(Style::new().fg(LEAF).add_modifier(Modifier::BOLD)),
            badge_row,
        );
    }

    frame.render_widget(
        Paragraph::new(vec![key_line("Enter", "again"), key_line("Esc", "menu")]),
        keys_row,
    );
}

fn key_line(key: &'static str, action: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{key:>9} "), Style::new().fg(LEAF).add_modifier(Modifier::BOLD)),
        Span::raw(action),
    ])
}

fn cause_title(cause: Option<GameOverCause>) -> &'static str {
    match cause {
        Some(GameOverCause::Wall) => " hit the wall ",
        Some(GameOverCause::SelfBite) => " bit yourself ",
        Some(GameOverCause::Obstacle) => " hit a rock ",
        Some(GameOverCause::BoardFull) => " the jungle is full ",
        None => "",
    }
}

/// A `width` x `height` box in the middle of `area`, clipped to it.
fn centered_box(area: Rect, (width, height): (u16, u16)) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [center] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);

    center
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::layout::Rect;

    use super::{centered_box, render_game_over_menu};
    use crate::game::GameOverCause;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn boxes_are_centered_and_clipped() {
        let area = Rect::new(2, 1, 42, 16);

        assert_eq!(centered_box(area, (28, 10)), Rect::new(9, 4, 28, 10));
        assert_eq!(centered_box(area, (50, 20)), area);
    }

    #[test]
    fn game_over_card_names_the_cause() {
        let mut terminal = Terminal::new(TestBackend::new(42, 16)).expect("test backend");

        terminal
            .draw(|frame| {
                render_game_over_menu(
                    frame,
                    frame.area(),
                    70,
                    70,
                    true,
                    Some(GameOverCause::Obstacle),
                );
            })
            .expect("draw");

        let text = screen_text(&terminal);
        assert!(text.contains("GAME OVER"));
        assert!(text.contains("hit a rock"));
        assert!(text.contains("New high score!"));
        assert!(text.contains("Score"));
    }
}

use std::time::Instant;

use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Paragraph};

use crate::audio::AudioSink;
use crate::config::CELL_WIDTH;
use crate::game::{GamePhase, GameSession};
use crate::grid::{GridSize, Position};
use crate::obstacle::ObstacleKind;
use crate::score::ScorePersistence;
use crate::sprites::{Sprite, SpriteSet};
use crate::terminal_runtime::{fits, required_size};
use crate::ui::hud::{HUD_HEIGHT, HudInfo, render_hud};
use crate::ui::menu::{render_game_over_menu, render_idle_hint, render_start_menu};

const FIELD_BG: Color = Color::Rgb(18, 42, 22);
const BORDER: Color = Color::Rgb(70, 120, 50);
const SNAKE_HEAD: Color = Color::Rgb(170, 230, 90);
const SNAKE_BODY: Color = Color::Rgb(90, 180, 60);
const SNAKE_TAIL: Color = Color::Rgb(60, 130, 45);
const FOOD: Color = Color::Rgb(230, 50, 40);
const ROCK: Color = Color::Rgb(150, 150, 140);
const STUMP: Color = Color::Rgb(140, 95, 55);

/// Renders one frame of the session.
///
/// Everything inside the field border is shifted by the hit animation's
/// knockback/shake offset while it plays.
pub fn render<A: AudioSink, S: ScorePersistence>(
    frame: &mut Frame<'_>,
    session: &GameSession<A, S>,
    sprites: &SpriteSet,
    hud: &HudInfo,
    now: Instant,
) {
    let area = frame.area();
    let grid = session.world().grid();
    if !fits(area, grid) {
        render_too_small(frame, area, grid);
        return;
    }

    let (field, hud_area) = layout(area, grid);
    let hit = session.hit_frame(now);
    let intensity = hit.map_or(0.0, |hit| hit.intensity);
    let offset = hit.map_or((0, 0), |hit| hit.offset);

    let block = Block::bordered()
        .border_type(BorderType::Thick)
        .border_style(Style::new().fg(border_color(intensity)).bg(FIELD_BG))
        .style(Style::new().bg(FIELD_BG));
    let inner = block.inner(field);
    frame.render_widget(block, field);

    let mut canvas = Canvas {
        buffer: frame.buffer_mut(),
        inner,
        grid,
        offset,
        sprites,
    };
    canvas.draw_world(session, now);

    render_hud(frame, hud_area, hud);

    match session.phase() {
        GamePhase::StartScreen => render_start_menu(frame, field, session.high_score()),
        GamePhase::Idle => render_idle_hint(frame, field),
        GamePhase::GameOver => render_game_over_menu(
            frame,
            field,
            session.score(),
            session.high_score(),
            session.is_new_high_score(),
            session.game_over_cause(),
        ),
        GamePhase::Running | GamePhase::HitAnimation => {}
    }
}

/// Splits `area` into the centered field (with border) and the HUD rows.
fn layout(area: Rect, grid: GridSize) -> (Rect, Rect) {
    let (width, height) = required_size(grid);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    let field_height = height - HUD_HEIGHT;

    (
        Rect::new(x, y, width, field_height),
        Rect::new(x, y + field_height, width, HUD_HEIGHT),
    )
}

fn border_color(intensity: f32) -> Color {
    if intensity <= 0.0 {
        return BORDER;
    }
    let fade = |base: u8, target: u8| {
        let base = f32::from(base);
        (base + (f32::from(target) - base) * intensity).round() as u8
    };
    Color::Rgb(fade(70, 255), fade(120, 40), fade(50, 40))
}

fn render_too_small(frame: &mut Frame<'_>, area: Rect, grid: GridSize) {
    let (width, height) = required_size(grid);
    let lines = vec![
        Line::from("Terminal too small"),
        Line::from(format!("need {width}x{height}, have {}x{}", area.width, area.height)),
    ];
    let y = area.y + area.height.saturating_sub(2) / 2;
    let message = Rect::new(area.x, y, area.width, area.height.min(2));
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .style(Style::new().fg(Color::Yellow)),
        message,
    );
}

struct Canvas<'a> {
    buffer: &'a mut Buffer,
    inner: Rect,
    grid: GridSize,
    offset: (i32, i32),
    sprites: &'a SpriteSet,
}

impl Canvas<'_> {
    fn draw_world<A: AudioSink, S: ScorePersistence>(
        &mut self,
        session: &GameSession<A, S>,
        now: Instant,
    ) {
        let world = session.world();

        for obstacle in &world.obstacles {
            let color = match obstacle.kind {
                ObstacleKind::Stump => STUMP,
                ObstacleKind::Boulder | ObstacleKind::Slab | ObstacleKind::Pebble => ROCK,
            };
            for cell in obstacle.rect().cells() {
                self.draw(cell, Sprite::Obstacle(obstacle.kind), Style::new().fg(color));
            }
        }

        self.draw(world.food, Sprite::Food, Style::new().fg(FOOD).add_modifier(Modifier::BOLD));

        let snake = &world.snake;
        let head = snake.head();
        let tail = snake.tail();
        // Head last so it stays on top when a one-cell snake has head == tail.
        for &segment in snake.segments().skip(1) {
            if segment == tail {
                self.draw(segment, Sprite::Tail, Style::new().fg(SNAKE_TAIL));
            } else {
                self.draw(segment, Sprite::Body, Style::new().fg(SNAKE_BODY));
            }
        }
        self.draw(
            head,
            head_sprite(session, now),
            Style::new().fg(SNAKE_HEAD).add_modifier(Modifier::BOLD),
        );
    }

    fn draw(&mut self, position: Position, sprite: Sprite, style: Style) {
        let Some((x, y)) = logical_to_terminal(self.inner, self.grid, position, self.offset) else {
            return;
        };
        self.buffer
            .set_string(x, y, self.sprites.glyph(sprite), style.bg(FIELD_BG));
    }
}

fn head_sprite<A: AudioSink, S: ScorePersistence>(
    session: &GameSession<A, S>,
    now: Instant,
) -> Sprite {
    let world = session.world();
    match session.phase() {
        GamePhase::HitAnimation | GamePhase::GameOver if session.game_over_cause().is_some() => {
            Sprite::HeadDead
        }
        _ if world.snake.head().manhattan_distance(world.food) <= 1 => Sprite::HeadEating,
        _ if session.tongue_out(now) => Sprite::HeadTongue(world.snake.facing()),
        _ => Sprite::Head(world.snake.facing()),
    }
}

/// Maps a grid cell (shifted by `offset` cells) to the terminal column/row
/// of its left half. Cells pushed outside the field are not drawn.
fn logical_to_terminal(
    inner: Rect,
    grid: GridSize,
    position: Position,
    offset: (i32, i32),
) -> Option<(u16, u16)> {
    if !grid.contains(position) {
        return None;
    }

    let column = (position.x + offset.0) * i32::from(CELL_WIDTH);
    let row = position.y + offset.1;
    let x_offset = u16::try_from(column).ok()?;
    let y_offset = u16::try_from(row).ok()?;

    let x = inner.x.checked_add(x_offset)?;
    let y = inner.y.checked_add(y_offset)?;
    if x.saturating_add(CELL_WIDTH) > inner.right() || y >= inner.bottom() {
        return None;
    }

    Some((x, y))
}

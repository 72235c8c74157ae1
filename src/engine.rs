use rand::Rng;
use tracing::{error, warn};

use crate::config::FOOD_REWARD;
use crate::grid::{GridSize, Position};
use crate::obstacle::{self, Obstacle, ObstaclePlan};
use crate::placement::{first_free_cell, place_food, place_obstacles};
use crate::snake::Snake;

/// What the head ran into.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CollisionKind {
    Wall,
    Body,
    Obstacle,
}

/// A terminal collision and the cell the head tried to enter.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Collision {
    pub kind: CollisionKind,
    pub at: Position,
}

/// Result of one simulation tick. Exactly one variant happens per tick.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TickOutcome {
    /// No direction yet; nothing moved.
    Stationary,
    /// Head advanced and the tail followed.
    Moved,
    /// Head advanced onto food; the snake grew by one.
    Ate,
    /// Head advanced onto food, and no free cell is left for the next one.
    BoardFilled,
    /// The move was refused; the snake is unchanged.
    Collided(Collision),
}

/// Simulation state for one play session: snake, food, obstacles and score.
#[derive(Debug, Clone)]
pub struct World {
    pub snake: Snake,
    pub food: Position,
    pub obstacles: Vec<Obstacle>,
    pub score: u32,
    grid: GridSize,
}

impl World {
    /// Lays out a fresh session: start snake, food, then obstacles around both.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, grid: GridSize) -> Self {
        let snake = Snake::spawn();
        let food = spawn_food(rng, grid, &snake, &[]).unwrap_or_else(|| {
            error!(?grid, "grid has no room for food; parking it at the origin");
            Position::new(0, 0)
        });
        let plan = ObstaclePlan::roll(rng);
        let obstacles = place_obstacles(rng, grid, &snake, food, plan);

        Self {
            snake,
            food,
            obstacles,
            score: 0,
            grid,
        }
    }

    /// Builds a world from explicit parts.
    #[must_use]
    pub fn from_parts(
        grid: GridSize,
        snake: Snake,
        food: Position,
        obstacles: Vec<Obstacle>,
    ) -> Self {
        Self {
            snake,
            food,
            obstacles,
            score: 0,
            grid,
        }
    }

    #[must_use]
    pub fn grid(&self) -> GridSize {
        self.grid
    }

    /// Classifies what `head` would hit. Bounds first, then body, then obstacles.
    #[must_use]
    pub fn collision_at(&self, head: Position) -> Option<CollisionKind> {
        if !self.grid.contains(head) {
            return Some(CollisionKind::Wall);
        }

        if self.snake.body_occupies(head) {
            return Some(CollisionKind::Body);
        }

        if obstacle::any_contains(&self.obstacles, head) {
            return Some(CollisionKind::Obstacle);
        }

        None
    }

    /// Advances the simulation by one tick.
    ///
    /// The body check runs before the tail is removed, so moving into the
    /// cell the tail is about to vacate still counts as a bite.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> TickOutcome {
        let Some(head) = self.snake.next_head() else {
            return TickOutcome::Stationary;
        };

        if let Some(kind) = self.collision_at(head) {
            return TickOutcome::Collided(Collision { kind, at: head });
        }

        let ate = head == self.food;
        self.snake.advance(head, ate);
        if !ate {
            return TickOutcome::Moved;
        }

        self.score += FOOD_REWARD;
        match spawn_food(rng, self.grid, &self.snake, &self.obstacles) {
            Some(food) => {
                self.food = food;
                TickOutcome::Ate
            }
            None => TickOutcome::BoardFilled,
        }
    }
}

/// Samples a food cell, falling back to an exhaustive scan when sampling
/// gives up. `None` means the board has no free cell at all.
fn spawn_food<R: Rng + ?Sized>(
    rng: &mut R,
    grid: GridSize,
    snake: &Snake,
    obstacles: &[Obstacle],
) -> Option<Position> {
    match place_food(rng, grid, snake, obstacles) {
        Ok(food) => Some(food),
        Err(exhausted) => {
            warn!(%exhausted, "food sampling gave up; scanning for a free cell");
            let fallback = first_free_cell(grid, snake, obstacles);
            if fallback.is_none() {
                error!("no free cell left for food");
            }
            fallback
        }
    }
}

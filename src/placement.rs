//! Randomized, constraint-checked placement of food and obstacles.
//!
//! Both placements are bounded rejection samplers: draw a uniform candidate,
//! test it against the occupied cells, give up after a fixed number of draws.

use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{FOOD_PLACEMENT_ATTEMPTS, OBSTACLE_PLACEMENT_ATTEMPTS, SAFE_ZONE_RADIUS};
use crate::grid::{GridSize, Position, Rect};
use crate::obstacle::{self, Obstacle, ObstacleKind, ObstaclePlan};
use crate::snake::Snake;

/// Rejection sampling ran out of attempts without finding a free spot.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
#[error("no free position found after {attempts} attempts")]
pub struct PlacementExhausted {
    pub attempts: u32,
}

/// Draws up to `attempts` candidates and returns the first accepted one.
pub fn sample_bounded<R, D, A>(
    rng: &mut R,
    attempts: u32,
    mut draw: D,
    accept: A,
) -> Result<Position, PlacementExhausted>
where
    R: Rng + ?Sized,
    D: FnMut(&mut R) -> Position,
    A: Fn(Position) -> bool,
{
    for _ in 0..attempts {
        let candidate = draw(rng);
        if accept(candidate) {
            return Ok(candidate);
        }
    }

    Err(PlacementExhausted { attempts })
}

/// Picks a uniformly random cell that is neither snake nor obstacle.
pub fn place_food<R: Rng + ?Sized>(
    rng: &mut R,
    grid: GridSize,
    snake: &Snake,
    obstacles: &[Obstacle],
) -> Result<Position, PlacementExhausted> {
    if grid.total_cells() == 0 {
        return Err(PlacementExhausted { attempts: 0 });
    }

    sample_bounded(
        rng,
        FOOD_PLACEMENT_ATTEMPTS,
        |rng| random_cell(rng, grid),
        |cell| is_free(cell, snake, obstacles),
    )
}

/// Exhaustive row-major scan for the first free cell.
#[must_use]
pub fn first_free_cell(grid: GridSize, snake: &Snake, obstacles: &[Obstacle]) -> Option<Position> {
    grid.cells().find(|cell| is_free(*cell, snake, obstacles))
}

/// Places every obstacle the plan asks for, in plan order.
///
/// An obstacle that cannot be placed within the attempt budget is skipped;
/// the returned list may therefore be shorter than `plan.total()`.
pub fn place_obstacles<R: Rng + ?Sized>(
    rng: &mut R,
    grid: GridSize,
    snake: &Snake,
    food: Position,
    plan: ObstaclePlan,
) -> Vec<Obstacle> {
    let safe_zone = Rect::around(snake.head(), SAFE_ZONE_RADIUS);
    let mut placed: Vec<Obstacle> = Vec::with_capacity(plan.total() as usize);

    for kind in plan.kinds() {
        match place_obstacle(rng, grid, kind, safe_zone, snake, food, &placed) {
            Ok(obstacle) => placed.push(obstacle),
            Err(exhausted) => debug!(?kind, %exhausted, "skipping obstacle"),
        }
    }

    if placed.len() < plan.total() as usize {
        info!(
            placed = placed.len(),
            requested = plan.total(),
            "obstacle batch placed partially"
        );
    }

    placed
}

fn place_obstacle<R: Rng + ?Sized>(
    rng: &mut R,
    grid: GridSize,
    kind: ObstacleKind,
    safe_zone: Rect,
    snake: &Snake,
    food: Position,
    placed: &[Obstacle],
) -> Result<Obstacle, PlacementExhausted> {
    let (width, height) = kind.footprint();
    if width > grid.width || height > grid.height {
        return Err(PlacementExhausted { attempts: 0 });
    }

    let max_x = i32::from(grid.width - width);
    let max_y = i32::from(grid.height - height);

    sample_bounded(
        rng,
        OBSTACLE_PLACEMENT_ATTEMPTS,
        |rng| Position::new(rng.gen_range(0..=max_x), rng.gen_range(0..=max_y)),
        |origin| {
            let rect = Obstacle::new(kind, origin).rect();
            !rect.overlaps(safe_zone)
                && !rect.contains(food)
                && !snake.segments().any(|segment| rect.contains(*segment))
                && !placed.iter().any(|other| rect.overlaps(other.rect()))
        },
    )
    .map(|origin| Obstacle::new(kind, origin))
}

fn random_cell<R: Rng + ?Sized>(rng: &mut R, grid: GridSize) -> Position {
    Position::new(
        rng.gen_range(0..i32::from(grid.width)),
        rng.gen_range(0..i32::from(grid.height)),
    )
}

fn is_free(cell: Position, snake: &Snake, obstacles: &[Obstacle]) -> bool {
    !snake.occupies(cell) && !obstacle::any_contains(obstacles, cell)
}

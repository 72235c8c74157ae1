use rand::Rng;

use crate::config::{SMALL_OBSTACLE_MAX, SMALL_OBSTACLE_MIN};
use crate::grid::{Position, Rect};

/// Obstacle shapes. The kind fixes the footprint; the look is up to the sprite set.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ObstacleKind {
    /// 2×2 boulder.
    Boulder,
    /// 2×1 flat rock.
    Slab,
    /// 1×1 pebble.
    Pebble,
    /// 1×1 tree stump.
    Stump,
}

impl ObstacleKind {
    /// Placement order used when a plan is realized.
    pub const ALL: [Self; 4] = [Self::Boulder, Self::Slab, Self::Pebble, Self::Stump];

    /// Footprint as `(width, height)` in cells.
    #[must_use]
    pub fn footprint(self) -> (u16, u16) {
        match self {
            Self::Boulder => (2, 2),
            Self::Slab => (2, 1),
            Self::Pebble | Self::Stump => (1, 1),
        }
    }
}

/// One placed obstacle.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub origin: Position,
}

impl Obstacle {
    #[must_use]
    pub fn new(kind: ObstacleKind, origin: Position) -> Self {
        Self { kind, origin }
    }

    /// Covered rectangle.
    #[must_use]
    pub fn rect(self) -> Rect {
        let (width, height) = self.kind.footprint();
        Rect::new(self.origin, width, height)
    }

    #[must_use]
    pub fn contains(self, position: Position) -> bool {
        self.rect().contains(position)
    }
}

/// Returns true if `position` is inside any obstacle.
#[must_use]
pub fn any_contains(obstacles: &[Obstacle], position: Position) -> bool {
    obstacles.iter().any(|obstacle| obstacle.contains(position))
}

/// How many obstacles of each kind a session asks for.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ObstaclePlan {
    pub boulders: u32,
    pub slabs: u32,
    pub pebbles: u32,
    pub stumps: u32,
}

impl ObstaclePlan {
    /// Draws per-kind counts and pulls the single-cell total into
    /// `[SMALL_OBSTACLE_MIN, SMALL_OBSTACLE_MAX]`.
    #[must_use]
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            boulders: 3,
            slabs: rng.gen_range(4..=5),
            pebbles: rng.gen_range(2..=5),
            stumps: rng.gen_range(2..=5),
        }
        .rebalanced()
    }

    /// Shifts pebble/stump counts so their sum lands in the small-obstacle band.
    ///
    /// A shortfall is split floor-to-pebbles, ceil-to-stumps; an excess is
    /// removed the same way. Counts saturate at zero.
    #[must_use]
    pub fn rebalanced(mut self) -> Self {
        let small = self.pebbles + self.stumps;

        if small < SMALL_OBSTACLE_MIN {
            let missing = SMALL_OBSTACLE_MIN - small;
            self.pebbles += missing / 2;
            self.stumps += missing.div_ceil(2);
        } else if small > SMALL_OBSTACLE_MAX {
            let excess = small - SMALL_OBSTACLE_MAX;
            self.pebbles = self.pebbles.saturating_sub(excess / 2);
            self.stumps = self.stumps.saturating_sub(excess.div_ceil(2));
        }

        self
    }

    #[must_use]
    pub fn count(self, kind: ObstacleKind) -> u32 {
        match kind {
            ObstacleKind::Boulder => self.boulders,
            ObstacleKind::Slab => self.slabs,
            ObstacleKind::Pebble => self.pebbles,
            ObstacleKind::Stump => self.stumps,
        }
    }

    #[must_use]
    pub fn total(self) -> u32 {
        self.boulders + self.slabs + self.pebbles + self.stumps
    }

    /// Kinds in placement order, each repeated by its count.
    pub fn kinds(self) -> impl Iterator<Item = ObstacleKind> {
        ObstacleKind::ALL
            .into_iter()
            .flat_map(move |kind| std::iter::repeat_n(kind, self.count(kind) as usize))
    }
}

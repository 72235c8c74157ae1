use crate::input::Direction;

/// Grid position in logical cell coordinates.
///
/// Coordinates are signed so a head stepped past the edge can still be
/// represented and classified as a wall hit.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the neighbouring cell one step in `direction`.
    #[must_use]
    pub fn stepped(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    #[must_use]
    pub fn manhattan_distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Axis-aligned block of cells anchored at its top-left corner.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Rect {
    pub origin: Position,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    #[must_use]
    pub const fn new(origin: Position, width: u16, height: u16) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    /// Square of side `2 * radius + 1` centred on `center`.
    #[must_use]
    pub fn around(center: Position, radius: i32) -> Self {
        let side = u16::try_from(radius.max(0) * 2 + 1).unwrap_or(u16::MAX);
        Self::new(
            Position::new(center.x - radius, center.y - radius),
            side,
            side,
        )
    }

    fn right(self) -> i32 {
        self.origin.x + i32::from(self.width)
    }

    fn bottom(self) -> i32 {
        self.origin.y + i32::from(self.height)
    }

    /// Returns true when `position` lies inside this rectangle.
    #[must_use]
    pub fn contains(self, position: Position) -> bool {
        position.x >= self.origin.x
            && position.y >= self.origin.y
            && position.x < self.right()
            && position.y < self.bottom()
    }

    /// Returns true when the two rectangles share at least one cell.
    #[must_use]
    pub fn overlaps(self, other: Self) -> bool {
        !(self.right() <= other.origin.x
            || other.right() <= self.origin.x
            || self.bottom() <= other.origin.y
            || other.bottom() <= self.origin.y)
    }

    /// Iterates over every covered cell, row by row.
    pub fn cells(self) -> impl Iterator<Item = Position> {
        (self.origin.y..self.bottom())
            .flat_map(move |y| (self.origin.x..self.right()).map(move |x| Position::new(x, y)))
    }
}

/// Logical grid dimensions, fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct GridSize {
    pub width: u16,
    pub height: u16,
}

impl GridSize {
    /// Returns the total number of cells in the grid.
    #[must_use]
    pub fn total_cells(self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }

    /// Returns true when the position lies inside the bounds.
    #[must_use]
    pub fn contains(self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.x < i32::from(self.width)
            && position.y < i32::from(self.height)
    }

    /// Returns true when every cell of `rect` lies inside the bounds.
    #[must_use]
    pub fn contains_rect(self, rect: Rect) -> bool {
        rect.width > 0
            && rect.height > 0
            && self.contains(rect.origin)
            && rect.right() <= i32::from(self.width)
            && rect.bottom() <= i32::from(self.height)
    }

    /// Iterates over every cell, row by row.
    pub fn cells(self) -> impl Iterator<Item = Position> {
        Rect::new(Position::new(0, 0), self.width, self.height).cells()
    }
}

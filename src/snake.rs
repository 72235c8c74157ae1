use std::collections::VecDeque;

use crate::grid::Position;
use crate::input::Direction;

/// Head cell of a freshly spawned snake.
pub const START_HEAD: Position = Position::new(10, 10);

/// Number of segments a freshly spawned snake has.
pub const START_LENGTH: usize = 3;

/// Snake body plus its steering state.
///
/// The body is ordered head first. `pending` is the direction the next tick
/// will move in; `last_committed` is the direction of the most recent move
/// and is what reversals are checked against.
#[derive(Debug, Clone)]
pub struct Snake {
    body: VecDeque<Position>,
    pending: Option<Direction>,
    last_committed: Option<Direction>,
}

impl Snake {
    /// Creates the stationary start snake: three cells in a row, head at
    /// [`START_HEAD`], trailing to the left.
    #[must_use]
    pub fn spawn() -> Self {
        let body = (0..START_LENGTH)
            .map(|offset| Position::new(START_HEAD.x - offset as i32, START_HEAD.y))
            .collect();

        Self {
            body,
            pending: None,
            last_committed: None,
        }
    }

    /// Creates a stationary snake from explicit body segments (front is head).
    ///
    /// # Panics
    ///
    /// Panics if `segments` is empty. Every other method relies on the body
    /// having a head.
    #[must_use]
    pub fn from_segments(segments: Vec<Position>) -> Self {
        assert!(!segments.is_empty(), "a snake needs at least one segment");

        Self {
            body: VecDeque::from(segments),
            pending: None,
            last_committed: None,
        }
    }

    /// Creates a snake that has already been moving in `direction`.
    ///
    /// # Panics
    ///
    /// Panics if `segments` is empty, like [`Snake::from_segments`].
    #[must_use]
    pub fn moving(segments: Vec<Position>, direction: Direction) -> Self {
        let mut snake = Self::from_segments(segments);
        snake.pending = Some(direction);
        snake.last_committed = Some(direction);
        snake
    }

    /// Requests a new travel direction. Returns `false` when dropped.
    ///
    /// Reversing the last committed direction is rejected. Before the first
    /// move there is no committed direction, so a turn straight into the
    /// neck segment is rejected instead.
    pub fn steer(&mut self, direction: Direction) -> bool {
        let reverses = match self.last_committed {
            Some(last) => direction == last.opposite(),
            None => self
                .body
                .get(1)
                .is_some_and(|neck| self.head().stepped(direction) == *neck),
        };

        if reverses {
            return false;
        }

        self.pending = Some(direction);
        true
    }

    /// Cell the head will enter on the next tick, if the snake is moving.
    #[must_use]
    pub fn next_head(&self) -> Option<Position> {
        self.pending.map(|direction| self.head().stepped(direction))
    }

    /// Commits one move into `head`. The tail is kept when `grow` is set.
    pub fn advance(&mut self, head: Position, grow: bool) {
        self.body.push_front(head);
        if !grow {
            let _ = self.body.pop_back();
        }
        self.last_committed = self.pending;
    }

    /// Returns the current head position.
    #[must_use]
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Returns the last segment.
    #[must_use]
    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    /// Returns true if any segment occupies `position`.
    #[must_use]
    pub fn occupies(&self, position: Position) -> bool {
        self.body.contains(&position)
    }

    /// Returns true if any segment other than the head occupies `position`.
    #[must_use]
    pub fn body_occupies(&self, position: Position) -> bool {
        self.body.iter().skip(1).any(|segment| *segment == position)
    }

    /// Returns current segment count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Returns true when there are no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    #[must_use]
    pub fn pending_direction(&self) -> Option<Direction> {
        self.pending
    }

    #[must_use]
    pub fn last_direction(&self) -> Option<Direction> {
        self.last_committed
    }

    /// Direction the head sprite should face.
    #[must_use]
    pub fn facing(&self) -> Direction {
        self.last_committed
            .or(self.pending)
            .unwrap_or(Direction::Right)
    }

    /// Iterates over body segments from head to tail.
    pub fn segments(&self) -> impl Iterator<Item = &Position> {
        self.body.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{START_HEAD, START_LENGTH, Snake};
    use crate::grid::Position;
    use crate::input::Direction;

    #[test]
    #[should_panic(expected = "at least one segment")]
    fn empty_body_is_rejected() {
        let _ = Snake::from_segments(Vec::new());
    }

    fn step(snake: &mut Snake) {
        let head = snake.next_head().expect("snake should be moving");
        snake.advance(head, false);
    }

    #[test]
    fn spawn_lays_out_three_cells_to_the_left() {
        let snake = Snake::spawn();
        let cells: Vec<_> = snake.segments().copied().collect();

        assert_eq!(snake.len(), START_LENGTH);
        assert_eq!(
            cells,
            vec![START_HEAD, Position::new(9, 10), Position::new(8, 10)]
        );
        assert_eq!(snake.next_head(), None);
    }

    #[test]
    fn snake_moves_one_cell_per_tick() {
        let mut snake = Snake::spawn();
        assert!(snake.steer(Direction::Right));

        step(&mut snake);

        assert_eq!(snake.head(), Position::new(11, 10));
        assert_eq!(snake.tail(), Position::new(9, 10));
        assert_eq!(snake.len(), 3);
    }

    #[test]
    fn growth_keeps_previous_tail() {
        let mut snake = Snake::spawn();
        snake.steer(Direction::Up);

        snake.advance(Position::new(10, 9), true);

        assert_eq!(snake.len(), 4);
        assert_eq!(snake.tail(), Position::new(8, 10));
    }

    #[test]
    fn reversal_of_committed_direction_is_rejected() {
        let mut snake = Snake::spawn();
        snake.steer(Direction::Up);
        step(&mut snake);

        assert!(!snake.steer(Direction::Down));
        assert_eq!(snake.pending_direction(), Some(Direction::Up));

        assert!(snake.steer(Direction::Up));
        assert!(snake.steer(Direction::Left));
        assert_eq!(snake.pending_direction(), Some(Direction::Left));
    }

    #[test]
    fn reversal_is_checked_against_committed_not_pending() {
        let mut snake = Snake::spawn();
        snake.steer(Direction::Right);
        step(&mut snake);

        // Up is pending but Right is still the committed move, so Down is fine.
        assert!(snake.steer(Direction::Up));
        assert!(snake.steer(Direction::Down));
        assert!(!snake.steer(Direction::Left));
        assert_eq!(snake.pending_direction(), Some(Direction::Down));
    }

    #[test]
    fn cannot_start_backwards_into_the_neck() {
        let mut snake = Snake::spawn();

        assert!(!snake.steer(Direction::Left));
        assert_eq!(snake.pending_direction(), None);

        assert!(snake.steer(Direction::Down));
    }

    #[test]
    fn body_occupancy_excludes_head() {
        let snake = Snake::spawn();

        assert!(snake.occupies(START_HEAD));
        assert!(!snake.body_occupies(START_HEAD));
        assert!(snake.body_occupies(Position::new(8, 10)));
    }
}

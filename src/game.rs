use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::audio::{AudioSink, SoundEvent};
use crate::config::{
    DEFAULT_HIT_ANIMATION_MS, KNOCKBACK_CELLS, MOVE_SOUND_EVERY, SHAKE_CELLS, SHAKE_PERIOD_MS,
    TONGUE_FLICK_MS, TONGUE_PAUSE_MAX_MS, TONGUE_PAUSE_MIN_MS,
};
use crate::engine::{Collision, CollisionKind, TickOutcome, World};
use crate::grid::GridSize;
use crate::input::{Direction, GameInput};
use crate::score::ScorePersistence;

/// Screen/phase of the session. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GamePhase {
    StartScreen,
    /// On the play screen, waiting for the first direction.
    Idle,
    Running,
    /// Frozen simulation while the knockback/shake effect plays.
    HitAnimation,
    GameOver,
}

/// Why the last run ended.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GameOverCause {
    Wall,
    SelfBite,
    Obstacle,
    BoardFull,
}

impl From<CollisionKind> for GameOverCause {
    fn from(kind: CollisionKind) -> Self {
        match kind {
            CollisionKind::Wall => Self::Wall,
            CollisionKind::Body => Self::SelfBite,
            CollisionKind::Obstacle => Self::Obstacle,
        }
    }
}

/// Knockback direction in cells, applied scaled by the fading intensity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Knockback {
    pub dx: f32,
    pub dy: f32,
}

/// Visual state of the hit animation for one rendered frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitFrame {
    /// Whole-cell offset applied to everything drawn in the play field.
    pub offset: (i32, i32),
    /// 1.0 at impact, fading linearly to 0.0 at the end of the animation.
    pub intensity: f32,
}

/// Idle tongue animation: out for a moment every 10-15 s of play.
#[derive(Debug, Clone, Copy, Default)]
struct TongueFlick {
    next_at: Option<Instant>,
    out_until: Option<Instant>,
}

#[derive(Debug, Clone, Copy)]
struct HitTimer {
    started_at: Instant,
    knockback: Knockback,
}

/// Per-session settings.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub grid: GridSize,
    pub hit_animation: Duration,
    pub muted: bool,
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            grid: GridSize {
                width: crate::config::DEFAULT_GRID_WIDTH,
                height: crate::config::DEFAULT_GRID_HEIGHT,
            },
            hit_animation: Duration::from_millis(DEFAULT_HIT_ANIMATION_MS),
            muted: false,
            seed: None,
        }
    }
}

/// One running game: simulation, phase, high score and the injected
/// audio and persistence collaborators.
#[derive(Debug)]
pub struct GameSession<A: AudioSink, S: ScorePersistence> {
    world: World,
    phase: GamePhase,
    hit: Option<HitTimer>,
    tongue: TongueFlick,
    cause: Option<GameOverCause>,
    high_score: u32,
    high_score_before_run: u32,
    moves: u64,
    muted: bool,
    hit_animation: Duration,
    rng: StdRng,
    audio: A,
    store: S,
}

impl<A: AudioSink, S: ScorePersistence> GameSession<A, S> {
    /// Creates a session on the start screen. A seed makes every random
    /// draw reproducible.
    pub fn new(config: SessionConfig, audio: A, store: S) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let world = World::generate(&mut rng, config.grid);
        let high_score = store.high_score();

        info!(
            width = config.grid.width,
            height = config.grid.height,
            high_score,
            "session created"
        );

        Self {
            world,
            phase: GamePhase::StartScreen,
            hit: None,
            tongue: TongueFlick::default(),
            cause: None,
            high_score,
            high_score_before_run: high_score,
            moves: 0,
            muted: config.muted,
            hit_animation: config.hit_animation,
            rng,
            audio,
            store,
        }
    }

    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the simulation, for scripted setups.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.world.score
    }

    #[must_use]
    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// True once the current run has beaten the best score it started against.
    #[must_use]
    pub fn is_new_high_score(&self) -> bool {
        self.world.score > self.high_score_before_run
    }

    #[must_use]
    pub fn game_over_cause(&self) -> Option<GameOverCause> {
        self.cause
    }

    #[must_use]
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    #[must_use]
    pub fn audio(&self) -> &A {
        &self.audio
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Renderer gate: once the game-over screen is up nothing moves.
    #[must_use]
    pub fn should_render(&self) -> bool {
        self.phase != GamePhase::GameOver
    }

    /// Applies one mapped input.
    pub fn apply_input(&mut self, input: GameInput, now: Instant) {
        match input {
            GameInput::Direction(direction) => {
                let _ = self.steer(direction);
            }
            GameInput::Confirm => match self.phase {
                GamePhase::StartScreen => self.enter_play(),
                GamePhase::HitAnimation | GamePhase::GameOver => self.restart(),
                GamePhase::Idle | GamePhase::Running => {}
            },
            GameInput::Menu => self.return_to_menu(),
            GameInput::ToggleMute => {
                self.muted = !self.muted;
                debug!(muted = self.muted, "mute toggled");
            }
            GameInput::Quit | GameInput::Redraw => {}
        }

        self.update(now);
    }

    /// Start screen → Idle with a freshly generated world.
    pub fn enter_play(&mut self) {
        if self.phase != GamePhase::StartScreen {
            return;
        }

        self.play(SoundEvent::ButtonClick);
        self.reset();
    }

    /// Hit animation / game over → Idle with a freshly generated world.
    ///
    /// Restarting during the hit animation drops its pending timer.
    pub fn restart(&mut self) {
        if !matches!(self.phase, GamePhase::HitAnimation | GamePhase::GameOver) {
            return;
        }

        self.reset();
    }

    /// Any phase → start screen.
    pub fn return_to_menu(&mut self) {
        if self.phase == GamePhase::StartScreen {
            return;
        }

        self.hit = None;
        self.play(SoundEvent::ButtonClick);
        self.set_phase(GamePhase::StartScreen);
    }

    /// Requests a direction change. The first accepted direction on the
    /// play screen starts the run. Returns `false` when the input was dropped.
    pub fn steer(&mut self, direction: Direction) -> bool {
        match self.phase {
            GamePhase::Idle => {
                if !self.world.snake.steer(direction) {
                    return false;
                }
                self.set_phase(GamePhase::Running);
                true
            }
            GamePhase::Running => self.world.snake.steer(direction),
            _ => false,
        }
    }

    /// Runs one logic tick. Only the running phase advances the simulation.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        if self.phase != GamePhase::Running {
            return TickOutcome::Stationary;
        }

        let outcome = self.world.step(&mut self.rng);
        match outcome {
            TickOutcome::Stationary => {}
            TickOutcome::Moved => {
                self.moves += 1;
                if self.moves % MOVE_SOUND_EVERY == 0 {
                    self.play(SoundEvent::Move);
                }
                self.flick_tongue(now);
            }
            TickOutcome::Ate => {
                self.play(SoundEvent::Eat);
                self.record_score();
                self.flick_tongue(now);
            }
            TickOutcome::BoardFilled => {
                self.play(SoundEvent::Eat);
                self.record_score();
                self.cause = Some(GameOverCause::BoardFull);
                self.play(SoundEvent::GameOver);
                self.set_phase(GamePhase::GameOver);
            }
            TickOutcome::Collided(collision) => self.begin_hit(collision, now),
        }

        outcome
    }

    /// Advances wall-clock driven transitions.
    pub fn update(&mut self, now: Instant) {
        let Some(hit) = self.hit else {
            return;
        };

        if now.saturating_duration_since(hit.started_at) >= self.hit_animation {
            self.hit = None;
            self.play(SoundEvent::GameOver);
            self.set_phase(GamePhase::GameOver);
        }
    }

    /// True while the tongue is out. Only drawn during a run.
    #[must_use]
    pub fn tongue_out(&self, now: Instant) -> bool {
        self.phase == GamePhase::Running && self.tongue.out_until.is_some_and(|until| now < until)
    }

    /// Knockback/shake state for the frame drawn at `now`.
    #[must_use]
    pub fn hit_frame(&self, now: Instant) -> Option<HitFrame> {
        let hit = self.hit?;
        let elapsed = now.saturating_duration_since(hit.started_at);
        let intensity = if self.hit_animation.is_zero() {
            0.0
        } else {
            (1.0 - elapsed.as_secs_f32() / self.hit_animation.as_secs_f32()).max(0.0)
        };
        let shake = if (elapsed.as_millis() / SHAKE_PERIOD_MS) % 2 == 0 {
            SHAKE_CELLS
        } else {
            -SHAKE_CELLS
        };

        Some(HitFrame {
            offset: (
                ((hit.knockback.dx + shake) * intensity).round() as i32,
                ((hit.knockback.dy - shake) * intensity).round() as i32,
            ),
            intensity,
        })
    }

    fn begin_hit(&mut self, collision: Collision, now: Instant) {
        if self.phase != GamePhase::Running {
            return;
        }

        let knockback = self.knockback_for(collision);
        self.cause = Some(collision.kind.into());
        self.hit = Some(HitTimer {
            started_at: now,
            knockback,
        });
        info!(cause = ?collision.kind, at = ?collision.at, score = self.world.score, "collision");

        self.play(SoundEvent::Collision);
        self.play(SoundEvent::Hit);
        self.set_phase(GamePhase::HitAnimation);
    }

    fn knockback_for(&mut self, collision: Collision) -> Knockback {
        let grid = self.world.grid();
        let at = collision.at;

        if collision.kind != CollisionKind::Wall {
            return Knockback {
                dx: self.rng.gen_range(-KNOCKBACK_CELLS..=KNOCKBACK_CELLS),
                dy: self.rng.gen_range(-KNOCKBACK_CELLS..=KNOCKBACK_CELLS),
            };
        }

        let (dx, dy) = if at.x < 0 {
            (KNOCKBACK_CELLS, 0.0)
        } else if at.x >= i32::from(grid.width) {
            (-KNOCKBACK_CELLS, 0.0)
        } else if at.y < 0 {
            (0.0, KNOCKBACK_CELLS)
        } else {
            (0.0, -KNOCKBACK_CELLS)
        };

        Knockback { dx, dy }
    }

    /// Starts a flick when one is due. The mouth must be closed, so nothing
    /// happens while the head is next to the food.
    fn flick_tongue(&mut self, now: Instant) {
        let world = &self.world;
        if world.snake.head().manhattan_distance(world.food) <= 1 {
            return;
        }

        match self.tongue.next_at {
            Some(due) if now < due => {}
            Some(_) => {
                self.tongue.out_until = Some(now + Duration::from_millis(TONGUE_FLICK_MS));
                self.tongue.next_at = Some(now + self.tongue_pause());
            }
            None => self.tongue.next_at = Some(now + self.tongue_pause()),
        }
    }

    fn tongue_pause(&mut self) -> Duration {
        Duration::from_millis(self.rng.gen_range(TONGUE_PAUSE_MIN_MS..=TONGUE_PAUSE_MAX_MS))
    }

    fn record_score(&mut self) {
        if self.world.score > self.high_score {
            self.high_score = self.world.score;
            self.store.set_high_score(self.high_score);
        }
    }

    fn reset(&mut self) {
        self.world = World::generate(&mut self.rng, self.world.grid());
        self.hit = None;
        self.tongue = TongueFlick::default();
        self.cause = None;
        self.moves = 0;
        self.high_score_before_run = self.high_score;

        debug!(
            obstacles = self.world.obstacles.len(),
            food = ?self.world.food,
            "world reset"
        );
        self.play(SoundEvent::GameStart);
        self.set_phase(GamePhase::Idle);
    }

    fn set_phase(&mut self, phase: GamePhase) {
        if self.phase != phase {
            debug!(from = ?self.phase, to = ?phase, "phase change");
        }
        self.phase = phase;
    }

    fn play(&mut self, event: SoundEvent) {
        if !self.muted {
            self.audio.play(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::{GameOverCause, GamePhase, GameSession, SessionConfig};
    use crate::audio::{AudioSink, SoundEvent};
    use crate::engine::TickOutcome;
    use crate::grid::Position;
    use crate::input::{Direction, GameInput};
    use crate::score::{MemoryScoreStore, ScorePersistence};
    use crate::snake::Snake;

    #[derive(Debug, Default)]
    struct RecordingAudio(Vec<SoundEvent>);

    impl AudioSink for RecordingAudio {
        fn play(&mut self, event: SoundEvent) {
            self.0.push(event);
        }
    }

    fn session() -> GameSession<RecordingAudio, MemoryScoreStore> {
        GameSession::new(
            SessionConfig {
                seed: Some(9),
                ..SessionConfig::default()
            },
            RecordingAudio::default(),
            MemoryScoreStore::default(),
        )
    }

    fn playing() -> GameSession<RecordingAudio, MemoryScoreStore> {
        let mut session = session();
        session.enter_play();
        session.world_mut().obstacles.clear();
        session.world_mut().food = Position::new(30, 20);
        session
    }

    fn crash_into_wall(session: &mut GameSession<RecordingAudio, MemoryScoreStore>, now: Instant) {
        session.world_mut().snake = Snake::moving(
            vec![Position::new(0, 10), Position::new(1, 10), Position::new(2, 10)],
            Direction::Left,
        );
        session.tick(now);
    }

    #[test]
    fn starts_on_the_start_screen() {
        let session = session();

        assert_eq!(session.phase(), GamePhase::StartScreen);
        assert!(session.should_render());
    }

    #[test]
    fn first_direction_starts_the_run() {
        let mut session = playing();
        let now = Instant::now();

        assert_eq!(session.phase(), GamePhase::Idle);
        assert_eq!(session.tick(now), TickOutcome::Stationary);

        session.apply_input(GameInput::Direction(Direction::Up), now);
        assert_eq!(session.phase(), GamePhase::Running);
        assert_eq!(session.tick(now), TickOutcome::Moved);
    }

    #[test]
    fn backwards_start_keeps_the_session_idle() {
        let mut session = playing();

        assert!(!session.steer(Direction::Left));
        assert_eq!(session.phase(), GamePhase::Idle);
    }

    #[test]
    fn collision_runs_hit_animation_then_game_over() {
        let mut session = playing();
        let start = Instant::now();
        session.steer(Direction::Up);

        crash_into_wall(&mut session, start);
        assert_eq!(session.phase(), GamePhase::HitAnimation);
        assert_eq!(session.game_over_cause(), Some(GameOverCause::Wall));

        session.update(start + Duration::from_millis(999));
        assert_eq!(session.phase(), GamePhase::HitAnimation);

        session.update(start + Duration::from_millis(1000));
        assert_eq!(session.phase(), GamePhase::GameOver);
        assert!(!session.should_render());
    }

    #[test]
    fn ticks_are_ignored_while_frozen() {
        let mut session = playing();
        let now = Instant::now();
        session.steer(Direction::Up);
        crash_into_wall(&mut session, now);
        let events_after_hit = session.audio().0.len();

        assert_eq!(session.tick(now), TickOutcome::Stationary);
        assert_eq!(session.phase(), GamePhase::HitAnimation);
        assert_eq!(session.audio().0.len(), events_after_hit);
    }

    #[test]
    fn restart_during_hit_animation_cancels_the_timer() {
        let mut session = playing();
        let start = Instant::now();
        session.steer(Direction::Up);
        crash_into_wall(&mut session, start);

        session.apply_input(GameInput::Confirm, start + Duration::from_millis(200));
        assert_eq!(session.phase(), GamePhase::Idle);

        session.update(start + Duration::from_secs(5));
        assert_eq!(session.phase(), GamePhase::Idle);
        assert_eq!(session.game_over_cause(), None);
    }

    #[test]
    fn wall_knockback_pushes_away_from_the_wall() {
        let mut session = playing();
        let start = Instant::now();
        session.steer(Direction::Up);
        crash_into_wall(&mut session, start);

        let frame = session.hit_frame(start).expect("hit animation is active");
        assert_eq!(frame.intensity, 1.0);
        assert!(frame.offset.0 > 0);

        let late = session
            .hit_frame(start + Duration::from_millis(1000))
            .expect("timer has not been polled yet");
        assert_eq!(late.offset, (0, 0));
    }

    #[test]
    fn eating_updates_and_persists_high_score() {
        let mut session = playing();
        let now = Instant::now();
        session.world_mut().food = Position::new(11, 10);
        session.steer(Direction::Right);

        assert_eq!(session.tick(now), TickOutcome::Ate);
        assert_eq!(session.score(), 10);
        assert_eq!(session.high_score(), 10);
        assert_eq!(session.store().high_score(), 10);
        assert!(session.is_new_high_score());
        assert!(session.audio().0.contains(&SoundEvent::Eat));
    }

    #[test]
    fn lower_score_leaves_high_score_alone() {
        let mut session = GameSession::new(
            SessionConfig {
                seed: Some(3),
                ..SessionConfig::default()
            },
            RecordingAudio::default(),
            MemoryScoreStore::with_high_score(500),
        );
        session.enter_play();
        session.world_mut().obstacles.clear();
        session.world_mut().food = Position::new(11, 10);
        session.steer(Direction::Right);

        session.tick(Instant::now());

        assert_eq!(session.score(), 10);
        assert_eq!(session.high_score(), 500);
        assert_eq!(session.store().high_score(), 500);
        assert!(!session.is_new_high_score());
    }

    #[test]
    fn move_sound_plays_every_tenth_move() {
        let mut session = playing();
        let now = Instant::now();
        session.steer(Direction::Up);

        for _ in 0..9 {
            session.tick(now);
        }
        assert!(!session.audio().0.contains(&SoundEvent::Move));

        session.tick(now);
        assert_eq!(
            session
                .audio()
                .0
                .iter()
                .filter(|event| **event == SoundEvent::Move)
                .count(),
            1
        );
    }

    #[test]
    fn muted_session_emits_nothing() {
        let mut session = session();
        let now = Instant::now();
        session.apply_input(GameInput::ToggleMute, now);
        session.apply_input(GameInput::Confirm, now);

        assert!(session.is_muted());
        assert_eq!(session.phase(), GamePhase::Idle);
        assert!(session.audio().0.is_empty());
    }

    #[test]
    fn menu_is_reachable_from_every_phase() {
        let mut session = playing();
        let now = Instant::now();
        session.steer(Direction::Up);
        session.apply_input(GameInput::Menu, now);
        assert_eq!(session.phase(), GamePhase::StartScreen);

        session.apply_input(GameInput::Confirm, now);
        assert_eq!(session.phase(), GamePhase::Idle);
        session.apply_input(GameInput::Menu, now);
        assert_eq!(session.phase(), GamePhase::StartScreen);
    }

    #[test]
    fn confirm_is_ignored_mid_run() {
        let mut session = playing();
        let now = Instant::now();
        session.steer(Direction::Up);
        session.tick(now);
        let head = session.world().snake.head();

        session.apply_input(GameInput::Confirm, now);

        assert_eq!(session.phase(), GamePhase::Running);
        assert_eq!(session.world().snake.head(), head);
    }

    #[test]
    fn tongue_flicks_after_a_quiet_stretch() {
        let start = Instant::now();
        let mut session = playing();
        session.apply_input(GameInput::Direction(Direction::Down), start);

        session.tick(start);
        assert!(!session.tongue_out(start));

        let later = start + Duration::from_secs(16);
        session.tick(later);
        assert!(session.tongue_out(later + Duration::from_millis(100)));
        assert!(!session.tongue_out(later + Duration::from_millis(250)));
    }

    #[test]
    fn tongue_stays_in_while_the_mouth_is_open() {
        let start = Instant::now();
        let mut session = playing();
        session.apply_input(GameInput::Direction(Direction::Down), start);
        session.tick(start);

        session.world_mut().food = Position::new(10, 13);
        let due = start + Duration::from_secs(16);
        session.tick(due);
        assert_eq!(session.world().snake.head(), Position::new(10, 12));
        assert!(!session.tongue_out(due));

        session.world_mut().food = Position::new(30, 20);
        let next = due + Duration::from_secs(1);
        session.tick(next);
        assert!(session.tongue_out(next));
    }
}

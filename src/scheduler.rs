//! Frame pacing for the host loop.
//!
//! Logic ticks run on a fixed wall-clock interval through an accumulator.
//! Rendering runs on its own minimum interval, picked from the average frame
//! rate measured over a rolling window. Pausing logic never delays rendering
//! and the other way round.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::{
    DEFAULT_TICK_INTERVAL_MS, FPS_DEGRADED, FPS_HEALTHY, FPS_SAMPLE_WINDOW, MAX_TICKS_PER_FRAME,
    RENDER_HZ_FULL, RENDER_HZ_MINIMAL, RENDER_HZ_REDUCED,
};

/// Rolling window of inter-frame durations.
#[derive(Debug, Clone)]
pub struct FrameStats {
    samples: VecDeque<Duration>,
    capacity: usize,
    total: Duration,
}

impl FrameStats {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            total: Duration::ZERO,
        }
    }

    /// Adds one sample, evicting the oldest when full.
    pub fn record(&mut self, frame_time: Duration) {
        if self.samples.len() == self.capacity {
            if let Some(oldest) = self.samples.pop_front() {
                self.total -= oldest;
            }
        }
        self.samples.push_back(frame_time);
        self.total += frame_time;
    }

    /// Average frames per second over the window; `None` until measurable.
    #[must_use]
    pub fn average_fps(&self) -> Option<f64> {
        if self.samples.is_empty() || self.total.is_zero() {
            return None;
        }

        Some(self.samples.len() as f64 / self.total.as_secs_f64())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.total = Duration::ZERO;
    }
}

/// Render-rate tier chosen from the measured frame rate.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RenderTier {
    Full,
    Reduced,
    Minimal,
}

impl RenderTier {
    /// Tier for an average FPS. No measurement yet means full rate.
    #[must_use]
    pub fn for_fps(fps: Option<f64>) -> Self {
        match fps {
            Some(fps) if fps < FPS_DEGRADED => Self::Minimal,
            Some(fps) if fps < FPS_HEALTHY => Self::Reduced,
            _ => Self::Full,
        }
    }

    #[must_use]
    pub fn target_hz(self) -> u32 {
        match self {
            Self::Full => RENDER_HZ_FULL,
            Self::Reduced => RENDER_HZ_REDUCED,
            Self::Minimal => RENDER_HZ_MINIMAL,
        }
    }

    /// Minimum time between two renders.
    #[must_use]
    pub fn min_interval(self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.target_hz()))
    }
}

/// Identifies one started loop. Handles from earlier starts are stale.
#[derive(Debug, PartialEq, Eq)]
pub struct LoopHandle {
    generation: u64,
}

/// What the host should do for this frame.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct FramePlan {
    pub logic_ticks: u32,
    pub render: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    pub tick_interval: Duration,
    pub max_ticks_per_frame: u32,
    pub fps_window: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            max_ticks_per_frame: MAX_TICKS_PER_FRAME,
            fps_window: FPS_SAMPLE_WINDOW,
        }
    }
}

/// Fixed-logic-rate, adaptive-render-rate frame scheduler.
#[derive(Debug)]
pub struct LoopScheduler {
    config: SchedulerConfig,
    generation: u64,
    running: bool,
    logic_paused: bool,
    render_paused: bool,
    last_logic_at: Option<Instant>,
    tick_accumulator: Duration,
    last_render_at: Option<Instant>,
    last_frame_at: Option<Instant>,
    stats: FrameStats,
    tier: RenderTier,
}

impl LoopScheduler {
    #[must_use]
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config: SchedulerConfig {
                tick_interval: config.tick_interval.max(Duration::from_millis(1)),
                ..config
            },
            generation: 0,
            running: false,
            logic_paused: false,
            render_paused: false,
            last_logic_at: None,
            tick_accumulator: Duration::ZERO,
            last_render_at: None,
            last_frame_at: None,
            stats: FrameStats::new(config.fps_window),
            tier: RenderTier::Full,
        }
    }

    /// Starts a new loop, invalidating any handle from a previous start.
    pub fn start(&mut self) -> LoopHandle {
        self.generation += 1;
        self.running = true;
        self.reset_logic_clock();
        self.reset_render_clock();
        debug!(generation = self.generation, "loop started");

        LoopHandle {
            generation: self.generation,
        }
    }

    /// Stops the loop; every outstanding handle becomes stale.
    pub fn stop(&mut self) {
        if self.running {
            debug!(generation = self.generation, "loop stopped");
        }
        self.running = false;
    }

    #[must_use]
    pub fn is_current(&self, handle: &LoopHandle) -> bool {
        self.running && handle.generation == self.generation
    }

    pub fn pause_logic(&mut self) {
        self.logic_paused = true;
    }

    /// Resumes ticking from `now` without replaying the paused time.
    pub fn resume_logic(&mut self) {
        if self.logic_paused {
            self.logic_paused = false;
            self.reset_logic_clock();
        }
    }

    /// Pauses or resumes logic only when the state actually changes.
    pub fn set_logic_active(&mut self, active: bool) {
        if active {
            self.resume_logic();
        } else {
            self.pause_logic();
        }
    }

    pub fn pause_render(&mut self) {
        self.render_paused = true;
    }

    /// Resumes rendering; the next frame renders immediately and the FPS
    /// window starts over.
    pub fn resume_render(&mut self) {
        if self.render_paused {
            self.render_paused = false;
            self.reset_render_clock();
        }
    }

    pub fn set_render_active(&mut self, active: bool) {
        if active {
            self.resume_render();
        } else {
            self.pause_render();
        }
    }

    #[must_use]
    pub fn is_logic_paused(&self) -> bool {
        self.logic_paused
    }

    #[must_use]
    pub fn is_render_paused(&self) -> bool {
        self.render_paused
    }

    #[must_use]
    pub fn tier(&self) -> RenderTier {
        self.tier
    }

    #[must_use]
    pub fn average_fps(&self) -> Option<f64> {
        self.stats.average_fps()
    }

    /// Plans the host frame at `now`. Returns `None` for a stale handle.
    pub fn frame(&mut self, handle: &LoopHandle, now: Instant) -> Option<FramePlan> {
        if !self.is_current(handle) {
            return None;
        }

        Some(FramePlan {
            logic_ticks: self.plan_logic(now),
            render: self.plan_render(now),
        })
    }

    fn plan_logic(&mut self, now: Instant) -> u32 {
        if self.logic_paused {
            return 0;
        }

        let Some(last) = self.last_logic_at.replace(now) else {
            return 0;
        };
        self.tick_accumulator += now.saturating_duration_since(last);

        let interval = self.config.tick_interval;
        let due = (self.tick_accumulator.as_nanos() / interval.as_nanos()) as u32;
        let ticks = due.min(self.config.max_ticks_per_frame);
        self.tick_accumulator -= interval * ticks;

        if due > ticks {
            debug!(dropped = due - ticks, "dropping tick backlog");
            self.tick_accumulator = Duration::ZERO;
        }

        ticks
    }

    fn plan_render(&mut self, now: Instant) -> bool {
        if self.render_paused {
            return false;
        }

        // Sampled per host frame so a throttled tier can still measure its way back up.
        if let Some(last_frame) = self.last_frame_at.replace(now) {
            self.stats.record(now.saturating_duration_since(last_frame));
            self.update_tier();
        }

        let Some(last) = self.last_render_at else {
            self.last_render_at = Some(now);
            return true;
        };

        if now.saturating_duration_since(last) < self.tier.min_interval() {
            return false;
        }

        self.last_render_at = Some(now);
        true
    }

    fn update_tier(&mut self) {
        let tier = RenderTier::for_fps(self.stats.average_fps());
        if tier != self.tier {
            info!(
                from = ?self.tier,
                to = ?tier,
                fps = ?self.stats.average_fps(),
                "render tier changed"
            );
            self.tier = tier;
        }
    }

    fn reset_logic_clock(&mut self) {
        self.last_logic_at = None;
        self.tick_accumulator = Duration::ZERO;
    }

    fn reset_render_clock(&mut self) {
        self.last_render_at = None;
        self.last_frame_at = None;
        self.stats.clear();
        self.tier = RenderTier::Full;
    }
}

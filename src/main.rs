use std::panic;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{error, info};

use jungle_snake::audio::BellAudio;
use jungle_snake::config::{
    FPS_SAMPLE_WINDOW, INPUT_POLL_INTERVAL_MS, MAX_TICKS_PER_FRAME, Settings,
};
use jungle_snake::error::AppError;
use jungle_snake::game::{GamePhase, GameSession, SessionConfig};
use jungle_snake::input::{GameInput, InputSource, KeyboardInput};
use jungle_snake::logging;
use jungle_snake::renderer;
use jungle_snake::scheduler::{LoopScheduler, SchedulerConfig};
use jungle_snake::score::JsonScoreStore;
use jungle_snake::sprites::SpriteSet;
use jungle_snake::terminal_runtime::{TerminalSession, restore_best_effort};
use jungle_snake::ui::hud::HudInfo;

type Session = GameSession<BellAudio, JsonScoreStore>;

#[derive(Debug, Parser)]
#[command(version, about = "Snake in a jungle of rocks, for the terminal")]
struct Cli {
    /// Settings file to use instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for food and obstacle placement.
    #[arg(long)]
    seed: Option<u64>,

    /// Custom sprite skin (JSON).
    #[arg(long)]
    skin: Option<PathBuf>,

    /// Start with sound cues muted.
    #[arg(long)]
    mute: bool,

    /// Show the measured frame rate in the HUD.
    #[arg(long)]
    fps: bool,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long)]
    log_level: Option<String>,

    /// Log file to append to.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(%error, "exiting with error");
            eprintln!("jungle-snake: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if cli.mute {
        settings.muted = true;
    }
    if let Some(skin) = cli.skin.clone() {
        settings.skin = Some(skin);
    }
    if let Some(level) = cli.log_level.clone() {
        settings.log_level = level;
    }
    settings.validate()?;

    let log_path = cli.log_file.clone().unwrap_or_else(logging::default_log_path);
    logging::init(&log_path, &settings.log_level)?;
    info!(?settings, seed = ?cli.seed, "starting");

    let sprites = SpriteSet::resolve(settings.skin.as_deref());
    let session = GameSession::new(
        SessionConfig {
            grid: settings.grid(),
            hit_animation: settings.hit_animation(),
            muted: settings.muted,
            seed: cli.seed,
        },
        BellAudio::stdout(),
        JsonScoreStore::open_default(),
    );
    let scheduler = LoopScheduler::new(SchedulerConfig {
        tick_interval: settings.tick_interval(),
        max_ticks_per_frame: MAX_TICKS_PER_FRAME,
        fps_window: FPS_SAMPLE_WINDOW,
    });

    install_panic_hook();
    let mut terminal = TerminalSession::enter()?;
    let result = run_loop(&mut terminal, session, scheduler, &sprites, cli.fps);
    drop(terminal);

    result
}

fn run_loop(
    terminal: &mut TerminalSession,
    mut session: Session,
    mut scheduler: LoopScheduler,
    sprites: &SpriteSet,
    show_fps: bool,
) -> Result<(), AppError> {
    let mut input = KeyboardInput;
    let handle = scheduler.start();
    let poll_interval = Duration::from_millis(INPUT_POLL_INTERVAL_MS);
    let mut last_phase = None;

    loop {
        let mut force_draw = false;
        if let Some(game_input) = input.poll_input(poll_interval)? {
            match game_input {
                GameInput::Quit => break,
                GameInput::Redraw => force_draw = true,
                other => {
                    session.apply_input(other, Instant::now());
                    // Render is paused on the game-over screen; show mute toggles anyway.
                    force_draw = !session.should_render();
                }
            }
        }

        let now = Instant::now();
        session.update(now);
        scheduler.set_logic_active(session.phase() == GamePhase::Running);
        scheduler.set_render_active(session.should_render());

        let Some(plan) = scheduler.frame(&handle, now) else {
            break;
        };
        for _ in 0..plan.logic_ticks {
            session.tick(now);
            if session.phase() != GamePhase::Running {
                break;
            }
        }

        let phase = session.phase();
        let phase_changed = last_phase != Some(phase);
        if plan.render || phase_changed || force_draw {
            let hud = HudInfo {
                score: session.score(),
                high_score: session.high_score(),
                length: session.world().snake.len(),
                muted: session.is_muted(),
                fps: show_fps.then(|| (scheduler.average_fps(), scheduler.tier())),
            };
            terminal
                .terminal_mut()
                .draw(|frame| renderer::render(frame, &session, sprites, &hud, now))?;
            last_phase = Some(phase);
        }
    }

    scheduler.stop();
    info!(score = session.score(), high_score = session.high_score(), "quit");
    Ok(())
}

fn install_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        restore_best_effort();
        default_hook(panic_info);
    }));
}

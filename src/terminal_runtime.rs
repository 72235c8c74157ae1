use std::io;

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;

use crate::config::CELL_WIDTH;
use crate::grid::GridSize;
use crate::ui::hud::HUD_HEIGHT;

/// Concrete terminal type used by the runtime.
pub type AppTerminal = Terminal<CrosstermBackend<io::Stdout>>;

/// Terminal columns and rows needed to draw the whole field, its border
/// and the HUD.
#[must_use]
pub fn required_size(grid: GridSize) -> (u16, u16) {
    (
        grid.width.saturating_mul(CELL_WIDTH).saturating_add(2),
        grid.height.saturating_add(2).saturating_add(HUD_HEIGHT),
    )
}

/// Returns true when `area` can hold the play field for `grid`.
#[must_use]
pub fn fits(area: Rect, grid: GridSize) -> bool {
    let (width, height) = required_size(grid);
    area.width >= width && area.height >= height
}

/// Owns terminal lifecycle (raw mode + alternate screen) for one run.
///
/// On drop, this type restores terminal state best-effort.
pub struct TerminalSession {
    terminal: AppTerminal,
}

impl TerminalSession {
    /// Enters raw mode, switches to alternate screen, and creates a ratatui terminal.
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        if let Err(error) = execute!(stdout, EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(error);
        }

        let backend = CrosstermBackend::new(stdout);
        match Terminal::new(backend) {
            Ok(terminal) => Ok(Self { terminal }),
            Err(error) => {
                restore_best_effort();
                Err(error)
            }
        }
    }

    pub fn terminal_mut(&mut self) -> &mut AppTerminal {
        &mut self.terminal
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        restore_best_effort();
    }
}

/// Leaves raw mode and the alternate screen, ignoring failures. Safe to
/// call more than once, e.g. from a panic hook.
pub fn restore_best_effort() {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, Show, LeaveAlternateScreen);
}

#[cfg(test)]
mod tests {
    use ratatui::layout::Rect;

    use super::{fits, required_size};
    use crate::grid::GridSize;
    use crate::ui::hud::HUD_HEIGHT;

    #[test]
    fn default_grid_needs_double_width_columns() {
        let grid = GridSize {
            width: 40,
            height: 24,
        };

        assert_eq!(required_size(grid), (82, 26 + HUD_HEIGHT));
        assert!(fits(Rect::new(0, 0, 82, 26 + HUD_HEIGHT), grid));
        assert!(!fits(Rect::new(0, 0, 81, 40), grid));
    }
}

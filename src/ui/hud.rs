use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::scheduler::RenderTier;

/// Rows the HUD occupies under the play field.
pub const HUD_HEIGHT: u16 = 2;

const LABEL: Color = Color::DarkGray;
const VALUE: Color = Color::White;
const ACCENT: Color = Color::LightGreen;

/// Values displayed by the HUD rows.
#[derive(Debug, Clone, Copy)]
pub struct HudInfo {
    pub score: u32,
    pub high_score: u32,
    pub length: usize,
    pub muted: bool,
    /// Measured FPS and render tier; `None` hides the readout.
    pub fps: Option<(Option<f64>, RenderTier)>,
}

/// Renders the two HUD rows into `area`.
pub fn render_hud(frame: &mut Frame<'_>, area: Rect, info: &HudInfo) {
    let top = Rect { height: 1, ..area };
    let bottom = Rect {
        y: area.y.saturating_add(1),
        height: area.height.saturating_sub(1).min(1),
        ..area
    };

    frame.render_widget(
        Paragraph::new(score_line(info)).alignment(Alignment::Left),
        top,
    );
    frame.render_widget(
        Paragraph::new(status_line(info)).alignment(Alignment::Left),
        bottom,
    );
}

fn score_line(info: &HudInfo) -> Line<'static> {
    let beaten = info.score > 0 && info.score >= info.high_score;
    let best_style = if beaten {
        Style::new().fg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::new().fg(VALUE)
    };

    Line::from(vec![
        Span::styled(" Score ", Style::new().fg(LABEL)),
        Span::styled(info.score.to_string(), Style::new().fg(VALUE).add_modifier(Modifier::BOLD)),
        Span::styled("   Best ", Style::new().fg(LABEL)),
        Span::styled(info.high_score.to_string(), best_style),
        Span::styled("   Length ", Style::new().fg(LABEL)),
        Span::styled(info.length.to_string(), Style::new().fg(VALUE)),
    ])
}

fn status_line(info: &HudInfo) -> Line<'static> {
    let mut spans = vec![Span::styled(
        " arrows/WASD move  Esc menu  m mute  q quit",
        Style::new().fg(LABEL),
    )];

    if info.muted {
        spans.push(Span::styled("   MUTED", Style::new().fg(Color::Yellow)));
    }

    if let Some((fps, tier)) = info.fps {
        spans.push(Span::styled(
            format!("   {} ({} Hz)", fps_text(fps), tier.target_hz()),
            Style::new().fg(LABEL),
        ));
    }

    Line::from(spans)
}

fn fps_text(fps: Option<f64>) -> String {
    match fps {
        Some(fps) => format!("{fps:.0} fps"),
        None => "-- fps".to_owned(),
    }
}

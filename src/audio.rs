use std::io::{self, Write};

use tracing::trace;

/// Sound cues the game emits. Playback is fire-and-forget.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum SoundEvent {
    ButtonClick,
    GameStart,
    Move,
    Eat,
    Collision,
    Hit,
    GameOver,
}

/// Something that can play sound cues.
pub trait AudioSink {
    fn play(&mut self, event: SoundEvent);
}

/// Drops every cue.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&mut self, event: SoundEvent) {
        trace!(?event, "sound dropped");
    }
}

/// Rings the terminal bell for the cues worth interrupting for.
#[derive(Debug)]
pub struct BellAudio<W: Write = io::Stdout> {
    out: W,
}

impl BellAudio {
    #[must_use]
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> BellAudio<W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[must_use]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> AudioSink for BellAudio<W> {
    fn play(&mut self, event: SoundEvent) {
        if !rings_bell(event) {
            return;
        }

        if let Err(error) = self.out.write_all(b"\x07").and_then(|()| self.out.flush()) {
            trace!(%error, "terminal bell failed");
        }
    }
}

fn rings_bell(event: SoundEvent) -> bool {
    matches!(event, SoundEvent::Eat | SoundEvent::Hit | SoundEvent::GameOver)
}

#[cfg(test)]
mod tests {
    use super::{AudioSink, BellAudio, SoundEvent};

    #[test]
    fn bell_rings_only_for_loud_cues() {
        let mut audio = BellAudio::new(Vec::new());

        audio.play(SoundEvent::Move);
        audio.play(SoundEvent::ButtonClick);
        audio.play(SoundEvent::Eat);
        audio.play(SoundEvent::Hit);

        assert_eq!(audio.into_inner(), b"\x07\x07".to_vec());
    }
}

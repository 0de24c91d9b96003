//! Fire-and-forget sound cues.
//!
//! Sinks consume [`GameEvent`]s and return nothing. A sink that fails turns
//! itself off; the failure never reaches the game loop.

use std::io::Write;

use tracing::debug;

use crate::game::GameEvent;

/// Sounds the game knows how to ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Eat,
    GameOver,
}

impl Cue {
    pub fn for_event(event: &GameEvent) -> Option<Cue> {
        match event {
            GameEvent::FoodEaten { .. } => Some(Cue::Eat),
            event if event.is_terminal() => Some(Cue::GameOver),
            _ => None,
        }
    }
}

pub trait SoundSink {
    fn play(&mut self, cue: Cue);

    fn on_event(&mut self, event: &GameEvent) {
        if let Some(cue) = Cue::for_event(event) {
            self.play(cue);
        }
    }
}

/// Plays nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct Muted;

impl SoundSink for Muted {
    fn play(&mut self, _cue: Cue) {}
}

/// Rings the terminal bell; once for food, twice for game over.
pub struct TerminalBell<W: Write = std::io::Stderr> {
    out: W,
    available: bool,
}

impl TerminalBell {
    pub fn new() -> Self {
        Self::with_writer(std::io::stderr())
    }
}

impl Default for TerminalBell {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> TerminalBell<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            out,
            available: true,
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    fn ring(&mut self, times: usize) -> std::io::Result<()> {
        for _ in 0..times {
            self.out.write_all(b"\x07")?;
        }
        self.out.flush()
    }
}

impl<W: Write> SoundSink for TerminalBell<W> {
    fn play(&mut self, cue: Cue) {
        if !self.available {
            return;
        }
        let times = match cue {
            Cue::Eat => 1,
            Cue::GameOver => 2,
        };
        if let Err(err) = self.ring(times) {
            debug!(error = %err, "terminal bell unavailable, muting");
            self.available = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_cue_mapping() {
        assert_eq!(
            Cue::for_event(&GameEvent::FoodEaten { score: 10 }),
            Some(Cue::Eat)
        );
        assert_eq!(
            Cue::for_event(&GameEvent::WallCollision),
            Some(Cue::GameOver)
        );
        assert_eq!(
            Cue::for_event(&GameEvent::SelfCollision {
                removed: 2,
                penalty: 20,
                fatal: false
            }),
            None
        );
        assert_eq!(Cue::for_event(&GameEvent::Reset), None);
    }

    #[test]
    fn test_bell_writes_bel_bytes() {
        let mut bell = TerminalBell::with_writer(Vec::new());
        bell.on_event(&GameEvent::FoodEaten { score: 10 });
        bell.on_event(&GameEvent::WallCollision);
        bell.on_event(&GameEvent::Started);
        assert_eq!(bell.out, b"\x07\x07\x07".to_vec());
    }

    #[test]
    fn test_failing_bell_mutes_itself() {
        let mut bell = TerminalBell::with_writer(BrokenPipe);
        bell.play(Cue::Eat);
        assert!(!bell.is_available());
        // later cues are silently skipped
        bell.play(Cue::GameOver);
    }
}

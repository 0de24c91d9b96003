use anyhow::{Context, Result};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEventKind, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::{Duration, Instant};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::audio::SoundSink;
use crate::game::{ConfigError, Direction, GameConfig, Phase};
use crate::input::gesture::cell_to_px;
use crate::input::{InputHandler, KeyAction, SwipeTracker, VirtualJoystick};
use crate::render::Renderer;
use crate::session::GameSession;

/// Roughly one display refresh
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Interactive play in the terminal.
///
/// Left-button drags are swipes. A right-button drag acts as a floating
/// joystick anchored where the button went down.
pub struct HumanMode {
    session: GameSession,
    renderer: Renderer,
    input_handler: InputHandler,
    swipe: SwipeTracker,
    joystick: VirtualJoystick,
    epoch: Instant,
    should_quit: bool,
}

impl HumanMode {
    pub fn new(config: GameConfig, sound: Box<dyn SoundSink>) -> Result<Self, ConfigError> {
        Ok(Self {
            session: GameSession::with_sound(config, sound)?,
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            swipe: SwipeTracker::new(),
            joystick: VirtualJoystick::new(),
            epoch: Instant::now(),
            should_quit: false,
        })
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen, EnableMouseCapture)
            .context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        info!(
            width = self.session.config().grid_width,
            height = self.session.config().grid_height,
            "terminal ready"
        );

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        let mut frame_timer = interval(FRAME_INTERVAL);
        frame_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(err)) => {
                            return Err(err).context("Failed to read terminal event");
                        }
                        None => self.should_quit = true,
                    }
                }

                // Advance the simulation and draw
                _ = frame_timer.tick() => {
                    let now = self.now_ms();
                    let snapshot = self.session.frame(now);
                    let renderer = &mut self.renderer;
                    terminal.draw(|frame| {
                        renderer.render(frame, &snapshot);
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        info!(
            games_played = self.session.metrics().games_played,
            high_score = self.session.metrics().high_score,
            "leaving"
        );
        Ok(())
    }

    fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => {
                // Only process key press events, not release
                if key.kind != KeyEventKind::Press {
                    return;
                }
                let action = self.input_handler.handle_key_event(key);
                self.apply(action);
            }
            Event::Mouse(mouse) => {
                if let Some(direction) = self.handle_mouse(mouse) {
                    self.session.submit_direction(direction);
                }
            }
            _ => {}
        }
    }

    fn apply(&mut self, action: KeyAction) {
        match action {
            KeyAction::Steer(direction) => {
                self.session.submit_direction(direction);
            }
            KeyAction::Play => match self.session.state().phase {
                Phase::NotStarted => self.session.start(),
                Phase::Over => self.session.restart(),
                Phase::AwaitingFirstInput | Phase::Running => {}
            },
            KeyAction::Restart => {
                self.session.restart();
            }
            KeyAction::SetDifficulty(difficulty) => {
                self.session.set_difficulty(difficulty);
            }
            KeyAction::CycleDifficulty => {
                self.session.cycle_difficulty();
            }
            KeyAction::Quit => {
                self.should_quit = true;
            }
            KeyAction::None => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Option<Direction> {
        let (x, y) = cell_to_px(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.swipe.begin(x, y);
                None
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let direction = self.swipe.end(x, y);
                if direction.is_some() {
                    debug!(?direction, "swipe");
                }
                direction
            }
            MouseEventKind::Down(MouseButton::Right) => self.joystick.grab((x, y), x, y).direction,
            MouseEventKind::Drag(MouseButton::Right) => self.joystick.drag(x, y).direction,
            MouseEventKind::Up(MouseButton::Right) => {
                self.joystick.release();
                None
            }
            _ => None,
        }
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(
            terminal.backend_mut(),
            DisableMouseCapture,
            LeaveAlternateScreen
        )
        .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Muted;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn mode() -> HumanMode {
        let mut config = GameConfig::small();
        config.rng_seed = Some(5);
        HumanMode::new(config, Box::new(Muted)).unwrap()
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_game_initialization() {
        let mode = mode();
        assert_eq!(mode.session().state().phase, Phase::NotStarted);
        assert_eq!(mode.session().state().score, 0);
    }

    #[test]
    fn test_play_then_steer() {
        let mut mode = mode();
        mode.handle_event(key(KeyCode::Char(' ')));
        assert_eq!(mode.session().state().phase, Phase::AwaitingFirstInput);

        mode.handle_event(key(KeyCode::Up));
        assert_eq!(mode.session().state().phase, Phase::Running);
        assert_eq!(mode.session().state().pending_direction, Direction::Up);
    }

    #[test]
    fn test_key_release_ignored() {
        let mut mode = mode();
        let mut release = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        mode.handle_event(Event::Key(release));
        assert_eq!(mode.session().state().phase, Phase::NotStarted);
    }

    #[test]
    fn test_swipe_steers() {
        let mut mode = mode();
        mode.handle_event(key(KeyCode::Enter));

        mode.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), 10, 10));
        mode.handle_event(mouse(MouseEventKind::Up(MouseButton::Left), 10, 13));
        assert_eq!(mode.session().state().phase, Phase::Running);
        assert_eq!(
            mode.session().state().pending_direction,
            Direction::Down
        );
    }

    #[test]
    fn test_joystick_steers() {
        let mut mode = mode();
        mode.handle_event(key(KeyCode::Enter));

        mode.handle_event(mouse(MouseEventKind::Down(MouseButton::Right), 20, 10));
        // Still inside the dead zone
        assert_eq!(mode.session().state().phase, Phase::AwaitingFirstInput);

        mode.handle_event(mouse(MouseEventKind::Drag(MouseButton::Right), 20, 8));
        assert_eq!(mode.session().state().pending_direction, Direction::Up);

        mode.handle_event(mouse(MouseEventKind::Up(MouseButton::Right), 20, 8));
        assert!(!mode.joystick.is_dragging());
    }

    #[test]
    fn test_difficulty_and_quit() {
        let mut mode = mode();
        mode.handle_event(key(KeyCode::Char('3')));
        assert_eq!(mode.session().difficulty(), crate::game::Difficulty::High);

        mode.handle_event(key(KeyCode::Char('q')));
        assert!(mode.should_quit);
    }

    #[test]
    fn test_restart_from_game_over() {
        let mut mode = mode();
        mode.handle_event(key(KeyCode::Char(' ')));
        mode.handle_event(key(KeyCode::Right));

        // Drive the snake into the right wall
        let mut now = 0.0;
        while !mode.session().state().is_over() && now < 10_000.0 {
            now += 16.0;
            mode.session.frame(now);
        }
        assert!(mode.session().state().is_over());

        mode.handle_event(key(KeyCode::Char('r')));
        assert_eq!(mode.session().state().phase, Phase::AwaitingFirstInput);
        assert_eq!(mode.session().metrics().games_played, 1);
    }
}

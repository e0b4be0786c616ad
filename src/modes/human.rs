use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use log::{info, warn};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{stderr, Stderr};
use std::time::SystemTime;

use crate::game::{GameEngine, GameState};
use crate::input::{InputHandler, KeyAction};
use crate::leaderboard::{GameScore, ScoreStore};
use crate::render::{Renderer, ScorePanel};
use crate::runtime::GameSession;

/// Interactive terminal game
///
/// Sends key presses to the session, redraws whenever the session reports a change
/// and saves the score once a game ends.
pub struct HumanMode {
    session: GameSession,
    store: Box<dyn ScoreStore>,
    renderer: Renderer,
    input_handler: InputHandler,
    panel: ScorePanel,
    top_limit: usize,
    last_state: GameState,
    should_quit: bool,
}

impl HumanMode {
    pub fn new(
        engine: GameEngine,
        store: Box<dyn ScoreStore>,
        player_name: String,
        top_limit: usize,
    ) -> Self {
        let session = GameSession::new(engine);
        session.load_new_game();

        let mut mode = Self {
            session,
            store,
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            panel: ScorePanel {
                player_name,
                ..ScorePanel::default()
            },
            top_limit,
            last_state: GameState::Menu,
            should_quit: false,
        };
        mode.refresh_scores();
        mode
    }

    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        let result = self.run_game_loop(&mut terminal).await;

        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();
        let mut changes = self.session.subscribe();

        self.draw(terminal)?;

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event)?,
                        Some(Err(err)) => return Err(err).context("Failed to read terminal event"),
                        None => self.should_quit = true,
                    }
                }

                alive = changes.changed() => {
                    if !alive {
                        self.should_quit = true;
                    }
                }

                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }

            self.sync_state();
            self.draw(terminal)?;
        }

        Ok(())
    }

    fn draw(&self, terminal: &mut Terminal<CrosstermBackend<Stderr>>) -> Result<()> {
        let snapshot = self.session.snapshot();
        terminal
            .draw(|frame| self.renderer.render(frame, &snapshot, &self.panel))
            .context("Failed to draw frame")?;
        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        if let Event::Key(key) = event {
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }
            let action = self.input_handler.handle_key_event(key);
            self.apply_key(action)?;
        }
        Ok(())
    }

    fn apply_key(&mut self, action: KeyAction) -> Result<()> {
        match action {
            KeyAction::Turn(direction) => {
                self.session.change_direction(direction);
            }
            KeyAction::NewGame => {
                // A game that just ended must be recorded before it is replaced
                self.sync_state();
                self.panel.save_message = None;
                self.session
                    .start_new_game()
                    .context("Failed to start a new game")?;
            }
            KeyAction::TogglePause => {
                self.session
                    .toggle_pause()
                    .context("Failed to toggle pause")?;
            }
            KeyAction::Quit => {
                self.should_quit = true;
            }
            KeyAction::None => {}
        }
        Ok(())
    }

    /// Catch up with the session, saving the score when a game has just ended
    fn sync_state(&mut self) {
        let state = self.session.state();
        if state == GameState::GameOver && self.last_state != GameState::GameOver {
            self.record_score();
        }
        self.last_state = state;
    }

    fn record_score(&mut self) {
        let snapshot = self.session.snapshot();
        let score = GameScore::new(
            self.panel.player_name.clone(),
            snapshot.score,
            snapshot.total_levels_completed,
            snapshot.game_over_at.unwrap_or_else(SystemTime::now),
        );

        let message = match self.store.save_player_score(score) {
            Ok(outcome) => {
                info!(
                    "Saved score {} for {}: {:?}",
                    snapshot.score, self.panel.player_name, outcome
                );
                outcome.message().to_string()
            }
            Err(err) => {
                warn!("Failed to save score: {}", err);
                format!("Could not save score: {}", err)
            }
        };
        self.panel.save_message = Some(message);
        self.refresh_scores();
    }

    fn refresh_scores(&mut self) {
        match self.store.top_scores(self.top_limit) {
            Ok(top) => self.panel.top_scores = top,
            Err(err) => warn!("Failed to read leaderboard: {}", err),
        }
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

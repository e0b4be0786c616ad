//! Live game session: engine, tick loop and change notifications wired together
//!
//! The engine sits behind a mutex that is only held for synchronous state mutation,
//! never across an `.await`. A transition and the loop change it implies happen under
//! one hold of that mutex, so the loop always matches the state that produced it. Every
//! externally visible transition bumps a revision counter on a watch channel;
//! subscribers treat a bump as "re-read everything".

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use log::{error, info};
use tokio::sync::watch;

use crate::game::{Direction, GameEngine, GameSnapshot, GameState, LoopDirective};

use super::scheduler::{SchedulerError, TickScheduler};

/// Subscription to a session's state-changed signal
///
/// Carries no payload. Several changes between two polls may be observed as one.
#[derive(Clone)]
pub struct StateChanges {
    rx: watch::Receiver<u64>,
}

impl StateChanges {
    /// Wait for the next change; `false` once the session is gone
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Number of notifications raised so far
    pub fn revision(&self) -> u64 {
        *self.rx.borrow()
    }
}

struct Shared {
    engine: Mutex<GameEngine>,
    scheduler: TickScheduler,
    changes: watch::Sender<u64>,
}

impl Shared {
    fn engine(&self) -> MutexGuard<'_, GameEngine> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        self.changes.send_modify(|revision| *revision += 1);
    }

    fn apply(self: &Arc<Self>, directive: LoopDirective) -> Result<(), SchedulerError> {
        match directive {
            LoopDirective::Stop => {
                self.scheduler.stop();
                Ok(())
            }
            LoopDirective::Start(period) => {
                let shared = Arc::downgrade(self);
                self.scheduler.start(move || on_tick(shared.clone()), period)
            }
        }
    }
}

async fn on_tick(shared: Weak<Shared>) {
    let Some(shared) = shared.upgrade() else {
        return;
    };

    let mut engine = shared.engine();
    let outcome = engine.tick();
    if let Some(directive) = outcome.loop_directive() {
        // A level change restarts the loop from inside this tick; the current loop
        // exits once we return.
        if let Err(err) = shared.apply(directive) {
            error!("Failed to apply {:?} after {:?}: {}", directive, outcome, err);
            shared.scheduler.stop();
        }
    }
    drop(engine);

    if outcome.changed_state() {
        shared.notify();
    }
}

/// A running game: the public face of the engine for a UI
///
/// Commands mirror [`GameEngine`] and additionally drive the tick loop. Must be used
/// from within a tokio runtime. Dropping the session stops its loop.
pub struct GameSession {
    shared: Arc<Shared>,
}

impl GameSession {
    pub fn new(engine: GameEngine) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            shared: Arc::new(Shared {
                engine: Mutex::new(engine),
                scheduler: TickScheduler::new(),
                changes,
            }),
        }
    }

    pub fn subscribe(&self) -> StateChanges {
        StateChanges {
            rx: self.shared.changes.subscribe(),
        }
    }

    /// Stop any running loop and load a fresh game in the Menu state
    pub fn load_new_game(&self) {
        {
            let mut engine = self.shared.engine();
            // Stop never fails
            let _ = self.shared.apply(engine.load_new_game());
        }
        self.shared.notify();
    }

    /// Load a fresh game and start playing it
    pub fn start_new_game(&self) -> Result<(), SchedulerError> {
        let started = {
            let mut engine = self.shared.engine();
            self.shared.scheduler.stop();
            let directive = engine.start_new_game();
            self.shared.apply(directive)
        };
        self.shared.notify();
        started
    }

    /// Pause a game in progress; ignored in any other state
    pub fn pause_game(&self) {
        let paused = {
            let mut engine = self.shared.engine();
            engine
                .pause_game()
                .map(|directive| self.shared.apply(directive))
        };
        if paused.is_some() {
            self.shared.notify();
        }
    }

    /// Resume a paused game; ignored in any other state
    pub fn resume_game(&self) -> Result<(), SchedulerError> {
        let resumed = {
            let mut engine = self.shared.engine();
            engine
                .resume_game()
                .map(|directive| self.shared.apply(directive))
        };
        let Some(resumed) = resumed else {
            return Ok(());
        };
        self.shared.notify();
        resumed
    }

    /// Pause when playing, resume when paused
    pub fn toggle_pause(&self) -> Result<(), SchedulerError> {
        let toggled = {
            let mut engine = self.shared.engine();
            let directive = match engine.state() {
                GameState::Playing => engine.pause_game(),
                GameState::Paused => engine.resume_game(),
                GameState::Menu | GameState::GameOver => None,
            };
            directive.map(|directive| self.shared.apply(directive))
        };
        let Some(toggled) = toggled else {
            return Ok(());
        };
        self.shared.notify();
        toggled
    }

    /// Returns whether the heading changed
    pub fn change_direction(&self, direction: Direction) -> bool {
        self.shared.engine().change_direction(direction)
    }

    pub fn state(&self) -> GameState {
        self.shared.engine().state()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.shared.engine().snapshot()
    }

    pub fn is_loop_running(&self) -> bool {
        self.shared.scheduler.is_running()
    }
}

impl Drop for GameSession {
    fn drop(&mut self) {
        info!("Game session closed");
        self.shared.scheduler.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{FoodItem, FoodTier, GameConfig, GridPoint, Snake};
    use std::time::Duration;
    use tokio::time::sleep;

    fn session() -> GameSession {
        GameSession::new(GameEngine::with_seed(GameConfig::default(), 9).unwrap())
    }

    /// Keep random food off row 1, where the snake runs
    fn clear_path(session: &GameSession) {
        session
            .shared
            .engine()
            .place_food(Some(FoodItem::new(GridPoint::new(0, 19), FoodTier::Normal, 5)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_runs_the_loop() {
        let session = session();
        let changes = session.subscribe();
        session.load_new_game();
        assert_eq!(session.state(), GameState::Menu);
        assert!(!session.is_loop_running());

        session.start_new_game().unwrap();
        clear_path(&session);
        assert_eq!(session.state(), GameState::Playing);
        assert!(session.is_loop_running());
        let revision = changes.revision();

        // 200ms per tick on level 1
        sleep(Duration::from_millis(450)).await;
        let snapshot = session.snapshot();
        assert_eq!(snapshot.snake.head(), GridPoint::new(5, 1));
        assert_eq!(snapshot.snake.len(), 10);
        assert_eq!(changes.revision(), revision + 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_freezes_and_resume_continues() {
        let session = session();
        session.start_new_game().unwrap();
        clear_path(&session);

        sleep(Duration::from_millis(250)).await;
        session.pause_game();
        assert_eq!(session.state(), GameState::Paused);
        assert!(!session.is_loop_running());
        let head = session.snapshot().snake.head();

        sleep(Duration::from_millis(1000)).await;
        assert_eq!(session.snapshot().snake.head(), head);

        session.toggle_pause().unwrap();
        assert_eq!(session.state(), GameState::Playing);
        assert!(session.is_loop_running());
        sleep(Duration::from_millis(250)).await;
        assert_ne!(session.snapshot().snake.head(), head);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ignored_commands_do_not_notify() {
        let session = session();
        let changes = session.subscribe();
        let revision = changes.revision();

        session.pause_game();
        session.resume_game().unwrap();
        assert_eq!(changes.revision(), revision);
        assert_eq!(session.state(), GameState::Menu);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wall_collision_ends_game_and_stops_loop() {
        let session = session();
        let mut changes = session.subscribe();
        session.start_new_game().unwrap();
        clear_path(&session);

        // Head starts at x=3 and leaves the 20-wide board on the 17th tick
        sleep(Duration::from_millis(200 * 17 + 50)).await;

        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, GameState::GameOver);
        assert!(snapshot.game_over_at.is_some());
        assert!(!session.is_loop_running());
        assert!(changes.changed().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_level_advance_restarts_loop_faster() {
        let session = session();
        session.start_new_game().unwrap();
        {
            let mut engine = session.shared.engine();
            engine.board_mut().open_gate();
            engine.replace_snake(Snake::new(GridPoint::new(9, 1), Direction::Right, 3));
        }

        sleep(Duration::from_millis(250)).await;
        let snapshot = session.snapshot();
        assert_eq!(snapshot.current_level, 2);
        assert_eq!(snapshot.total_levels_completed, 1);
        assert_eq!(snapshot.state, GameState::Playing);
        assert!(session.is_loop_running());
        assert_eq!(
            session.shared.scheduler.period(),
            Some(Duration::from_millis(180))
        );
        assert_eq!(snapshot.tick_interval, Duration::from_millis(180));
    }

    #[tokio::test(start_paused = true)]
    async fn test_direction_change_applies_on_next_tick() {
        let session = session();
        session.start_new_game().unwrap();
        clear_path(&session);

        assert!(session.change_direction(Direction::Down));
        assert!(!session.change_direction(Direction::Left));

        sleep(Duration::from_millis(250)).await;
        assert_eq!(session.snapshot().snake.head(), GridPoint::new(3, 2));
        assert!(session.change_direction(Direction::Right));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_new_game_racing_a_fatal_tick_keeps_loop_running() {
        for _ in 0..200 {
            let session = Arc::new(session());
            session.start_new_game().unwrap();
            clear_path(&session);
            session
                .shared
                .engine()
                .replace_snake(Snake::new(GridPoint::new(19, 1), Direction::Right, 3));

            let tick = tokio::spawn(on_tick(Arc::downgrade(&session.shared)));
            let restart = {
                let session = Arc::clone(&session);
                tokio::spawn(async move { session.start_new_game() })
            };
            tick.await.unwrap();
            restart.await.unwrap().unwrap();

            // Either the game ended first and was restarted, or the fresh game took
            // the tick; both leave a running loop behind a Playing state
            assert_eq!(session.state(), GameState::Playing);
            assert!(session.is_loop_running());
            assert_eq!(
                session.shared.scheduler.period(),
                Some(Duration::from_millis(200))
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_tick_then_new_game_keeps_ticking() {
        let session = session();
        session.start_new_game().unwrap();
        clear_path(&session);
        session
            .shared
            .engine()
            .replace_snake(Snake::new(GridPoint::new(19, 1), Direction::Right, 3));

        on_tick(Arc::downgrade(&session.shared)).await;
        assert_eq!(session.state(), GameState::GameOver);
        assert!(!session.is_loop_running());

        session.start_new_game().unwrap();
        clear_path(&session);
        let head = session.snapshot().snake.head();
        sleep(Duration::from_millis(450)).await;
        assert_eq!(session.state(), GameState::Playing);
        assert!(session.is_loop_running());
        assert_ne!(session.snapshot().snake.head(), head);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_session_stops_ticks() {
        let session = session();
        session.start_new_game().unwrap();
        let mut changes = session.subscribe();
        drop(session);

        assert!(!changes.changed().await);
    }
}

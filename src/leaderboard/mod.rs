//! Persisted leaderboard
//!
//! One entry per player (names compare case-insensitively). A player's entry only
//! changes when they beat their own best. The game engine never touches this module;
//! the UI saves a score after a game ends.

pub mod json_store;
pub mod store;

use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use json_store::JsonScoreStore;
pub use store::{MemoryScoreStore, ScoreStore};

/// Number of entries shown by default
pub const DEFAULT_TOP_SCORES: usize = 10;
/// Longest accepted player name, in characters
pub const MAX_PLAYER_NAME_LEN: usize = 50;

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("player name must be 1-{MAX_PLAYER_NAME_LEN} characters, got {0:?}")]
    InvalidPlayerName(String),
    #[error("failed to access leaderboard file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("leaderboard file {path:?} is corrupt")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A player's best result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameScore {
    pub player_name: String,
    pub score: u32,
    pub total_levels_completed: u32,
    /// Unix timestamp (ms) when achieved
    pub achieved_at_ms: u64,
}

impl GameScore {
    pub fn new(
        player_name: impl Into<String>,
        score: u32,
        total_levels_completed: u32,
        achieved_at: SystemTime,
    ) -> Self {
        let achieved_at_ms = achieved_at
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_millis() as u64;
        Self {
            player_name: player_name.into(),
            score,
            total_levels_completed,
            achieved_at_ms,
        }
    }
}

/// Result of saving a score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// First entry for this player
    InsertedNew,
    /// Beat the player's previous best
    UpdatedHighScore,
    /// Not better than the player's previous best; nothing stored
    ScoreTooLow,
}

impl SaveOutcome {
    /// Feedback line for the player
    pub fn message(&self) -> &'static str {
        match self {
            SaveOutcome::InsertedNew => "Score saved to the leaderboard",
            SaveOutcome::UpdatedHighScore => "New personal best!",
            SaveOutcome::ScoreTooLow => "Your previous best is higher; score not saved",
        }
    }
}

/// Leaderboard contents and the rules for changing them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    entries: Vec<GameScore>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a score, keeping only each player's best
    pub fn save(&mut self, mut score: GameScore) -> Result<SaveOutcome, LeaderboardError> {
        let name = score.player_name.trim();
        if name.is_empty() || name.chars().count() > MAX_PLAYER_NAME_LEN {
            return Err(LeaderboardError::InvalidPlayerName(score.player_name));
        }
        score.player_name = name.to_string();

        let existing = self
            .entries
            .iter_mut()
            .find(|entry| same_player(&entry.player_name, &score.player_name));

        match existing {
            Some(entry) if entry.score < score.score => {
                entry.score = score.score;
                entry.total_levels_completed = score.total_levels_completed;
                entry.achieved_at_ms = score.achieved_at_ms;
                Ok(SaveOutcome::UpdatedHighScore)
            }
            Some(_) => Ok(SaveOutcome::ScoreTooLow),
            None => {
                self.entries.push(score);
                Ok(SaveOutcome::InsertedNew)
            }
        }
    }

    /// Best `limit` entries, highest score first; ties go to the earlier achievement
    pub fn top(&self, limit: usize) -> Vec<GameScore> {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(a.achieved_at_ms.cmp(&b.achieved_at_ms))
        });
        entries.truncate(limit);
        entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn same_player(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Format a timestamp as a relative date string
pub fn format_age(achieved_at_ms: u64, now: SystemTime) -> String {
    let now_ms = now
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64;
    let mins = now_ms.saturating_sub(achieved_at_ms) / 60_000;
    let hours = mins / 60;
    let days = hours / 24;

    if days >= 1 {
        if days == 1 {
            "Yesterday".to_string()
        } else {
            format!("{} days ago", days)
        }
    } else if hours >= 1 {
        if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", hours)
        }
    } else if mins >= 1 {
        if mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", mins)
        }
    } else {
        "Just now".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(name: &str, score: u32, at: u64) -> GameScore {
        GameScore {
            player_name: name.to_string(),
            score,
            total_levels_completed: 0,
            achieved_at_ms: at,
        }
    }

    #[test]
    fn test_tri_state_save() {
        let mut board = Leaderboard::new();
        assert_eq!(
            board.save(score("Ada", 50, 1)).unwrap(),
            SaveOutcome::InsertedNew
        );
        assert_eq!(
            board.save(score("ada", 40, 2)).unwrap(),
            SaveOutcome::ScoreTooLow
        );
        assert_eq!(
            board.save(score("ADA", 50, 3)).unwrap(),
            SaveOutcome::ScoreTooLow
        );
        assert_eq!(
            board.save(score("  ada ", 70, 4)).unwrap(),
            SaveOutcome::UpdatedHighScore
        );

        let top = board.top(10);
        assert_eq!(top.len(), 1);
        // First spelling is kept
        assert_eq!(top[0].player_name, "Ada");
        assert_eq!(top[0].score, 70);
        assert_eq!(top[0].achieved_at_ms, 4);
    }

    #[test]
    fn test_invalid_names_rejected() {
        let mut board = Leaderboard::new();
        assert!(matches!(
            board.save(score("   ", 10, 0)),
            Err(LeaderboardError::InvalidPlayerName(_))
        ));
        let long = "x".repeat(MAX_PLAYER_NAME_LEN + 1);
        assert!(board.save(score(&long, 10, 0)).is_err());
        assert!(board.is_empty());
    }

    #[test]
    fn test_top_is_sorted_and_limited() {
        let mut board = Leaderboard::new();
        for (i, (name, points)) in [("a", 10), ("b", 30), ("c", 20), ("d", 30)]
            .into_iter()
            .enumerate()
        {
            board.save(score(name, points, i as u64)).unwrap();
        }

        let names: Vec<_> = board
            .top(3)
            .into_iter()
            .map(|entry| entry.player_name)
            .collect();
        assert_eq!(names, vec!["b", "d", "c"]);
        assert_eq!(board.top(DEFAULT_TOP_SCORES).len(), 4);

        board.clear();
        assert!(board.top(10).is_empty());
    }

    #[test]
    fn test_game_score_from_system_time() {
        let at = UNIX_EPOCH + Duration::from_millis(1_234);
        let entry = GameScore::new("p", 5, 2, at);
        assert_eq!(entry.achieved_at_ms, 1_234);
        assert_eq!(entry.total_levels_completed, 2);
    }

    #[test]
    fn test_format_age() {
        let now = UNIX_EPOCH + Duration::from_secs(10 * 24 * 3600);
        let now_ms = 10 * 24 * 3600 * 1000;
        assert_eq!(format_age(now_ms, now), "Just now");
        assert_eq!(format_age(now_ms - 90_000, now), "1 min ago");
        assert_eq!(format_age(now_ms - 3 * 3_600_000, now), "3 hours ago");
        assert_eq!(format_age(now_ms - 25 * 3_600_000, now), "Yesterday");
        assert_eq!(format_age(now_ms - 5 * 86_400_000, now), "5 days ago");
    }
}

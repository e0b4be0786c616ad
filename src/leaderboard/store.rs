use super::{GameScore, Leaderboard, LeaderboardError, SaveOutcome};

/// Read/write contract of a score store
pub trait ScoreStore: Send {
    /// Insert or improve the player's entry
    fn save_player_score(&mut self, score: GameScore) -> Result<SaveOutcome, LeaderboardError>;

    /// Best `limit` entries, highest first
    fn top_scores(&self, limit: usize) -> Result<Vec<GameScore>, LeaderboardError>;

    /// Remove every entry
    fn clear(&mut self) -> Result<(), LeaderboardError>;
}

/// Non-persistent store
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    leaderboard: Leaderboard,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryScoreStore {
    fn save_player_score(&mut self, score: GameScore) -> Result<SaveOutcome, LeaderboardError> {
        self.leaderboard.save(score)
    }

    fn top_scores(&self, limit: usize) -> Result<Vec<GameScore>, LeaderboardError> {
        Ok(self.leaderboard.top(limit))
    }

    fn clear(&mut self) -> Result<(), LeaderboardError> {
        self.leaderboard.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryScoreStore::new();
        let entry = GameScore {
            player_name: "p1".into(),
            score: 25,
            total_levels_completed: 1,
            achieved_at_ms: 0,
        };

        assert_eq!(
            store.save_player_score(entry.clone()).unwrap(),
            SaveOutcome::InsertedNew
        );
        assert_eq!(store.top_scores(5).unwrap(), vec![entry]);

        store.clear().unwrap();
        assert!(store.top_scores(5).unwrap().is_empty());
    }
}

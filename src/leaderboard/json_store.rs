use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use super::store::ScoreStore;
use super::{GameScore, Leaderboard, LeaderboardError, SaveOutcome};

/// Leaderboard kept in a JSON file
///
/// The whole file is rewritten on every change, via a temporary sibling file and a
/// rename, so a crash never leaves a half-written leaderboard behind.
#[derive(Debug)]
pub struct JsonScoreStore {
    path: PathBuf,
    leaderboard: Leaderboard,
}

impl JsonScoreStore {
    /// Open the file at `path`; a missing file is an empty leaderboard
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LeaderboardError> {
        let path = path.into();
        let leaderboard = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|source| {
                LeaderboardError::Corrupt {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("No leaderboard at {:?}, starting empty", path);
                Leaderboard::new()
            }
            Err(source) => return Err(LeaderboardError::Io { path, source }),
        };

        Ok(Self { path, leaderboard })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), LeaderboardError> {
        let io_err = |source| LeaderboardError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(&self.leaderboard).map_err(|source| {
            LeaderboardError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_err)?;
        if let Err(err) = fs::rename(&tmp, &self.path) {
            warn!("Could not replace {:?}: {}", self.path, err);
            let _ = fs::remove_file(&tmp);
            return Err(io_err(err));
        }
        Ok(())
    }
}

impl ScoreStore for JsonScoreStore {
    fn save_player_score(&mut self, score: GameScore) -> Result<SaveOutcome, LeaderboardError> {
        let before = self.leaderboard.clone();
        let outcome = self.leaderboard.save(score)?;
        if outcome != SaveOutcome::ScoreTooLow {
            if let Err(err) = self.persist() {
                self.leaderboard = before;
                return Err(err);
            }
        }
        Ok(outcome)
    }

    fn top_scores(&self, limit: usize) -> Result<Vec<GameScore>, LeaderboardError> {
        Ok(self.leaderboard.top(limit))
    }

    fn clear(&mut self) -> Result<(), LeaderboardError> {
        let before = std::mem::take(&mut self.leaderboard);
        if let Err(err) = self.persist() {
            self.leaderboard = before;
            return Err(err);
        }
        Ok(())
    }
}

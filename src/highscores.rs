//! High score table
//!
//! Persisted through a `Storage` backend, tracks the top 5 scores.

use serde::{Deserialize, Serialize};

use crate::persistence::Storage;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 5;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Unix timestamp (ms) when achieved
    pub date: f64,
}

/// High score table, sorted best first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HighScores {
    #[serde(default)]
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "bounce_sandbox_highscores";

    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the table
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Add a score if it qualifies. Returns the rank achieved (1-indexed).
    pub fn add_score(&mut self, score: u64, date: f64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry { score, date };

        // Ties go after existing entries
        let pos = self
            .entries
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_HIGH_SCORES);

        Some(pos + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Restore ordering and size after loading untrusted data
    fn normalize(&mut self) {
        self.entries.retain(|e| e.score > 0);
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_HIGH_SCORES);
    }

    /// Load high scores, starting fresh on missing or corrupt data
    pub fn load(storage: &dyn Storage) -> Self {
        match storage.get_item(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<HighScores>(&json) {
                Ok(mut scores) => {
                    scores.normalize();
                    log::info!("Loaded {} high scores", scores.entries.len());
                    scores
                }
                Err(e) => {
                    log::warn!("Ignoring corrupt high scores ({}), starting fresh", e);
                    Self::new()
                }
            },
            Ok(None) => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("Could not read high scores ({}), starting fresh", e);
                Self::new()
            }
        }
    }

    /// Save high scores. Failures are logged, never fatal.
    pub fn save(&self, storage: &mut dyn Storage) {
        let result = serde_json::to_string(self)
            .map_err(Into::into)
            .and_then(|json| storage.set_item(Self::STORAGE_KEY, &json));

        match result {
            Ok(()) => log::info!("High scores saved ({} entries)", self.entries.len()),
            Err(e) => log::warn!("Failed to save high scores: {}", e),
        }
    }
}

/// Format a timestamp relative to `now` (both Unix ms)
pub fn format_date(timestamp: f64, now: f64) -> String {
    let diff_mins = (now - timestamp) / 60_000.0;
    let diff_hours = diff_mins / 60.0;
    let diff_days = diff_hours / 24.0;

    if diff_days >= 1.0 {
        let days = diff_days.floor() as i64;
        if days == 1 {
            "Yesterday".to_string()
        } else {
            format!("{} days ago", days)
        }
    } else if diff_hours >= 1.0 {
        let hours = diff_hours.floor() as i64;
        if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", hours)
        }
    } else if diff_mins >= 1.0 {
        let mins = diff_mins.floor() as i64;
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
    use crate::persistence::MemoryStorage;

    #[test]
    fn test_zero_never_qualifies() {
        let scores = HighScores::new();
        assert!(!scores.qualifies(0));
        assert!(scores.qualifies(1));
    }

    #[test]
    fn test_add_score_keeps_top_five_sorted() {
        let mut scores = HighScores::new();
        for (i, s) in [30, 10, 50, 20, 40].into_iter().enumerate() {
            assert!(scores.add_score(s, i as f64).is_some());
        }
        assert_eq!(scores.top_score(), Some(50));

        // Too low once the table is full
        assert_eq!(scores.add_score(5, 9.0), None);

        assert_eq!(scores.add_score(45, 10.0), Some(2));
        let ranked: Vec<u64> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(ranked, vec![50, 45, 40, 30, 20]);
    }

    #[test]
    fn test_round_trip_through_storage() {
        let mut storage = MemoryStorage::new();
        let mut scores = HighScores::new();
        scores.add_score(12, 1_700_000_000_000.0);
        scores.save(&mut storage);

        assert_eq!(HighScores::load(&storage), scores);
    }

    #[test]
    fn test_corrupt_data_starts_fresh() {
        let mut storage = MemoryStorage::new();
        storage.set_item(HighScores::STORAGE_KEY, "[[[").unwrap();
        assert!(HighScores::load(&storage).is_empty());
    }

    #[test]
    fn test_load_normalizes_untrusted_entries() {
        let mut storage = MemoryStorage::new();
        let json = r#"{"entries":[
            {"score":3,"date":0},{"score":0,"date":0},{"score":9,"date":0},
            {"score":1,"date":0},{"score":7,"date":0},{"score":5,"date":0},
            {"score":8,"date":0}
        ]}"#;
        storage.set_item(HighScores::STORAGE_KEY, json).unwrap();

        let scores = HighScores::load(&storage);
        let ranked: Vec<u64> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(ranked, vec![9, 8, 7, 5, 3]);
    }

    #[test]
    fn test_format_date() {
        let now = 10.0 * 24.0 * 3_600_000.0;
        assert_eq!(format_date(now - 5_000.0, now), "Just now");
        assert_eq!(format_date(now - 60_000.0, now), "1 min ago");
        assert_eq!(format_date(now - 5.0 * 60_000.0, now), "5 mins ago");
        assert_eq!(format_date(now - 3_600_000.0, now), "1 hour ago");
        assert_eq!(format_date(now - 24.0 * 3_600_000.0, now), "Yesterday");
        assert_eq!(format_date(now - 3.0 * 24.0 * 3_600_000.0, now), "3 days ago");
    }
}

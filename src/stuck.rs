// Loop detection for bot players
//
// A snake that cannot make progress ends up repeating the exact same body
// layout. The detector keeps fingerprints of the recent bodies and reports
// the snake as stuck once the newest layout has been seen often enough.

use std::collections::hash_map::DefaultHasher;
use std::collections::VecDeque;
use std::hash::{Hash, Hasher};

use crate::config::StuckDetectionConfig;
use crate::snake_body::SnakeBody;

#[derive(Debug, Clone, PartialEq)]
pub struct StuckSnakeDetector {
    history: VecDeque<u64>,
    history_length: usize,
    repeat_threshold: usize,
    enabled: bool,
}

impl StuckSnakeDetector {
    pub fn new(config: &StuckDetectionConfig) -> Self {
        StuckSnakeDetector {
            history: VecDeque::with_capacity(config.history_length),
            history_length: config.history_length.max(1),
            repeat_threshold: config.repeat_threshold.max(2),
            enabled: config.enabled,
        }
    }

    /// Records the body reached after a tick
    pub fn feed(&mut self, body: &SnakeBody) {
        if self.history.len() == self.history_length {
            self.history.pop_front();
        }
        self.history.push_back(Self::fingerprint(body));
    }

    /// The latest body layout repeats at least `repeat_threshold` times in the window
    pub fn is_stuck(&self) -> bool {
        if !self.enabled {
            return false;
        }
        let Some(latest) = self.history.back() else {
            return false;
        };
        self.history.iter().filter(|h| *h == latest).count() >= self.repeat_threshold
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Forgets the most recent body, pairing with a step backward
    pub fn undo(&mut self) {
        self.history.pop_back();
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    fn fingerprint(body: &SnakeBody) -> u64 {
        let mut hasher = DefaultHasher::new();
        body.position_array().hash(&mut hasher);
        hasher.finish()
    }
}

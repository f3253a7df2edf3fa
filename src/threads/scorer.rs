//! Thread importance scoring and top-K selection.
//!
//! Additive score per thread:
//!   +100 latest item from a whitelisted sender
//!    +50 priority content anywhere in the thread
//!    +10 per email when the thread has more than one
//!    +30 urgency word in the latest item
//!
//! Weights are ordered so sender trust dominates content signal, which
//! dominates volume. Only the highest-scoring threads go on to
//! summarization; the rest are cheap to have grouped and cheap to drop.

use crate::classify::keywords::THREAD_URGENCY_WORDS;
use crate::classify::{ContentClassifier, SenderClassifier};
use crate::types::Thread;

pub const WHITELISTED_SENDER_POINTS: i64 = 100;
pub const PRIORITY_CONTENT_POINTS: i64 = 50;
pub const PER_EMAIL_POINTS: i64 = 10;
pub const URGENCY_POINTS: i64 = 30;

/// Default number of threads that proceed to summarization.
pub const DEFAULT_MAX_THREADS: usize = 15;

/// Scores threads for ranking.
#[derive(Debug, Clone, Default)]
pub struct ThreadScorer {
    sender: SenderClassifier,
    content: ContentClassifier,
}

impl ThreadScorer {
    pub fn new(sender: SenderClassifier, content: ContentClassifier) -> Self {
        Self { sender, content }
    }

    /// Compute the score for one thread. Empty threads score zero.
    pub fn score(&self, thread: &Thread) -> i64 {
        let latest = match thread.latest() {
            Some(item) => item,
            None => return 0,
        };
        let mut score = 0;
        if self.sender.is_whitelisted(&latest.sender) {
            score += WHITELISTED_SENDER_POINTS;
        }
        if thread
            .items
            .iter()
            .any(|item| self.content.has_priority_signal(&item.subject, &item.body))
        {
            score += PRIORITY_CONTENT_POINTS;
        }
        if thread.items.len() > 1 {
            score += PER_EMAIL_POINTS * thread.items.len() as i64;
        }
        let latest_text = latest.search_text();
        if THREAD_URGENCY_WORDS
            .iter()
            .any(|w| latest_text.contains(w))
        {
            score += URGENCY_POINTS;
        }
        score
    }

    /// Score, rank descending, and keep the top `max_threads`. The sort is
    /// stable, so equal-scoring threads keep their grouping order.
    pub fn rank(&self, mut threads: Vec<Thread>, max_threads: usize) -> Vec<Thread> {
        for thread in &mut threads {
            thread.score = self.score(thread);
        }
        threads.sort_by(|a, b| b.score.cmp(&a.score));
        if threads.len() > max_threads {
            log::debug!(
                "thread cutoff: keeping {} of {} threads",
                max_threads,
                threads.len()
            );
            threads.truncate(max_threads);
        }
        threads
    }
}

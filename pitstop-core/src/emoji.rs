//! Emoji picker that avoids recent repeats.

use rand::Rng;
use std::collections::VecDeque;

/// Glyph returned when the pool is empty.
pub const FALLBACK_EMOJI: &str = "✨";

/// Pools at or below this size never trim their history.
const TRIM_MIN_POOL: usize = 5;

/// Pick an element of `pool` that is not in `recent`, then record it.
///
/// `recent` is cleared once it covers the whole pool, and its oldest entry is
/// dropped once it grows past half the pool (pools larger than five only).
pub fn unique_emoji<R: Rng + ?Sized>(
    pool: &[String],
    recent: &mut VecDeque<String>,
    rng: &mut R,
) -> String {
    if pool.is_empty() {
        return FALLBACK_EMOJI.to_string();
    }
    if recent.len() >= pool.len() {
        recent.clear();
    }

    let mut candidates: Vec<&String> = pool.iter().filter(|e| !recent.contains(e)).collect();
    if candidates.is_empty() {
        // Duplicate pool entries can leave nothing fresh even below full length.
        recent.clear();
        candidates = pool.iter().collect();
    }
    let choice = candidates[rng.gen_range(0..candidates.len())].clone();

    recent.push_back(choice.clone());
    if pool.len() > TRIM_MIN_POOL && recent.len() * 2 > pool.len() {
        recent.pop_front();
    }
    choice
}

/// A pool and its recently used history.
#[derive(Debug, Clone, Default)]
pub struct EmojiRecycler {
    pool: Vec<String>,
    recent: VecDeque<String>,
}

impl EmojiRecycler {
    pub fn new<I, S>(pool: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pool: pool.into_iter().map(Into::into).collect(),
            recent: VecDeque::new(),
        }
    }

    pub fn next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> String {
        unique_emoji(&self.pool, &mut self.recent, rng)
    }
}

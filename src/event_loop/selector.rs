use std::collections::VecDeque;

use log::debug;
use rand::Rng;

use crate::event_loop::models::Track;

/// Random draws tried before giving up on the anti-repetition rules.
pub const MAX_DRAWS: usize = 5;
/// How many recently emitted names a new pick must avoid.
pub const RECENT_NAMES: usize = 5;

/// Draws tracks from a pool without replacement, trying to avoid the same
/// kind twice in a row and any of the last few map names.
///
/// The rules are best effort: after [`MAX_DRAWS`] non-compliant draws the last
/// one is taken anyway, so a run never stalls on an awkward pool.
pub struct Selector {
    pool: Vec<Track>,
    recent_names: VecDeque<String>,
    last_kind: Option<String>,
}

impl Selector {
    pub fn new(pool: Vec<Track>) -> Self {
        Selector {
            pool,
            recent_names: VecDeque::with_capacity(RECENT_NAMES),
            last_kind: None,
        }
    }

    /// Tracks not yet emitted.
    pub fn remaining(&self) -> usize {
        self.pool.len()
    }

    fn is_compliant(&self, track: &Track) -> bool {
        self.last_kind.as_deref() != Some(track.kind())
            && !self.recent_names.iter().any(|name| *name == track.name)
    }

    /// Pick and remove the next track; `None` once the pool is empty.
    pub fn next_track<R: Rng>(&mut self, rng: &mut R) -> Option<Track> {
        self.next_with(|len| rng.gen_range(0..len))
    }

    /// Same as [`next_track`](Self::next_track) with `draw(len)` supplying
    /// each index in `0..len`.
    pub fn next_with<F>(&mut self, mut draw: F) -> Option<Track>
    where
        F: FnMut(usize) -> usize,
    {
        if self.pool.is_empty() {
            return None;
        }

        let mut index = 0;
        for attempt in 1..=MAX_DRAWS {
            index = draw(self.pool.len());
            if self.is_compliant(&self.pool[index]) {
                break;
            }
            if attempt == MAX_DRAWS {
                debug!(
                    "no compliant track in {MAX_DRAWS} draws, accepting '{}'",
                    self.pool[index].id
                );
            }
        }

        let track = self.pool.remove(index);
        self.last_kind = Some(track.kind().to_string());
        if self.recent_names.len() == RECENT_NAMES {
            self.recent_names.pop_front();
        }
        self.recent_names.push_back(track.name.clone());
        Some(track)
    }
}

/// Drain a whole pool into its emission order.
pub fn select_order<R: Rng>(pool: Vec<Track>, rng: &mut R) -> Vec<Track> {
    let mut selector = Selector::new(pool);
    let mut order = Vec::with_capacity(selector.remaining());
    while let Some(track) = selector.next_track(rng) {
        order.push(track);
    }
    order
}

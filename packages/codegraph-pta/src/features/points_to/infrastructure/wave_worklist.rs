//! Wave-bucketed worklist
//!
//! Dirty PAG nodes are bucketed by the topological position of their
//! owning method's call-graph component (callees first). Nodes of one
//! component share a wave, so a recursive component drains together.

use rustc_hash::FxHashSet;

#[derive(Debug, Clone)]
pub struct WaveWorklist {
    /// Items organized by wave
    waves: Vec<Vec<u32>>,

    /// Earliest wave that may be non-empty
    current_wave: usize,

    /// Total items remaining
    remaining: usize,

    /// Items currently queued (an item lives in at most one wave)
    queued: FxHashSet<u32>,
}

impl WaveWorklist {
    pub fn new(wave_count: usize) -> Self {
        Self {
            waves: vec![Vec::new(); wave_count.max(1)],
            current_wave: 0,
            remaining: 0,
            queued: FxHashSet::default(),
        }
    }

    /// Queue `item` in `wave` (clamped); no-op if already queued
    pub fn push(&mut self, item: u32, wave: usize) -> bool {
        if !self.queued.insert(item) {
            return false;
        }
        let wave_idx = wave.min(self.waves.len() - 1);
        self.waves[wave_idx].push(item);
        self.remaining += 1;
        if wave_idx < self.current_wave {
            self.current_wave = wave_idx;
        }
        true
    }

    /// Pop from the earliest non-empty wave
    pub fn pop(&mut self) -> Option<u32> {
        while self.current_wave < self.waves.len() {
            if let Some(item) = self.waves[self.current_wave].pop() {
                self.remaining -= 1;
                self.queued.remove(&item);
                return Some(item);
            }
            self.current_wave += 1;
        }
        None
    }

    /// Remove and return every queued item (wave order)
    pub fn drain(&mut self) -> Vec<u32> {
        let mut items = Vec::with_capacity(self.remaining);
        for wave in &mut self.waves {
            items.append(wave);
        }
        self.queued.clear();
        self.remaining = 0;
        self.current_wave = 0;
        items
    }

    pub fn contains(&self, item: u32) -> bool {
        self.queued.contains(&item)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    pub fn len(&self) -> usize {
        self.remaining
    }

    pub fn wave_count(&self) -> usize {
        self.waves.len()
    }
}

//! Set-associative cache statistics sink.
//!
//! This module implements a configurable set-associative hit/miss model.
//! It tracks no data, only tags: each access either hits an installed line
//! or installs one over a round-robin victim. The processor consumes these
//! as opaque counters with a reset/print interface; instruction and data
//! caches are cloned from templates, and the same model with one set,
//! eight ways, and page-sized lines serves as an ITLB/DTLB reach model.

/// Cache statistics sink.
///
/// Counts accesses and misses against a tag array with round-robin
/// replacement. A freshly constructed instance can serve as a template:
/// cloning it stamps out an identically-shaped sink.
#[derive(Clone)]
pub struct CacheSim {
    name: String,
    sets: usize,
    ways: usize,
    line_bytes: usize,
    tags: Vec<u64>,
    valid: Vec<bool>,
    victim: Vec<usize>,
    accesses: u64,
    misses: u64,
}

impl CacheSim {
    /// Creates a new sink with the specified geometry.
    ///
    /// # Arguments
    ///
    /// * `sets` - Number of sets (clamped to at least 1).
    /// * `ways` - Associativity (clamped to at least 1).
    /// * `line_bytes` - Line size in bytes (clamped to at least 1).
    /// * `name` - Label used in the statistics printout.
    ///
    /// # Returns
    ///
    /// A new `CacheSim` with all lines invalid and counters zeroed.
    pub fn new(sets: usize, ways: usize, line_bytes: usize, name: &str) -> Self {
        let sets = sets.max(1);
        let ways = ways.max(1);
        let line_bytes = line_bytes.max(1);
        Self {
            name: name.to_string(),
            sets,
            ways,
            line_bytes,
            tags: vec![0; sets * ways],
            valid: vec![false; sets * ways],
            victim: vec![0; sets],
            accesses: 0,
            misses: 0,
        }
    }

    /// Records one access to `addr`, installing the line on a miss.
    pub fn tick(&mut self, addr: u64) {
        self.accesses += 1;

        let line = addr / self.line_bytes as u64;
        let set = (line % self.sets as u64) as usize;
        let tag = line / self.sets as u64;
        let base = set * self.ways;

        for way in 0..self.ways {
            let idx = base + way;
            if self.valid[idx] && self.tags[idx] == tag {
                return;
            }
        }

        self.misses += 1;
        let idx = base + self.victim[set];
        self.tags[idx] = tag;
        self.valid[idx] = true;
        self.victim[set] = (self.victim[set] + 1) % self.ways;
    }

    /// Returns the total access count.
    pub fn accesses(&self) -> u64 {
        self.accesses
    }

    /// Returns the miss count.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Returns the sink's label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Zeroes the access and miss counters, leaving installed lines alone.
    pub fn reset_stats(&mut self) {
        self.accesses = 0;
        self.misses = 0;
    }

    /// Prints the accumulated counters to stdout.
    pub fn print_stats(&self) {
        let rate = if self.accesses > 0 {
            (self.misses as f64 / self.accesses as f64) * 100.0
        } else {
            0.0
        };
        println!(
            "{:<6} accesses: {:<12} misses: {:<12} miss_rate: {:.2}%",
            self.name, self.accesses, self.misses, rate
        );
    }
}

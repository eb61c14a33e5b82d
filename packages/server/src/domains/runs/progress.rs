//! Fixed progress bands for a run.
//!
//! 0-10 startup, 10-70 crawling (split evenly across sources), 75 filter,
//! 80 dedupe, 85-95 ranking, 100 on completion.

pub const STARTED: u8 = 5;
pub const CRAWL_START: u8 = 10;
pub const CRAWL_END: u8 = 70;
pub const FILTERED: u8 = 75;
pub const DEDUPED: u8 = 80;
pub const RANKING_START: u8 = 85;
pub const RANKING_END: u8 = 95;
pub const COMPLETE: u8 = 100;

/// Crawl-band allocation for a known number of sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressPlan {
    source_count: usize,
}

impl ProgressPlan {
    pub fn new(source_count: usize) -> Self {
        Self { source_count }
    }

    /// Progress once `completed` sources (1-based) have been folded in.
    pub fn after_source(&self, completed: usize) -> u8 {
        if self.source_count == 0 {
            return CRAWL_END;
        }
        let band = (CRAWL_END - CRAWL_START) as usize;
        let done = completed.min(self.source_count);
        CRAWL_START + (band * done / self.source_count) as u8
    }
}

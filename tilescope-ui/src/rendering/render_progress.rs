/// Progress of the current render generation.
///
/// Steps are tiles. Completions from superseded generations are not counted.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RenderProgress {
    pub generation: u64,
    pub completed_tiles: u32,
    pub total_tiles: u32,
    pub is_complete: bool,
}

impl RenderProgress {
    pub fn new(generation: u64, total_tiles: u32) -> Self {
        Self {
            generation,
            completed_tiles: 0,
            total_tiles,
            is_complete: total_tiles == 0,
        }
    }

    /// Count one finished tile if it belongs to this generation.
    pub fn record(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.is_complete {
            return false;
        }
        self.completed_tiles += 1;
        self.is_complete = self.completed_tiles >= self.total_tiles;
        true
    }

    /// Calculate completion percentage (0.0 to 100.0).
    pub fn percentage(&self) -> f32 {
        if self.total_tiles == 0 {
            0.0
        } else {
            (self.completed_tiles as f32 / self.total_tiles as f32) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_progress_starts_at_zero() {
        let progress = RenderProgress::new(3, 100);
        assert_eq!(progress.completed_tiles, 0);
        assert_eq!(progress.total_tiles, 100);
        assert!(!progress.is_complete);
    }

    #[test]
    fn completes_after_all_tiles() {
        let mut progress = RenderProgress::new(1, 2);
        assert!(progress.record(1));
        assert!(!progress.is_complete);
        assert!(progress.record(1));
        assert!(progress.is_complete);
        assert!((progress.percentage() - 100.0).abs() < 0.001);
    }

    #[test]
    fn stale_generation_not_counted() {
        let mut progress = RenderProgress::new(5, 16);
        assert!(!progress.record(4));
        assert_eq!(progress.completed_tiles, 0);
    }

    #[test]
    fn percentage_zero_tiles() {
        let progress = RenderProgress::new(0, 0);
        assert!((progress.percentage() - 0.0).abs() < 0.001);
    }
}

//! Sequential unit identifier assignment
//!
//! The historian keeps no per-unit state beyond this counter: identifiers are
//! handed out in order and never revoked during a run. The counter is not
//! persisted, so a restart reassigns identifiers from 1.

use std::sync::atomic::{AtomicU32, Ordering};

/// Monotonic identifier source for registering units
#[derive(Debug, Default)]
pub struct UnitRegistry {
    next: AtomicU32,
}

impl UnitRegistry {
    /// Create an empty registry (first assignment yields 1)
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the next sequential unit identifier
    pub fn assign(&self) -> u32 {
        self.next.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Number of identifiers handed out so far this run
    pub fn assigned(&self) -> u32 {
        self.next.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_assignments_start_at_one_and_increase() {
        let registry = UnitRegistry::new();
        assert_eq!(registry.assigned(), 0);
        assert_eq!(registry.assign(), 1);
        assert_eq!(registry.assign(), 2);
        assert_eq!(registry.assign(), 3);
        assert_eq!(registry.assigned(), 3);
    }

    #[test]
    fn test_concurrent_assignments_are_unique_and_dense() {
        let registry = Arc::new(UnitRegistry::new());
        let mut handles = Vec::new();

        for _ in 0..4 {
            let registry = Arc::clone(&registry);
            handles.push(std::thread::spawn(move || {
                (0..25).map(|_| registry.assign()).collect::<Vec<u32>>()
            }));
        }

        let mut ids: Vec<u32> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        ids.sort_unstable();

        // 100 assignments across 4 threads: exactly 1..=100, no gaps, no reuse.
        assert_eq!(ids, (1..=100).collect::<Vec<u32>>());
        assert_eq!(registry.assigned(), 100);
    }
}

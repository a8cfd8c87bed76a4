use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic id source shared between threads.
///
/// Ids start at 1 so that 0 never names a live subscription or call. The
/// space never wraps: once `u64::MAX` has been handed out or observed, the
/// allocator is exhausted and `next_id` returns `None`.
#[derive(Debug)]
pub struct IdAllocator {
    /// Next id to hand out; 0 once exhausted.
    next: AtomicU64,
}

impl IdAllocator {
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub fn next_id(&self) -> Option<u64> {
        self.next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |next| {
                (next != 0).then(|| next.wrapping_add(1))
            })
            .ok()
    }

    /// Make sure future ids never collide with an externally chosen one.
    pub fn observe(&self, id: u64) {
        let _ = self
            .next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |next| {
                (next != 0 && id >= next).then(|| id.wrapping_add(1))
            });
    }

    pub fn is_exhausted(&self) -> bool {
        self.next.load(Ordering::Relaxed) == 0
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_start_at_one() {
        let ids = IdAllocator::new();
        assert_eq!(ids.next_id(), Some(1));
        assert_eq!(ids.next_id(), Some(2));
    }

    #[test]
    fn observe_skips_past_external_id() {
        let ids = IdAllocator::new();
        ids.observe(41);
        assert_eq!(ids.next_id(), Some(42));
    }

    #[test]
    fn observe_never_moves_backwards() {
        let ids = IdAllocator::new();
        ids.observe(10);
        ids.observe(3);
        assert_eq!(ids.next_id(), Some(11));
    }

    #[test]
    fn last_id_exhausts_instead_of_wrapping() {
        let ids = IdAllocator::new();
        ids.observe(u64::MAX - 1);
        assert_eq!(ids.next_id(), Some(u64::MAX));
        assert!(ids.is_exhausted());
        assert_eq!(ids.next_id(), None);
        assert_eq!(ids.next_id(), None);
    }

    #[test]
    fn observing_max_exhausts() {
        let ids = IdAllocator::new();
        ids.observe(u64::MAX);
        assert_eq!(ids.next_id(), None);
        ids.observe(5);
        assert_eq!(ids.next_id(), None);
    }

    #[test]
    fn ids_unique_across_threads() {
        use std::collections::HashSet;
        use std::sync::Arc;

        let ids = Arc::new(IdAllocator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || (0..100).map(|_| ids.next_id().unwrap()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for h in handles {
            for id in h.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 400);
    }
}

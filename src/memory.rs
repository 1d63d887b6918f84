// Heap accounting for profiling parse sessions.
//
// With `memory_tracking` on, the global allocator reports every allocation
// to a pair of counters. Without it every query returns zeroed stats.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Snapshot of heap use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryStats {
    /// Bytes live when the snapshot was taken
    pub current: usize,
    /// Highest `current` seen since the last peak reset
    pub peak: usize,
}

/// Live and peak byte counters fed by an allocator
#[derive(Debug)]
pub struct Counters {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl Counters {
    pub const fn new() -> Self {
        Counters {
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    #[inline]
    pub fn record_alloc(&self, bytes: usize) {
        let now = self.current.fetch_add(bytes, Ordering::Relaxed) + bytes;
        self.peak.fetch_max(now, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_dealloc(&self, bytes: usize) {
        self.current.fetch_sub(bytes, Ordering::Relaxed);
    }

    pub fn stats(&self) -> MemoryStats {
        MemoryStats {
            current: self.current.load(Ordering::SeqCst),
            peak: self.peak.load(Ordering::SeqCst),
        }
    }

    /// Lower the peak to the live byte count. Returns the stats as they
    /// were before the reset.
    pub fn reset_peak(&self) -> MemoryStats {
        let current = self.current.load(Ordering::SeqCst);
        let peak = self.peak.swap(current, Ordering::SeqCst);
        MemoryStats { current, peak }
    }
}

impl Default for Counters {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "memory_tracking")]
mod tracking {
    use super::Counters;
    use std::alloc::{GlobalAlloc, Layout};

    #[cfg(feature = "mimalloc")]
    type Inner = mimalloc::MiMalloc;
    #[cfg(feature = "mimalloc")]
    const INNER: Inner = mimalloc::MiMalloc;

    #[cfg(not(feature = "mimalloc"))]
    type Inner = std::alloc::System;
    #[cfg(not(feature = "mimalloc"))]
    const INNER: Inner = std::alloc::System;

    /// Forwards to `inner` and reports sizes to `counters`
    pub struct Counting {
        inner: Inner,
        pub counters: Counters,
    }

    unsafe impl GlobalAlloc for Counting {
        unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
            let ptr = self.inner.alloc(layout);
            if !ptr.is_null() {
                self.counters.record_alloc(layout.size());
            }
            ptr
        }

        unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
            self.counters.record_dealloc(layout.size());
            self.inner.dealloc(ptr, layout)
        }
    }

    #[global_allocator]
    pub static HEAP: Counting = Counting {
        inner: INNER,
        counters: Counters::new(),
    };
}

#[cfg(all(feature = "mimalloc", not(feature = "memory_tracking")))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Current and peak heap use of the process
#[cfg(feature = "memory_tracking")]
pub fn stats() -> MemoryStats {
    tracking::HEAP.counters.stats()
}

/// Restart peak tracking from the current allocation. Returns the stats
/// from before the reset.
#[cfg(feature = "memory_tracking")]
pub fn reset_peak() -> MemoryStats {
    tracking::HEAP.counters.reset_peak()
}

#[cfg(not(feature = "memory_tracking"))]
pub fn stats() -> MemoryStats {
    MemoryStats::default()
}

#[cfg(not(feature = "memory_tracking"))]
pub fn reset_peak() -> MemoryStats {
    MemoryStats::default()
}

/// Bytes currently allocated on the heap
pub fn allocated() -> usize {
    stats().current
}

/// Peak heap allocation since the last [`reset_peak`]
pub fn peak_allocated() -> usize {
    stats().peak
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_track_peak() {
        let counters = Counters::new();
        counters.record_alloc(100);
        counters.record_alloc(50);
        counters.record_dealloc(120);
        assert_eq!(counters.stats(), MemoryStats { current: 30, peak: 150 });

        let before = counters.reset_peak();
        assert_eq!(before.peak, 150);
        assert_eq!(counters.stats(), MemoryStats { current: 30, peak: 30 });

        counters.record_alloc(10);
        assert_eq!(counters.stats().peak, 40);
    }

    #[cfg(not(feature = "memory_tracking"))]
    #[test]
    fn test_disabled_reports_zero() {
        assert_eq!(allocated(), 0);
        assert_eq!(peak_allocated(), 0);
        assert_eq!(reset_peak(), MemoryStats::default());
    }

    #[cfg(feature = "memory_tracking")]
    #[test]
    fn test_peak_covers_allocation() {
        reset_peak();
        let block = vec![0u8; 1 << 20];
        assert!(peak_allocated() >= block.len());
        drop(block);
        assert!(reset_peak().peak >= 1 << 20);
    }
}

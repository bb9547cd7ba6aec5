use parking_lot::{Condvar, Mutex};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::trace;

/// Counting semaphore that bounds how many files are scanned at once.
///
/// A slot is held by a [`ScanPermit`] and given back when the permit is
/// dropped, so a task returns its slot on every exit path, including error
/// returns and panics.
#[derive(Debug)]
pub struct AdmissionGate {
    capacity: usize,
    available: Mutex<usize>,
    freed: Condvar,
    peak: AtomicUsize,
}

impl AdmissionGate {
    /// Creates a gate with `capacity` free slots
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity: capacity.get(),
            available: Mutex::new(capacity.get()),
            freed: Condvar::new(),
            peak: AtomicUsize::new(0),
        }
    }

    /// Blocks until a slot is free and takes it
    pub fn acquire(&self) -> ScanPermit<'_> {
        let mut available = self.available.lock();
        while *available == 0 {
            trace!("Admission gate full, waiting for a slot");
            self.freed.wait(&mut available);
        }
        self.take(&mut available)
    }

    fn take(&self, available: &mut usize) -> ScanPermit<'_> {
        *available -= 1;
        self.peak
            .fetch_max(self.capacity - *available, Ordering::Relaxed);
        ScanPermit { gate: self }
    }

    fn release(&self) {
        let mut available = self.available.lock();
        *available += 1;
        debug_assert!(*available <= self.capacity);
        drop(available);
        self.freed.notify_one();
    }

    /// Number of slots currently held
    pub fn in_flight(&self) -> usize {
        self.capacity - *self.available.lock()
    }

    /// Highest number of slots that were ever held at the same time
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::Relaxed)
    }
}

/// One held slot of an [`AdmissionGate`]
#[derive(Debug)]
#[must_use = "the slot is released as soon as the permit is dropped"]
pub struct ScanPermit<'a> {
    gate: &'a AdmissionGate,
}

impl Drop for ScanPermit<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn gate(capacity: usize) -> AdmissionGate {
        AdmissionGate::new(NonZeroUsize::new(capacity).unwrap())
    }

    #[test]
    fn test_acquire_and_release() {
        let gate = gate(2);
        let first = gate.acquire();
        let second = gate.acquire();
        assert_eq!(gate.in_flight(), 2);

        drop(first);
        assert_eq!(gate.in_flight(), 1);
        let third = gate.acquire();
        assert_eq!(gate.in_flight(), 2);

        drop(second);
        drop(third);
        assert_eq!(gate.in_flight(), 0);
        assert_eq!(gate.peak(), 2);
    }

    #[test]
    fn test_release_on_panic() {
        let gate = gate(1);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _permit = gate.acquire();
            panic!("scan failed");
        }));
        assert!(result.is_err());
        assert_eq!(gate.in_flight(), 0);
        let _permit = gate.acquire();
        assert_eq!(gate.in_flight(), 1);
    }

    #[test]
    fn test_acquire_blocks_until_release() {
        let gate = Arc::new(gate(1));
        let acquired = Arc::new(AtomicBool::new(false));
        let permit = gate.acquire();

        let waiter = {
            let gate = Arc::clone(&gate);
            let acquired = Arc::clone(&acquired);
            thread::spawn(move || {
                let _permit = gate.acquire();
                acquired.store(true, Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!acquired.load(Ordering::SeqCst));

        drop(permit);
        waiter.join().unwrap();
        assert!(acquired.load(Ordering::SeqCst));
        assert_eq!(gate.peak(), 1);
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let gate = Arc::new(gate(3));
        let active = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let gate = Arc::clone(&gate);
                let active = Arc::clone(&active);
                let max_seen = Arc::clone(&max_seen);
                thread::spawn(move || {
                    let _permit = gate.acquire();
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    max_seen.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(5));
                    active.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(max_seen.load(Ordering::SeqCst) <= 3);
        assert!(gate.peak() <= 3);
        assert_eq!(gate.in_flight(), 0);
    }
}

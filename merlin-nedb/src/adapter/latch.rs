use crate::datastore::Callback;
use crate::errors::AdapterResult;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Single-fire completion of a fan-out.
///
/// Fires its callback exactly once: with the first error reported, or with
/// success once every participant reported success. Results arriving after
/// that are logged and discarded.
pub(crate) struct CompletionLatch {
    remaining: AtomicUsize,
    callback: Mutex<Option<Callback<()>>>,
}

impl CompletionLatch {
    /// A latch waiting for `participants` results. Must be at least one.
    pub(crate) fn new(participants: usize, callback: Callback<()>) -> Self {
        CompletionLatch {
            remaining: AtomicUsize::new(participants),
            callback: Mutex::new(Some(callback)),
        }
    }

    pub(crate) fn count_down(&self, result: AdapterResult<()>) {
        match result {
            Ok(()) => {
                let previous = self.remaining.fetch_sub(1, Ordering::AcqRel);
                if previous == 1 {
                    self.fire(Ok(()));
                } else if self.is_fired() {
                    log::warn!("Completion already signalled, discarding late success");
                } else {
                    log::trace!("{} participants pending", previous - 1);
                }
            }
            Err(err) => self.fire(Err(err)),
        }
    }

    pub(crate) fn is_fired(&self) -> bool {
        self.callback.lock().is_none()
    }

    fn fire(&self, result: AdapterResult<()>) {
        let callback = self.callback.lock().take();
        match callback {
            Some(callback) => callback(result),
            None => match result {
                Ok(()) => log::warn!("Completion already signalled, discarding late success"),
                Err(err) => log::warn!("Completion already signalled, discarding error: {}", err),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{AdapterError, ErrorKind};
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn recording_latch(participants: usize) -> (CompletionLatch, Arc<Mutex<Vec<AdapterResult<()>>>>) {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&fired);
        let latch = CompletionLatch::new(
            participants,
            Box::new(move |result| sink.lock().push(result)),
        );
        (latch, fired)
    }

    fn failure(message: &str) -> AdapterResult<()> {
        Err(AdapterError::new(message, ErrorKind::StorageError))
    }

    #[test]
    fn test_fires_success_after_all_participants() {
        let (latch, fired) = recording_latch(3);
        latch.count_down(Ok(()));
        latch.count_down(Ok(()));
        assert!(fired.lock().is_empty());
        assert!(!latch.is_fired());

        latch.count_down(Ok(()));
        assert_eq!(fired.lock().len(), 1);
        assert!(fired.lock()[0].is_ok());
    }

    #[test]
    fn test_first_error_wins() {
        let (latch, fired) = recording_latch(3);
        latch.count_down(Ok(()));
        latch.count_down(failure("first"));
        latch.count_down(failure("second"));

        let fired = fired.lock();
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].as_ref().unwrap_err().message(), "first");
    }

    #[test]
    fn test_success_after_error_is_discarded() {
        let (latch, fired) = recording_latch(2);
        latch.count_down(failure("boom"));
        latch.count_down(Ok(()));

        assert_eq!(fired.lock().len(), 1);
        assert!(fired.lock()[0].is_err());
    }

    #[test]
    fn test_concurrent_failures_fire_once() {
        let (latch, fired) = recording_latch(8);
        let latch = Arc::new(latch);
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let latch = Arc::clone(&latch);
                std::thread::spawn(move || {
                    if i % 2 == 0 {
                        latch.count_down(failure("boom"));
                    } else {
                        latch.count_down(Ok(()));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(fired.lock().len(), 1);
        assert!(fired.lock()[0].is_err());
    }
}

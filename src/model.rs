use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use tracing::info;

/// A process-wide, lazily loaded model handle.
///
/// The first caller of [`SharedModel::get_or_load`] runs the loader while holding the lock, so
/// concurrent callers block until loading finishes and then share the same `Arc`. A failed
/// load leaves the slot empty; the next caller tries again.
pub struct SharedModel<T> {
    slot: Mutex<Option<Arc<T>>>,
}

impl<T> Default for SharedModel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SharedModel<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Return the cached model, loading it first if nobody has yet.
    pub fn get_or_load<F>(&self, load: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Result<T>,
    {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| anyhow!("model handle mutex poisoned"))?;

        if let Some(model) = slot.as_ref() {
            return Ok(Arc::clone(model));
        }

        let model = Arc::new(load()?);
        *slot = Some(Arc::clone(&model));
        info!("model loaded");
        Ok(model)
    }

    /// Whether a model is currently cached.
    pub fn is_loaded(&self) -> bool {
        self.slot.lock().map(|s| s.is_some()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn loads_once_and_reuses_the_handle() -> anyhow::Result<()> {
        let shared = SharedModel::new();
        let loads = AtomicUsize::new(0);

        let a = shared.get_or_load(|| {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok(String::from("model"))
        })?;
        let b = shared.get_or_load(|| {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok(String::from("other"))
        })?;

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(*b, "model");
        Ok(())
    }

    #[test]
    fn concurrent_callers_share_a_single_load() {
        let shared = Arc::new(SharedModel::<usize>::new());
        let loads = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let shared = Arc::clone(&shared);
                let loads = Arc::clone(&loads);
                thread::spawn(move || {
                    shared
                        .get_or_load(|| {
                            thread::sleep(Duration::from_millis(20));
                            Ok(loads.fetch_add(1, Ordering::SeqCst))
                        })
                        .map(|m| *m)
                })
            })
            .collect();

        for handle in handles {
            let value = handle.join().expect("thread panicked").expect("load failed");
            assert_eq!(value, 0);
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_load_can_be_retried() -> anyhow::Result<()> {
        let shared = SharedModel::<u8>::new();

        assert!(shared.get_or_load(|| Err(anyhow!("disk on fire"))).is_err());
        assert!(!shared.is_loaded());

        let model = shared.get_or_load(|| Ok(7))?;
        assert_eq!(*model, 7);
        assert!(shared.is_loaded());
        Ok(())
    }
}

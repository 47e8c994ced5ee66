use std::fmt;
use std::sync::{Mutex, OnceLock, PoisonError};

/// Process-wide, lazily constructed single instance of `T`.
///
/// Meant to live in a `static`:
///
/// ```
/// use scaffold_common::Singleton;
///
/// #[derive(Default)]
/// struct Registry;
///
/// static REGISTRY: Singleton<Registry> = Singleton::new();
///
/// let a: *const Registry = REGISTRY.instance();
/// let b: *const Registry = REGISTRY.instance();
/// assert_eq!(a, b);
/// ```
///
/// A failed fallible initialiser leaves the cell empty, so the next caller
/// runs its own initialiser instead of observing a half-built value.
pub struct Singleton<T> {
    cell: OnceLock<T>,
    init_lock: Mutex<()>,
}

impl<T> Singleton<T> {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
            init_lock: Mutex::new(()),
        }
    }

    /// Instance if already constructed
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Construct with `init` on first call; every caller gets the same instance.
    pub fn get_or_init<F>(&self, init: F) -> &T
    where
        F: FnOnce() -> T,
    {
        self.cell.get_or_init(init)
    }

    /// Fallible construction. Initialisers run one at a time; an `Err` is
    /// handed back to its caller and nothing is stored.
    pub fn get_or_try_init<F, E>(&self, init: F) -> Result<&T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = self.cell.get() {
            return Ok(value);
        }

        let _guard = self.init_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = self.cell.get() {
            return Ok(value);
        }

        let value = init()?;
        Ok(self.cell.get_or_init(|| value))
    }
}

impl<T: Default> Singleton<T> {
    /// Instance built with `T::default()` on first access
    pub fn instance(&self) -> &T {
        self.get_or_init(T::default)
    }
}

impl<T> Default for Singleton<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Singleton<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Singleton")
            .field("instance", &self.cell.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[derive(Debug, Default)]
    struct Counter {
        value: AtomicUsize,
    }

    #[test]
    fn test_instance_is_shared() {
        static COUNTER: Singleton<Counter> = Singleton::new();

        assert!(!COUNTER.is_initialized());
        COUNTER.instance().value.fetch_add(1, Ordering::SeqCst);
        COUNTER.instance().value.fetch_add(1, Ordering::SeqCst);

        assert!(COUNTER.is_initialized());
        assert_eq!(COUNTER.instance().value.load(Ordering::SeqCst), 2);
        assert!(std::ptr::eq(COUNTER.instance(), COUNTER.get().unwrap()));
    }

    #[test]
    fn test_concurrent_construction_runs_once() {
        static SHARED: Singleton<Counter> = Singleton::new();
        let constructions = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let constructions = Arc::clone(&constructions);
                thread::spawn(move || {
                    let instance = SHARED.get_or_init(|| {
                        constructions.fetch_add(1, Ordering::SeqCst);
                        Counter::default()
                    });
                    instance as *const Counter as usize
                })
            })
            .collect();

        let addresses: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(constructions.load(Ordering::SeqCst), 1);
        assert!(addresses.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn test_failed_init_can_be_retried() {
        let singleton: Singleton<String> = Singleton::new();

        let first: Result<&String, &str> = singleton.get_or_try_init(|| Err("boom"));
        assert_eq!(first, Err("boom"));
        assert!(singleton.get().is_none());

        let second: Result<&String, &str> = singleton.get_or_try_init(|| Ok("ready".to_string()));
        assert_eq!(second.unwrap(), "ready");

        // Later initialisers are ignored once a value exists
        let third: Result<&String, &str> = singleton.get_or_try_init(|| Err("ignored"));
        assert_eq!(third.unwrap(), "ready");
    }
}

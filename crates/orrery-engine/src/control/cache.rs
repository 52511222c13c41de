/// Lazily recomputed value behind an explicit dirty flag.
///
/// The matrices a control derives (view, projection) are consumed many
/// times per frame but depend on a handful of setters; each setter
/// invalidates exactly the caches its field feeds.
#[derive(Debug)]
pub(crate) struct Cached<T> {
    value: T,
    dirty: bool,
}

impl<T> Cached<T> {
    pub fn new(value: T) -> Self {
        Self { value, dirty: true }
    }

    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    #[cfg(test)]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns the value, recomputing it first if a dependency changed.
    pub fn get_or_update(&mut self, f: impl FnOnce() -> T) -> &T {
        if self.dirty {
            self.value = f();
            self.dirty = false;
        }
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recomputes_only_when_dirty() {
        let mut calls = 0;
        let mut cache = Cached::new(0);

        assert_eq!(*cache.get_or_update(|| { calls += 1; 7 }), 7);
        assert_eq!(*cache.get_or_update(|| { calls += 1; 8 }), 7);
        assert_eq!(calls, 1);

        cache.invalidate();
        assert!(cache.is_dirty());
        assert_eq!(*cache.get_or_update(|| { calls += 1; 8 }), 8);
        assert_eq!(calls, 2);
        assert!(!cache.is_dirty());
    }
}

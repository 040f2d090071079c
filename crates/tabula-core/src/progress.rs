//! Progress reporting for long-running reads and writes

/// Wraps a caller's progress callback
///
/// Reported values are clamped to `[0, 1]` and never decrease.
pub struct Progress<'a> {
    callback: Option<&'a mut dyn FnMut(f64)>,
    last: f64,
}

impl<'a> Progress<'a> {
    pub fn new(callback: &'a mut dyn FnMut(f64)) -> Self {
        Self {
            callback: Some(callback),
            last: 0.0,
        }
    }

    /// A progress sink that discards every update
    pub fn none() -> Self {
        Self {
            callback: None,
            last: 0.0,
        }
    }

    pub fn from_option(callback: Option<&'a mut dyn FnMut(f64)>) -> Self {
        Self {
            callback,
            last: 0.0,
        }
    }

    /// Report a fraction of the work done
    pub fn report(&mut self, fraction: f64) {
        if fraction.is_nan() {
            return;
        }
        let fraction = fraction.clamp(0.0, 1.0).max(self.last);
        self.last = fraction;
        if let Some(callback) = self.callback.as_mut() {
            callback(fraction);
        }
    }

    /// Report `done` out of `total` units
    pub fn update(&mut self, done: usize, total: usize) {
        if total == 0 {
            self.report(1.0);
        } else {
            self.report(done as f64 / total as f64);
        }
    }

    pub fn finish(&mut self) {
        self.report(1.0);
    }

    pub fn last(&self) -> f64 {
        self.last
    }
}

impl std::fmt::Debug for Progress<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress")
            .field("last", &self.last)
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

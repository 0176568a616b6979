//! Interval arithmetic for ray parameter ranges.
//!
//! Provides closed intervals [min, max] used for valid-hit distance windows
//! and final color clamping.

/// Closed interval [min, max] over f64.
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    /// Minimum value of the interval
    pub min: f64,
    /// Maximum value of the interval
    pub max: f64,
}

impl Interval {
    /// Interval containing nothing (min > max).
    pub const EMPTY: Interval = Interval {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    /// Interval containing all real numbers.
    pub const UNIVERSE: Interval = Interval {
        min: f64::NEG_INFINITY,
        max: f64::INFINITY,
    };

    /// Create a new interval with given min and max values.
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Width of the interval.
    pub fn size(&self) -> f64 {
        self.max - self.min
    }

    /// Check if the interval contains the given value (inclusive bounds).
    pub fn contains(&self, x: f64) -> bool {
        self.min <= x && x <= self.max
    }

    /// Check if the interval surrounds the given value (exclusive bounds).
    pub fn surrounds(&self, x: f64) -> bool {
        self.min < x && x < self.max
    }

    /// Clamp the given value to be within this interval's bounds.
    pub fn clamp(&self, x: f64) -> f64 {
        x.clamp(self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_inclusive() {
        let i = Interval::new(0.0, 1.0);
        assert!(i.contains(0.0));
        assert!(i.contains(1.0));
        assert!(i.contains(0.5));
        assert!(!i.contains(1.0 + 1e-12));
    }

    #[test]
    fn surrounds_is_exclusive() {
        let i = Interval::new(0.0, 1.0);
        assert!(!i.surrounds(0.0));
        assert!(!i.surrounds(1.0));
        assert!(i.surrounds(0.5));
    }

    #[test]
    fn clamp_saturates() {
        let i = Interval::new(0.0, 0.999);
        assert_eq!(i.clamp(-0.5), 0.0);
        assert_eq!(i.clamp(0.25), 0.25);
        assert_eq!(i.clamp(2.0), 0.999);
    }

    #[test]
    fn empty_and_universe() {
        assert!(!Interval::EMPTY.contains(0.0));
        assert!(Interval::UNIVERSE.contains(f64::MAX));
        assert!(Interval::EMPTY.size() < 0.0);
    }
}

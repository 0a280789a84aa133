use crate::error::MappingError;
use crate::input::{AxisSnapshot, CONTROL_AXES};

/// Baseline subtracted from the control axes before rate mapping.
/// Stored in device convention (before sign correction).
pub type TrimVector = AxisSnapshot;

#[derive(Debug, Clone)]
pub struct TrimCalculator {
    trim: TrimVector,
}

impl Default for TrimCalculator {
    fn default() -> Self {
        Self::new(CONTROL_AXES)
    }
}

impl TrimCalculator {
    pub fn new(width: usize) -> Self {
        Self { trim: TrimVector::zero(width) }
    }

    /// Replace the baseline with `raw`. The caller only does this while trimming.
    pub fn capture(&mut self, raw: &AxisSnapshot) -> Result<(), MappingError> {
        if raw.len() != self.trim.len() {
            return Err(MappingError::ShapeMismatch { expected: self.trim.len(), got: raw.len() });
        }
        self.trim = raw.clone();
        Ok(())
    }

    pub fn reset(&mut self) {
        self.trim = TrimVector::zero(self.trim.len());
    }

    pub fn current(&self) -> &TrimVector {
        &self.trim
    }

    pub fn is_zero(&self) -> bool {
        self.trim.values().iter().all(|v| *v == 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let t = TrimCalculator::default();
        assert_eq!(t.current(), &AxisSnapshot::zero(4));
        assert!(t.is_zero());
    }

    #[test]
    fn capture_then_current_is_exact() {
        let mut t = TrimCalculator::default();
        let a = AxisSnapshot::new(vec![0.03, -0.07, 0.0, 0.11]);
        t.capture(&a).unwrap();
        assert_eq!(t.current(), &a);
    }

    #[test]
    fn reset_twice_stays_zero() {
        let mut t = TrimCalculator::default();
        t.capture(&AxisSnapshot::new(vec![0.5, 0.5, 0.5, 0.5])).unwrap();
        t.reset();
        let once = t.current().clone();
        t.reset();
        assert_eq!(t.current(), &once);
        assert!(t.is_zero());
    }

    #[test]
    fn capture_rejects_wrong_width() {
        let mut t = TrimCalculator::default();
        let err = t.capture(&AxisSnapshot::new(vec![0.1; 6])).unwrap_err();
        assert_eq!(err, MappingError::ShapeMismatch { expected: 4, got: 6 });
        assert!(t.is_zero());
    }
}

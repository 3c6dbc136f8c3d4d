//! Trim range handling for the save workflow.
//!
//! While the session is saving, a two-handle range control selects the
//! sub-range of the captured trace that will be persisted. The range is only
//! meaningful against the trace captured when saving began; it is reset when
//! a new recording starts and cleared when a save or discard completes.

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

/// Minimum number of points a template needs to be a viable gesture.
pub const MIN_TEMPLATE_POINTS: usize = 5;

/// A half-open index range `start..end` into a save candidate's points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrimRange {
    pub start: usize,
    pub end: usize,
}

impl TrimRange {
    /// Create a range without validation; see [`validate_save`].
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// The full range over a trace of `len` points.
    pub fn full(len: usize) -> Self {
        Self { start: 0, end: len }
    }

    /// Number of points selected.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the range selects nothing.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Clamp both bounds into `[0, len]`, keeping `start <= end`.
    pub fn clamp_to(self, len: usize) -> Self {
        let end = self.end.min(len);
        Self {
            start: self.start.min(end),
            end,
        }
    }
}

/// Validate a save request before anything is sent to the service.
///
/// Rejects an empty name, an inverted range, bounds outside the candidate
/// trace, and ranges shorter than [`MIN_TEMPLATE_POINTS`]. These are client
/// guard rails, not protocol errors: a validation failure never mutates
/// session state or touches the network.
pub fn validate_save(name: &str, range: TrimRange, trace_len: usize) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ClientError::validation("template name must not be empty"));
    }
    if range.start > range.end {
        return Err(ClientError::validation(format!(
            "trim range is inverted ({}..{})",
            range.start, range.end
        )));
    }
    if range.end > trace_len {
        return Err(ClientError::validation(format!(
            "trim range {}..{} exceeds trace length {}",
            range.start, range.end, trace_len
        )));
    }
    if range.len() < MIN_TEMPLATE_POINTS {
        return Err(ClientError::validation(format!(
            "trim range selects {} points, minimum {} required",
            range.len(),
            MIN_TEMPLATE_POINTS
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_name_rejected() {
        let err = validate_save("", TrimRange::new(0, 10), 10).unwrap_err();
        assert!(err.is_validation());

        let err = validate_save("   ", TrimRange::new(0, 10), 10).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = validate_save("x", TrimRange::new(6, 5), 10).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let err = validate_save("x", TrimRange::new(0, 11), 10).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_too_short_range_rejected() {
        // length 3 < 5
        let err = validate_save("x", TrimRange::new(0, 3), 10).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_valid_range_accepted() {
        // length 6 >= 5
        assert!(validate_save("x", TrimRange::new(2, 8), 10).is_ok());
        // exact minimum
        assert!(validate_save("x", TrimRange::new(0, 5), 5).is_ok());
    }

    #[test]
    fn test_clamp_to() {
        assert_eq!(TrimRange::new(3, 20).clamp_to(10), TrimRange::new(3, 10));
        assert_eq!(TrimRange::new(15, 20).clamp_to(10), TrimRange::new(10, 10));
        assert_eq!(TrimRange::new(2, 8).clamp_to(10), TrimRange::new(2, 8));
    }

    #[test]
    fn test_full_range() {
        let range = TrimRange::full(7);
        assert_eq!(range, TrimRange::new(0, 7));
        assert_eq!(range.len(), 7);
    }
}

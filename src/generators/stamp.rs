//! QR-style stamp for vouchers.
//!
//! The stamp is a visual marker only: a 21x21 module matrix with the three
//! finder squares of a version-1 QR code, filled from the md5 digest of the
//! payload. It is not a scannable code.

use chrono::{DateTime, Local};
use serde::Serialize;

pub const STAMP_MODULES: usize = 21;
const FINDER: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stamp {
    pub payload: String,
    /// Row-major, `STAMP_MODULES * STAMP_MODULES` entries.
    pub modules: Vec<bool>,
}

impl Stamp {
    /// Stamp for `<prefix>-<epoch millis>`.
    pub fn from_timestamp(prefix: &str, at: &DateTime<Local>) -> Self {
        Self::from_payload(format!("{}-{}", prefix, at.timestamp_millis()))
    }

    pub fn from_payload(payload: String) -> Self {
        let mut bits = Vec::with_capacity(128 * 4);
        let mut seed = md5::compute(payload.as_bytes()).0;
        // Four chained digests give enough bits for the data area.
        for _ in 0..4 {
            for byte in seed {
                for shift in 0..8 {
                    bits.push((byte >> shift) & 1 == 1);
                }
            }
            seed = md5::compute(seed).0;
        }

        let mut modules = vec![false; STAMP_MODULES * STAMP_MODULES];
        let mut next = bits.into_iter().cycle();
        for row in 0..STAMP_MODULES {
            for col in 0..STAMP_MODULES {
                modules[row * STAMP_MODULES + col] = match finder_module(row, col) {
                    Some(dark) => dark,
                    None => next.next().unwrap_or(false),
                };
            }
        }

        Self { payload, modules }
    }

    pub fn is_dark(&self, row: usize, col: usize) -> bool {
        row < STAMP_MODULES && col < STAMP_MODULES && self.modules[row * STAMP_MODULES + col]
    }
}

/// Fixed module value inside a finder pattern (plus its separator), if any.
fn finder_module(row: usize, col: usize) -> Option<bool> {
    let far = STAMP_MODULES - FINDER;
    let origins = [(0, 0), (0, far), (far, 0)];

    for (r0, c0) in origins {
        // Separator ring one module wide around each finder.
        let r_lo = r0.saturating_sub(1);
        let c_lo = c0.saturating_sub(1);
        if row < r_lo || row > r0 + FINDER || col < c_lo || col > c0 + FINDER {
            continue;
        }
        if row < r0 || row >= r0 + FINDER || col < c0 || col >= c0 + FINDER {
            return Some(false);
        }
        let (r, c) = (row - r0, col - c0);
        let ring = r.min(c).min(FINDER - 1 - r).min(FINDER - 1 - c);
        return Some(ring != 1);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finder_corners() {
        let stamp = Stamp::from_payload("Payment-1700000000000".to_string());
        assert_eq!(stamp.modules.len(), STAMP_MODULES * STAMP_MODULES);
        // Outer ring dark, next ring light, centre dark.
        assert!(stamp.is_dark(0, 0));
        assert!(!stamp.is_dark(1, 1));
        assert!(stamp.is_dark(3, 3));
        assert!(stamp.is_dark(0, 20));
        assert!(stamp.is_dark(20, 0));
        // Separator.
        assert!(!stamp.is_dark(7, 0));
    }

    #[test]
    fn test_deterministic_per_payload() {
        let a = Stamp::from_payload("Payment-1".to_string());
        let b = Stamp::from_payload("Payment-1".to_string());
        let c = Stamp::from_payload("Payment-2".to_string());
        assert_eq!(a, b);
        assert_ne!(a.modules, c.modules);
    }
}

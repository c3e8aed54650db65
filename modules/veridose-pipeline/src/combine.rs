//! Deterministic weighted merge of science and personal scores.

use veridose_common::{
    BAND_GOOD_MIN, BAND_OK_MIN, EMOJI_GOOD, EMOJI_OK, EMOJI_POOR, PERSONAL_WEIGHT, SCIENCE_WEIGHT,
};

/// `round(0.7 * science + 0.3 * personal)`. Monotonic non-decreasing in
/// both arguments.
pub fn combine(science: u8, personal: u8) -> u8 {
    (SCIENCE_WEIGHT * science as f64 + PERSONAL_WEIGHT * personal as f64).round() as u8
}

pub fn emoji_for(score: u8) -> &'static str {
    if score >= BAND_GOOD_MIN {
        EMOJI_GOOD
    } else if score >= BAND_OK_MIN {
        EMOJI_OK
    } else {
        EMOJI_POOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints() {
        assert_eq!(combine(0, 0), 0);
        assert_eq!(combine(100, 100), 100);
    }

    #[test]
    fn weighting() {
        assert_eq!(combine(100, 0), 70);
        assert_eq!(combine(0, 100), 30);
        assert_eq!(combine(80, 90), 83);
    }

    #[test]
    fn monotonic_in_both_arguments() {
        for s in (0..=100).step_by(10) {
            for p in (0..=100).step_by(10) {
                let base = combine(s, p);
                if s < 100 {
                    assert!(combine(s + 10, p) >= base);
                }
                if p < 100 {
                    assert!(combine(s, p + 10) >= base);
                }
            }
        }
    }

    #[test]
    fn emoji_bands() {
        assert_eq!(emoji_for(100), EMOJI_GOOD);
        assert_eq!(emoji_for(80), EMOJI_GOOD);
        assert_eq!(emoji_for(79), EMOJI_OK);
        assert_eq!(emoji_for(60), EMOJI_OK);
        assert_eq!(emoji_for(59), EMOJI_POOR);
        assert_eq!(emoji_for(0), EMOJI_POOR);
    }
}

//! Deterministic slot scaffold: how many perspectives a run produces, where each
//! one sits on the bias axis, and which colour band owns it.

use crate::error::ScaffoldError;
use serde::{Deserialize, Serialize};

/// One of seven contiguous bias ranges, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Indigo,
    Violet,
}

impl Band {
    pub const ALL: [Band; 7] = [
        Band::Red,
        Band::Orange,
        Band::Yellow,
        Band::Green,
        Band::Blue,
        Band::Indigo,
        Band::Violet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Band::Red => "red",
            Band::Orange => "orange",
            Band::Yellow => "yellow",
            Band::Green => "green",
            Band::Blue => "blue",
            Band::Indigo => "indigo",
            Band::Violet => "violet",
        }
    }

    /// Best-effort band for a record that lost its colour label.
    pub fn from_bias(bias_x: f64) -> Band {
        let idx = (bias_x.clamp(0.0, 1.0) * Self::ALL.len() as f64) as usize;
        Self::ALL[idx.min(Self::ALL.len() - 1)]
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Band {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Band::ALL
            .iter()
            .copied()
            .find(|b| b.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("Unknown band: {}", s))
    }
}

/// A position the run must fill with exactly one perspective.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerspectiveSlot {
    pub index: usize,
    #[serde(rename = "color")]
    pub band: Band,
    pub bias_x: f64,
}

/// Number of perspectives for a claim of significance `s`: `ceil(128 * s^2.8 + 8)`.
///
/// `s` is clamped to `[0, 1]`, so the result always lies in `[8, 136]`.
pub fn perspective_count(significance: f64) -> usize {
    let s = significance.clamp(0.0, 1.0);
    (128.0 * s.powf(2.8) + 8.0).ceil() as usize
}

pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Build `count` slots with evenly spaced biases and contiguous, near-equal bands.
pub fn build_scaffold(count: usize) -> Result<Vec<PerspectiveSlot>, ScaffoldError> {
    if count == 0 {
        return Err(ScaffoldError::InvalidCount(count));
    }

    let bias = |i: usize| {
        if count > 1 {
            round4(i as f64 / (count - 1) as f64)
        } else {
            0.5
        }
    };

    let base = count / Band::ALL.len();
    let remainder = count % Band::ALL.len();

    let mut slots = Vec::with_capacity(count);
    let mut cursor = 0;
    for (band_idx, band) in Band::ALL.iter().enumerate() {
        let size = base + usize::from(band_idx < remainder);
        for index in cursor..cursor + size {
            slots.push(PerspectiveSlot {
                index,
                band: *band,
                bias_x: bias(index),
            });
        }
        cursor += size;
    }

    Ok(slots)
}

/// Split a scaffold into per-band groups in band order, skipping empty bands.
pub fn group_by_band(slots: &[PerspectiveSlot]) -> Vec<(Band, Vec<PerspectiveSlot>)> {
    Band::ALL
        .iter()
        .filter_map(|band| {
            let group: Vec<_> = slots.iter().filter(|s| s.band == *band).copied().collect();
            (!group.is_empty()).then_some((*band, group))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band_sizes(slots: &[PerspectiveSlot]) -> Vec<usize> {
        Band::ALL
            .iter()
            .map(|b| slots.iter().filter(|s| s.band == *b).count())
            .collect()
    }

    #[test]
    fn test_count_and_bias_span() {
        for count in 1..=140 {
            let slots = build_scaffold(count).unwrap();
            assert_eq!(slots.len(), count);
            for pair in slots.windows(2) {
                assert!(pair[0].bias_x <= pair[1].bias_x);
                assert_eq!(pair[0].index + 1, pair[1].index);
            }
            if count > 1 {
                assert_eq!(slots[0].bias_x, 0.0);
                assert_eq!(slots[count - 1].bias_x, 1.0);
            }
        }
    }

    #[test]
    fn test_single_slot_is_centered() {
        let slots = build_scaffold(1).unwrap();
        assert_eq!(slots[0].bias_x, 0.5);
        assert_eq!(slots[0].band, Band::Red);
    }

    #[test]
    fn test_zero_count_rejected() {
        assert!(matches!(
            build_scaffold(0),
            Err(ScaffoldError::InvalidCount(0))
        ));
    }

    #[test]
    fn test_band_sizes_for_27() {
        let slots = build_scaffold(27).unwrap();
        assert_eq!(band_sizes(&slots), vec![4, 4, 4, 4, 4, 4, 3]);
    }

    #[test]
    fn test_bands_are_contiguous_and_balanced() {
        for count in 1..=140 {
            let slots = build_scaffold(count).unwrap();
            let sizes: Vec<_> = band_sizes(&slots).into_iter().filter(|s| *s > 0).collect();
            let max = sizes.iter().max().unwrap();
            let min = sizes.iter().min().unwrap();
            assert!(max - min <= 1, "count {}: {:?}", count, sizes);

            for pair in slots.windows(2) {
                assert!(pair[0].band <= pair[1].band);
            }
        }
    }

    #[test]
    fn test_perspective_count_formula() {
        assert_eq!(perspective_count(0.5), 27);
        assert_eq!(perspective_count(0.0), 8);
        assert_eq!(perspective_count(1.0), 136);
        assert_eq!(perspective_count(1.7), 136);
    }

    #[test]
    fn test_group_by_band_preserves_order() {
        let slots = build_scaffold(10).unwrap();
        let groups = group_by_band(&slots);
        assert_eq!(groups.len(), 7);
        assert_eq!(groups[0].0, Band::Red);
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[6].1.len(), 1);

        let few = build_scaffold(3).unwrap();
        let groups = group_by_band(&few);
        assert_eq!(
            groups.iter().map(|(b, _)| *b).collect::<Vec<_>>(),
            vec![Band::Red, Band::Orange, Band::Yellow]
        );
    }

    #[test]
    fn test_band_parse_and_from_bias() {
        assert_eq!("Indigo".parse::<Band>().unwrap(), Band::Indigo);
        assert!("teal".parse::<Band>().is_err());
        assert_eq!(Band::from_bias(0.0), Band::Red);
        assert_eq!(Band::from_bias(1.0), Band::Violet);
        assert_eq!(Band::from_bias(0.5), Band::Green);
    }
}

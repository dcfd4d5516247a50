//! Posture signal categories

use std::fmt;

use serde::{Deserialize, Serialize};

/// Common behaviour of the four posture signals
pub trait Signal: Copy {
    /// Whether this is the acceptable value
    fn is_normal(self) -> bool;

    /// Human-readable description used in alerts and overlays
    fn description(self) -> &'static str;
}

/// Vertical head position and tilt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeadPosition {
    TooHigh,
    TooLow,
    Normal,
    Tilted,
}

/// Distance from the camera, from relative face size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SitDistance {
    TooFar,
    TooNear,
    Normal,
}

/// Vertical sitting height, from the face's top edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SitHeight {
    TooHigh,
    TooLow,
    Normal,
}

/// Lean and hunch proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LateralPosture {
    LeaningForward,
    LeaningBack,
    Normal,
    PossibleHunch,
}

/// Result of the optional side-view silhouette check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SideViewPosture {
    Upright,
    Hunchback,
}

impl Signal for HeadPosition {
    fn is_normal(self) -> bool {
        self == HeadPosition::Normal
    }

    fn description(self) -> &'static str {
        match self {
            HeadPosition::TooHigh => "head position too high",
            HeadPosition::TooLow => "head position too low",
            HeadPosition::Normal => "head position normal",
            HeadPosition::Tilted => "head tilted",
        }
    }
}

impl Signal for SitDistance {
    fn is_normal(self) -> bool {
        self == SitDistance::Normal
    }

    fn description(self) -> &'static str {
        match self {
            SitDistance::TooFar => "sitting too far from the screen",
            SitDistance::TooNear => "sitting too close to the screen",
            SitDistance::Normal => "sitting distance normal",
        }
    }
}

impl Signal for SitHeight {
    fn is_normal(self) -> bool {
        self == SitHeight::Normal
    }

    fn description(self) -> &'static str {
        match self {
            SitHeight::TooHigh => "sitting too high",
            SitHeight::TooLow => "sitting too low",
            SitHeight::Normal => "sitting height normal",
        }
    }
}

impl Signal for LateralPosture {
    fn is_normal(self) -> bool {
        self == LateralPosture::Normal
    }

    fn description(self) -> &'static str {
        match self {
            LateralPosture::LeaningForward => "leaning forward",
            LateralPosture::LeaningBack => "leaning back",
            LateralPosture::Normal => "sitting upright",
            LateralPosture::PossibleHunch => "possible hunch",
        }
    }
}

impl Signal for SideViewPosture {
    fn is_normal(self) -> bool {
        self == SideViewPosture::Upright
    }

    fn description(self) -> &'static str {
        match self {
            SideViewPosture::Upright => "side view upright",
            SideViewPosture::Hunchback => "hunchback detected",
        }
    }
}

macro_rules! display_via_description {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.description())
            }
        })*
    };
}

display_via_description!(HeadPosition, SitDistance, SitHeight, LateralPosture, SideViewPosture);

/// The four per-frame posture signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostureSignals {
    pub head: HeadPosition,
    pub distance: SitDistance,
    pub height: SitHeight,
    pub lateral: LateralPosture,
}

impl PostureSignals {
    /// All signals at their normal value
    pub fn normal() -> Self {
        Self {
            head: HeadPosition::Normal,
            distance: SitDistance::Normal,
            height: SitHeight::Normal,
            lateral: LateralPosture::Normal,
        }
    }

    /// True iff every signal is normal
    pub fn is_correct(&self) -> bool {
        self.head.is_normal()
            && self.distance.is_normal()
            && self.height.is_normal()
            && self.lateral.is_normal()
    }

    /// Descriptions of the non-normal signals, in signal order
    pub fn deviations(&self) -> Vec<&'static str> {
        let all = [
            (self.head.is_normal(), self.head.description()),
            (self.distance.is_normal(), self.distance.description()),
            (self.height.is_normal(), self.height.description()),
            (self.lateral.is_normal(), self.lateral.description()),
        ];
        all.into_iter()
            .filter(|(normal, _)| !normal)
            .map(|(_, description)| description)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_normal_is_correct() {
        let signals = PostureSignals::normal();
        assert!(signals.is_correct());
        assert!(signals.deviations().is_empty());
    }

    #[test]
    fn test_any_single_deviation_flips_verdict() {
        let base = PostureSignals::normal();
        let flipped = [
            PostureSignals { head: HeadPosition::TooHigh, ..base },
            PostureSignals { head: HeadPosition::TooLow, ..base },
            PostureSignals { head: HeadPosition::Tilted, ..base },
            PostureSignals { distance: SitDistance::TooFar, ..base },
            PostureSignals { distance: SitDistance::TooNear, ..base },
            PostureSignals { height: SitHeight::TooHigh, ..base },
            PostureSignals { height: SitHeight::TooLow, ..base },
            PostureSignals { lateral: LateralPosture::LeaningForward, ..base },
            PostureSignals { lateral: LateralPosture::LeaningBack, ..base },
            PostureSignals { lateral: LateralPosture::PossibleHunch, ..base },
        ];

        for signals in flipped {
            assert!(!signals.is_correct(), "{:?} should be incorrect", signals);
            assert_eq!(signals.deviations().len(), 1);
        }
    }

    #[test]
    fn test_deviation_order() {
        let signals = PostureSignals {
            head: HeadPosition::Tilted,
            distance: SitDistance::TooNear,
            height: SitHeight::Normal,
            lateral: LateralPosture::LeaningBack,
        };
        assert_eq!(
            signals.deviations(),
            vec!["head tilted", "sitting too close to the screen", "leaning back"]
        );
    }
}

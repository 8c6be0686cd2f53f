//! Maximum-fill selection among competing bubbles.

/// Why a bubble field produced no accepted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The darkest bubble did not exceed the acceptance threshold.
    BelowThreshold,
    /// Two or more bubbles share the highest fill ratio.
    Tie,
}

impl RejectReason {
    pub const fn code(self) -> &'static str {
        match self {
            Self::BelowThreshold => "below_threshold",
            Self::Tie => "tie",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Outcome of one field: a strict winner above threshold, or nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection {
    Accepted { index: usize, fill: f32 },
    Rejected { reason: RejectReason, best_fill: f32 },
}

impl Selection {
    /// Index of the accepted bubble.
    pub fn accepted(&self) -> Option<usize> {
        match *self {
            Self::Accepted { index, .. } => Some(index),
            Self::Rejected { .. } => None,
        }
    }

    /// Highest fill ratio measured for this field, accepted or not.
    pub fn best_fill(&self) -> f32 {
        match *self {
            Self::Accepted { fill, .. } => fill,
            Self::Rejected { best_fill, .. } => best_fill,
        }
    }

    pub fn reject_reason(&self) -> Option<RejectReason> {
        match *self {
            Self::Accepted { .. } => None,
            Self::Rejected { reason, .. } => Some(reason),
        }
    }
}

/// Pick the bubble with the strictly highest fill ratio above `threshold`.
///
/// An exact tie for the maximum has no winner.
pub fn select_max_fill(fills: &[f32], threshold: f32) -> Selection {
    let mut best: Option<(usize, f32)> = None;
    let mut tied = false;
    for (i, &fill) in fills.iter().enumerate() {
        match best {
            Some((_, b)) if fill == b => tied = true,
            Some((_, b)) if fill < b => {}
            _ => {
                best = Some((i, fill));
                tied = false;
            }
        }
    }

    let Some((index, fill)) = best else {
        return Selection::Rejected {
            reason: RejectReason::BelowThreshold,
            best_fill: 0.0,
        };
    };

    if fill <= threshold {
        Selection::Rejected {
            reason: RejectReason::BelowThreshold,
            best_fill: fill,
        }
    } else if tied {
        Selection::Rejected {
            reason: RejectReason::Tie,
            best_fill: fill,
        }
    } else {
        Selection::Accepted { index, fill }
    }
}

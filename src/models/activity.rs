// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Activity definitions and tier-based scoring.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A single scoring tier: values in `[min, max)` award `points`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Tier {
    /// Lower bound (inclusive)
    pub min: f64,
    /// Upper bound (exclusive); `None` marks the open-ended final tier
    #[serde(default)]
    pub max: Option<f64>,
    /// Points awarded for values in this tier
    pub points: u32,
}

/// Ordered tier table attached to an activity.
///
/// Stored shape: `{"tiers": [{"min": 0.0, "max": 50.0, "points": 1}, ...]}`,
/// ascending by `min`, last tier with `"max": null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ScoringTiers {
    pub tiers: Vec<Tier>,
}

impl ScoringTiers {
    /// Map a reported value to points.
    ///
    /// Tiers are evaluated in stored order: a bounded tier matches when
    /// `min <= value < max`, the open final tier when `value >= min`.
    /// The first match wins. A value below the first tier's `min` scores 0.
    pub fn compute_points(&self, value: f64) -> u32 {
        for tier in &self.tiers {
            let matched = match tier.max {
                Some(max) => value >= tier.min && value < max,
                None => value >= tier.min,
            };
            if matched {
                return tier.points;
            }
        }
        0
    }

    /// Validate the table shape: non-empty, contiguous ascending by `min`,
    /// exactly the last tier open-ended.
    pub fn validate(&self) -> Result<(), String> {
        if self.tiers.is_empty() {
            return Err("at least one tier is required".to_string());
        }

        let last_idx = self.tiers.len() - 1;
        for (i, tier) in self.tiers.iter().enumerate() {
            if tier.min < 0.0 {
                return Err(format!("tier {} has a negative min", i + 1));
            }
            match (tier.max, i == last_idx) {
                (Some(_), true) => {
                    return Err("the last tier must be open-ended (max = null)".to_string());
                }
                (None, false) => {
                    return Err(format!("tier {} is open-ended but not last", i + 1));
                }
                (Some(max), false) => {
                    if max <= tier.min {
                        return Err(format!("tier {} has max <= min", i + 1));
                    }
                    if self.tiers[i + 1].min != max {
                        return Err(format!(
                            "tier {} does not start where tier {} ends",
                            i + 2,
                            i + 1
                        ));
                    }
                }
                (None, true) => {}
            }
        }

        Ok(())
    }
}

/// Activity definition stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Document ID
    pub id: String,
    /// Display name (e.g. "Running")
    pub name: String,
    /// Longer description shown when registering values
    pub description: String,
    /// Unit of the reported value (e.g. "km", "k steps")
    pub unit: String,
    /// Ordered scoring tiers
    pub scoring_tiers: ScoringTiers,
    /// Owning company; `None` marks a global template visible to every company
    pub company_id: Option<String>,
    /// Soft-delete flag; inactive activities are hidden from registration but
    /// historical entries keep referencing them
    pub is_active: bool,
    /// When this definition was created (RFC3339)
    pub created_at: String,
}

// Domain type definitions for the costing engine
// Provides the enums shared by the calculators, the workspace and the HTTP layer

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Access level of a roster entry
///
/// Only the three staff levels count toward personnel cost. Any other level
/// coming from the roster provider deserializes as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    SuperAdmin,
    Admin,
    Professional,
    #[serde(other)]
    Other,
}

impl AccessLevel {
    /// Whether a staff member with this level is part of the salary base
    pub fn counts_toward_personnel_cost(&self) -> bool {
        matches!(
            self,
            AccessLevel::SuperAdmin | AccessLevel::Admin | AccessLevel::Professional
        )
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessLevel::SuperAdmin => write!(f, "super_admin"),
            AccessLevel::Admin => write!(f, "admin"),
            AccessLevel::Professional => write!(f, "professional"),
            AccessLevel::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for AccessLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(AccessLevel::SuperAdmin),
            "admin" => Ok(AccessLevel::Admin),
            "professional" => Ok(AccessLevel::Professional),
            "other" => Ok(AccessLevel::Other),
            _ => Err(format!("Invalid access level: {}", s)),
        }
    }
}

/// Health classification of a subscription plan
///
/// Priority when classifying: `Danger` over `Warning` over `Healthy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Plan price is below its operational cost
    Danger,

    /// Plan is profitable but priced under the suggested minimum
    Warning,

    Healthy,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Danger => write!(f, "danger"),
            HealthStatus::Warning => write!(f, "warning"),
            HealthStatus::Healthy => write!(f, "healthy"),
        }
    }
}

/// Per-plan state of the scheduled price increase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IncreaseState {
    Normal,
    ScheduledForIncrease,
}

impl Default for IncreaseState {
    fn default() -> Self {
        IncreaseState::Normal
    }
}

impl fmt::Display for IncreaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncreaseState::Normal => write!(f, "normal"),
            IncreaseState::ScheduledForIncrease => write!(f, "scheduled_for_increase"),
        }
    }
}

/// Whether a draft differs from its committed value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DraftState {
    Clean,
    Dirty,
}

impl fmt::Display for DraftState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftState::Clean => write!(f, "clean"),
            DraftState::Dirty => write!(f, "dirty"),
        }
    }
}

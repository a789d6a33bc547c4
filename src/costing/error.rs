// Error types for the costing engine
// The calculators themselves never fail; these cover operator actions,
// settings/policy validation and persistence of the committed workspace.

use thiserror::Error;

/// Main error type for the costing engine
#[derive(Debug, Error)]
pub enum CostingError {
    /// Financial settings that cannot be used even after clamping
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// Auto-increase policy outside its accepted range
    #[error("Invalid auto-increase policy: {0}")]
    InvalidPolicy(String),

    /// Operator action targeting a service that is not in the catalog
    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    /// Operator action targeting a plan that is not in the catalog
    #[error("Plan not found: {0}")]
    PlanNotFound(String),

    /// The workspace store refused or failed to persist a snapshot
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// JSON serialization/deserialization errors
    /// Occurs when reading a seed snapshot
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for costing operations
pub type CostingResult<T> = Result<T, CostingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = CostingError::PlanNotFound("plan-9".to_string());
        assert_eq!(error.to_string(), "Plan not found: plan-9");

        let error = CostingError::InvalidPolicy("trigger day must be 1-31".to_string());
        assert_eq!(error.to_string(), "Invalid auto-increase policy: trigger day must be 1-31");
    }

    #[test]
    fn test_error_from_json() {
        let json_result: Result<serde_json::Value, _> = serde_json::from_str("{invalid json}");

        if let Err(json_error) = json_result {
            let error: CostingError = json_error.into();
            assert!(matches!(error, CostingError::Json(_)));
        }
    }
}

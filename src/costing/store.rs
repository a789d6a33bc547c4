// Workspace persistence
//
// The committed state is handed to a store as one snapshot. Stores are
// called at most once per save and never retried.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Mutex;
use utoipa::ToSchema;

use crate::costing::auto_increase::{AutoIncreasePolicy, IncreaseSchedule};
use crate::costing::error::{CostingError, CostingResult};
use crate::costing::models::{Catalog, FinancialSettings, Staff};

/// Everything a workspace needs to start from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WorkspaceSnapshot {
    pub settings: FinancialSettings,
    #[serde(default)]
    pub staff: Vec<Staff>,
    #[serde(default)]
    pub catalog: Catalog,
    #[serde(default)]
    pub policy: AutoIncreasePolicy,
    #[serde(default)]
    pub schedule: IncreaseSchedule,
}

/// Destination of saved workspaces
pub trait WorkspaceStore: Send + Sync {
    fn persist(&self, snapshot: &WorkspaceSnapshot) -> CostingResult<()>;
}

/// Store keeping the last saved snapshot in memory
#[derive(Debug, Default)]
pub struct InMemoryStore {
    saved: Mutex<Option<WorkspaceSnapshot>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last snapshot persisted, if any
    pub fn last_saved(&self) -> Option<WorkspaceSnapshot> {
        match self.saved.lock() {
            Ok(saved) => saved.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl WorkspaceStore for InMemoryStore {
    fn persist(&self, snapshot: &WorkspaceSnapshot) -> CostingResult<()> {
        let mut saved = self
            .saved
            .lock()
            .map_err(|e| CostingError::Persistence(format!("store lock poisoned: {}", e)))?;
        *saved = Some(snapshot.clone());
        Ok(())
    }
}

/// Read a snapshot from a JSON file
pub fn load_snapshot_file(path: impl AsRef<Path>) -> CostingResult<WorkspaceSnapshot> {
    let path = path.as_ref();
    tracing::info!("Loading workspace snapshot from {}", path.display());

    let contents = std::fs::read_to_string(path)?;
    let snapshot: WorkspaceSnapshot = serde_json::from_str(&contents)?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot() -> WorkspaceSnapshot {
        WorkspaceSnapshot {
            settings: FinancialSettings {
                salary_per_employee: dec!(2500),
                ..FinancialSettings::default()
            },
            staff: vec![],
            catalog: Catalog::default(),
            policy: AutoIncreasePolicy::default(),
            schedule: IncreaseSchedule::default(),
        }
    }

    #[test]
    fn test_in_memory_store_keeps_last_snapshot() {
        let store = InMemoryStore::new();
        assert!(store.last_saved().is_none());

        store.persist(&snapshot()).unwrap();
        assert_eq!(store.last_saved(), Some(snapshot()));
    }

    #[test]
    fn test_snapshot_defaults_optional_sections() {
        let json = r#"{
            "settings": {
                "work_days_in_month": 22,
                "default_commission": 40,
                "plan_safety_margin": 30,
                "card_fee_percentage": 3,
                "tax_on_services_percentage": 6,
                "salary_per_employee": 2500,
                "social_charges_percentage": 0
            }
        }"#;

        let snapshot: WorkspaceSnapshot = serde_json::from_str(json).unwrap();

        assert_eq!(snapshot.settings.default_commission, dec!(40));
        assert!(snapshot.staff.is_empty());
        assert!(snapshot.catalog.services.is_empty());
        assert_eq!(snapshot.policy, AutoIncreasePolicy::default());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = load_snapshot_file("/definitely/not/here.json");
        assert!(matches!(result, Err(CostingError::Io(_))));
    }

    #[test]
    fn test_load_snapshot_file() {
        let path = std::env::temp_dir().join(format!("salon-snapshot-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, serde_json::to_string(&snapshot()).unwrap()).unwrap();

        let loaded = load_snapshot_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, snapshot());
    }
}

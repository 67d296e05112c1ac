// Service Catalog Domain Model

use serde::{Deserialize, Serialize};

/// Center identifier (database row id)
pub type CenterId = i64;

/// Department identifier (database row id)
pub type DepartmentId = i64;

/// A department within a service center. Immutable once provisioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    pub center_id: CenterId,
    /// Capacity ceiling for WAITING tokens
    pub max_slots: i64,
    /// Average minutes spent serving one token
    pub avg_service_time: i64,
}

/// A service center and its departments (ordered by id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Center {
    pub id: CenterId,
    pub name: String,
    pub departments: Vec<Department>,
}

/// Provisioning input for one center, usually read from configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CenterSpec {
    pub name: String,
    #[serde(default)]
    pub departments: Vec<DepartmentSpec>,
}

/// Provisioning input for one department
#[derive(Debug, Clone, Deserialize)]
pub struct DepartmentSpec {
    pub name: String,
    pub max_slots: i64,
    pub avg_service_time: i64,
}

impl DepartmentSpec {
    pub fn new(name: impl Into<String>, max_slots: i64, avg_service_time: i64) -> Self {
        Self {
            name: name.into(),
            max_slots,
            avg_service_time,
        }
    }

    pub fn validate(&self) -> super::error::Result<()> {
        if self.name.trim().is_empty() {
            return Err(super::DomainError::ValidationError(
                "department name cannot be empty".to_string(),
            ));
        }
        if self.max_slots <= 0 {
            return Err(super::DomainError::ValidationError(format!(
                "department '{}' must have max_slots > 0",
                self.name
            )));
        }
        if self.avg_service_time < 0 {
            return Err(super::DomainError::ValidationError(format!(
                "department '{}' has a negative avg_service_time",
                self.name
            )));
        }
        Ok(())
    }
}

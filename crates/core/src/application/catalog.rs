// Catalog Service - read-mostly registry of centers and departments

use crate::domain::{Center, CenterSpec, DomainError};
use crate::error::Result;
use crate::port::CatalogRepository;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

pub struct CatalogService {
    catalog: Arc<dyn CatalogRepository>,
}

impl CatalogService {
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }

    /// Centers ordered by id, each with its departments
    pub async fn list_centers(&self) -> Result<Vec<Center>> {
        self.catalog.list_centers().await
    }

    /// Idempotently upsert the configured catalog.
    ///
    /// Everything is validated before the first write and the store applies
    /// all upserts in one transaction, so a failure leaves the catalog
    /// untouched. Returns the number of departments provisioned.
    pub async fn provision(&self, centers: &[CenterSpec]) -> Result<usize> {
        validate(centers)?;

        let trimmed: Vec<CenterSpec> = centers
            .iter()
            .map(|center| CenterSpec {
                name: center.name.trim().to_string(),
                ..center.clone()
            })
            .collect();
        let departments = self.catalog.provision(&trimmed).await?;

        info!(
            centers = centers.len(),
            departments = departments,
            "Catalog provisioned"
        );
        Ok(departments)
    }
}

fn validate(centers: &[CenterSpec]) -> Result<()> {
    let mut center_names = HashSet::new();
    for center in centers {
        let name = center.name.trim();
        if name.is_empty() {
            return Err(DomainError::ValidationError("center name cannot be empty".to_string()).into());
        }
        if !center_names.insert(name.to_lowercase()) {
            return Err(DomainError::ValidationError(format!("duplicate center '{}'", name)).into());
        }

        let mut department_names = HashSet::new();
        for department in &center.departments {
            department.validate()?;
            if !department_names.insert(department.name.trim().to_lowercase()) {
                return Err(DomainError::ValidationError(format!(
                    "duplicate department '{}' in center '{}'",
                    department.name, name
                ))
                .into());
            }
        }
    }
    Ok(())
}

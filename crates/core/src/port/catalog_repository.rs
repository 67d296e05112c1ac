// Catalog Repository Port (Interface)

use crate::domain::{Center, CenterId, CenterSpec, Department, DepartmentId, DepartmentSpec};
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// All centers ordered by id, departments nested and ordered by id
    async fn list_centers(&self) -> Result<Vec<Center>>;

    async fn find_department(&self, id: DepartmentId) -> Result<Option<Department>>;

    /// Insert the center if no center has this name; returns its id either way
    async fn upsert_center(&self, name: &str) -> Result<CenterId>;

    /// Insert or update (matched by name within the center)
    async fn upsert_department(&self, center_id: CenterId, spec: &DepartmentSpec)
        -> Result<DepartmentId>;

    /// Upsert every center and department atomically; returns the number of
    /// departments written. On error nothing is written.
    async fn provision(&self, centers: &[CenterSpec]) -> Result<usize>;
}

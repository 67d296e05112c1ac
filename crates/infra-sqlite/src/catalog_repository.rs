// SQLite CatalogRepository Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use queueless_core::domain::{
    Center, CenterId, CenterSpec, Department, DepartmentId, DepartmentSpec,
};
use queueless_core::error::Result;
use queueless_core::port::CatalogRepository;
use sqlx::{SqliteConnection, SqlitePool};

pub struct SqliteCatalogRepository {
    pool: SqlitePool,
}

impl SqliteCatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CenterDepartmentRow {
    center_id: i64,
    center_name: String,
    department_id: Option<i64>,
    department_name: Option<String>,
    max_slots: Option<i64>,
    avg_service_time: Option<i64>,
}

#[derive(Debug, sqlx::FromRow)]
struct DepartmentRow {
    id: i64,
    name: String,
    center_id: i64,
    max_slots: i64,
    avg_service_time: i64,
}

impl From<DepartmentRow> for Department {
    fn from(row: DepartmentRow) -> Self {
        Department {
            id: row.id,
            name: row.name,
            center_id: row.center_id,
            max_slots: row.max_slots,
            avg_service_time: row.avg_service_time,
        }
    }
}

#[async_trait]
impl CatalogRepository for SqliteCatalogRepository {
    async fn list_centers(&self) -> Result<Vec<Center>> {
        let rows = sqlx::query_as::<_, CenterDepartmentRow>(
            r#"
            SELECT c.id AS center_id, c.name AS center_name,
                   d.id AS department_id, d.name AS department_name,
                   d.max_slots, d.avg_service_time
            FROM centers c
            LEFT JOIN departments d ON d.center_id = c.id
            ORDER BY c.id ASC, d.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let mut centers: Vec<Center> = Vec::new();
        for row in rows {
            if centers.last().map(|c| c.id) != Some(row.center_id) {
                centers.push(Center {
                    id: row.center_id,
                    name: row.center_name,
                    departments: Vec::new(),
                });
            }

            // Centers without departments come back as a single NULL-padded row
            let (Some(id), Some(name), Some(max_slots), Some(avg_service_time)) = (
                row.department_id,
                row.department_name,
                row.max_slots,
                row.avg_service_time,
            ) else {
                continue;
            };

            if let Some(center) = centers.last_mut() {
                center.departments.push(Department {
                    id,
                    name,
                    center_id: row.center_id,
                    max_slots,
                    avg_service_time,
                });
            }
        }

        Ok(centers)
    }

    async fn find_department(&self, id: DepartmentId) -> Result<Option<Department>> {
        let row = sqlx::query_as::<_, DepartmentRow>(
            "SELECT id, name, center_id, max_slots, avg_service_time FROM departments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Department::from))
    }

    async fn upsert_center(&self, name: &str) -> Result<CenterId> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        upsert_center_on(&mut *conn, name).await
    }

    async fn upsert_department(
        &self,
        center_id: CenterId,
        spec: &DepartmentSpec,
    ) -> Result<DepartmentId> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        upsert_department_on(&mut *conn, center_id, spec).await
    }

    async fn provision(&self, centers: &[CenterSpec]) -> Result<usize> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let mut departments = 0;
        for center in centers {
            let center_id = upsert_center_on(&mut *tx, &center.name).await?;
            for department in &center.departments {
                upsert_department_on(&mut *tx, center_id, department).await?;
                departments += 1;
            }
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(departments)
    }
}

async fn upsert_center_on(conn: &mut SqliteConnection, name: &str) -> Result<CenterId> {
    sqlx::query_scalar(
        r#"
        INSERT INTO centers (name) VALUES (?)
        ON CONFLICT(name) DO UPDATE SET name = name
        RETURNING id
        "#,
    )
    .bind(name)
    .fetch_one(conn)
    .await
    .map_err(map_sqlx_error)
}

async fn upsert_department_on(
    conn: &mut SqliteConnection,
    center_id: CenterId,
    spec: &DepartmentSpec,
) -> Result<DepartmentId> {
    sqlx::query_scalar(
        r#"
        INSERT INTO departments (center_id, name, max_slots, avg_service_time)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(center_id, name) DO UPDATE SET
            max_slots = excluded.max_slots,
            avg_service_time = excluded.avg_service_time
        RETURNING id
        "#,
    )
    .bind(center_id)
    .bind(&spec.name)
    .bind(spec.max_slots)
    .bind(spec.avg_service_time)
    .fetch_one(conn)
    .await
    .map_err(map_sqlx_error)
}

// ============================================================================
// Tenancy Infrastructure - PostgreSQL Connection Descriptor Repository
// File: crates/tenancy-infrastructure/src/database/postgres/connection_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use tenancy_core::domain::ConnectionDescriptor;
use tenancy_core::error::DomainError;
use tenancy_core::repositories::ConnectionDescriptorRepository;

use super::{read_error, write_error};

pub struct PgConnectionDescriptorRepository {
    pool: PgPool,
}

impl PgConnectionDescriptorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct DescriptorRow {
    pub dsn: String,
    pub schema_name: Option<String>,
}

#[async_trait]
impl ConnectionDescriptorRepository for PgConnectionDescriptorRepository {
    async fn find_by_tenant(&self, tenant_id: &Uuid) -> Result<Option<ConnectionDescriptor>, DomainError> {
        let row: Option<DescriptorRow> = sqlx::query_as(
            r#"
            SELECT dsn, schema_name
            FROM tenant_connections
            WHERE tenant_id = $1
            "#
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error("finding connection descriptor", e))?;

        // Stored descriptors are always tenant-specific
        Ok(row.map(|r| ConnectionDescriptor::dedicated(r.dsn, r.schema_name)))
    }

    async fn upsert(&self, tenant_id: &Uuid, descriptor: &ConnectionDescriptor) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO tenant_connections (tenant_id, dsn, schema_name, modified_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (tenant_id)
            DO UPDATE SET dsn = EXCLUDED.dsn, schema_name = EXCLUDED.schema_name, modified_at = NOW()
            "#
        )
        .bind(tenant_id)
        .bind(&descriptor.dsn)
        .bind(&descriptor.schema)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error("storing connection descriptor", e, |_| None))?;

        Ok(())
    }

    async fn remove(&self, tenant_id: &Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM tenant_connections WHERE tenant_id = $1")
            .bind(tenant_id)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error("removing connection descriptor", e, |_| None))?;

        Ok(result.rows_affected() > 0)
    }
}

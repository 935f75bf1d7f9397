// ============================================================================
// Tenancy Infrastructure - PostgreSQL Tenant Repository
// File: crates/tenancy-infrastructure/src/database/postgres/tenant_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use tenancy_core::domain::Tenant;
use tenancy_core::error::DomainError;
use tenancy_core::repositories::TenantRepository;

use super::{read_error, write_error};

pub struct PgTenantRepository {
    pool: PgPool,
}

impl PgTenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct TenantRow {
    pub id: Uuid,
    pub code: String,
    pub domain: Option<String>,
    pub display_name: String,
    pub contact_email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl From<TenantRow> for Tenant {
    fn from(row: TenantRow) -> Self {
        Tenant {
            id: row.id,
            code: row.code,
            domain: row.domain,
            display_name: row.display_name,
            contact_email: row.contact_email,
            is_active: row.is_active,
            created_at: row.created_at,
            modified_at: row.modified_at,
        }
    }
}

fn conflict(tenant: &Tenant) -> impl FnOnce(&str) -> Option<DomainError> + '_ {
    move |msg: &str| {
        if msg.contains("domain") {
            tenant.domain.clone().map(DomainError::TenantDomainAlreadyExists)
        } else {
            Some(DomainError::TenantCodeAlreadyExists(tenant.code.clone()))
        }
    }
}

#[async_trait]
impl TenantRepository for PgTenantRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Tenant>, DomainError> {
        let row: Option<TenantRow> = sqlx::query_as(
            r#"
            SELECT id, code, domain, display_name, contact_email, is_active, created_at, modified_at
            FROM tenants
            WHERE id = $1
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error("finding tenant by id", e))?;

        Ok(row.map(Into::into))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Tenant>, DomainError> {
        let row: Option<TenantRow> = sqlx::query_as(
            r#"
            SELECT id, code, domain, display_name, contact_email, is_active, created_at, modified_at
            FROM tenants
            WHERE LOWER(code) = LOWER($1)
            "#
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error("finding tenant by code", e))?;

        Ok(row.map(Into::into))
    }

    async fn find_by_domain(&self, domain: &str) -> Result<Option<Tenant>, DomainError> {
        let row: Option<TenantRow> = sqlx::query_as(
            r#"
            SELECT id, code, domain, display_name, contact_email, is_active, created_at, modified_at
            FROM tenants
            WHERE LOWER(domain) = LOWER($1)
            "#
        )
        .bind(domain)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error("finding tenant by domain", e))?;

        Ok(row.map(Into::into))
    }

    async fn create(&self, tenant: &Tenant) -> Result<Tenant, DomainError> {
        let row: TenantRow = sqlx::query_as(
            r#"
            INSERT INTO tenants (
                id, code, domain, display_name, contact_email, is_active, created_at, modified_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, code, domain, display_name, contact_email, is_active, created_at, modified_at
            "#
        )
        .bind(tenant.id)
        .bind(&tenant.code)
        .bind(&tenant.domain)
        .bind(&tenant.display_name)
        .bind(&tenant.contact_email)
        .bind(tenant.is_active)
        .bind(tenant.created_at)
        .bind(tenant.modified_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error("creating tenant", e, conflict(tenant)))?;

        info!("Tenant row inserted: {}", row.id);
        Ok(row.into())
    }

    async fn update(&self, tenant: &Tenant) -> Result<Tenant, DomainError> {
        let row: Option<TenantRow> = sqlx::query_as(
            r#"
            UPDATE tenants
            SET
                domain = $2,
                display_name = $3,
                contact_email = $4,
                is_active = $5,
                modified_at = $6
            WHERE id = $1
            RETURNING id, code, domain, display_name, contact_email, is_active, created_at, modified_at
            "#
        )
        .bind(tenant.id)
        .bind(&tenant.domain)
        .bind(&tenant.display_name)
        .bind(&tenant.contact_email)
        .bind(tenant.is_active)
        .bind(tenant.modified_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error("updating tenant", e, conflict(tenant)))?;

        row.map(Into::into).ok_or(DomainError::TenantNotFound)
    }
}

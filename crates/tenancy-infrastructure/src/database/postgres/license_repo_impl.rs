// ============================================================================
// Tenancy Infrastructure - PostgreSQL License Repository
// File: crates/tenancy-infrastructure/src/database/postgres/license_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use tenancy_core::domain::{FeatureFlags, License, LicenseType};
use tenancy_core::error::DomainError;
use tenancy_core::repositories::LicenseRepository;

use super::{read_error, write_error};

pub struct PgLicenseRepository {
    pool: PgPool,
}

impl PgLicenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct LicenseRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub license_type: String,
    pub max_employees: i32,
    pub has_reports: bool,
    pub has_api: bool,
    pub has_mobile_app: bool,
    pub monthly_price_cents: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl TryFrom<LicenseRow> for License {
    type Error = DomainError;

    fn try_from(row: LicenseRow) -> Result<Self, Self::Error> {
        let license_type = LicenseType::from_str(&row.license_type).ok_or_else(|| {
            DomainError::DatabaseError(format!("Unknown license type '{}' on license {}", row.license_type, row.id))
        })?;
        let max_employees = u32::try_from(row.max_employees).map_err(|_| {
            DomainError::DatabaseError(format!("Negative employee limit on license {}", row.id))
        })?;

        Ok(License {
            id: row.id,
            tenant_id: row.tenant_id,
            license_type,
            max_employees,
            features: FeatureFlags {
                has_reports: row.has_reports,
                has_api: row.has_api,
                has_mobile_app: row.has_mobile_app,
            },
            monthly_price_cents: row.monthly_price_cents,
            start_date: row.start_date,
            end_date: row.end_date,
            is_active: row.is_active,
            created_at: row.created_at,
            modified_at: row.modified_at,
        })
    }
}

fn max_employees_column(license: &License) -> Result<i32, DomainError> {
    i32::try_from(license.max_employees)
        .map_err(|_| DomainError::ValidationError("Employee limit out of range".to_string()))
}

#[async_trait]
impl LicenseRepository for PgLicenseRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<License>, DomainError> {
        let row: Option<LicenseRow> = sqlx::query_as(
            r#"
            SELECT
                id, tenant_id, license_type, max_employees,
                has_reports, has_api, has_mobile_app, monthly_price_cents,
                start_date, end_date, is_active, created_at, modified_at
            FROM licenses
            WHERE id = $1
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error("finding license by id", e))?;

        row.map(License::try_from).transpose()
    }

    async fn find_active_by_tenant(&self, tenant_id: &Uuid) -> Result<Option<License>, DomainError> {
        let row: Option<LicenseRow> = sqlx::query_as(
            r#"
            SELECT
                id, tenant_id, license_type, max_employees,
                has_reports, has_api, has_mobile_app, monthly_price_cents,
                start_date, end_date, is_active, created_at, modified_at
            FROM licenses
            WHERE tenant_id = $1 AND is_active
            "#
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error("finding active license", e))?;

        row.map(License::try_from).transpose()
    }

    async fn create(&self, license: &License) -> Result<License, DomainError> {
        let row: LicenseRow = sqlx::query_as(
            r#"
            INSERT INTO licenses (
                id, tenant_id, license_type, max_employees,
                has_reports, has_api, has_mobile_app, monthly_price_cents,
                start_date, end_date, is_active, created_at, modified_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING
                id, tenant_id, license_type, max_employees,
                has_reports, has_api, has_mobile_app, monthly_price_cents,
                start_date, end_date, is_active, created_at, modified_at
            "#
        )
        .bind(license.id)
        .bind(license.tenant_id)
        .bind(license.license_type.as_str())
        .bind(max_employees_column(license)?)
        .bind(license.features.has_reports)
        .bind(license.features.has_api)
        .bind(license.features.has_mobile_app)
        .bind(license.monthly_price_cents)
        .bind(license.start_date)
        .bind(license.end_date)
        .bind(license.is_active)
        .bind(license.created_at)
        .bind(license.modified_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            write_error("creating license", e, |_| Some(DomainError::ActiveLicenseExists(license.tenant_id)))
        })?;

        info!("License row inserted: {}", row.id);
        row.try_into()
    }

    async fn update(&self, license: &License) -> Result<License, DomainError> {
        let row: Option<LicenseRow> = sqlx::query_as(
            r#"
            UPDATE licenses
            SET
                license_type = $2,
                max_employees = $3,
                has_reports = $4,
                has_api = $5,
                has_mobile_app = $6,
                monthly_price_cents = $7,
                start_date = $8,
                end_date = $9,
                is_active = $10,
                modified_at = $11
            WHERE id = $1
            RETURNING
                id, tenant_id, license_type, max_employees,
                has_reports, has_api, has_mobile_app, monthly_price_cents,
                start_date, end_date, is_active, created_at, modified_at
            "#
        )
        .bind(license.id)
        .bind(license.license_type.as_str())
        .bind(max_employees_column(license)?)
        .bind(license.features.has_reports)
        .bind(license.features.has_api)
        .bind(license.features.has_mobile_app)
        .bind(license.monthly_price_cents)
        .bind(license.start_date)
        .bind(license.end_date)
        .bind(license.is_active)
        .bind(license.modified_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            write_error("updating license", e, |_| Some(DomainError::ActiveLicenseExists(license.tenant_id)))
        })?;

        row.map(License::try_from).transpose()?.ok_or(DomainError::LicenseNotFound)
    }

    async fn replace_active(&self, license: &License) -> Result<License, DomainError> {
        let mut transaction = self.pool.begin().await
            .map_err(|e| write_error("starting license replacement", e, |_| None))?;

        sqlx::query(
            r#"
            UPDATE licenses
            SET is_active = FALSE, modified_at = NOW()
            WHERE tenant_id = $1 AND is_active AND id <> $2
            "#
        )
        .bind(license.tenant_id)
        .bind(license.id)
        .execute(&mut *transaction)
        .await
        .map_err(|e| write_error("deactivating previous license", e, |_| None))?;

        let row: LicenseRow = sqlx::query_as(
            r#"
            INSERT INTO licenses (
                id, tenant_id, license_type, max_employees,
                has_reports, has_api, has_mobile_app, monthly_price_cents,
                start_date, end_date, is_active, created_at, modified_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (id) DO UPDATE SET
                license_type = EXCLUDED.license_type,
                max_employees = EXCLUDED.max_employees,
                has_reports = EXCLUDED.has_reports,
                has_api = EXCLUDED.has_api,
                has_mobile_app = EXCLUDED.has_mobile_app,
                monthly_price_cents = EXCLUDED.monthly_price_cents,
                start_date = EXCLUDED.start_date,
                end_date = EXCLUDED.end_date,
                is_active = EXCLUDED.is_active,
                modified_at = EXCLUDED.modified_at
            RETURNING
                id, tenant_id, license_type, max_employees,
                has_reports, has_api, has_mobile_app, monthly_price_cents,
                start_date, end_date, is_active, created_at, modified_at
            "#
        )
        .bind(license.id)
        .bind(license.tenant_id)
        .bind(license.license_type.as_str())
        .bind(max_employees_column(license)?)
        .bind(license.features.has_reports)
        .bind(license.features.has_api)
        .bind(license.features.has_mobile_app)
        .bind(license.monthly_price_cents)
        .bind(license.start_date)
        .bind(license.end_date)
        .bind(license.is_active)
        .bind(license.created_at)
        .bind(license.modified_at)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|e| {
            write_error("storing replacement license", e, |_| Some(DomainError::ActiveLicenseExists(license.tenant_id)))
        })?;

        // Dropping the transaction on any error above rolls back the deactivation
        transaction.commit().await
            .map_err(|e| write_error("committing license replacement", e, |_| None))?;

        info!("License {} replaced the active license of tenant {}", row.id, row.tenant_id);
        row.try_into()
    }
}

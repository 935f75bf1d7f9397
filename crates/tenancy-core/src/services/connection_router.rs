// ============================================================================
// Tenancy Core - Connection Router
// File: crates/tenancy-core/src/services/connection_router.rs
// ============================================================================
//! Per-tenant storage routing with a shared copy-on-write cache.
//!
//! Readers clone an `Arc` snapshot of the whole table under a short read lock.
//! Writers build a new table and swap it in under the write lock, so a reader sees
//! either the previous or the next table, never a half-applied change. Cached
//! targets are themselves immutable `Arc`s.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use tenancy_shared::config::AppConfig;
use tenancy_shared::constants::DEFAULT_REGISTRY_TIMEOUT_MS;

use crate::domain::{ConnectionDescriptor, ConnectionTarget};
use crate::error::TenancyError;
use crate::repositories::ConnectionDescriptorRepository;
use crate::services::bounded_lookup;

#[derive(Default)]
struct RouteTable {
    /// Bumped by every invalidation. A lookup that started under an older
    /// generation must not populate the cache.
    generation: u64,
    entries: HashMap<Uuid, Arc<ConnectionTarget>>,
}

pub struct ConnectionRouter {
    descriptors: Arc<dyn ConnectionDescriptorRepository>,
    default_descriptor: Option<ConnectionDescriptor>,
    lookup_timeout: Duration,
    table: RwLock<Arc<RouteTable>>,
}

impl ConnectionRouter {
    pub fn new(
        descriptors: Arc<dyn ConnectionDescriptorRepository>,
        default_descriptor: Option<ConnectionDescriptor>,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            descriptors,
            default_descriptor,
            lookup_timeout,
            table: RwLock::new(Arc::new(RouteTable::default())),
        }
    }

    pub fn from_config(descriptors: Arc<dyn ConnectionDescriptorRepository>, config: &AppConfig) -> Self {
        let default_descriptor = config
            .routing
            .default_dsn
            .as_ref()
            .map(|dsn| ConnectionDescriptor::shared(dsn.clone(), config.routing.default_schema.clone()));

        let timeout_ms = if config.tenancy.registry_timeout_ms == 0 {
            DEFAULT_REGISTRY_TIMEOUT_MS
        } else {
            config.tenancy.registry_timeout_ms
        };

        Self::new(descriptors, default_descriptor, Duration::from_millis(timeout_ms))
    }

    /// Connection target for a tenant: cached, tenant-specific, or the shared default.
    pub async fn route_for(&self, tenant_id: Uuid) -> Result<Arc<ConnectionTarget>, TenancyError> {
        let snapshot = self.snapshot();
        if let Some(target) = snapshot.entries.get(&tenant_id) {
            return Ok(Arc::clone(target));
        }
        let generation = snapshot.generation;
        drop(snapshot);

        let found = bounded_lookup(
            self.lookup_timeout,
            "connection descriptor",
            self.descriptors.find_by_tenant(&tenant_id),
        )
        .await?;

        let descriptor = match found {
            Some(descriptor) => descriptor,
            None => match &self.default_descriptor {
                Some(shared) => shared.clone(),
                None => {
                    warn!(tenant_id = %tenant_id, "No dedicated descriptor and no shared default configured");
                    return Err(TenancyError::RoutingUnavailable(tenant_id));
                }
            },
        };

        debug!(
            tenant_id = %tenant_id,
            dedicated = descriptor.dedicated,
            dsn = %descriptor.redacted_dsn(),
            "Connection target resolved"
        );

        let target = Arc::new(ConnectionTarget::new(tenant_id, descriptor));
        self.store(generation, Arc::clone(&target));
        Ok(target)
    }

    /// Drop one tenant's cached target. Call after its descriptor changes.
    pub fn invalidate(&self, tenant_id: Uuid) {
        let mut table = self.table.write();
        let mut entries = table.entries.clone();
        let removed = entries.remove(&tenant_id).is_some();
        *table = Arc::new(RouteTable {
            generation: table.generation.wrapping_add(1),
            entries,
        });
        info!(tenant_id = %tenant_id, cached = removed, "Connection target invalidated");
    }

    pub fn invalidate_all(&self) {
        let mut table = self.table.write();
        let dropped = table.entries.len();
        *table = Arc::new(RouteTable {
            generation: table.generation.wrapping_add(1),
            entries: HashMap::new(),
        });
        info!(dropped, "Connection target cache cleared");
    }

    pub fn cached_len(&self) -> usize {
        self.snapshot().entries.len()
    }

    fn snapshot(&self) -> Arc<RouteTable> {
        self.table.read().clone()
    }

    fn store(&self, generation: u64, target: Arc<ConnectionTarget>) {
        let mut table = self.table.write();
        if table.generation != generation {
            debug!(tenant_id = %target.tenant_id, "Skipping cache fill raced by invalidation");
            return;
        }
        let mut entries = table.entries.clone();
        entries.insert(target.tenant_id, target);
        *table = Arc::new(RouteTable { generation, entries });
    }
}

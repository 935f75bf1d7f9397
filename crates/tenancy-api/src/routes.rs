//! Router assembly

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{entitlements, health, tenant};
use crate::middleware::{tenant_context_middleware, trusted_tenant_context_middleware};
use crate::state::AppState;

/// Wrap tenant-bound routes so every request is resolved and routed first.
/// The `X-Tenant-Id` header is ignored here.
pub fn tenant_scope(routes: Router<AppState>, state: &AppState) -> Router<AppState> {
    routes.layer(from_fn_with_state(state.clone(), tenant_context_middleware))
}

/// Like [`tenant_scope`], but also resolves from `X-Tenant-Id`. Only for routes
/// reachable by internal services, never exposed at the public edge.
pub fn trusted_tenant_scope(routes: Router<AppState>, state: &AppState) -> Router<AppState> {
    routes.layer(from_fn_with_state(state.clone(), trusted_tenant_context_middleware))
}

fn tenant_routes() -> Router<AppState> {
    Router::new()
        .route("/tenant/context", get(tenant::get_context))
        .route("/tenant/entitlements", get(tenant::get_entitlements))
        .route("/entitlements/check", post(entitlements::check_entitlement))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", tenant_scope(tenant_routes(), &state))
        .nest("/internal/v1", trusted_tenant_scope(tenant_routes(), &state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use chrono::{Duration, Utc};
    use serde_json::Value;
    use tower::ServiceExt;

    use tenancy_core::{ConnectionDescriptor, Feature, FeatureFlags, License, LicenseType, Tenant};
    use tenancy_infrastructure::{
        InMemoryConnectionDescriptorRepository, InMemoryLicenseRepository, InMemoryTenantRepository,
    };
    use tenancy_shared::config::{
        AppConfig, AppSettings, DatabaseSettings, JwtSettings, RoutingSettings, TenancySettings,
    };

    use crate::middleware::require_feature;

    fn config(env: &str) -> AppConfig {
        AppConfig {
            app: AppSettings {
                env: env.to_string(),
                host: "127.0.0.1".to_string(),
                port: 0,
                name: "tenancy-test".to_string(),
                log_dir: None,
                cors_origins: Vec::new(),
            },
            database: DatabaseSettings {
                url: "postgres://unused".to_string(),
                max_connections: 1,
                min_connections: 1,
                acquire_timeout_secs: 1,
            },
            jwt: JwtSettings {
                secret: "router-test-secret".to_string(),
                access_token_expiry: 900,
            },
            tenancy: TenancySettings::default(),
            routing: RoutingSettings {
                default_dsn: Some("postgres://shared/attendance".to_string()),
                default_schema: None,
            },
        }
    }

    struct Fixture {
        state: AppState,
        acme: Tenant,
    }

    async fn fixture(features: FeatureFlags) -> Fixture {
        let state = AppState::new(
            config("test"),
            Arc::new(InMemoryTenantRepository::new()),
            Arc::new(InMemoryLicenseRepository::new()),
            Arc::new(InMemoryConnectionDescriptorRepository::new()),
        )
        .unwrap();

        let acme = state
            .provisioning
            .provision_tenant(Tenant::new("acme", None, "Acme Corp", "hr@acme.com").unwrap())
            .await
            .unwrap();
        let now = Utc::now();
        let license = License::new(
            acme.id,
            LicenseType::Standard,
            50,
            features,
            4_900,
            now - Duration::days(1),
            now + Duration::days(30),
        )
        .unwrap();
        state.provisioning.replace_license(license).await.unwrap();

        Fixture { state, acme }
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get_request(uri: &str) -> axum::http::request::Builder {
        Request::builder().uri(uri).header(header::HOST, "localhost")
    }

    #[tokio::test]
    async fn test_health_needs_no_tenant() {
        let fx = fixture(FeatureFlags::default()).await;

        let response = build_router(fx.state)
            .oneshot(get_request("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_context_from_header() {
        let fx = fixture(FeatureFlags::default()).await;

        let response = build_router(fx.state)
            .oneshot(
                get_request("/internal/v1/tenant/context")
                    .header("X-Tenant-Id", "acme")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["tenant_code"], "acme");
        assert_eq!(body["data"]["source"], "header");
        assert_eq!(body["data"]["connection"]["dedicated"], false);
    }

    #[tokio::test]
    async fn test_context_from_subdomain() {
        let fx = fixture(FeatureFlags::default()).await;

        let response = build_router(fx.state)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/tenant/context")
                    .header(header::HOST, "acme.sphere.example.com:8443")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["data"]["source"], "subdomain");
    }

    #[tokio::test]
    async fn test_claim_overrides_header() {
        let fx = fixture(FeatureFlags::default()).await;
        let globex = fx
            .state
            .provisioning
            .provision_tenant(Tenant::new("globex", None, "Globex", "it@globex.com").unwrap())
            .await
            .unwrap();
        let token = fx
            .state
            .jwt
            .generate_access_token("user-1", Some("globex"), Some("company-9"))
            .unwrap();

        let response = build_router(fx.state)
            .oneshot(
                get_request("/internal/v1/tenant/context")
                    .header("X-Tenant-Id", "acme")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["data"]["tenant_id"], globex.id.to_string());
        assert_eq!(body["data"]["company_id"], "company-9");
        assert_eq!(body["data"]["source"], "claim");
    }

    #[tokio::test]
    async fn test_authenticated_without_company_is_forbidden() {
        let fx = fixture(FeatureFlags::default()).await;
        let token = fx.state.jwt.generate_access_token("user-1", Some("acme"), None).unwrap();

        let response = build_router(fx.state)
            .oneshot(
                get_request("/api/v1/tenant/context")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(json_body(response).await["error"]["code"], "COMPANY_UNRESOLVED");
    }

    #[tokio::test]
    async fn test_bad_token_is_unauthorized() {
        let fx = fixture(FeatureFlags::default()).await;

        let response = build_router(fx.state)
            .oneshot(
                get_request("/api/v1/tenant/context")
                    .header("X-Tenant-Id", "acme")
                    .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_tenant_is_forbidden() {
        let fx = fixture(FeatureFlags::default()).await;

        let response = build_router(fx.state)
            .oneshot(
                get_request("/internal/v1/tenant/context")
                    .header("X-Tenant-Id", "initech")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(json_body(response).await["error"]["code"], "TENANT_UNRESOLVED");
    }

    #[tokio::test]
    async fn test_reprovisioned_tenant_routes_to_dedicated_target() {
        let fx = fixture(FeatureFlags::default()).await;
        let app = build_router(fx.state.clone());
        let request = || {
            get_request("/internal/v1/tenant/context")
                .header("X-Tenant-Id", "acme")
                .body(Body::empty())
                .unwrap()
        };

        let before = json_body(app.clone().oneshot(request()).await.unwrap()).await;
        assert_eq!(before["data"]["connection"]["dedicated"], false);

        fx.state
            .provisioning
            .reprovision(
                &fx.acme.id,
                ConnectionDescriptor::dedicated("postgres://acme-db/attendance", Some("acme".to_string())),
            )
            .await
            .unwrap();

        let after = json_body(app.oneshot(request()).await.unwrap()).await;
        assert_eq!(after["data"]["connection"]["dedicated"], true);
        assert_eq!(after["data"]["connection"]["schema"], "acme");
    }

    #[tokio::test]
    async fn test_entitlements_summary() {
        let fx = fixture(FeatureFlags { has_reports: true, has_api: false, has_mobile_app: false }).await;

        let response = build_router(fx.state)
            .oneshot(
                get_request("/internal/v1/tenant/entitlements")
                    .header("X-Tenant-Id", "acme")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["data"]["license_type"], "standard");
        assert_eq!(body["data"]["features"], serde_json::json!(["reports"]));
        assert_eq!(body["data"]["max_employees"], 50);
    }

    #[tokio::test]
    async fn test_check_employee_limit() {
        let fx = fixture(FeatureFlags::default()).await;
        let app = build_router(fx.state);
        let check = |count: u32| {
            get_request("/internal/v1/entitlements/check")
                .method("POST")
                .header("X-Tenant-Id", "acme")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(format!(
                    r#"{{"capability":"add_employee","current_count":{}}}"#,
                    count
                )))
                .unwrap()
        };

        let allowed = app.clone().oneshot(check(49)).await.unwrap();
        assert_eq!(allowed.status(), StatusCode::OK);

        let denied = app.oneshot(check(50)).await.unwrap();
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);
        let body = json_body(denied).await;
        assert_eq!(body["error"]["code"], "EMPLOYEE_LIMIT_REACHED");
        assert_eq!(body["error"]["details"]["limit"], 50);
        assert_eq!(body["error"]["details"]["current"], 50);
    }

    #[tokio::test]
    async fn test_require_feature_gate() {
        let fx = fixture(FeatureFlags { has_reports: true, has_api: false, has_mobile_app: false }).await;
        let state = fx.state;
        let gated = Router::new()
            .route(
                "/reports",
                get(|| async { "report" })
                    .layer(from_fn_with_state((state.clone(), Feature::Reports), require_feature)),
            )
            .route(
                "/api-keys",
                get(|| async { "keys" })
                    .layer(from_fn_with_state((state.clone(), Feature::Api), require_feature)),
            );
        let app = trusted_tenant_scope(gated, &state).with_state(state);
        let request = |uri: &str| {
            get_request(uri).header("X-Tenant-Id", "acme").body(Body::empty()).unwrap()
        };

        let reports = app.clone().oneshot(request("/reports")).await.unwrap();
        assert_eq!(reports.status(), StatusCode::OK);

        let api = app.oneshot(request("/api-keys")).await.unwrap();
        assert_eq!(api.status(), StatusCode::FORBIDDEN);
        let body = json_body(api).await;
        assert_eq!(body["error"]["code"], "FEATURE_NOT_LICENSED");
        assert_eq!(body["error"]["details"]["feature"], "api");
    }

    #[tokio::test]
    async fn test_public_scope_ignores_tenant_header() {
        let fx = fixture(FeatureFlags::default()).await;
        let app = build_router(fx.state);

        let anonymous = app
            .clone()
            .oneshot(
                get_request("/api/v1/tenant/entitlements")
                    .header("X-Tenant-Id", "acme")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(anonymous.status(), StatusCode::FORBIDDEN);
        assert_eq!(json_body(anonymous).await["error"]["code"], "TENANT_UNRESOLVED");

        let from_host = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/tenant/context")
                    .header(header::HOST, "acme.sphere.example.com")
                    .header("X-Tenant-Id", "globex")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = json_body(from_host).await;
        assert_eq!(body["data"]["tenant_code"], "acme");
        assert_eq!(body["data"]["source"], "subdomain");
    }

    #[tokio::test]
    async fn test_rejected_license_replacement_keeps_entitlements() {
        let fx = fixture(FeatureFlags { has_reports: true, has_api: false, has_mobile_app: false }).await;
        let app = build_router(fx.state.clone());
        let check = || {
            get_request("/internal/v1/entitlements/check")
                .method("POST")
                .header("X-Tenant-Id", "acme")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"capability":"use_reports"}"#))
                .unwrap()
        };

        assert_eq!(app.clone().oneshot(check()).await.unwrap().status(), StatusCode::OK);

        let now = Utc::now();
        let mut inverted = License::for_type(fx.acme.id, LicenseType::Premium, now, now).unwrap();
        inverted.end_date = now - Duration::days(1);
        assert!(fx.state.provisioning.replace_license(inverted).await.is_err());

        assert_eq!(app.oneshot(check()).await.unwrap().status(), StatusCode::OK);
    }

    #[test]
    fn test_production_default_tenant_is_rejected() {
        let mut cfg = config("production");
        cfg.tenancy.default_tenant_code = Some("acme".to_string());

        let state = AppState::new(
            cfg,
            Arc::new(InMemoryTenantRepository::new()),
            Arc::new(InMemoryLicenseRepository::new()),
            Arc::new(InMemoryConnectionDescriptorRepository::new()),
        );

        assert!(state.is_err());
    }
}

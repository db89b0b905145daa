use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use chrono::Utc;
use std::sync::Arc;

use crate::inventory::Tier;
use crate::inventory::service::RegionFilter;
use crate::web::models::{
    DedicatedServersQuery, DedicatedServersResponse, FamilyInfo, FamilyMetaResponse,
};
use crate::web::{AppError, AppState};

async fn list_dedicated_servers(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<DedicatedServersQuery>,
) -> Result<Json<DedicatedServersResponse>, AppError> {
    let catalog = app_state.inventory.catalog();

    let family = match params.family.as_deref().map(str::trim) {
        None | Some("") => Tier::Core,
        Some(raw) => raw.parse::<Tier>().map_err(|_| {
            AppError::InvalidInput(format!(
                "Invalid family '{raw}'. Expected one of: BASIC, CORE, ULTRA, TITAN, VELOCITY"
            ))
        })?,
    };

    let region = RegionFilter::parse(params.region.as_deref(), catalog)
        .map_err(|e| AppError::InvalidInput(format!("Invalid region: {e}")))?;

    let view = app_state.inventory.query(family, region).await;
    let meta = catalog.family_meta(family);

    Ok(Json(DedicatedServersResponse {
        family: view.family,
        region: view.region.to_string(),
        meta: FamilyMetaResponse {
            label: meta.label,
            tagline: meta.tagline,
            markup: catalog.markup.rate(family),
            count: view.servers.len(),
            generated_at: Utc::now(),
        },
        region_summary: view.region_summary,
        servers: view.servers,
        source: view.source,
    }))
}

async fn list_families(State(app_state): State<Arc<AppState>>) -> Json<Vec<FamilyInfo>> {
    let catalog = app_state.inventory.catalog();
    let families = Tier::ALL
        .into_iter()
        .map(|tier| {
            let meta = catalog.family_meta(tier);
            FamilyInfo {
                family: tier,
                label: meta.label,
                tagline: meta.tagline,
                markup: catalog.markup.rate(tier),
            }
        })
        .collect();
    Json(families)
}

pub fn dedicated_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/servers", get(list_dedicated_servers))
        .route("/families", get(list_families))
}

#[cfg(test)]
mod tests {
    use crate::inventory::fetcher::{InventoryFetcher, UnconfiguredFetcher};
    use crate::inventory::{FetchError, RawRecord};
    use crate::web::test_support::{get_json, test_router};
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use serde_json::Value;

    struct StaticFetcher(Vec<RawRecord>);

    #[async_trait]
    impl InventoryFetcher for StaticFetcher {
        async fn fetch_servers(&self) -> Result<Vec<RawRecord>, FetchError> {
            Ok(self.0.clone())
        }
    }

    fn live_records() -> Vec<RawRecord> {
        [
            ("AMD Ryzen 9 7950X", "Miami, FL", "", "200"),
            ("AMD EPYC 9354P", "", "sea", "400"),
            ("Intel Xeon Gold 6248R", "", "NYC", "150"),
        ]
        .into_iter()
        .map(|(cpu, location, region, price)| {
            [
                ("CPU", cpu),
                ("Location", location),
                ("Region", region),
                ("BasePrice", price),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
        })
        .collect()
    }

    fn servers(body: &Value) -> &Vec<Value> {
        body["servers"].as_array().unwrap()
    }

    #[tokio::test]
    async fn test_default_family_is_core_from_fallback() {
        let (status, body) =
            get_json(test_router(UnconfiguredFetcher), "/api/dedicated/servers").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["family"], "CORE");
        assert_eq!(body["region"], "ALL");
        assert_eq!(body["source"], "fallback");
        assert_eq!(body["meta"]["markup"], 0.25);
        assert!(body["meta"]["generatedAt"].is_string());
        assert!(!servers(&body).is_empty());
        assert!(servers(&body).iter().all(|s| s["tier"] == "CORE"));
    }

    #[tokio::test]
    async fn test_velocity_with_upstream_down() {
        let (status, body) = get_json(
            test_router(UnconfiguredFetcher),
            "/api/dedicated/servers?family=VELOCITY&region=ALL",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "fallback");
        assert!(!servers(&body).is_empty());
        assert!(servers(&body).iter().all(|s| s["tier"] == "VELOCITY"));

        let summary_total: u64 = body["regionSummary"]
            .as_object()
            .unwrap()
            .values()
            .map(|r| r["total"].as_u64().unwrap())
            .sum();
        assert_eq!(summary_total as usize, servers(&body).len());
        assert_eq!(body["meta"]["count"].as_u64().unwrap() as usize, servers(&body).len());
    }

    #[tokio::test]
    async fn test_every_family_returns_only_its_tier() {
        for family in ["BASIC", "CORE", "ULTRA", "TITAN", "VELOCITY"] {
            let (status, body) = get_json(
                test_router(UnconfiguredFetcher),
                &format!("/api/dedicated/servers?family={family}"),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["family"], family);
            assert!(servers(&body).iter().all(|s| s["tier"] == family));
        }
    }

    #[tokio::test]
    async fn test_region_filter_applies_after_summary() {
        let (status, body) = get_json(
            test_router(UnconfiguredFetcher),
            "/api/dedicated/servers?family=velocity&region=mia",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["region"], "MIA");
        assert!(!servers(&body).is_empty());
        assert!(servers(&body).iter().all(|s| s["region"] == "MIA"));
        // Summary still lists the other Velocity regions.
        assert!(body["regionSummary"]["NYC"]["total"].as_u64().unwrap() >= 1);
    }

    #[tokio::test]
    async fn test_live_inventory_is_normalized_and_marked_up() {
        let router = test_router(StaticFetcher(live_records()));
        let (status, body) =
            get_json(router, "/api/dedicated/servers?family=VELOCITY").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "soap");

        let list = servers(&body);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["region"], "MIAMIFL");
        assert_eq!(list[0]["marked_up_price"], 280);
        assert_eq!(list[0]["availability"], "available");
        assert_eq!(list[1]["region"], "SEA");
        assert_eq!(list[1]["marked_up_price"], 560);
        assert_eq!(body["regionSummary"]["MIAMIFL"]["label"], "MIAMIFL");
        assert_eq!(body["regionSummary"]["SEA"]["label"], "Seattle, WA");
    }

    #[tokio::test]
    async fn test_invalid_family_is_400() {
        let (status, body) = get_json(
            test_router(UnconfiguredFetcher),
            "/api/dedicated/servers?family=ELITE",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("ELITE"));
    }

    #[tokio::test]
    async fn test_unknown_region_is_400() {
        let (status, body) = get_json(
            test_router(UnconfiguredFetcher),
            "/api/dedicated/servers?family=CORE&region=MARS",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("MARS"));
    }

    #[tokio::test]
    async fn test_families_listing() {
        let (status, body) =
            get_json(test_router(UnconfiguredFetcher), "/api/dedicated/families").await;
        assert_eq!(status, StatusCode::OK);
        let families = body.as_array().unwrap();
        assert_eq!(families.len(), 5);
        assert_eq!(families[0]["family"], "BASIC");
        assert_eq!(families[4]["family"], "VELOCITY");
        assert_eq!(families[4]["markup"], 0.4);
    }
}

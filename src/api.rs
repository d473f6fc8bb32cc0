//! REST API for the parcel planner.
//!
//! Provides HTTP endpoints for catalog lookup, packing and carrier ranking.
//! Uses Axum as the web framework and supports CORS. Planning is CPU-bound
//! and runs on the blocking thread pool.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use log::{error, info};
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use utoipa::{OpenApi, ToSchema};

use crate::catalog::{Addon, Carrier};
use crate::config::ApiConfig;
use crate::error::PlannerError;
use crate::model::{PlacedItem, Product, TransportBox};
use crate::packing::{PackingResult, PackingStrategy};
use crate::planner::{PackingPlan, ShipmentPlanner};
use crate::ranker::{ShippingOption, cheapest_option};
use crate::summary::{PackingStep, PackingSummary, packing_steps};

#[derive(Clone)]
struct ApiState {
    planner: Arc<ShipmentPlanner>,
}

static OPENAPI_DOC: OnceLock<utoipa::openapi::OpenApi> = OnceLock::new();

// SRI hashes verified against https://unpkg.com/swagger-ui-dist@5.17.14/ on 2025-10-29.
const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8" />
        <title>parcel-planner API Docs</title>
        <link
            rel="stylesheet"
            href="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css"
            integrity="sha384-wxLW6kwyHktdDGr6Pv1zgm/VGJh99lfUbzSn6HNHBENZlCN7W602k9VkGdxuFvPn"
            crossorigin="anonymous"
        />
    </head>
    <body>
        <div id="swagger-ui"></div>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js"
            integrity="sha384-wmyclcVGX/WhUkdkATwhaK1X1JtiNrr2EoYJ+diV3vj4v6OC5yCeSu+yW13SYJep"
            crossorigin="anonymous"
        ></script>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-standalone-preset.js"
            integrity="sha384-2YH8WDRaj7V2OqU/trsmzSagmk/E2SutiCsGkdgoQwC9pNUJV1u/141DHB6jgs8t"
            crossorigin="anonymous"
        ></script>
        <script>
            window.onload = function () {
                const ui = SwaggerUIBundle({
                    url: "/docs/openapi.json",
                    dom_id: "#swagger-ui",
                    presets: [SwaggerUIBundle.presets.apis, SwaggerUIStandalonePreset],
                    layout: "StandaloneLayout",
                });
                window.ui = ui;
            };
        </script>
    </body>
    </html>"##;

fn openapi_doc() -> &'static utoipa::openapi::OpenApi {
    OPENAPI_DOC.get_or_init(ApiDoc::openapi)
}

/// Requested quantities by size label.
#[derive(Deserialize, ToSchema)]
#[schema(example = json!({ "items": { "S": 20, "L": 4 } }))]
pub struct ItemsRequest {
    #[schema(value_type = Object)]
    pub items: BTreeMap<String, i64>,
}

#[derive(Deserialize, ToSchema)]
#[schema(example = json!({ "items": { "S": 50 }, "strategy": "collision_aware" }))]
pub struct PackRequest {
    #[schema(value_type = Object)]
    pub items: BTreeMap<String, i64>,
    /// Overrides the configured packing strategy
    #[serde(default)]
    #[schema(nullable = true)]
    pub strategy: Option<PackingStrategy>,
}

#[derive(Deserialize, ToSchema)]
#[schema(
    example = json!({
        "items": { "S": 10, "LL": 2 },
        "addons": { "cash_on_delivery": true, "express_delivery": false }
    })
)]
pub struct ShipRequest {
    #[schema(value_type = Object)]
    pub items: BTreeMap<String, i64>,
    #[serde(default)]
    #[schema(nullable = true)]
    pub strategy: Option<PackingStrategy>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub addons: BTreeMap<Addon, bool>,
}

#[derive(Serialize, ToSchema)]
pub struct ProductEntry {
    pub size: String,
    #[schema(value_type = [f64; 3], example = json!([6.5, 6.5, 6.5]))]
    pub dims: (f64, f64, f64),
    pub weight: f64,
}

impl From<&Product> for ProductEntry {
    fn from(product: &Product) -> Self {
        Self {
            size: product.size.to_string(),
            dims: product.dims.as_vec3().as_tuple(),
            weight: product.weight,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct BoxEntry {
    pub id: String,
    #[schema(value_type = [f64; 3], example = json!([37.5, 37.0, 24.0]))]
    pub outer: (f64, f64, f64),
    #[schema(value_type = [f64; 3], example = json!([35.5, 35.0, 22.0]))]
    pub inner: (f64, f64, f64),
    pub inner_volume: f64,
    pub max_weight: f64,
}

impl From<&TransportBox> for BoxEntry {
    fn from(b: &TransportBox) -> Self {
        Self {
            id: b.id.to_string(),
            outer: b.outer.as_vec3().as_tuple(),
            inner: b.inner().as_vec3().as_tuple(),
            inner_volume: b.inner_volume(),
            max_weight: b.max_weight,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct CatalogResponse {
    pub products: Vec<ProductEntry>,
    pub boxes: Vec<BoxEntry>,
}

#[derive(Serialize, ToSchema)]
pub struct CandidatesResponse {
    pub total_volume: f64,
    pub total_weight: f64,
    pub candidates: Vec<BoxEntry>,
}

/// Single placed item in the response.
///
/// # Fields
/// * `pos` - Minimum corner (x, y, z) inside the box
/// * `dims` - Occupied dimensions after rotation
#[derive(Serialize, ToSchema)]
pub struct PackedItem {
    pub size: String,
    #[schema(value_type = [f64; 3], example = json!([0.0, 0.0, 0.0]))]
    pub pos: (f64, f64, f64),
    #[schema(value_type = [f64; 3], example = json!([6.5, 6.5, 6.5]))]
    pub dims: (f64, f64, f64),
    pub weight: f64,
    pub rotated: bool,
}

impl From<&PlacedItem> for PackedItem {
    fn from(item: &PlacedItem) -> Self {
        Self {
            size: item.product.size.to_string(),
            pos: item.position.as_tuple(),
            dims: item.dims.as_vec3().as_tuple(),
            weight: item.product.weight,
            rotated: item.rotated,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PackedBox {
    #[serde(rename = "box")]
    pub target: BoxEntry,
    pub strategy: PackingStrategy,
    pub total_weight: f64,
    pub total_volume: f64,
    pub utilization_rate: f64,
    pub packing_efficiency: f64,
    pub placed: Vec<PackedItem>,
}

impl From<&PackingResult> for PackedBox {
    fn from(result: &PackingResult) -> Self {
        Self {
            target: BoxEntry::from(&result.target),
            strategy: result.strategy,
            total_weight: result.total_weight,
            total_volume: result.total_volume,
            utilization_rate: result.utilization_rate,
            packing_efficiency: result.packing_efficiency,
            placed: result.placed.iter().map(PackedItem::from).collect(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct SummaryEntry {
    pub box_id: String,
    pub total_items: usize,
    pub total_weight: f64,
    pub utilization_rate: f64,
    pub packing_efficiency: f64,
    pub height_used: f64,
    pub height_efficiency: f64,
    /// Weight in kg keyed by whole-centimeter height
    #[schema(value_type = Object)]
    pub weight_per_layer: BTreeMap<u32, f64>,
    #[schema(value_type = Object)]
    pub item_count_by_size: BTreeMap<String, u32>,
}

impl From<PackingSummary> for SummaryEntry {
    fn from(summary: PackingSummary) -> Self {
        Self {
            box_id: summary.box_id.to_string(),
            total_items: summary.total_items,
            total_weight: summary.total_weight,
            utilization_rate: summary.utilization_rate,
            packing_efficiency: summary.packing_efficiency,
            height_used: summary.height_used,
            height_efficiency: summary.height_efficiency,
            weight_per_layer: summary.weight_per_layer,
            item_count_by_size: summary
                .item_count_by_size
                .into_iter()
                .map(|(size, count)| (size.to_string(), count))
                .collect(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct StepEntry {
    pub step: usize,
    pub band_start: u32,
    pub item_count: usize,
    pub description: String,
}

impl From<&PackingStep> for StepEntry {
    fn from(step: &PackingStep) -> Self {
        Self {
            step: step.step,
            band_start: step.band_start,
            item_count: step.item_count,
            description: step.to_string(),
        }
    }
}

/// Response structure with every box that holds the request.
///
/// # Fields
/// * `candidates` - Box ids that passed the volume and weight filter
/// * `results` - Boxes that could actually be packed, smallest first
/// * `recommended` - Id of the recommended box, if any
#[derive(Serialize, ToSchema)]
pub struct PackResponse {
    pub strategy: PackingStrategy,
    pub candidates: Vec<String>,
    pub results: Vec<PackedBox>,
    #[schema(nullable = true)]
    pub recommended: Option<String>,
    #[schema(nullable = true)]
    pub summary: Option<SummaryEntry>,
    pub steps: Vec<StepEntry>,
}

impl PackResponse {
    fn from_plan(plan: &PackingPlan, strategy: PackingStrategy) -> Self {
        let recommended = plan.recommended();
        Self {
            strategy,
            candidates: plan.candidates.iter().map(|b| b.id.to_string()).collect(),
            results: plan.results.iter().map(PackedBox::from).collect(),
            recommended: recommended.map(|r| r.target.id.to_string()),
            summary: recommended.map(|r| PackingSummary::new(r).into()),
            steps: recommended
                .map(|r| packing_steps(r).iter().map(StepEntry::from).collect())
                .unwrap_or_default(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ShippingOptionEntry {
    pub box_id: String,
    pub carrier: Carrier,
    pub carrier_name: String,
    pub service: String,
    pub delivery: String,
    pub base_rate: u32,
    pub total_cost: u32,
    /// ISO date
    pub estimated_delivery: String,
    pub savings: u32,
    pub recommendation_score: f64,
    pub tracking: bool,
    pub insurance: bool,
    pub features: Vec<String>,
}

impl From<&ShippingOption<'_>> for ShippingOptionEntry {
    fn from(option: &ShippingOption<'_>) -> Self {
        Self {
            box_id: option.packing.target.id.to_string(),
            carrier: option.rate.carrier,
            carrier_name: option.rate.carrier.display_name().to_string(),
            service: option.service.name.clone(),
            delivery: option.service.delivery.to_string(),
            base_rate: option.rate.price,
            total_cost: option.total_cost,
            estimated_delivery: option.estimated_delivery.to_string(),
            savings: option.savings,
            recommendation_score: option.recommendation_score,
            tracking: option.service.tracking,
            insurance: option.service.insurance,
            features: option.service.features.clone(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ShipResponse {
    pub packing: PackResponse,
    /// Best recommendation first
    pub options: Vec<ShippingOptionEntry>,
    #[schema(nullable = true)]
    pub cheapest: Option<ShippingOptionEntry>,
}

#[derive(Serialize, ToSchema)]
struct ErrorResponse {
    error: String,
    details: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
        }
    }
}

fn error_response(
    status: StatusCode,
    error: impl Into<String>,
    details: impl Into<String>,
) -> Response {
    (status, Json(ErrorResponse::new(error, details))).into_response()
}

fn json_deserialize_error(err: JsonRejection) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid JSON data",
        err.to_string(),
    )
}

fn validation_error(details: impl Into<String>) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid input data",
        details,
    )
}

fn item_pairs(items: &BTreeMap<String, i64>) -> impl Iterator<Item = (&str, i64)> {
    items.iter().map(|(label, qty)| (label.as_str(), *qty))
}

/// Runs a planning job on the blocking pool and turns its outcome into a response.
async fn run_planning<T, F>(job: F) -> Response
where
    T: Serialize + Send + 'static,
    F: FnOnce() -> Result<T, PlannerError> + Send + 'static,
{
    match tokio::task::spawn_blocking(job).await {
        Ok(Ok(body)) => (StatusCode::OK, Json(body)).into_response(),
        Ok(Err(err)) => validation_error(err.to_string()),
        Err(err) => {
            error!("❌ Planning task failed: {err}");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Planning failed",
                err.to_string(),
            )
        }
    }
}

fn pack_job(planner: &ShipmentPlanner, request: PackRequest) -> Result<PackResponse, PlannerError> {
    let shipment = planner.validate(item_pairs(&request.items))?;
    let strategy = request
        .strategy
        .unwrap_or_else(|| planner.default_strategy());
    let plan = planner.pack_all(shipment, Some(strategy));
    Ok(PackResponse::from_plan(&plan, strategy))
}

fn ship_job(planner: &ShipmentPlanner, request: ShipRequest) -> Result<ShipResponse, PlannerError> {
    let shipment = planner.validate(item_pairs(&request.items))?;
    let strategy = request
        .strategy
        .unwrap_or_else(|| planner.default_strategy());
    let plan = planner.pack_all(shipment, Some(strategy));
    let options = planner.rank(&plan.results, &request.addons);

    Ok(ShipResponse {
        packing: PackResponse::from_plan(&plan, strategy),
        cheapest: cheapest_option(&options).map(ShippingOptionEntry::from),
        options: options.iter().map(ShippingOptionEntry::from).collect(),
    })
}

#[derive(OpenApi)]
#[openapi(
    paths(handle_catalog, handle_candidates, handle_pack, handle_ship),
    components(
        schemas(
            ItemsRequest,
            PackRequest,
            ShipRequest,
            CatalogResponse,
            CandidatesResponse,
            PackResponse,
            ShipResponse,
            ProductEntry,
            BoxEntry,
            PackedBox,
            PackedItem,
            SummaryEntry,
            StepEntry,
            ShippingOptionEntry,
            PackingStrategy,
            Carrier,
            Addon,
            ErrorResponse
        )
    ),
    tags(
        (name = "catalog", description = "Products and boxes"),
        (name = "packing", description = "Box selection and packing"),
        (name = "shipping", description = "Carrier option ranking")
    )
)]
struct ApiDoc;

fn router(planner: Arc<ShipmentPlanner>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route("/catalog", get(handle_catalog))
        .route("/candidates", post(handle_candidates))
        .route("/pack", post(handle_pack))
        .route("/ship", post(handle_ship))
        // API documentation
        .route("/docs/openapi.json", get(serve_openapi_json))
        .route("/docs", get(serve_openapi_ui))
        .layer(cors)
        .with_state(ApiState { planner })
}

/// Starts the API server and serves until it is terminated.
///
/// Configures CORS for cross-origin requests.
pub async fn start_api_server(config: ApiConfig, planner: ShipmentPlanner) -> std::io::Result<()> {
    let app = router(Arc::new(planner));

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(
        "🚀 Server running on http://{}:{}",
        config.display_host(),
        config.port()
    );
    if config.binds_to_all_interfaces() {
        info!("💡 Local access: http://localhost:{}", config.port());
    }
    info!("📦 API Endpoints:");
    info!("   - GET /catalog");
    info!("   - POST /candidates");
    info!("   - POST /pack");
    info!("   - POST /ship");
    info!("📑 Documentation:");
    info!("   - GET /docs");
    info!("   - GET /docs/openapi.json");

    axum::serve(listener, app).await
}

/// Handler for GET /catalog.
#[utoipa::path(
    get,
    path = "/catalog",
    responses((status = 200, description = "Products and boxes on offer", body = CatalogResponse)),
    tag = "catalog"
)]
async fn handle_catalog(State(state): State<ApiState>) -> impl IntoResponse {
    let catalogs = state.planner.catalogs();
    Json(CatalogResponse {
        products: catalogs.products.all().map(ProductEntry::from).collect(),
        boxes: catalogs.boxes.all().iter().map(BoxEntry::from).collect(),
    })
}

/// Handler for POST /candidates.
///
/// Lists the boxes whose volume and weight limit could hold the items,
/// smallest first. An empty list means nothing can ship the load.
#[utoipa::path(
    post,
    path = "/candidates",
    request_body = ItemsRequest,
    responses(
        (status = 200, description = "Boxes that may hold the items", body = CandidatesResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid items", body = ErrorResponse)
    ),
    tag = "packing"
)]
async fn handle_candidates(
    State(state): State<ApiState>,
    payload: Result<Json<ItemsRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(err) => return json_deserialize_error(err),
    };

    let request = match state.planner.validate(item_pairs(&payload.items)) {
        Ok(request) => request,
        Err(err) => return validation_error(err.to_string()),
    };
    let candidates = state.planner.candidate_boxes(&request);
    let response = CandidatesResponse {
        total_volume: request.total_volume(),
        total_weight: request.total_weight(),
        candidates: candidates.into_iter().map(BoxEntry::from).collect(),
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// Handler for POST /pack.
///
/// Packs the items into every candidate box and recommends one.
#[utoipa::path(
    post,
    path = "/pack",
    request_body = PackRequest,
    responses(
        (status = 200, description = "Feasible boxes with placements", body = PackResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid items", body = ErrorResponse)
    ),
    tag = "packing"
)]
async fn handle_pack(
    State(state): State<ApiState>,
    payload: Result<Json<PackRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(err) => return json_deserialize_error(err),
    };

    info!("📥 New pack request: {} sizes", payload.items.len());
    let planner = Arc::clone(&state.planner);
    run_planning(move || pack_job(&planner, payload)).await
}

/// Handler for POST /ship.
///
/// Packs the items, then ranks carrier options for every feasible box.
#[utoipa::path(
    post,
    path = "/ship",
    request_body = ShipRequest,
    responses(
        (status = 200, description = "Packing and ranked shipping options", body = ShipResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid items", body = ErrorResponse)
    ),
    tag = "shipping"
)]
async fn handle_ship(
    State(state): State<ApiState>,
    payload: Result<Json<ShipRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(err) => return json_deserialize_error(err),
    };

    info!("📥 New shipping request: {} sizes", payload.items.len());
    let planner = Arc::clone(&state.planner);
    run_planning(move || ship_job(&planner, payload)).await
}

async fn serve_openapi_json() -> impl IntoResponse {
    Json(openapi_doc())
}

async fn serve_openapi_ui() -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalogs;

    fn planner() -> ShipmentPlanner {
        ShipmentPlanner::new(Catalogs::builtin().unwrap())
    }

    #[test]
    fn openapi_doc_lists_expected_paths() {
        let doc = openapi_doc();
        let paths = &doc.paths.paths;
        for path in ["/catalog", "/candidates", "/pack", "/ship"] {
            assert!(
                paths.contains_key(path),
                "OpenAPI documentation is missing the {} path",
                path
            );
        }
    }

    #[test]
    fn openapi_doc_contains_key_schemas() {
        let doc = openapi_doc();
        let components = doc
            .components
            .as_ref()
            .expect("OpenAPI documentation contains no components");
        let schemas = &components.schemas;
        for name in ["PackRequest", "ShipRequest", "PackResponse", "ShipResponse", "ErrorResponse"] {
            assert!(
                schemas.contains_key(name),
                "Expected schema '{}' is missing from the OpenAPI document",
                name
            );
        }
    }

    #[test]
    fn ship_request_parses_addons_and_strategy() {
        let json = r#"{
            "items": {"S": 10, "L-long": 2},
            "strategy": "grid",
            "addons": {"cash_on_delivery": true, "express_delivery": false}
        }"#;
        let request: ShipRequest = serde_json::from_str(json).expect("Should parse valid JSON");
        assert_eq!(request.items["L-long"], 2);
        assert_eq!(request.strategy, Some(PackingStrategy::Grid));
        assert_eq!(request.addons.get(&Addon::CashOnDelivery), Some(&true));
        assert_eq!(request.addons.get(&Addon::ExpressDelivery), Some(&false));
    }

    #[test]
    fn pack_request_defaults_when_fields_are_absent() {
        let request: PackRequest =
            serde_json::from_str(r#"{"items": {"S": 1}}"#).expect("Should parse valid JSON");
        assert_eq!(request.strategy, None);

        let request: ShipRequest =
            serde_json::from_str(r#"{"items": {"S": 1}, "strategy": null}"#)
                .expect("Should parse valid JSON");
        assert!(request.addons.is_empty());
        assert_eq!(request.strategy, None);
    }

    #[test]
    fn unknown_addon_is_rejected() {
        let json = r#"{"items": {"S": 1}, "addons": {"gift_wrap": true}}"#;
        assert!(serde_json::from_str::<ShipRequest>(json).is_err());
    }

    #[test]
    fn pack_job_recommends_a_box_with_summary() {
        let request = PackRequest {
            items: BTreeMap::from([("S".to_string(), 50)]),
            strategy: None,
        };
        let response = pack_job(&planner(), request).unwrap();

        assert_eq!(response.strategy, PackingStrategy::CollisionAware);
        assert!(!response.results.is_empty());
        let recommended = response.recommended.as_deref().unwrap();
        let summary = response.summary.as_ref().unwrap();
        assert_eq!(summary.box_id, recommended);
        assert_eq!(summary.total_items, 50);
        assert_eq!(
            response.steps.iter().map(|s| s.item_count).sum::<usize>(),
            50
        );
    }

    #[test]
    fn ship_job_reports_cheapest_option() {
        let request = ShipRequest {
            items: BTreeMap::from([("L".to_string(), 6)]),
            strategy: Some(PackingStrategy::Grid),
            addons: BTreeMap::new(),
        };
        let response = ship_job(&planner(), request).unwrap();

        let cheapest = response.cheapest.as_ref().unwrap();
        assert_eq!(cheapest.savings, 0);
        let min = response.options.iter().map(|o| o.total_cost).min().unwrap();
        assert_eq!(cheapest.total_cost, min);
    }

    #[test]
    fn invalid_items_are_reported_as_errors() {
        let request = PackRequest {
            items: BTreeMap::from([("XL".to_string(), 1)]),
            strategy: None,
        };
        match pack_job(&planner(), request) {
            Err(err) => assert!(err.to_string().contains("XL")),
            Ok(_) => panic!("unknown size should be rejected"),
        }
    }

    #[tokio::test]
    async fn planning_errors_map_to_unprocessable_entity() {
        let planner = planner();
        let response = run_planning(move || {
            pack_job(
                &planner,
                PackRequest {
                    items: BTreeMap::from([("S".to_string(), -1)]),
                    strategy: None,
                },
            )
        })
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}

//! REST API for the load-planning service.
//!
//! Provides HTTP endpoints for communication with the frontend.
//! Uses Axum as the web framework and supports CORS.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::{
    Router,
    http::{StatusCode, Uri, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{Any, CorsLayer};
use utoipa::{OpenApi, ToSchema};

use crate::config::{ApiConfig, PlannerConfig};
use crate::metrics::{self, LoadMetrics};
use crate::model::{
    FleetPlan, PlacedCase, ProductSpec, ShipmentLine, Stack, ValidationError, VehicleLoad,
    VehicleSpec,
};
use crate::packer::{PlanError, plan_shipment, plan_shipment_with_progress};
use crate::vehicles;

#[derive(Clone)]
struct ApiState {
    planner_config: PlannerConfig,
}

static OPENAPI_DOC: OnceLock<utoipa::openapi::OpenApi> = OnceLock::new();

// SRI hashes verified against https://unpkg.com/swagger-ui-dist@5.17.14/ on 2025-10-29.
const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8" />
        <title>loadplan API Docs</title>
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

/// Embedded Web Assets (HTML, CSS, JS)
#[derive(RustEmbed)]
#[folder = "web/"]
struct WebAssets;

/// Vehicle selection: either the name of a built-in class or a full
/// custom specification.
#[derive(Deserialize, Clone, ToSchema)]
#[serde(untagged)]
pub enum VehicleChoice {
    Catalog(String),
    Custom(VehicleRequest),
}

/// Custom vehicle specification supplied inline with a request.
#[derive(Deserialize, Clone, ToSchema)]
pub struct VehicleRequest {
    pub name: Option<String>,
    #[schema(example = 450.0)]
    pub length: f64,
    #[schema(example = 150.0)]
    pub width: f64,
    #[schema(example = 245.0)]
    pub height: f64,
    #[schema(example = 1100.0)]
    pub max_weight: f64,
}

impl VehicleRequest {
    fn into_spec(self) -> Result<VehicleSpec, ValidationError> {
        VehicleSpec::new(
            self.name.unwrap_or_else(|| "Custom".to_string()),
            self.length,
            self.width,
            self.height,
            self.max_weight,
        )
    }
}

/// Request structure for the planning endpoints.
///
/// `cargo` lists the requested product quantities; zero-quantity lines are
/// skipped. `allow_rotation` overrides the configured rotation policy for
/// this request when present.
#[derive(Deserialize, ToSchema)]
#[schema(
    example = json!({
        "vehicle": "BUS",
        "cargo": [
            {
                "product": {
                    "name": "Beer crate",
                    "width": 40.0,
                    "length": 30.0,
                    "height": 30.0,
                    "weight": 15.0,
                    "items_per_case": 1,
                    "can_stack": true
                },
                "quantity": 24
            }
        ],
        "allow_rotation": false
    })
)]
pub struct PlanRequest {
    pub vehicle: VehicleChoice,
    pub cargo: Vec<ShipmentLine>,
    #[serde(default)]
    #[schema(nullable = true)]
    pub allow_rotation: Option<bool>,
}

struct ValidatedPlanRequest {
    vehicle: VehicleSpec,
    cargo: Vec<ShipmentLine>,
    allow_rotation: Option<bool>,
}

impl ValidatedPlanRequest {
    fn line_count(&self) -> usize {
        self.cargo.len()
    }

    fn into_parts(self) -> (VehicleSpec, Vec<ShipmentLine>, Option<bool>) {
        (self.vehicle, self.cargo, self.allow_rotation)
    }
}

#[derive(Debug)]
enum PlanRequestValidationError {
    UnknownVehicle(String),
    InvalidVehicle(ValidationError),
    InvalidProduct(ValidationError),
}

impl PlanRequest {
    fn into_validated(self) -> Result<ValidatedPlanRequest, PlanRequestValidationError> {
        let vehicle = match self.vehicle {
            VehicleChoice::Catalog(name) => vehicles::find_vehicle(&name)
                .ok_or(PlanRequestValidationError::UnknownVehicle(name))?,
            VehicleChoice::Custom(request) => request
                .into_spec()
                .map_err(PlanRequestValidationError::InvalidVehicle)?,
        };

        let cargo = self
            .cargo
            .into_iter()
            .filter(|line| line.quantity > 0)
            .map(|line| {
                let p = line.product;
                ProductSpec::new(
                    p.name,
                    p.width,
                    p.length,
                    p.height,
                    p.weight,
                    p.items_per_case,
                    p.can_stack,
                )
                .map(|product| ShipmentLine {
                    product,
                    quantity: line.quantity,
                })
            })
            .collect::<Result<Vec<_>, ValidationError>>()
            .map_err(PlanRequestValidationError::InvalidProduct)?;

        Ok(ValidatedPlanRequest {
            vehicle,
            cargo,
            allow_rotation: self.allow_rotation,
        })
    }
}

/// Response structure with the full fleet plan.
#[derive(Serialize, ToSchema)]
pub struct PlanResponse {
    pub vehicle: VehicleSpec,
    pub vehicles: Vec<PlannedVehicle>,
    pub vehicle_count: usize,
    pub is_complete: bool,
    pub oversize: Option<OversizeReport>,
    pub product_totals: BTreeMap<String, u32>,
}

/// One vehicle load with its stacks and derived metrics.
#[derive(Serialize, ToSchema)]
pub struct PlannedVehicle {
    pub id: usize,
    pub total_weight: f64,
    pub stacks: Vec<PlannedStack>,
    pub metrics: LoadMetrics,
    pub product_totals: BTreeMap<String, u32>,
}

/// One stack with its absolute floor position.
#[derive(Serialize, ToSchema)]
pub struct PlannedStack {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub length: f64,
    pub height: f64,
    pub cases: Vec<PlannedCase>,
}

/// One placed case inside a stack.
#[derive(Serialize, ToSchema)]
pub struct PlannedCase {
    pub product: String,
    pub width: f64,
    pub length: f64,
    pub height: f64,
    pub weight: f64,
    pub z_offset: f64,
    pub rotated: bool,
    pub actual_items: u32,
}

/// The case that stopped the fleet computation, if any.
#[derive(Serialize, ToSchema)]
pub struct OversizeReport {
    pub product: String,
    pub width: f64,
    pub length: f64,
    pub height: f64,
    pub weight: f64,
    pub vehicle: String,
    pub reason_code: String,
    pub reason: String,
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

fn parse_plan_request(
    payload: Result<Json<PlanRequest>, JsonRejection>,
) -> Result<ValidatedPlanRequest, Response> {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(err) => return Err(json_deserialize_error(err)),
    };

    match payload.into_validated() {
        Ok(validated) => Ok(validated),
        Err(PlanRequestValidationError::UnknownVehicle(name)) => Err(error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Unknown vehicle",
            format!("'{}' is not a built-in vehicle class", name),
        )),
        Err(PlanRequestValidationError::InvalidVehicle(err)) => Err(error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Invalid vehicle specification",
            err.to_string(),
        )),
        Err(PlanRequestValidationError::InvalidProduct(err)) => {
            Err(validation_error(err.to_string()))
        }
    }
}

fn planned_case(placed: &PlacedCase) -> PlannedCase {
    PlannedCase {
        product: placed.case.product.clone(),
        width: placed.case.width,
        length: placed.case.length,
        height: placed.case.height,
        weight: placed.case.weight,
        z_offset: placed.z_offset,
        rotated: placed.rotated,
        actual_items: placed.case.actual_items,
    }
}

fn planned_stack(stack: &Stack) -> PlannedStack {
    PlannedStack {
        x: stack.x,
        y: stack.y,
        width: stack.width,
        length: stack.length,
        height: stack.current_height,
        cases: stack.cases.iter().map(planned_case).collect(),
    }
}

impl PlanResponse {
    fn from_loads(
        vehicle: VehicleSpec,
        loads: Vec<VehicleLoad>,
        oversize: Option<OversizeReport>,
    ) -> Self {
        let vehicles: Vec<PlannedVehicle> = loads
            .iter()
            .enumerate()
            .map(|(i, load)| PlannedVehicle {
                id: i + 1,
                total_weight: load.total_weight,
                stacks: load.stacks.iter().map(planned_stack).collect(),
                metrics: LoadMetrics::derive(load, &vehicle),
                product_totals: metrics::product_totals(load),
            })
            .collect();

        let plan = FleetPlan {
            vehicle: vehicle.clone(),
            loads,
        };
        let product_totals = metrics::fleet_product_totals(&plan);

        Self {
            vehicle,
            vehicle_count: vehicles.len(),
            vehicles,
            is_complete: oversize.is_none(),
            oversize,
            product_totals,
        }
    }

    /// Maps a planning result to the response shape; a failed plan keeps
    /// its completed loads and reports the offending case.
    pub fn from_result(result: Result<FleetPlan, PlanError>) -> Self {
        match result {
            Ok(plan) => Self::from_loads(plan.vehicle.clone(), plan.loads, None),
            Err(PlanError::OversizeItem {
                case,
                vehicle,
                reason,
                completed,
            }) => {
                let report = OversizeReport {
                    product: case.product,
                    width: case.width,
                    length: case.length,
                    height: case.height,
                    weight: case.weight,
                    vehicle: vehicle.name.clone(),
                    reason_code: reason.code().to_string(),
                    reason: reason.to_string(),
                };
                Self::from_loads(vehicle, completed, Some(report))
            }
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(handle_plan, handle_plan_stream, handle_vehicles),
    components(
        schemas(
            PlanRequest,
            VehicleChoice,
            VehicleRequest,
            PlanResponse,
            PlannedVehicle,
            PlannedStack,
            PlannedCase,
            OversizeReport,
            ErrorResponse,
            ProductSpec,
            ShipmentLine,
            VehicleSpec,
            LoadMetrics
        )
    ),
    tags((name = "planning", description = "Endpoints for transport load planning"))
)]
struct ApiDoc;

/// Starts the API server.
///
/// Configures CORS for cross-origin requests from the frontend.
/// Blocks until the server is terminated.
pub async fn start_api_server(config: ApiConfig, planner_config: PlannerConfig) {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let state = ApiState { planner_config };

    let app = Router::new()
        // API endpoints
        .route("/plan", post(handle_plan))
        .route("/plan_stream", post(handle_plan_stream))
        .route("/vehicles", get(handle_vehicles))
        // API documentation
        .route("/docs/openapi.json", get(serve_openapi_json))
        .route("/docs", get(serve_openapi_ui))
        // Web-UI (embedded)
        .route("/", get(serve_index))
        .route("/{*path}", get(serve_static))
        .layer(cors)
        .with_state(state);

    let addr = config.socket_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            panic!("❌ Could not bind API server to {}: {}", addr, err);
        }
    };

    let display_host = config.display_host().to_string();
    println!(
        "🚀 Server running on http://{}:{}",
        display_host,
        config.port()
    );
    if config.binds_to_all_interfaces() && config.uses_default_host() {
        println!("💡 Local access: http://localhost:{}", config.port());
    }
    println!("🚛 API Endpoints:");
    println!("   - POST /plan");
    println!("   - POST /plan_stream");
    println!("   - GET /vehicles");
    println!("📑 Documentation:");
    println!("   - GET /docs");
    println!("   - GET /docs/openapi.json");
    println!("🌐 Web-UI: http://{}:{}", display_host, config.port());

    if let Err(err) = axum::serve(listener, app).await {
        eprintln!("❌ API server terminated with an error: {err}");
    }
}

/// Handler for POST /plan endpoint.
///
/// Expands the requested quantities into cases and plans the fleet.
///
/// # Returns
/// JSON response with all required vehicle loads; an unloadable case is
/// reported in `oversize` while the completed loads are kept.
#[utoipa::path(
    post,
    path = "/plan",
    request_body = PlanRequest,
    responses(
        (status = 200, description = "Fleet plan for the requested cargo", body = PlanResponse),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid request, product or vehicle data",
            body = ErrorResponse
        )
    ),
    tag = "planning"
)]
async fn handle_plan(
    State(state): State<ApiState>,
    payload: Result<Json<PlanRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match parse_plan_request(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let line_count = request.line_count();
    let (vehicle, cargo, allow_rotation_override) = request.into_parts();

    println!(
        "📥 New plan request: {} cargo lines, vehicle '{}'",
        line_count, vehicle.name
    );
    let mut policy = state.planner_config.packing_policy();
    if let Some(allow_rotation) = allow_rotation_override {
        policy.allow_rotation = allow_rotation;
    }

    let result = plan_shipment(&cargo, &vehicle, &policy);
    match &result {
        Ok(plan) => println!(
            "🚛 Result: {} vehicles, {} cases",
            plan.vehicle_count(),
            plan.case_count()
        ),
        Err(err) => println!("⚠️ Planning stopped: {}", err),
    }

    let response = PlanResponse::from_result(result);
    (StatusCode::OK, Json(response)).into_response()
}

/// Handler for POST /plan_stream endpoint (SSE).
///
/// Streams planning events in real-time as Server-Sent Events
/// (text/event-stream). The frontend can visualize the load build-up live
/// without waiting for the complete result.
#[utoipa::path(
    post,
    path = "/plan_stream",
    request_body = PlanRequest,
    responses(
        (
            status = 200,
            description = "Streams planning events in real-time",
            content_type = "text/event-stream",
            body = String
        ),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid request, product or vehicle data",
            body = ErrorResponse
        )
    ),
    tag = "planning"
)]
async fn handle_plan_stream(
    State(state): State<ApiState>,
    payload: Result<Json<PlanRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match parse_plan_request(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let (vehicle, cargo, allow_rotation_override) = request.into_parts();

    let (tx, rx) = mpsc::channel::<String>(32);

    let mut policy = state.planner_config.packing_policy();
    if let Some(allow_rotation) = allow_rotation_override {
        policy.allow_rotation = allow_rotation;
    }

    tokio::task::spawn_blocking(move || {
        let _ = plan_shipment_with_progress(&cargo, &vehicle, &policy, |evt| {
            if let Ok(json) = serde_json::to_string(evt) {
                if tx.blocking_send(json).is_err() {
                    // Receiver has closed the stream; remaining events are discarded.
                    return;
                }
            }
        });
    });

    let stream = ReceiverStream::new(rx)
        .map(|msg| Ok::<_, std::convert::Infallible>(Event::default().data(msg)));
    Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(std::time::Duration::from_secs(10))
                .text("keep-alive"),
        )
        .into_response()
}

/// Handler for GET /vehicles endpoint.
///
/// Returns the built-in vehicle classes the frontend offers for selection.
#[utoipa::path(
    get,
    path = "/vehicles",
    responses(
        (status = 200, description = "Built-in vehicle classes", body = [VehicleSpec])
    ),
    tag = "planning"
)]
async fn handle_vehicles() -> impl IntoResponse {
    Json(vehicles::builtin_vehicles())
}

/// Serves the index.html main page
async fn serve_index() -> Response {
    match WebAssets::get("index.html") {
        Some(content) => Html(content.data).into_response(),
        None => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
    }
}

/// Serves static assets (JS, CSS, etc.)
async fn serve_static(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    match WebAssets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.as_ref())], content.data).into_response()
        }
        None => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
    }
}

async fn serve_openapi_json(State(_state): State<ApiState>) -> impl IntoResponse {
    Json(openapi_doc())
}

async fn serve_openapi_ui(State(_state): State<ApiState>) -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Case;
    use crate::packer::OversizeReason;

    #[test]
    fn openapi_doc_lists_expected_paths() {
        let doc = openapi_doc();
        let paths = &doc.paths.paths;
        for path in ["/plan", "/plan_stream", "/vehicles"] {
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
        for name in ["PlanRequest", "PlanResponse", "ErrorResponse"] {
            assert!(
                schemas.contains_key(name),
                "Expected schema '{}' is missing from OpenAPI spec",
                name
            );
        }
    }

    #[test]
    fn plan_request_accepts_catalog_vehicle_name() {
        let json = r#"{
            "vehicle": "BUS",
            "cargo": [
                {
                    "product": {"name": "Crate", "width": 80.0, "length": 60.0, "height": 40.0, "weight": 20.0},
                    "quantity": 3
                }
            ]
        }"#;
        let request: PlanRequest = serde_json::from_str(json).expect("Should parse valid JSON");
        let validated = request.into_validated().expect("Should validate");
        assert_eq!(validated.vehicle.name, "BUS");
        assert_eq!(validated.cargo.len(), 1);
        assert_eq!(validated.allow_rotation, None);
    }

    #[test]
    fn plan_request_accepts_custom_vehicle() {
        let json = r#"{
            "vehicle": {"name": "Box truck", "length": 600.0, "width": 220.0, "height": 230.0, "max_weight": 5000.0},
            "cargo": []
        }"#;
        let request: PlanRequest = serde_json::from_str(json).expect("Should parse valid JSON");
        let validated = request.into_validated().expect("Should validate");
        assert_eq!(validated.vehicle.name, "Box truck");
        assert_eq!(validated.vehicle.max_weight, 5000.0);
    }

    #[test]
    fn plan_request_rejects_unknown_vehicle() {
        let json = r#"{"vehicle": "ZEPPELIN", "cargo": []}"#;
        let request: PlanRequest = serde_json::from_str(json).expect("Should parse valid JSON");
        assert!(matches!(
            request.into_validated(),
            Err(PlanRequestValidationError::UnknownVehicle(_))
        ));
    }

    #[test]
    fn plan_request_rejects_invalid_product() {
        let json = r#"{
            "vehicle": "BUS",
            "cargo": [
                {
                    "product": {"name": "Crate", "width": -80.0, "length": 60.0, "height": 40.0, "weight": 20.0},
                    "quantity": 3
                }
            ]
        }"#;
        let request: PlanRequest = serde_json::from_str(json).expect("Should parse valid JSON");
        assert!(matches!(
            request.into_validated(),
            Err(PlanRequestValidationError::InvalidProduct(_))
        ));
    }

    #[test]
    fn zero_quantity_lines_are_skipped() {
        let json = r#"{
            "vehicle": "BUS",
            "cargo": [
                {
                    "product": {"name": "Crate", "width": 80.0, "length": 60.0, "height": 40.0, "weight": 20.0},
                    "quantity": 0
                }
            ]
        }"#;
        let request: PlanRequest = serde_json::from_str(json).expect("Should parse valid JSON");
        let validated = request.into_validated().expect("Should validate");
        assert!(validated.cargo.is_empty());
    }

    #[test]
    fn plan_request_parses_allow_rotation_when_present() {
        let json = r#"{"vehicle": "BUS", "cargo": [], "allow_rotation": true}"#;
        let request: PlanRequest = serde_json::from_str(json).expect("Should parse valid JSON");
        assert_eq!(request.allow_rotation, Some(true));

        let json = r#"{"vehicle": "BUS", "cargo": [], "allow_rotation": null}"#;
        let request: PlanRequest = serde_json::from_str(json).expect("Should parse valid JSON");
        assert_eq!(request.allow_rotation, None);
    }

    #[test]
    fn failed_plan_keeps_completed_loads_in_response() {
        let vehicle = VehicleSpec::new("BUS", 450.0, 150.0, 245.0, 1100.0).unwrap();
        let oversize = Case {
            product: "Generator".to_string(),
            width: 500.0,
            length: 60.0,
            height: 40.0,
            weight: 250.0,
            can_stack: false,
            actual_items: 1,
        };
        let completed = vec![VehicleLoad {
            stacks: vec![Stack::open(
                0.0,
                0.0,
                Case {
                    product: "Crate".to_string(),
                    width: 80.0,
                    length: 60.0,
                    height: 40.0,
                    weight: 20.0,
                    can_stack: true,
                    actual_items: 1,
                },
                false,
            )],
            total_weight: 20.0,
        }];

        let response = PlanResponse::from_result(Err(PlanError::OversizeItem {
            case: oversize,
            vehicle,
            reason: OversizeReason::ExceedsDimensions,
            completed,
        }));

        assert!(!response.is_complete);
        assert_eq!(response.vehicle_count, 1);
        let report = response.oversize.expect("oversize report missing");
        assert_eq!(report.product, "Generator");
        assert_eq!(report.reason_code, "exceeds_dimensions");
        assert_eq!(response.product_totals.get("Crate"), Some(&1));
    }

    #[test]
    fn successful_plan_maps_stacks_and_metrics() {
        let vehicle = VehicleSpec::new("BUS", 450.0, 150.0, 245.0, 1100.0).unwrap();
        let cargo = vec![ShipmentLine {
            product: ProductSpec::new("Crate", 80.0, 60.0, 40.0, 20.0, 1, true).unwrap(),
            quantity: 3,
        }];

        let result = plan_shipment(&cargo, &vehicle, &Default::default());
        let response = PlanResponse::from_result(result);

        assert!(response.is_complete);
        assert_eq!(response.vehicle_count, 1);
        let load = &response.vehicles[0];
        assert_eq!(load.stacks.len(), 1);
        assert_eq!(load.stacks[0].cases.len(), 3);
        assert!((load.metrics.total_weight - 60.0).abs() < 1e-9);
        assert_eq!(load.product_totals.get("Crate"), Some(&3));
    }
}

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::{debug, warn};
use serde_json::json;
use urania::chart::ChartService;
use urania::error::ChartError;

use crate::requests::{PlanetRequest, SolarArcBody, TransitBody};
use crate::responses::{ChartBody, ErrorBody, SolarArcResponse};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ChartService>,
}

/// Every failure is a client error carrying `{"error": ...}`.
#[derive(Debug)]
pub enum ApiError {
    Chart(ChartError),
    Body(String),
}

impl From<ChartError> for ApiError {
    fn from(err: ChartError) -> Self {
        ApiError::Chart(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Body(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = match self {
            ApiError::Chart(err) => {
                warn!("request failed ({:?}): {}", err.kind(), err);
                err.to_string()
            }
            ApiError::Body(message) => {
                warn!("rejected request body: {}", message);
                message
            }
        };
        (StatusCode::BAD_REQUEST, Json(ErrorBody { error })).into_response()
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/planet", post(planet_handler))
        .route("/transit", post(transit_handler))
        .route("/solararc", post(solar_arc_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

async fn planet_handler(
    State(state): State<AppState>,
    payload: Result<Json<PlanetRequest>, JsonRejection>,
) -> Result<Json<ChartBody>, ApiError> {
    let Json(body) = payload?;
    debug!("/planet {:?}", body);
    let chart = state.service.natal(body.into_natal()?).await?;
    Ok(Json(ChartBody::from(&chart)))
}

/// An empty body is a transit over the reference location.
async fn transit_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChartBody>, ApiError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        TransitBody::default()
    } else {
        serde_json::from_slice::<TransitBody>(&body)
            .map_err(|e| ApiError::Body(format!("Failed to deserialize the JSON body: {e}")))?
    };
    debug!("/transit {:?}", request);
    let chart = state.service.transit(request.into_transit()?).await?;
    Ok(Json(ChartBody::from(&chart)))
}

async fn solar_arc_handler(
    State(state): State<AppState>,
    payload: Result<Json<SolarArcBody>, JsonRejection>,
) -> Result<Json<SolarArcResponse>, ApiError> {
    let Json(body) = payload?;
    debug!("/solararc {:?}", body);
    let result = state.service.solar_arc(body.into_solar_arc()?).await?;
    Ok(Json(SolarArcResponse::from(&result)))
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;
    use urania::chart::ChartDefaults;
    use urania::ephemeris::{
        Body as Planet, Coordinates, HouseSystem, Observer, PositionProvider, ProviderError,
        RawHouses, RawPosition,
    };
    use urania::error::ServiceError;
    use urania::location::{Geocoder, LocationResolver};
    use urania::time::{AmbiguityPolicy, TimeResolver};
    use urania::zodiac::Sign;

    struct StubProvider;

    impl PositionProvider for StubProvider {
        fn body_position(
            &self,
            _jd: f64,
            body: Planet,
            _observer: &Observer,
        ) -> Result<RawPosition, ProviderError> {
            let code = body.swiss_code() as f64;
            Ok(RawPosition {
                longitude: (code * 31.3 + 7.25) % 360.0,
                latitude: 0.0,
                distance: 1.0,
                speed_longitude: if body == Planet::Mercury { -0.4 } else { 0.8 },
            })
        }

        fn houses(
            &self,
            _jd: f64,
            _location: &Coordinates,
            _system: HouseSystem,
        ) -> Result<RawHouses, ProviderError> {
            let mut cusps = [0.0; 12];
            for (i, c) in cusps.iter_mut().enumerate() {
                *c = (200.0 + 30.0 * i as f64) % 360.0;
            }
            Ok(RawHouses {
                cusps,
                ascendant: 200.0,
                midheaven: 110.0,
            })
        }
    }

    #[derive(Default)]
    struct CountingGeocoder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Geocoder for CountingGeocoder {
        async fn geocode(&self, _place: &str) -> Result<Option<Coordinates>, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
    }

    struct PanickingGeocoder;

    #[async_trait]
    impl Geocoder for PanickingGeocoder {
        async fn geocode(&self, place: &str) -> Result<Option<Coordinates>, ServiceError> {
            panic!("geocoder called for {place:?}");
        }
    }

    fn router_with(geocoder: Arc<dyn Geocoder>) -> Router {
        let defaults = ChartDefaults {
            house_system: HouseSystem::Porphyry,
            topocentric: false,
            default_zone: chrono_tz::Asia::Tokyo,
            zone_from_coordinates: false,
            transit_location: Coordinates::new(35.6895, 139.6917).unwrap(),
        };
        let service = ChartService::new(
            Arc::new(StubProvider),
            LocationResolver::new(geocoder, Duration::from_secs(2)),
            TimeResolver::fixed_only(AmbiguityPolicy::default()),
            defaults,
        );
        create_router(AppState {
            service: Arc::new(service),
        })
    }

    async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_planet_end_to_end() {
        let router = router_with(Arc::new(PanickingGeocoder));
        let (status, body) = post_json(
            router,
            "/planet",
            json!({"year": 2024, "month": 3, "day": 20, "hour": 12, "minute": 0,
                   "latitude": 35.68, "longitude": 139.69, "location": "Osaka"}),
        )
        .await;

        // coordinates win; the panicking geocoder is never reached
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["coordinates"]["latitude"], 35.68);
        assert_eq!(body["coordinates"]["longitude"], 139.69);
        assert_eq!(body["input_datetime_utc"], "2024-03-20 03:00");
        let planets = body["planets"].as_array().unwrap();
        assert_eq!(planets.len(), 12);
        let signs: Vec<&str> = Sign::all().iter().map(|s| s.name()).collect();
        for p in planets {
            assert!(signs.contains(&p["sign"].as_str().unwrap()));
            let degree = p["degree"].as_f64().unwrap();
            assert!((0.0..30.0).contains(&degree));
            assert!(p["house"].as_u64().is_some());
        }
        assert_eq!(planets[2]["name"], "Mercury");
        assert_eq!(planets[2]["retrograde"], true);

        let cusps = body["houses"]["cusps"].as_array().unwrap();
        assert_eq!(cusps.len(), 12);
        assert!(cusps
            .iter()
            .all(|c| (0.0..360.0).contains(&c.as_f64().unwrap())));
    }

    #[tokio::test]
    async fn test_planet_missing_location_is_400() {
        let router = router_with(Arc::new(PanickingGeocoder));
        let (status, body) = post_json(
            router,
            "/planet",
            json!({"year": 2024, "month": 3, "day": 20, "hour": 12, "minute": 0}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("location"));
        assert!(body.get("planets").is_none());
    }

    #[tokio::test]
    async fn test_non_numeric_field_is_400() {
        let router = router_with(Arc::new(PanickingGeocoder));
        let (status, body) = post_json(
            router,
            "/planet",
            json!({"year": "nineteen", "month": 3, "day": 20, "hour": 12, "minute": 0,
                   "location": "Tokyo"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_place_is_400_after_one_lookup() {
        let geocoder = Arc::new(CountingGeocoder::default());
        let router = router_with(geocoder.clone());
        let (status, body) = post_json(
            router,
            "/planet",
            json!({"year": 2024, "month": 3, "day": 20, "hour": 12, "minute": 0,
                   "location": "Atlantis"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Atlantis"));
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transit_without_body() {
        let router = router_with(Arc::new(PanickingGeocoder));
        let request = Request::builder()
            .method("POST")
            .uri("/transit")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["coordinates"]["latitude"], 35.6895);
        assert_eq!(body["planets"].as_array().unwrap().len(), 12);
    }

    #[tokio::test]
    async fn test_solar_arc_age_method() {
        let router = router_with(Arc::new(PanickingGeocoder));
        let (status, body) = post_json(
            router,
            "/solararc",
            json!({"birth_year": 2000, "birth_month": 1, "birth_day": 15,
                   "birth_hour": 12, "birth_minute": 0,
                   "target_year": 2024, "target_month": 1, "target_day": 10,
                   "method": "age", "latitude": 35.68, "longitude": 139.69}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["method"], "age");
        assert_eq!(body["age"], 23);
        assert_eq!(body["arc"], 23.0);
        assert_eq!(body["target_date"], "2024-01-10");
        for p in body["planets"].as_array().unwrap() {
            assert!(p.get("house").is_none());
            assert!(p.get("retrograde").is_none());
        }
    }

    #[tokio::test]
    async fn test_health() {
        let router = router_with(Arc::new(PanickingGeocoder));
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

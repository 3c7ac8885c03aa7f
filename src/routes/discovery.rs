use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;
use crate::core::{DiscoveryError, DiscoveryOrchestrator};
use crate::models::{
    Coordinate, CreateSessionRequest, DiscoveryResponse, DiscoveryResult, ErrorResponse,
    HealthResponse, LocationErrorRequest, SessionResponse, SetLocationRequest,
};
use crate::services::{MapSurface, PlaceProvider, Session, SessionError, SessionRegistry};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionRegistry,
}

/// Configure all discovery routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/sessions", web::post().to(create_session))
        .route("/sessions/{id}", web::get().to(get_session))
        .route("/sessions/{id}", web::delete().to(delete_session))
        .route("/sessions/{id}/location", web::post().to(set_location))
        .route("/sessions/{id}/location/error", web::post().to(report_location_error))
        .route("/sessions/{id}/discover", web::post().to(discover))
        .route("/sessions/{id}/map", web::get().to(get_map));
}

fn error_response(status: actix_web::http::StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

fn session_error(e: SessionError) -> HttpResponse {
    error_response(actix_web::http::StatusCode::NOT_FOUND, "Session not found", e.to_string())
}

fn validation_error(errors: validator::ValidationErrors) -> HttpResponse {
    error_response(actix_web::http::StatusCode::BAD_REQUEST, "Validation failed", errors.to_string())
}

fn invalid_location(e: impl std::fmt::Display) -> HttpResponse {
    error_response(actix_web::http::StatusCode::BAD_REQUEST, "Invalid location", e.to_string())
}

fn notice_message(e: &DiscoveryError) -> String {
    e.notice().map_or_else(|| e.to_string(), |notice| notice.message())
}

async fn snapshot(id: Uuid, session: &Session) -> SessionResponse {
    SessionResponse {
        session_id: id,
        phase: session.phase().await,
        location: session.location().await,
        last_result: session.last_result().await,
    }
}

async fn lookup(state: &AppState, id: Uuid) -> Result<Arc<Session>, HttpResponse> {
    state.sessions.get(id).await.map_err(session_error)
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        active_sessions: state.sessions.len(),
        timestamp: chrono::Utc::now(),
    })
}

/// Mount a map session
///
/// POST /api/v1/sessions
///
/// Request body (optional, an empty body mounts without a location):
/// ```json
/// { "location": { "latitude": 33.6844, "longitude": 73.0479 } }
/// ```
async fn create_session(state: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let req: CreateSessionRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CreateSessionRequest::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(req) => req,
            Err(e) => {
                return error_response(
                    actix_web::http::StatusCode::BAD_REQUEST,
                    "invalid_json",
                    format!("Invalid JSON: {}", e),
                )
            }
        }
    };

    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let location = match req
        .location
        .map(|l| Coordinate::new(l.latitude, l.longitude))
        .transpose()
    {
        Ok(location) => location,
        Err(e) => return invalid_location(e),
    };

    let (id, session) = state.sessions.create().await;

    if let Some(coordinate) = location {
        if let Err(e) = session.set_location(coordinate).await {
            tracing::warn!("Session {} mounted without location: {}", id, e);
        }
    }

    tracing::info!("Mounted session {}", id);

    HttpResponse::Created().json(snapshot(id, &session).await)
}

async fn get_session(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let id = path.into_inner();
    match lookup(&state, id).await {
        Ok(session) => HttpResponse::Ok().json(snapshot(id, &session).await),
        Err(resp) => resp,
    }
}

/// Unmount a map session
async fn delete_session(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let id = path.into_inner();
    match state.sessions.remove(id).await {
        Ok(()) => {
            tracing::info!("Unmounted session {}", id);
            HttpResponse::NoContent().finish()
        }
        Err(e) => session_error(e),
    }
}

/// Location pushed by the browser
///
/// POST /api/v1/sessions/{id}/location
async fn set_location(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<SetLocationRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let id = path.into_inner();
    let session = match lookup(&state, id).await {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    let coordinate = match Coordinate::new(req.latitude, req.longitude) {
        Ok(c) => c,
        Err(e) => return invalid_location(e),
    };

    if let Err(e) = session.set_location(coordinate).await {
        return invalid_location(e);
    }
    HttpResponse::Ok().json(snapshot(id, &session).await)
}

/// Location acquisition failure reported by the browser
///
/// POST /api/v1/sessions/{id}/location/error
async fn report_location_error(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<LocationErrorRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let id = path.into_inner();
    let session = match lookup(&state, id).await {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    session.report_location_error(req.into_inner().message).await;
    HttpResponse::Ok().json(snapshot(id, &session).await)
}

/// Run discovery around the session's location
///
/// POST /api/v1/sessions/{id}/discover
///
/// An empty result is a normal 200 response with status "empty".
async fn discover(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let id = path.into_inner();
    let session = match lookup(&state, id).await {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    tracing::info!("Discovery requested for session {}", id);

    match run_discovery(Arc::clone(&session)).await {
        Ok(result) => {
            let notice = result.notice(session.config().search_radius_meters);

            HttpResponse::Ok().json(DiscoveryResponse {
                count: result.count(),
                message: notice.message(),
                result,
            })
        }
        Err(e @ (DiscoveryError::LocationUnavailable | DiscoveryError::LocationAcquisition(_))) => error_response(
            actix_web::http::StatusCode::PRECONDITION_FAILED,
            "Location unavailable",
            notice_message(&e),
        ),
        Err(e @ DiscoveryError::Superseded) => {
            tracing::info!("Discovery for session {} superseded", id);
            error_response(actix_web::http::StatusCode::CONFLICT, "Discovery superseded", e.to_string())
        }
        Err(e @ DiscoveryError::Aborted(_)) => {
            tracing::error!("Discovery failed for session {}: {}", id, e);
            error_response(
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Discovery failed",
                notice_message(&e),
            )
        }
    }
}

/// Run discovery as its own task on the worker's arbiter
///
/// A panic inside the run is reported as [`DiscoveryError::Aborted`] and shown
/// on the session's surface instead of taking down the request.
async fn run_discovery<P, M>(session: Arc<DiscoveryOrchestrator<P, M>>) -> Result<DiscoveryResult, DiscoveryError>
where
    P: PlaceProvider + 'static,
    M: MapSurface + 'static,
{
    let run = Arc::clone(&session);
    match actix_web::rt::spawn(async move { run.start_discovery().await }).await {
        Ok(outcome) => outcome,
        Err(e) => {
            let err = DiscoveryError::Aborted(e.to_string());
            if let Some(notice) = err.notice() {
                session.surface().notify(&notice);
            }
            Err(err)
        }
    }
}

/// Current map frame for the session
async fn get_map(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    match lookup(&state, path.into_inner()).await {
        Ok(session) => HttpResponse::Ok().json(session.surface().snapshot()),
        Err(resp) => resp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Candidate, DiscoveryConfig, Notice};
    use crate::services::{GeoapifyClient, InMemorySurface, ProviderError};
    use actix_web::{http::StatusCode, test, App};

    /// Provider whose every query panics
    struct BrokenProvider;

    impl PlaceProvider for BrokenProvider {
        async fn search_by_category(
            &self,
            _categories: &[String],
            _center: Coordinate,
            _radius_meters: u32,
            _limit: u32,
        ) -> Result<Vec<Candidate>, ProviderError> {
            panic!("category lookup exploded")
        }

        async fn search_by_text(
            &self,
            _term: &str,
            _center: Coordinate,
            _radius_meters: u32,
            _limit: u32,
        ) -> Result<Vec<Candidate>, ProviderError> {
            panic!("text lookup exploded")
        }
    }

    fn app_state() -> AppState {
        let client = GeoapifyClient::with_base_url("http://127.0.0.1:9".to_string(), "key".to_string(), 1)
            .expect("client");
        AppState {
            sessions: SessionRegistry::new(Arc::new(client), DiscoveryConfig::default(), 100, 60),
        }
    }

    #[actix_web::test]
    async fn test_discover_without_location_is_precondition_failure() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post().uri("/sessions").to_request();
        let created: SessionResponse = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::post()
            .uri(&format!("/sessions/{}/discover", created.session_id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PRECONDITION_FAILED);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.message, "Please allow location access to find nearby software houses");
    }

    #[actix_web::test]
    async fn test_unknown_session_is_not_found() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri(&format!("/sessions/{}", Uuid::new_v4()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_invalid_location_rejected() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post().uri("/sessions").to_request();
        let created: SessionResponse = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::post()
            .uri(&format!("/sessions/{}/location", created.session_id))
            .set_json(serde_json::json!({ "latitude": 120.0, "longitude": 73.0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_mount_with_location() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/sessions")
            .set_json(serde_json::json!({ "location": { "latitude": 33.6844, "longitude": 73.0479 } }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let created: SessionResponse = test::read_body_json(resp).await;
        assert_eq!(created.location, Some(Coordinate { latitude: 33.6844, longitude: 73.0479 }));
    }

    #[actix_web::test]
    async fn test_mount_with_malformed_body_is_rejected() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/sessions")
            .insert_header(("content-type", "application/json"))
            .set_payload(r#"{"location":{"latitude":"33.68","longitude":73.04}}"#)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "invalid_json");
        assert_eq!(body.status_code, 400);
    }

    #[actix_web::test]
    async fn test_mount_with_out_of_range_location_is_rejected() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/sessions")
            .set_json(serde_json::json!({ "location": { "latitude": 95.0, "longitude": 200.0 } }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_aborted_run_reports_search_failure() {
        let session = Arc::new(DiscoveryOrchestrator::new(
            BrokenProvider,
            Arc::new(InMemorySurface::new()),
            DiscoveryConfig::default(),
        ));
        session
            .set_location(Coordinate { latitude: 33.6844, longitude: 73.0479 })
            .await
            .unwrap();

        let err = run_discovery(Arc::clone(&session)).await.unwrap_err();

        assert!(matches!(err, DiscoveryError::Aborted(_)));
        assert_eq!(
            notice_message(&err),
            "Failed to search for nearby companies. Please check your internet connection and try again."
        );
        assert_eq!(session.surface().snapshot().notice, Some(Notice::SearchFailed));
    }
}

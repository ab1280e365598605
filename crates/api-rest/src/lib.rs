//! # API REST
//!
//! REST facade over the prescription authoring core.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, session headers)
//!
//! The clinic API is injected through [`AppState`], so the router runs against the real
//! `rx-client` in production and an in-memory implementation in tests.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::{IntoParams, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use rx_core::{
    encode, AuthoringSession, ClinicApi, CoreConfig, DoctorInfo, DosageCode, MedicineCatalog,
    PrescriptionComposer, PrescriptionDraft, PrescriptionError, PrescriptionForm, PreviewRenderer,
    Role, Schedule, SessionContext,
};

/// Shared state for the REST handlers.
pub struct AppState<A> {
    cfg: Arc<CoreConfig>,
    api: Arc<A>,
    renderer: PreviewRenderer,
}

impl<A> Clone for AppState<A> {
    fn clone(&self) -> Self {
        Self {
            cfg: self.cfg.clone(),
            api: self.api.clone(),
            renderer: self.renderer.clone(),
        }
    }
}

impl<A> AppState<A> {
    pub fn new(cfg: Arc<CoreConfig>, api: A) -> Self {
        let renderer = PreviewRenderer::from_config(&cfg);
        Self {
            cfg,
            api: Arc::new(api),
            renderer,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComplaintsRes {
    pub complaints: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuggestRes {
    pub medicines: Vec<String>,
}

/// Doctor details for the printed header plus the authoring form.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AuthoringReq {
    pub doctor: DoctorInfo,
    pub form: PrescriptionForm,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PreviewRes {
    pub draft: PrescriptionDraft,
    pub rendered: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeRes {
    pub appointment_id: String,
    pub message: Option<String>,
    /// The caller should forget its selected appointment.
    pub clear_appointment_context: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SuggestParams {
    /// Case-insensitive fragment of a medicine name.
    #[serde(default)]
    pub q: String,
}

type Failure = (StatusCode, Json<ErrorRes>);

fn failure(status: StatusCode, error: impl Into<String>) -> Failure {
    (
        status,
        Json(ErrorRes {
            error: error.into(),
        }),
    )
}

fn error_response(e: PrescriptionError) -> Failure {
    match e {
        PrescriptionError::Validation(v) => failure(StatusCode::BAD_REQUEST, v.to_string()),
        PrescriptionError::Api(api) => {
            tracing::error!("clinic API error: {}", api);
            failure(StatusCode::BAD_GATEWAY, api.user_message())
        }
        PrescriptionError::Forbidden { .. } => failure(StatusCode::FORBIDDEN, e.to_string()),
        PrescriptionError::InvalidState(_) => failure(StatusCode::CONFLICT, e.to_string()),
        PrescriptionError::InvalidInput(_)
        | PrescriptionError::Text(_)
        | PrescriptionError::YamlDeserialization(_)
        | PrescriptionError::JsonDeserialization(_) => {
            failure(StatusCode::BAD_REQUEST, e.to_string())
        }
        PrescriptionError::FileRead(_) | PrescriptionError::FileWrite(_) => {
            tracing::error!("unexpected I/O error: {}", e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}

/// Build the caller's session from `x-role`, `x-doctor-id`, `x-hospital-id` and a bearer
/// `authorization` header.
fn session_from_headers(headers: &HeaderMap) -> Result<SessionContext, Failure> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let role: Role = header("x-role")
        .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "missing x-role header"))?
        .parse()
        .map_err(error_response)?;

    let mut session = SessionContext::new(role);
    if let Some(doctor_id) = header("x-doctor-id") {
        session = session.with_doctor_id(doctor_id);
    }
    if let Some(hospital_id) = header("x-hospital-id") {
        session = session.with_hospital_id(hospital_id);
    }
    if let Some(token) = header("authorization")
        .as_deref()
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        session = session.with_token(token.trim());
    }

    Ok(session)
}

fn authoring_session<A>(
    state: &AppState<A>,
    headers: &HeaderMap,
    req: AuthoringReq,
) -> Result<AuthoringSession, Failure> {
    let session = session_from_headers(headers)?;
    let composer = PrescriptionComposer::from_form(
        &req.form,
        None,
        req.doctor,
        state.cfg.complaint_vocabulary().to_vec(),
    )
    .map_err(error_response)?;

    AuthoringSession::new(session, composer, state.renderer.clone()).map_err(error_response)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        complaints,
        encode_dosage,
        preview_prescription,
        finalize_appointment,
        suggest_medicines,
    ),
    components(schemas(
        HealthRes,
        ComplaintsRes,
        SuggestRes,
        AuthoringReq,
        PreviewRes,
        FinalizeRes,
        ErrorRes,
        Schedule,
        DosageCode,
        DoctorInfo,
        PrescriptionForm,
        PrescriptionDraft,
        rx_core::form::FormVitals,
        rx_core::form::FormMedicine,
        rx_core::DraftVitals,
        rx_core::DraftComplaints,
        rx_core::DraftMedicine,
        rx_core::DosageStrength,
        rx_core::MealRelation,
    ))
)]
pub struct ApiDoc;

/// Build the REST router.
pub fn router<A>(state: AppState<A>) -> Router
where
    A: ClinicApi + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/complaints", get(complaints::<A>))
        .route("/dosage/encode", post(encode_dosage))
        .route("/prescriptions/preview", post(preview_prescription::<A>))
        .route(
            "/appointments/:id/finalize",
            post(finalize_appointment::<A>),
        )
        .route("/medicines/suggest", get(suggest_medicines::<A>))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the REST API on `addr` until the process exits.
///
/// # Errors
/// Returns an error if the address cannot be bound or the server fails while running.
pub async fn serve<A>(addr: &str, state: AppState<A>) -> anyhow::Result<()>
where
    A: ClinicApi + Send + Sync + 'static,
{
    tracing::info!("++ Starting RX REST on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancers.
async fn health() -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "RX REST API is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/complaints",
    responses(
        (status = 200, description = "Selectable complaint labels", body = ComplaintsRes)
    )
)]
async fn complaints<A>(State(state): State<AppState<A>>) -> Json<ComplaintsRes> {
    Json(ComplaintsRes {
        complaints: state.cfg.complaint_vocabulary().to_vec(),
    })
}

#[utoipa::path(
    post,
    path = "/dosage/encode",
    request_body = Schedule,
    responses(
        (status = 200, description = "Daily dose code and preview label", body = DosageCode)
    )
)]
/// Encode a dosing schedule.
async fn encode_dosage(Json(schedule): Json<Schedule>) -> Json<DosageCode> {
    Json(encode(&schedule))
}

#[utoipa::path(
    post,
    path = "/prescriptions/preview",
    request_body = AuthoringReq,
    responses(
        (status = 200, description = "Composed draft and rendered preview", body = PreviewRes),
        (status = 400, description = "Invalid form", body = ErrorRes),
        (status = 403, description = "Caller is not a doctor", body = ErrorRes)
    )
)]
/// Compose a prescription form into a draft and render its print preview.
///
/// Nothing is sent to the clinic API.
async fn preview_prescription<A>(
    State(state): State<AppState<A>>,
    headers: HeaderMap,
    Json(req): Json<AuthoringReq>,
) -> Result<Json<PreviewRes>, Failure> {
    let mut authoring = authoring_session(&state, &headers, req)?;
    let draft = authoring.submit().map_err(error_response)?.clone();
    let rendered = authoring.render().map_err(error_response)?;
    Ok(Json(PreviewRes { draft, rendered }))
}

#[utoipa::path(
    post,
    path = "/appointments/{id}/finalize",
    request_body = AuthoringReq,
    params(("id" = String, Path, description = "Appointment identifier")),
    responses(
        (status = 200, description = "Prescription recorded", body = FinalizeRes),
        (status = 400, description = "Invalid form", body = ErrorRes),
        (status = 403, description = "Caller is not a doctor", body = ErrorRes),
        (status = 502, description = "Clinic API failed", body = ErrorRes)
    )
)]
/// Compose a prescription form and record it against the appointment.
///
/// The appointment in the path wins over any appointment named in the form.
async fn finalize_appointment<A>(
    State(state): State<AppState<A>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(mut req): Json<AuthoringReq>,
) -> Result<Json<FinalizeRes>, Failure>
where
    A: ClinicApi + Send + Sync + 'static,
{
    req.form.appointment_id = Some(id);
    let mut authoring = authoring_session(&state, &headers, req)?;
    let appointment_id = authoring
        .submit()
        .map_err(error_response)?
        .appointment_id()
        .to_string();

    let outcome = authoring
        .confirm_save(state.api.as_ref())
        .await
        .map_err(error_response)?;

    Ok(Json(FinalizeRes {
        appointment_id,
        message: outcome.message,
        clear_appointment_context: outcome.clear_appointment_context,
    }))
}

#[utoipa::path(
    get,
    path = "/medicines/suggest",
    params(SuggestParams),
    responses(
        (status = 200, description = "Matching catalog names", body = SuggestRes)
    )
)]
/// Suggest medicine names from the clinic catalog.
///
/// An unavailable catalog yields no suggestions rather than an error.
async fn suggest_medicines<A>(
    State(state): State<AppState<A>>,
    headers: HeaderMap,
    Query(params): Query<SuggestParams>,
) -> Result<Json<SuggestRes>, Failure>
where
    A: ClinicApi + Send + Sync + 'static,
{
    session_from_headers(&headers)?;
    let catalog = MedicineCatalog::load(state.api.as_ref()).await;
    let medicines = catalog
        .suggest(&params.q)
        .into_iter()
        .map(str::to_string)
        .collect();
    Ok(Json(SuggestRes { medicines }))
}

//! # RX Client
//!
//! `reqwest` implementation of the clinic API used by the authoring flow.
//!
//! Endpoints, relative to the configured base URL:
//! - `GET  /doctor/medicines` for the common medicine catalog
//! - `PUT  /doctor/appointment/finalize/{appointmentId}` to record a prescription
//!
//! When the session carries a token it is sent as a bearer `Authorization` header.

#![warn(rust_2018_idioms)]

use rx_core::{
    ApiError, ClinicApi, CoreConfig, FinalizePayload, FinalizeResponse, PrescriptionError,
    PrescriptionResult,
};
use rx_types::AppointmentId;
use serde::Deserialize;

/// HTTP client for the clinic API.
#[derive(Clone, Debug)]
pub struct ClinicApiClient {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl ClinicApiClient {
    /// Create a client from the resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns `PrescriptionError::InvalidInput` if the HTTP client cannot be built.
    pub fn new(cfg: &CoreConfig, token: Option<String>) -> PrescriptionResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(cfg.request_timeout())
            .build()
            .map_err(|e| {
                PrescriptionError::InvalidInput(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            base_url: cfg.api_base_url().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorised(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = self
            .authorised(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

fn transport_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Transport("request to clinic API timed out".into())
    } else if e.is_connect() {
        ApiError::Transport(format!("cannot connect to clinic API: {}", e))
    } else {
        ApiError::Transport(e.to_string())
    }
}

/// A catalog entry is either a bare name or an object carrying one.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogEntry {
    Name(String),
    Named { name: String },
}

impl CatalogEntry {
    fn into_name(self) -> String {
        match self {
            CatalogEntry::Name(name) | CatalogEntry::Named { name } => name,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogBody {
    Wrapped {
        #[serde(default)]
        data: Vec<CatalogEntry>,
    },
    Bare(Vec<CatalogEntry>),
}

impl ClinicApi for ClinicApiClient {
    async fn fetch_common_medicines(&self) -> Result<Vec<String>, ApiError> {
        let url = format!("{}/doctor/medicines", self.base_url);
        tracing::debug!("fetching medicine catalog from {}", url);

        let response = self.send(self.client.get(&url)).await?;
        let body: CatalogBody = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        let entries = match body {
            CatalogBody::Wrapped { data } => data,
            CatalogBody::Bare(entries) => entries,
        };

        Ok(entries.into_iter().map(CatalogEntry::into_name).collect())
    }

    async fn finalize_appointment(
        &self,
        appointment_id: &AppointmentId,
        payload: &FinalizePayload,
    ) -> Result<FinalizeResponse, ApiError> {
        let url = format!(
            "{}/doctor/appointment/finalize/{}",
            self.base_url, appointment_id
        );
        tracing::debug!(
            appointment = %appointment_id,
            medicines = payload.prescriptions.len(),
            "finalizing appointment"
        );

        let response = self.send(self.client.put(&url).json(payload)).await?;
        response
            .json::<FinalizeResponse>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

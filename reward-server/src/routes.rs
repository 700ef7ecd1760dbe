// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::config::{ServerConfig, CORS_MAX_AGE_SECS};
use crate::programs::{summaries, ProgramSummary};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use reward_merkle::{Error, ProgramProof, ProofQueryService, ProofResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Query string of `GET /proof`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofParams {
    pub address: Option<String>,
    pub program_id: Option<String>,
}

/// Query string of `GET /proofs`.
#[derive(Debug, Default, Deserialize)]
pub struct ProofsParams {
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    code: &'static str,
}

/// Failures reported to HTTP clients.
#[derive(Debug)]
pub enum ApiError {
    MissingAddress,
    MissingProgramId,
    InvalidParameter,
    InvalidAddress,
    UnknownProgram,
    NotInRewardList,
    Internal,
}

impl ApiError {
    fn parts(&self) -> (StatusCode, ErrorBody) {
        let (status, error, code) = match self {
            ApiError::MissingAddress => (StatusCode::BAD_REQUEST, "invalid address", "missing_parameter"),
            ApiError::MissingProgramId => {
                (StatusCode::BAD_REQUEST, "invalid programId", "missing_parameter")
            }
            ApiError::InvalidParameter => {
                (StatusCode::BAD_REQUEST, "invalid query string", "invalid_parameter")
            }
            ApiError::InvalidAddress => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid address", "invalid_address")
            }
            ApiError::UnknownProgram => (StatusCode::NOT_FOUND, "unknown program", "unknown_program"),
            ApiError::NotInRewardList => {
                (StatusCode::NOT_FOUND, "not in reward list", "not_in_reward_list")
            }
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error",
                "internal_error",
            ),
        };
        (status, ErrorBody { error, code })
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidAddress { .. } => ApiError::InvalidAddress,
            Error::UnknownProgram(_) => ApiError::UnknownProgram,
            Error::NotFound { .. } => ApiError::NotInRewardList,
            other => {
                error!("Internal error while serving a proof: {other}");
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.parts();
        (status, Json(body)).into_response()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        debug!("Rejected query string: {rejection}");
        ApiError::InvalidParameter
    }
}

/// Treats an empty query value like a missing one.
fn required(value: Option<String>, missing: ApiError) -> Result<String, ApiError> {
    value.filter(|v| !v.trim().is_empty()).ok_or(missing)
}

/// `GET /proof?address=…&programId=…`
async fn get_proof(
    State(service): State<Arc<ProofQueryService>>,
    params: Result<Query<ProofParams>, QueryRejection>,
) -> Result<Json<ProofResponse>, ApiError> {
    let Query(params) = params?;
    let address = required(params.address, ApiError::MissingAddress)?;
    let program_id = required(params.program_id, ApiError::MissingProgramId)?;

    let response = service.query_proof(&program_id, &address).map_err(|err| {
        debug!("Proof query for {address} in {program_id} failed: {err}");
        ApiError::from(err)
    })?;
    Ok(Json(response))
}

/// `GET /proofs?address=…`, proofs in every program that whitelists the address.
async fn get_proofs(
    State(service): State<Arc<ProofQueryService>>,
    params: Result<Query<ProofsParams>, QueryRejection>,
) -> Result<Json<Vec<ProgramProof>>, ApiError> {
    let Query(params) = params?;
    let address = required(params.address, ApiError::MissingAddress)?;
    Ok(Json(service.query_all(&address)?))
}

/// `GET /programs`
async fn list_programs(State(service): State<Arc<ProofQueryService>>) -> Json<Vec<ProgramSummary>> {
    Json(summaries(service.registry()))
}

/// Browser access: `GET` only, from the configured origins.
pub fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("Ignoring invalid CORS origin {origin:?}: {err}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(CORS_MAX_AGE_SECS))
}

pub fn router(service: ProofQueryService, cors: CorsLayer) -> Router {
    Router::new()
        .route("/proof", get(get_proof))
        .route("/proofs", get(get_proofs))
        .route("/programs", get(list_programs))
        .layer(cors)
        .with_state(Arc::new(service))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        let cases = [
            (ApiError::MissingAddress, 400, "missing_parameter"),
            (ApiError::MissingProgramId, 400, "missing_parameter"),
            (ApiError::InvalidParameter, 400, "invalid_parameter"),
            (ApiError::InvalidAddress, 422, "invalid_address"),
            (ApiError::UnknownProgram, 404, "unknown_program"),
            (ApiError::NotInRewardList, 404, "not_in_reward_list"),
            (ApiError::Internal, 500, "internal_error"),
        ];
        for (err, status, code) in cases {
            let (actual_status, body) = err.parts();
            assert_eq!(actual_status.as_u16(), status);
            assert_eq!(body.code, code);
        }
    }

    #[test]
    fn test_library_errors_map_to_api_errors() {
        assert!(matches!(
            ApiError::from(Error::UnknownProgram("x".to_string())),
            ApiError::UnknownProgram
        ));
        assert!(matches!(
            ApiError::from(Error::IndexOutOfRange { index: 3, len: 2 }),
            ApiError::Internal
        ));
    }

    #[test]
    fn test_empty_parameter_counts_as_missing() {
        assert!(required(Some("  ".to_string()), ApiError::MissingAddress).is_err());
        assert!(required(None, ApiError::MissingAddress).is_err());
        assert_eq!(
            required(Some("0x1".to_string()), ApiError::MissingAddress).unwrap(),
            "0x1"
        );
    }
}

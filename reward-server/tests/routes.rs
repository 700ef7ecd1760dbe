// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderValue, Method, Request, StatusCode},
    Router,
};
use color_eyre::Result;
use reward_merkle::{program_id, ProofQueryService, Whitelist};
use reward_server::{
    cors_layer, programs::registry_from_whitelist, router, ProgramsConfig, ServerConfig,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const A: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
const B: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";
const C: &str = "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB";
const OUTSIDER: &str = "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb";

const PROGRAM1_ID: &str = "0x96adf373413c3ec927a30419a752c09b592d1aeff97014b822cda8f1340ea6d7";
const USDE_WEEK24_ID: &str = "0x4486940b210d017fe91b72846254afd5ce9bcfcb960e9089d17074ff30cbe7aa";

fn app() -> Router {
    let whitelist: Whitelist = serde_json::from_value(json!({
        "rewardProgram1": [[A, 100], [B, 200], [C, 300]],
        "usde-week24": [[A, "12345678901234567890"]],
    }))
    .expect("valid whitelist");
    let config = ProgramsConfig {
        no_dumps: true,
        ..ProgramsConfig::default()
    };
    let registry = registry_from_whitelist(&whitelist, &config);
    let service = ProofQueryService::new(Arc::new(registry));
    router(service, cors_layer(&ServerConfig::default()))
}

async fn get(app: Router, uri: &str) -> Result<(StatusCode, Value)> {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty())?)
        .await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, serde_json::from_slice(&bytes)?))
}

#[tokio::test]
async fn test_proof_found() -> Result<()> {
    let (status, body) = get(app(), &format!("/proof?address={A}&programId={PROGRAM1_ID}")).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "proof": [
                "0x94b864311e36e9678f0b1c17a7bb410d95099421ccdaa88a27509dd0f34f6a05",
                "0xd301256d6a43a54792f499505835d15834df7e331fb9200d28ffac6de0cf2eee"
            ],
            "rewardAmount": 100,
            "programId": PROGRAM1_ID
        })
    );
    Ok(())
}

#[tokio::test]
async fn test_lowercase_address_gets_the_same_proof() -> Result<()> {
    let (_, checksummed) =
        get(app(), &format!("/proof?address={B}&programId={PROGRAM1_ID}")).await?;
    let (status, lower) = get(
        app(),
        &format!("/proof?address={}&programId={PROGRAM1_ID}", B.to_lowercase()),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(lower, checksummed);
    Ok(())
}

#[tokio::test]
async fn test_large_amount_is_a_string() -> Result<()> {
    let (status, body) =
        get(app(), &format!("/proof?address={A}&programId={USDE_WEEK24_ID}")).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rewardAmount"], "12345678901234567890");
    // a single leaf tree has an empty proof
    assert_eq!(body["proof"], json!([]));
    Ok(())
}

#[tokio::test]
async fn test_missing_parameters() -> Result<()> {
    let (status, body) = get(app(), &format!("/proof?programId={PROGRAM1_ID}")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"error": "invalid address", "code": "missing_parameter"})
    );

    let (status, body) = get(app(), &format!("/proof?address={A}&programId=")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"error": "invalid programId", "code": "missing_parameter"})
    );
    Ok(())
}

#[tokio::test]
async fn test_repeated_parameter_is_a_json_error() -> Result<()> {
    let (status, body) = get(
        app(),
        &format!("/proof?address={A}&address={B}&programId={PROGRAM1_ID}"),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"error": "invalid query string", "code": "invalid_parameter"})
    );

    let (status, body) = get(app(), &format!("/proofs?address={A}&address={B}")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_parameter");
    Ok(())
}

#[tokio::test]
async fn test_invalid_address() -> Result<()> {
    let (status, body) = get(app(), &format!("/proof?address=0x1234&programId={PROGRAM1_ID}")).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "invalid_address");

    // mixed case with a broken checksum
    let bad = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAeD";
    let (status, _) = get(app(), &format!("/proof?address={bad}&programId={PROGRAM1_ID}")).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn test_unknown_program_and_unknown_address_differ() -> Result<()> {
    let unknown = program_id("usde-week25");
    let (status, body) = get(app(), &format!("/proof?address={A}&programId={unknown}")).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "unknown program", "code": "unknown_program"}));

    let (status, body) = get(app(), &format!("/proof?address={A}&programId=rewardProgram1")).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "unknown_program");

    let (status, body) =
        get(app(), &format!("/proof?address={OUTSIDER}&programId={PROGRAM1_ID}")).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"error": "not in reward list", "code": "not_in_reward_list"})
    );
    Ok(())
}

#[tokio::test]
async fn test_proofs_across_programs() -> Result<()> {
    let (status, body) = get(app(), &format!("/proofs?address={A}")).await?;
    assert_eq!(status, StatusCode::OK);

    let proofs = body.as_array().expect("a list");
    assert_eq!(proofs.len(), 2);
    assert_eq!(proofs[0]["name"], "usde-week24");
    assert_eq!(proofs[0]["programId"], USDE_WEEK24_ID);
    assert_eq!(proofs[1]["name"], "rewardProgram1");
    assert_eq!(proofs[1]["rewardAmount"], 100);

    let (status, body) = get(app(), &format!("/proofs?address={OUTSIDER}")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, _) = get(app(), "/proofs").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_programs_listing() -> Result<()> {
    let (status, body) = get(app(), "/programs").await?;
    assert_eq!(status, StatusCode::OK);

    let programs = body.as_array().expect("a list");
    assert_eq!(programs.len(), 2);
    assert_eq!(programs[0]["name"], "rewardProgram1");
    assert_eq!(programs[0]["entries"], 3);
    assert_eq!(programs[0]["totalAmount"], 600);
    assert_eq!(
        programs[0]["root"],
        "0xf690e54e17b3d6df8566486ba7abe96f560a1a5ded6ca17fc8bcf5d9e85f0bd1"
    );
    assert_eq!(programs[1]["name"], "usde-week24");
    Ok(())
}

#[tokio::test]
async fn test_cors_preflight() -> Result<()> {
    let response = app()
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/proof")
                .header(header::ORIGIN, "http://localhost:3000")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())?,
        )
        .await?;

    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
        Some(&"http://localhost:3000".parse::<HeaderValue>()?)
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_MAX_AGE),
        Some(&"86400".parse::<HeaderValue>()?)
    );

    let response = app()
        .oneshot(
            Request::builder()
                .uri(format!("/proof?address={A}&programId={PROGRAM1_ID}"))
                .header(header::ORIGIN, "https://elsewhere.example")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
    Ok(())
}

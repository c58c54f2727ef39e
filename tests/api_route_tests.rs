use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode},
};
use base64::Engine;
use serde_json::{Value, json};
use std::{
    fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};
use tower::ServiceExt;

use vaxapi::db::seed::VaccineSeed;
use vaxapi::db::store::VaxStorage;
use vaxapi::router::{VaxState, vax_router};

async fn temp_app(tag: &str) -> (Router, VaxStorage, PathBuf) {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "vaxapi-api-{}-{}-{}.sqlite",
        tag,
        std::process::id(),
        nanos
    ));

    let database_url = format!("sqlite:{}", temp_path.display());
    let storage = VaxStorage::connect(&database_url)
        .await
        .expect("failed to open temp database");
    storage.init_schema().await.expect("schema init failed");

    let app = vax_router(VaxState::new(storage.clone()));
    (app, storage, temp_path)
}

fn basic_auth(username: &str, password: &str) -> String {
    let token =
        base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
    format!("Basic {token}")
}

fn json_request(method: &str, uri: &str, auth: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

fn bare_request(method: &str, uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    builder.body(Body::empty()).expect("failed to build request")
}

async fn json_body(resp: Response<Body>) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body was not JSON")
}

fn alice_payload() -> Value {
    json!({
        "username": "alice",
        "name": "Alice",
        "birth": "1990-01-01",
        "email": "alice@example.com",
        "password": "hunter2"
    })
}

#[tokio::test]
async fn account_lifecycle_over_http() {
    let (app, _storage, path) = temp_app("lifecycle").await;

    // Register.
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/users", None, alice_payload()))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = json_body(resp).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    // The canonical representation never carries a password field.
    assert!(body.get("password").is_none());

    // Authenticated read.
    let resp = app
        .clone()
        .oneshot(bare_request(
            "GET",
            "/users",
            Some(&basic_auth("alice", "hunter2")),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    // Wrong password.
    let resp = app
        .clone()
        .oneshot(bare_request(
            "GET",
            "/users",
            Some(&basic_auth("alice", "wrong")),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let wrong_password_body = json_body(resp).await;

    // Unknown username must be indistinguishable from a wrong password.
    let resp = app
        .clone()
        .oneshot(bare_request(
            "GET",
            "/users",
            Some(&basic_auth("nobody", "hunter2")),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(resp).await, wrong_password_body);

    // Patch only the email.
    let resp = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/users",
            Some(&basic_auth("alice", "hunter2")),
            json!({"email": "a@x.com"}),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["email"], "a@x.com");
    assert_eq!(body["name"], "Alice");
    assert_eq!(body["birth"], "1990-01-01");

    // Change the password.
    let resp = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/users",
            Some(&basic_auth("alice", "hunter2")),
            json!({"new_password": "newpw"}),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(bare_request(
            "GET",
            "/users",
            Some(&basic_auth("alice", "hunter2")),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .clone()
        .oneshot(bare_request(
            "GET",
            "/users",
            Some(&basic_auth("alice", "newpw")),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    // Delete, then the account is gone.
    let resp = app
        .clone()
        .oneshot(bare_request(
            "DELETE",
            "/users",
            Some(&basic_auth("alice", "newpw")),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app
        .clone()
        .oneshot(bare_request(
            "GET",
            "/users",
            Some(&basic_auth("alice", "newpw")),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn duplicate_registration_returns_conflict() {
    let (app, _storage, path) = temp_app("conflict").await;

    let resp = app
        .clone()
        .oneshot(json_request("POST", "/users", None, alice_payload()))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
        .clone()
        .oneshot(json_request("POST", "/users", None, alice_payload()))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body = json_body(resp).await;
    assert_eq!(body["error"]["code"], "DUPLICATE_IDENTITY");

    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn registration_requires_a_password() {
    let (app, _storage, path) = temp_app("no-password").await;

    let mut payload = alice_payload();
    payload["password"] = json!("");
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/users", None, payload))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(body["error"]["code"], "INVALID_INPUT");

    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn empty_patch_fields_are_rejected_not_ignored() {
    let (app, _storage, path) = temp_app("empty-patch").await;

    let resp = app
        .clone()
        .oneshot(json_request("POST", "/users", None, alice_payload()))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/users",
            Some(&basic_auth("alice", "hunter2")),
            json!({"email": ""}),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/users",
            Some(&basic_auth("alice", "hunter2")),
            json!({"birth": ""}),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/users",
            Some(&basic_auth("alice", "hunter2")),
            json!({"new_password": ""}),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Nothing was overwritten by the rejected patches.
    let resp = app
        .clone()
        .oneshot(bare_request(
            "GET",
            "/users",
            Some(&basic_auth("alice", "hunter2")),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["birth"], "1990-01-01");
    assert_eq!(body["email"], "alice@example.com");

    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn catalog_and_dose_routes() {
    let (app, storage, path) = temp_app("doses").await;

    storage
        .seed_vaccines(&[VaccineSeed {
            name: "BCG".to_string(),
            num_doses: 1,
            obs: Some("single dose at birth".to_string()),
        }])
        .await
        .expect("seed failed");

    // Catalog listing needs no auth.
    let resp = app
        .clone()
        .oneshot(bare_request("GET", "/vaccines", None))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body[0]["name"], "BCG");
    let vac_id = body[0]["vac_id"].as_i64().expect("vac_id missing");

    let resp = app
        .clone()
        .oneshot(json_request("POST", "/users", None, alice_payload()))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Dose registration against the seeded vaccine.
    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/doses",
            Some(&basic_auth("alice", "hunter2")),
            json!({"vac_id": vac_id, "date_taken": "2024-03-01"}),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let dose = json_body(resp).await;
    assert_eq!(dose["vac_id"], vac_id);
    assert_eq!(dose["date_taken"], "2024-03-01");

    // Unknown vaccine id.
    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/doses",
            Some(&basic_auth("alice", "hunter2")),
            json!({"vac_id": 999, "date_taken": "2024-03-01"}),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(resp).await;
    assert_eq!(body["error"]["code"], "UNKNOWN_VACCINE");

    // Listing returns the single registered dose.
    let resp = app
        .clone()
        .oneshot(bare_request(
            "GET",
            "/doses",
            Some(&basic_auth("alice", "hunter2")),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let doses = json_body(resp).await;
    assert_eq!(doses.as_array().map(Vec::len), Some(1));

    let _ = fs::remove_file(&path);
}

/// A request with no Authorization header at all must be indistinguishable
/// from one with bad credentials: same 401 status, same JSON body.
#[tokio::test]
async fn missing_credentials_match_bad_credentials_on_the_wire() {
    let (app, _storage, path) = temp_app("no-auth").await;

    let resp = app
        .clone()
        .oneshot(json_request("POST", "/users", None, alice_payload()))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
        .clone()
        .oneshot(bare_request(
            "GET",
            "/users",
            Some(&basic_auth("alice", "wrong")),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let bad_password_body = json_body(resp).await;

    for (method, uri) in [("GET", "/users"), ("DELETE", "/users"), ("GET", "/doses")] {
        let resp = app
            .clone()
            .oneshot(bare_request(method, uri, None))
            .await
            .expect("request failed");
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(resp).await, bad_password_body);
    }

    // Malformed header value, same story.
    let resp = app
        .clone()
        .oneshot(bare_request("GET", "/users", Some("Bearer not-basic")))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(resp).await, bad_password_body);

    let _ = fs::remove_file(&path);
}

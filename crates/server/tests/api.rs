use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db)
        .password_cost(4)
        .build()
        .await
        .unwrap();
    engine.new_user("alice", "password").await.unwrap();
    engine.new_user("bob", "password").await.unwrap();
    server::router(Arc::new(engine))
}

fn basic(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    user: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, basic(user, "password"));
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn amounts(record: &Value) -> Vec<i64> {
    record["snapshots"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["amount_minor"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn requests_without_valid_credentials_are_rejected() {
    let app = app().await;

    let request = Request::builder()
        .uri("/categories")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/categories")
        .header(header::AUTHORIZATION, basic("alice", "wrong-password"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn categories_crud() {
    let app = app().await;

    let (status, list) = call(&app, "GET", "/categories", "alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["categories"].as_array().unwrap().len(), 6);
    assert_eq!(list["balanced"], json!(true));

    let (status, created) = call(
        &app,
        "POST",
        "/categories",
        "alice",
        Some(json!({ "name": "Gifts", "percentage": 5.0, "display_order": 6 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["color"], json!("#6366f1"));
    let id = created["id"].as_i64().unwrap();

    let (status, list) = call(&app, "GET", "/categories", "alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["balanced"], json!(false));
    assert_eq!(list["total_percentage"].as_f64().unwrap(), 105.0);

    let (status, updated) = call(
        &app,
        "PUT",
        &format!("/categories/{id}"),
        "alice",
        Some(json!({ "name": "Presents", "percentage": 2.5, "color": "#112233" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], json!("Presents"));

    let (status, body) = call(
        &app,
        "PUT",
        &format!("/categories/{id}"),
        "alice",
        Some(json!({ "name": "Presents", "percentage": 0.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], json!("percentage"));

    let (status, _) = call(&app, "DELETE", &format!("/categories/{id}"), "bob", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(&app, "DELETE", &format!("/categories/{id}"), "alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn monthly_record_lifecycle() {
    let app = app().await;
    let body = json!({ "year": 2025, "month": 5, "income_minor": 200_000, "notes": "May" });

    let (status, record) = call(&app, "POST", "/records", "alice", Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        amounts(&record),
        vec![60_000, 40_000, 20_000, 20_000, 40_000, 20_000]
    );
    assert_eq!(record["allocated_minor"], json!(200_000));
    assert_eq!(record["stale"], json!(false));
    let id = record["id"].as_i64().unwrap();

    let (status, _) = call(&app, "POST", "/records", "alice", Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, updated) = call(
        &app,
        "PUT",
        &format!("/records/{id}"),
        "alice",
        Some(json!({ "income_minor": 100_000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["income_minor"], json!(100_000));
    assert_eq!(updated["notes"], Value::Null);
    assert_eq!(
        amounts(&updated),
        vec![30_000, 20_000, 10_000, 10_000, 20_000, 10_000]
    );

    let (status, regenerated) = call(
        &app,
        "POST",
        &format!("/records/{id}/regenerate"),
        "alice",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(regenerated["income_minor"], json!(100_000));

    let (status, _) = call(&app, "GET", &format!("/records/{id}"), "bob", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, list) = call(&app, "GET", "/records", "alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, history) = call(&app, "GET", "/history", "alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["stats"]["months"], json!(1));
    assert_eq!(history["stats"]["best_minor"], json!(100_000));

    let (status, _) = call(&app, "DELETE", &format!("/records/{id}"), "alice", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, "GET", &format!("/records/{id}"), "alice", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn record_input_errors() {
    let app = app().await;

    let (status, body) = call(
        &app,
        "POST",
        "/records",
        "alice",
        Some(json!({ "year": 2025, "month": 13, "income_minor": 1_000 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], json!("month"));

    let (status, body) = call(
        &app,
        "POST",
        "/records",
        "alice",
        Some(json!({ "year": 2025, "month": 1, "income_minor": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], json!("income"));

    let (status, body) = call(
        &app,
        "POST",
        "/records",
        "alice",
        Some(json!({ "year": 2025, "month": 1, "income_minor": i64::MAX })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], json!("income"));

    // an invalid edit of someone else's record is still a 404
    let (status, created) = call(
        &app,
        "POST",
        "/records",
        "alice",
        Some(json!({ "year": 2025, "month": 1, "income_minor": 1_000 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = call(
        &app,
        "PUT",
        &format!("/records/{}", created["id"]),
        "bob",
        Some(json!({ "income_minor": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // without active categories
    let (_, list) = call(&app, "GET", "/categories", "bob", None).await;
    for category in list["categories"].as_array().unwrap() {
        let id = category["id"].as_i64().unwrap();
        call(&app, "DELETE", &format!("/categories/{id}"), "bob", None).await;
    }
    let (status, body) = call(
        &app,
        "POST",
        "/records",
        "bob",
        Some(json!({ "year": 2025, "month": 1, "income_minor": 1_000 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("field").is_none());
}

#[tokio::test]
async fn savings_goal_ledger() {
    let app = app().await;

    let (status, goal) = call(
        &app,
        "POST",
        "/goals",
        "alice",
        Some(json!({ "name": "Trip", "target_minor": 50_000 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(goal["balance_minor"], json!(0));
    assert_eq!(goal["icon"], json!("🐷"));
    let id = goal["id"].as_i64().unwrap();

    let mut contribution_ids = Vec::new();
    for (amount, date) in [(20_000, "2025-01-10"), (10_000, "2025-02-10"), (-5_000, "2025-03-10")] {
        let (status, created) = call(
            &app,
            "POST",
            &format!("/goals/{id}/contributions"),
            "alice",
            Some(json!({ "amount_minor": amount, "date": date })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        contribution_ids.push(created["id"].as_i64().unwrap());
    }

    let (status, detail) = call(&app, "GET", &format!("/goals/{id}"), "alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["balance_minor"], json!(25_000));
    assert_eq!(detail["progress"].as_f64().unwrap(), 0.5);
    assert_eq!(detail["complete"], json!(false));
    assert_eq!(detail["contributions"][0]["date"], json!("2025-03-10"));
    let running: Vec<i64> = detail["balance_history"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["balance_minor"].as_i64().unwrap())
        .collect();
    assert_eq!(running, vec![20_000, 30_000, 25_000]);

    let (status, body) = call(
        &app,
        "POST",
        &format!("/goals/{id}/contributions"),
        "alice",
        Some(json!({ "amount_minor": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], json!("amount"));

    let last = contribution_ids[2];
    let (status, _) = call(
        &app,
        "DELETE",
        &format!("/goals/{id}/contributions/{last}"),
        "bob",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        "DELETE",
        &format!("/goals/{id}/contributions/{last}"),
        "alice",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, goals) = call(&app, "GET", "/goals", "alice", None).await;
    assert_eq!(goals[0]["balance_minor"], json!(30_000));

    let (status, dashboard) = call(
        &app,
        "GET",
        "/dashboard?year=2025&month=1",
        "alice",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["record"], Value::Null);
    assert_eq!(dashboard["goals_in_progress"].as_array().unwrap().len(), 1);

    let (status, _) = call(&app, "DELETE", &format!("/goals/{id}"), "alice", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, "GET", &format!("/goals/{id}"), "alice", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_and_password_change() {
    let app = app().await;

    let (status, profile) = call(&app, "GET", "/user", "alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["username"], json!("alice"));

    let (status, _) = call(
        &app,
        "PUT",
        "/user/password",
        "alice",
        Some(json!({ "current_password": "nope", "new_password": "secret99" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &app,
        "PUT",
        "/user/password",
        "alice",
        Some(json!({ "current_password": "password", "new_password": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], json!("password"));

    let (status, _) = call(
        &app,
        "PUT",
        "/user/password",
        "alice",
        Some(json!({ "current_password": "password", "new_password": "secret99" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // the old password no longer authenticates
    let (status, _) = call(&app, "GET", "/user", "alice", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn run_returns_when_the_address_is_taken() {
    let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = taken.local_addr().unwrap();

    let db = Database::connect("sqlite::memory:").await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    tokio::time::timeout(std::time::Duration::from_secs(5), server::run(engine, addr))
        .await
        .unwrap();
}

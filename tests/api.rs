use std::collections::HashMap;
use std::net::SocketAddr;

use actix_web::http::{StatusCode, header};
use actix_web::web::Data;
use actix_web::{App, test};
use serde_json::{Value, json};

use hrm_attendance::config::Config;
use hrm_attendance::db::Stores;
use hrm_attendance::routes::{self, RateLimiters};
use hrm_attendance::state::AppState;

const ADMIN_USER: &str = "admin@academy.com";
const ADMIN_PASS: &str = "0786";

fn config() -> Config {
    let vars = HashMap::from([
        ("SERVER_ADDR", "127.0.0.1:0"),
        ("DATABASE_URL", "memory:"),
        ("JWT_SECRET", "integration-secret"),
        ("ADMIN_USERNAME", ADMIN_USER),
        ("ADMIN_PASSWORD", ADMIN_PASS),
        ("LATE_CUTOFF", "10:00"),
        ("RATE_LOGIN_PER_MIN", "600"),
    ]);
    Config::from_lookup(&|key| vars.get(key).map(|v| v.to_string())).unwrap()
}

fn peer() -> SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

macro_rules! spawn_app {
    () => {{
        let config = config();
        let state = Data::new(AppState::new(&Stores::in_memory(), &config));
        let limiters = RateLimiters::from_config(&config).unwrap();
        let config = Data::new(config);
        test::init_service(
            App::new()
                .app_data(state)
                .app_data(config.clone())
                .configure(move |cfg| routes::configure(cfg, &config, &limiters)),
        )
        .await
    }};
}

macro_rules! login {
    ($app:expr, $user:expr, $pass:expr) => {{
        let req = test::TestRequest::post()
            .uri("/auth/login")
            .peer_addr(peer())
            .set_json(json!({ "username": $user, "password": $pass }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&$app, req).await;
        body["token"].as_str().unwrap().to_string()
    }};
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

#[actix_web::test]
async fn admin_login_returns_token_and_role() {
    let app = spawn_app!();
    let req = test::TestRequest::post()
        .uri("/auth/login")
        .peer_addr(peer())
        .set_json(json!({ "username": ADMIN_USER, "password": ADMIN_PASS }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["role"], "admin");
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[actix_web::test]
async fn bad_credentials_get_401_envelope() {
    let app = spawn_app!();
    let req = test::TestRequest::post()
        .uri("/auth/login")
        .peer_addr(peer())
        .set_json(json!({ "username": ADMIN_USER, "password": "wrong" }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "success": false, "message": "Invalid credentials" }));
}

#[actix_web::test]
async fn protected_routes_need_a_token() {
    let app = spawn_app!();

    let req = test::TestRequest::get()
        .uri("/api/attendance")
        .peer_addr(peer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);

    let req = test::TestRequest::get()
        .uri("/api/attendance")
        .peer_addr(peer())
        .insert_header(bearer("not-a-jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn attendance_round_trip_through_http() {
    let app = spawn_app!();
    let token = login!(app, ADMIN_USER, ADMIN_PASS);

    let req = test::TestRequest::post()
        .uri("/api/attendance/manual")
        .peer_addr(peer())
        .insert_header(bearer(&token))
        .set_json(json!({
            "employeeId": "EMP001",
            "employeeName": "Doe, John",
            "date": "2024-01-15T00:00:00.000Z",
            "loginTime": "10:30",
            "logoutTime": "",
            "location": "",
            "totalHours": 99,
            "isLate": false
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let created = &body["data"];
    assert_eq!(created["date"], "2024-01-15");
    assert_eq!(created["totalHours"], 0.0);
    assert_eq!(created["isLate"], true);
    assert_eq!(created["location"], "Office");
    assert_eq!(created["logoutTime"], Value::Null);
    let id = created["id"].as_u64().unwrap();

    let req = test::TestRequest::patch()
        .uri(&format!("/api/attendance/{id}"))
        .peer_addr(peer())
        .insert_header(bearer(&token))
        .set_json(json!({ "loginTime": "09:00", "logoutTime": "17:30" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["totalHours"], 8.5);
    assert_eq!(body["data"]["isLate"], true);

    let req = test::TestRequest::get()
        .uri("/api/attendance?employee=john&dateFrom=2024-01-01&dateTo=2024-01-31")
        .peer_addr(peer())
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::get()
        .uri("/api/attendance/summary?date=2024-01-15")
        .peer_addr(peer())
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["loginCount"], 1);
    assert_eq!(body["data"]["lateRecords"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::get()
        .uri("/api/attendance/export/full")
        .peer_addr(peer())
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(disposition.contains("attendance_report_"));
    let csv = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert_eq!(
        csv,
        "Employee,Date,Login Time,Logout Time,Total Hours,Late,Location,Actually Present,Remarks\n\
         \"Doe, John\",2024-01-15,09:00,17:30,8.5,Yes,Office,Yes,\n"
    );

    let req = test::TestRequest::delete()
        .uri(&format!("/api/attendance/{id}"))
        .peer_addr(peer())
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/attendance/{id}"))
        .peer_addr(peer())
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn manual_entry_validation_and_conflict() {
    let app = spawn_app!();
    let token = login!(app, ADMIN_USER, ADMIN_PASS);

    let req = test::TestRequest::post()
        .uri("/api/attendance/manual")
        .peer_addr(peer())
        .insert_header(bearer(&token))
        .set_json(json!({ "employeeName": "John Doe", "date": "2024-01-15" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let entry = json!({
        "employeeId": "EMP001",
        "employeeName": "John Doe",
        "date": "2024-01-15",
        "loginTime": "09:00"
    });
    for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
        let req = test::TestRequest::post()
            .uri("/api/attendance/manual")
            .peer_addr(peer())
            .insert_header(bearer(&token))
            .set_json(&entry)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), expected);
    }

    let req = test::TestRequest::get()
        .uri("/api/attendance/export/weekly")
        .peer_addr(peer())
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn employees_cannot_administer_attendance() {
    let app = spawn_app!();
    let admin = login!(app, ADMIN_USER, ADMIN_PASS);

    let req = test::TestRequest::post()
        .uri("/api/employees")
        .peer_addr(peer())
        .insert_header(bearer(&admin))
        .set_json(json!({
            "employeeId": "EMP001",
            "name": "John Doe",
            "email": "john.doe@academy.com",
            "username": "john.doe@academy.com",
            "password": "password123",
            "joinDate": "2024-01-15"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["data"].get("password").is_none());
    let id = body["data"]["id"].as_u64().unwrap();

    let token = login!(app, "john.doe@academy.com", "password123");

    let req = test::TestRequest::get()
        .uri("/api/attendance")
        .peer_addr(peer())
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri(&format!("/api/employees/{id}"))
        .peer_addr(peer())
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["employeeId"], "EMP001");

    let req = test::TestRequest::get()
        .uri("/api/me")
        .peer_addr(peer())
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["role"], "employee");
    assert_eq!(body["data"]["id"], "EMP001");
}

#[actix_web::test]
async fn malformed_input_gets_failure_envelope() {
    let app = spawn_app!();
    let token = login!(app, ADMIN_USER, ADMIN_PASS);

    let requests = [
        test::TestRequest::post()
            .uri("/api/attendance/manual")
            .set_json(json!({
                "employeeName": "John Doe",
                "date": "2024-01-15",
                "loginTime": "9am"
            })),
        test::TestRequest::get().uri("/api/attendance?dateFrom=yesterday"),
        test::TestRequest::patch()
            .uri("/api/attendance/abc")
            .set_json(json!({ "loginTime": "09:00" })),
    ];

    for req in requests {
        let req = req.peer_addr(peer()).insert_header(bearer(&token)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("application/json"));

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
    }

    let req = test::TestRequest::post()
        .uri("/api/attendance/manual")
        .peer_addr(peer())
        .insert_header(bearer(&token))
        .set_json(json!({ "employeeName": "John Doe", "date": "2024-01-15", "loginTime": "9am" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["message"].as_str().unwrap().contains("9am"));
}

use std::sync::Arc;

use actix_web::{App, test, web};
use gpio_bridge::{AppConfig, AppState, GpioManager};
use serde_json::{Value, json};

fn sample_config() -> AppConfig {
    serde_json::from_str(
        r#"
        {
            "http": {
                "host": "localhost:8080",
                "path": "/api/v1"
            },
            "gpio": {
                "numbering": "BCM",
                "pin_count": 40,
                "strict": true
            },
            "hardware": {
                "enabled": false
            }
        }
        "#,
    )
    .expect("valid sample config")
}

async fn app_state(cfg: AppConfig) -> AppState<gpio_bridge::Backend> {
    let manager = Arc::new(GpioManager::new(Arc::new(cfg)));
    manager.initialize().await.expect("simulator initializes");
    AppState { manager }
}

macro_rules! init_app {
    ($state:expr) => {{
        let state = $state;
        let scope_path = state.manager.config().http.path.clone();
        test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .service(state.api_scope(&scope_path)),
        )
        .await
    }};
}

#[actix_rt::test]
async fn root_describes_service() {
    let app = init_app!(app_state(sample_config()).await);

    let req = test::TestRequest::get().uri("/api/v1/").to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(resp["status"], "success");
    assert_eq!(resp["data"]["name"], "gpio-bridge");
    assert!(resp["data"]["version"].is_string());
    assert!(
        resp["data"]["description"]
            .as_str()
            .unwrap()
            .contains("simulated")
    );
}

#[actix_rt::test]
async fn output_setup_reports_wire_codes() {
    let app = init_app!(app_state(sample_config()).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/pins/17/setup")
        .set_payload(r#"{"mode":"output","initial":"low"}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::get().uri("/api/v1/pins/17").to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["status"], "success");
    assert_eq!(
        resp["data"],
        json!({ "mode": 0, "pull_up_down": 33, "value": 0 })
    );
}

#[actix_rt::test]
async fn input_pin_reads_low_by_default() {
    let app = init_app!(app_state(sample_config()).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/pins/27/setup")
        .set_payload(r#"{"mode":"input"}"#)
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["data"]["mode"], 1);

    let req = test::TestRequest::get().uri("/api/v1/pins/27").to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["data"]["value"], 0);
    assert_eq!(resp["data"]["pull_up_down"], 33);
}

#[actix_rt::test]
async fn input_pull_is_reported() {
    let app = init_app!(app_state(sample_config()).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/pins/4/setup")
        .set_payload(r#"{"mode":"input","pull_up_down":"up"}"#)
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(resp["data"]["pull_up_down"], 31);
}

#[actix_rt::test]
async fn set_state_and_list_pins() {
    let app = init_app!(app_state(sample_config()).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/pins/22/setup")
        .set_payload(r#"{"mode":"output"}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::post()
        .uri("/api/v1/pins/22/state")
        .set_payload(r#"{"state":"high"}"#)
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["data"]["value"], 1);

    let req = test::TestRequest::get().uri("/api/v1/pins").to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["data"], json!({ "22": 1 }));
}

#[actix_rt::test]
async fn unconfigured_pin_returns_404() {
    let app = init_app!(app_state(sample_config()).await);

    let req = test::TestRequest::get().uri("/api/v1/pins/5").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Pin 5 not found");
}

#[actix_rt::test]
async fn bad_pin_ids_return_400() {
    let app = init_app!(app_state(sample_config()).await);

    for uri in ["/api/v1/pins/abc", "/api/v1/pins/-3", "/api/v1/pins/40"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400, "{uri}");
    }

    let req = test::TestRequest::post()
        .uri("/api/v1/pins/x/cleanup")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
async fn invalid_mode_and_state_return_400() {
    let app = init_app!(app_state(sample_config()).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/pins/17/setup")
        .set_payload(r#"{"mode":"pwm"}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::post()
        .uri("/api/v1/pins/17/setup")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::post()
        .uri("/api/v1/pins/17/setup")
        .set_payload(r#"{"mode":"output"}"#)
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/pins/17/state")
        .set_payload(r#"{"state":"medium"}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::post()
        .uri("/api/v1/pins/17/state")
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
async fn reject_state_when_not_output() {
    let app = init_app!(app_state(sample_config()).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/pins/27/setup")
        .set_payload(r#"{"mode":"input"}"#)
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/pins/27/state")
        .set_payload(r#"{"state":"high"}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Pin 27 is not set up as output");
}

#[actix_rt::test]
async fn cleanup_pin_is_idempotent() {
    let app = init_app!(app_state(sample_config()).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/pins/17/setup")
        .set_payload(r#"{"mode":"output","initial":"high"}"#)
        .to_request();
    test::call_service(&app, req).await;

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/v1/pins/17/cleanup")
            .to_request();
        let resp: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["status"], "success");
        assert_eq!(resp["message"], "Pin 17 cleaned up");
    }

    let req = test::TestRequest::get().uri("/api/v1/pins/17").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_rt::test]
async fn cleanup_all_clears_every_pin() {
    let app = init_app!(app_state(sample_config()).await);

    for pin in [5, 6, 7] {
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/pins/{pin}/setup"))
            .set_payload(r#"{"mode":"output","initial":"high"}"#)
            .to_request();
        test::call_service(&app, req).await;
    }

    let req = test::TestRequest::post().uri("/api/v1/cleanup").to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["message"], "All pins cleaned up");

    let req = test::TestRequest::get().uri("/api/v1/pins").to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["data"], json!({}));
}

#[actix_rt::test]
async fn status_reports_full_pin_range() {
    let app = init_app!(app_state(sample_config()).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/pins/17/setup")
        .set_payload(r#"{"mode":"output","initial":1}"#)
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get().uri("/api/v1/status").to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;

    let data = &resp["data"];
    assert_eq!(data["initialized"], true);
    assert_eq!(data["backend"], "simulated");
    assert_eq!(data["remote"], false);
    assert_eq!(data["mode"], "BCM");
    let pins = data["pins"].as_object().unwrap();
    assert_eq!(pins.len(), 40);
    assert_eq!(pins["17"], 1);
    assert_eq!(pins["0"], 0);
}

#[actix_rt::test]
async fn wrong_method_returns_405() {
    let app = init_app!(app_state(sample_config()).await);

    let req = test::TestRequest::get()
        .uri("/api/v1/pins/17/setup")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 405);

    let req = test::TestRequest::delete().uri("/api/v1/pins").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 405);
}

#[actix_rt::test]
async fn unknown_path_returns_404() {
    let app = init_app!(app_state(sample_config()).await);

    let req = test::TestRequest::get().uri("/api/v1/nope").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "error");
}

#[actix_rt::test]
async fn api_key_is_enforced_when_configured() {
    let mut cfg = sample_config();
    cfg.http.api_key = Some("s3cret".to_string());
    let app = init_app!(app_state(cfg).await);

    let req = test::TestRequest::get().uri("/api/v1/pins").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::get()
        .uri("/api/v1/pins")
        .insert_header(("X-API-Key", "wrong"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::get()
        .uri("/api/v1/pins")
        .insert_header(("X-API-Key", "s3cret"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}

#[actix_rt::test]
async fn reconfigure_rejected_under_reject_policy() {
    let mut cfg = sample_config();
    cfg.gpio.reconfigure = gpio_bridge::ReconfigurePolicy::Reject;
    let app = init_app!(app_state(cfg).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/pins/18/setup")
        .set_payload(r#"{"mode":"input"}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::post()
        .uri("/api/v1/pins/18/setup")
        .set_payload(r#"{"mode":"output"}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 409);
}

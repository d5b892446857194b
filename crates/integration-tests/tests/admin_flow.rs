//! Admin order console over HTTP.

use reqwest::StatusCode;
use serde_json::{Value, json};

use velvet_integration_tests::{TestApp, fixture_address};

async fn body(response: reqwest::Response) -> Value {
    response.json().await.expect("json body")
}

async fn place_cod_order(app: &TestApp, user: &str) -> String {
    let response = app
        .post(
            "/api/cart/add",
            user,
            &json!({"product_id": "p1", "size": "M", "quantity": 1}),
        )
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    let placed = app
        .post(
            "/api/orders/place",
            user,
            &json!({"address": fixture_address(), "payment_method": "cod"}),
        )
        .send()
        .await
        .expect("request");
    body(placed).await["order"]["id"]
        .as_str()
        .expect("order id")
        .to_owned()
}

#[tokio::test]
async fn admin_routes_require_the_token() {
    let app = TestApp::spawn().await;

    let bare = app
        .client
        .get(format!("{}/api/admin/orders", app.base_url))
        .send()
        .await
        .expect("request");
    assert_eq!(bare.status(), StatusCode::UNAUTHORIZED);

    let wrong = app
        .client
        .get(format!("{}/api/admin/orders", app.base_url))
        .bearer_auth("wrong-token")
        .send()
        .await
        .expect("request");
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_sees_every_users_orders() {
    let app = TestApp::spawn().await;
    place_cod_order(&app, "u1").await;
    place_cod_order(&app, "u2").await;

    let response = app.admin_get("/api/admin/orders").send().await.expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body(response).await;
    assert_eq!(body["orders"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn admin_moves_an_order_through_the_lifecycle() {
    let app = TestApp::spawn().await;
    let order_id = place_cod_order(&app, "u1").await;

    for status in ["Processing", "Packing", "Shipped", "Out for Delivery", "Delivered"] {
        let response = app
            .admin_post(
                "/api/admin/orders/status",
                &json!({"order_id": order_id, "status": status}),
            )
            .send()
            .await
            .expect("request");
        assert_eq!(response.status(), StatusCode::OK, "advancing to {status}");
        assert_eq!(body(response).await["order"]["status"], json!(status));
    }
}

#[tokio::test]
async fn delivered_orders_cannot_be_reopened() {
    let app = TestApp::spawn().await;
    let order_id = place_cod_order(&app, "u1").await;
    app.admin_post(
        "/api/admin/orders/status",
        &json!({"order_id": order_id, "status": "Delivered"}),
    )
    .send()
    .await
    .expect("request");

    let response = app
        .admin_post(
            "/api/admin/orders/status",
            &json!({"order_id": order_id, "status": "Shipped"}),
        )
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body(response).await;
    assert_eq!(body["error"], json!("invalid_transition"));
    assert!(
        body["message"]
            .as_str()
            .is_some_and(|m| m.contains("Delivered") && m.contains("Shipped")),
        "message should name both statuses: {body}"
    );
}

#[tokio::test]
async fn cancelled_orders_stay_cancelled() {
    let app = TestApp::spawn().await;
    let order_id = place_cod_order(&app, "u1").await;
    app.admin_post(
        "/api/admin/orders/status",
        &json!({"order_id": order_id, "status": "Cancelled"}),
    )
    .send()
    .await
    .expect("request");

    // Same-status set is a no-op, anything else conflicts
    let same = app
        .admin_post(
            "/api/admin/orders/status",
            &json!({"order_id": order_id, "status": "Cancelled"}),
        )
        .send()
        .await
        .expect("request");
    assert_eq!(same.status(), StatusCode::OK);

    let reopen = app
        .admin_post(
            "/api/admin/orders/status",
            &json!({"order_id": order_id, "status": "Processing"}),
        )
        .send()
        .await
        .expect("request");
    assert_eq!(reopen.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn unknown_order_is_not_found() {
    let app = TestApp::spawn().await;
    let response = app
        .admin_post(
            "/api/admin/orders/status",
            &json!({
                "order_id": "00000000-0000-0000-0000-000000000000",
                "status": "Shipped",
            }),
        )
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

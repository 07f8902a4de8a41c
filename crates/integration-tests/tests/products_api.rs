//! Integration tests for the product endpoints.

use minimart_integration_tests::TestContext;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_product_crud_round_trip() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .post_json("/products", &json!({ "name": "Desk Lamp", "stock": 10 }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Desk Lamp");
    assert_eq!(body["is_available"], true);
    let id = body["id"].as_i64().expect("id");

    let (status, body) = ctx
        .put_json(
            &format!("/products/{id}"),
            &json!({ "name": "Bright Desk Lamp", "stock": 7 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Bright Desk Lamp");
    assert_eq!(body["stock"], 7);

    assert_eq!(
        ctx.delete(&format!("/products/{id}")).await,
        StatusCode::NO_CONTENT
    );
    let (status, _) = ctx.get_json(&format!("/products/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_availability_defaults_and_overrides() {
    let ctx = TestContext::new().await;

    // Zero stock derives unavailable.
    let (_, body) = ctx
        .post_json("/products", &json!({ "name": "Out of Stock", "stock": 0 }))
        .await;
    assert_eq!(body["is_available"], false);

    // Explicit flag wins over the derived value.
    let (_, body) = ctx
        .post_json(
            "/products",
            &json!({ "name": "Hidden", "stock": 5, "is_available": false }),
        )
        .await;
    assert_eq!(body["is_available"], false);
}

#[tokio::test]
async fn test_patch_stock_rederives_availability() {
    let ctx = TestContext::new().await;
    let id = ctx.create_product("Desk Lamp", 5).await;

    let (status, body) = ctx
        .patch_json(&format!("/products/{id}"), &json!({ "stock": 0 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stock"], 0);
    assert_eq!(body["is_available"], false);

    let (status, body) = ctx
        .patch_json(&format!("/products/{id}"), &json!({ "stock": 3 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_available"], true);
}

#[tokio::test]
async fn test_invalid_product_input_is_rejected() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx
        .post_json("/products", &json!({ "name": "   ", "stock": 5 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx
        .post_json("/products", &json!({ "name": "Lamp", "stock": -1 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

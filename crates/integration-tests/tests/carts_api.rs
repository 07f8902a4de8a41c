//! Integration tests for the cart endpoints and checkout.

use minimart_integration_tests::TestContext;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_checkout_decrements_stock_and_records_line() {
    let ctx = TestContext::new().await;
    let user_id = ctx.create_user("alice").await;
    let product_id = ctx.create_product("Desk Lamp", 10).await;

    let (status, line) = ctx
        .post_json(
            &format!("/carts/{user_id}"),
            &json!({ "product_id": product_id, "quantity": 3 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(line["quantity"], 3);
    assert_eq!(line["product_name"], "Desk Lamp");

    let (_, product) = ctx.get_json(&format!("/products/{product_id}")).await;
    assert_eq!(product["stock"], 7);

    let (status, lines) = ctx.get_json(&format!("/carts/{user_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lines.as_array().expect("array").len(), 1);
}

#[tokio::test]
async fn test_repeat_checkout_accumulates_one_line() {
    let ctx = TestContext::new().await;
    let user_id = ctx.create_user("alice").await;
    let product_id = ctx.create_product("Desk Lamp", 10).await;

    for quantity in [2, 3] {
        let (status, _) = ctx
            .post_json(
                &format!("/carts/{user_id}"),
                &json!({ "product_id": product_id, "quantity": quantity }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, lines) = ctx.get_json(&format!("/carts/{user_id}")).await;
    let lines = lines.as_array().expect("array");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"], 5);
}

#[tokio::test]
async fn test_checkout_via_put() {
    let ctx = TestContext::new().await;
    let user_id = ctx.create_user("alice").await;
    let product_id = ctx.create_product("Desk Lamp", 4).await;

    let (status, line) = ctx
        .put_json(
            &format!("/carts/{user_id}"),
            &json!({ "product_id": product_id, "quantity": 2 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(line["user_id"].as_i64(), Some(user_id));
    assert_eq!(line["quantity"], 2);
}

#[tokio::test]
async fn test_insufficient_stock_rejected_without_changes() {
    let ctx = TestContext::new().await;
    let user_id = ctx.create_user("alice").await;
    let product_id = ctx.create_product("Desk Lamp", 3).await;

    let (status, body) = ctx
        .post_json(
            &format!("/carts/{user_id}"),
            &json!({ "product_id": product_id, "quantity": 4 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (_, product) = ctx.get_json(&format!("/products/{product_id}")).await;
    assert_eq!(product["stock"], 3);
    let (_, lines) = ctx.get_json(&format!("/carts/{user_id}")).await;
    assert!(lines.as_array().expect("array").is_empty());
}

#[tokio::test]
async fn test_exhausting_stock_flips_availability() {
    let ctx = TestContext::new().await;
    let user_id = ctx.create_user("alice").await;
    let product_id = ctx.create_product("Desk Lamp", 2).await;

    let (status, _) = ctx
        .post_json(
            &format!("/carts/{user_id}"),
            &json!({ "product_id": product_id, "quantity": 2 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, product) = ctx.get_json(&format!("/products/{product_id}")).await;
    assert_eq!(product["stock"], 0);
    assert_eq!(product["is_available"], false);

    // The next attempt fails on the availability flag.
    let (status, _) = ctx
        .post_json(
            &format!("/carts/{user_id}"),
            &json!({ "product_id": product_id, "quantity": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_checkout_error_statuses() {
    let ctx = TestContext::new().await;
    let user_id = ctx.create_user("alice").await;
    let product_id = ctx.create_product("Desk Lamp", 5).await;

    // Unknown user and unknown product are 404s.
    let (status, _) = ctx
        .post_json(
            "/carts/999",
            &json!({ "product_id": product_id, "quantity": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .post_json(
            &format!("/carts/{user_id}"),
            &json!({ "product_id": 999, "quantity": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Non-positive quantity is a 400.
    let (status, _) = ctx
        .post_json(
            &format!("/carts/{user_id}"),
            &json!({ "product_id": product_id, "quantity": 0 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cart_listing_and_clearing() {
    let ctx = TestContext::new().await;
    let user_id = ctx.create_user("alice").await;
    let chair = ctx.create_product("Chair", 5).await;
    let table = ctx.create_product("Table", 5).await;

    // Empty cart lists as an empty array, not a 404.
    let (status, lines) = ctx.get_json(&format!("/carts/{user_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(lines.as_array().expect("array").is_empty());

    // Unknown user is a 404.
    let (status, _) = ctx.get_json("/carts/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    for product_id in [chair, table] {
        ctx.post_json(
            &format!("/carts/{user_id}"),
            &json!({ "product_id": product_id, "quantity": 1 }),
        )
        .await;
    }

    let (_, lines) = ctx.get_json(&format!("/carts/{user_id}")).await;
    assert_eq!(lines.as_array().expect("array").len(), 2);

    // Clearing removes everything and is idempotent.
    assert_eq!(
        ctx.delete(&format!("/carts/{user_id}")).await,
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        ctx.delete(&format!("/carts/{user_id}")).await,
        StatusCode::NO_CONTENT
    );
    let (_, lines) = ctx.get_json(&format!("/carts/{user_id}")).await;
    assert!(lines.as_array().expect("array").is_empty());
}

#[tokio::test]
async fn test_delete_single_cart_line() {
    let ctx = TestContext::new().await;
    let user_id = ctx.create_user("alice").await;
    let product_id = ctx.create_product("Chair", 5).await;

    let (_, line) = ctx
        .post_json(
            &format!("/carts/{user_id}"),
            &json!({ "product_id": product_id, "quantity": 1 }),
        )
        .await;
    let line_id = line["id"].as_i64().expect("line id");

    assert_eq!(
        ctx.delete(&format!("/carts/lines/{line_id}")).await,
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        ctx.delete(&format!("/carts/lines/{line_id}")).await,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_deleting_user_cascades_only_their_cart_lines() {
    let ctx = TestContext::new().await;
    let alice = ctx.create_user("alice").await;
    let bob = ctx.create_user("bob").await;
    let product_id = ctx.create_product("Chair", 5).await;

    for user_id in [alice, bob] {
        ctx.post_json(
            &format!("/carts/{user_id}"),
            &json!({ "product_id": product_id, "quantity": 1 }),
        )
        .await;
    }

    assert_eq!(
        ctx.delete(&format!("/users/{alice}")).await,
        StatusCode::NO_CONTENT
    );
    // Alice's cart is gone with her.
    let (status, _) = ctx.get_json(&format!("/carts/{alice}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Bob's cart is untouched.
    let (status, lines) = ctx.get_json(&format!("/carts/{bob}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lines.as_array().expect("array").len(), 1);
}

use std::time::Duration;

use fruitsupply_api::app::{build_app, App};
use fruitsupply_infra::bootstrap::Background;
use fruitsupply_infra::config::AppConfig;
use reqwest::StatusCode;
use serde_json::{json, Value};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
    _background: Option<Background>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory backends, ephemeral port.
        let config = AppConfig::from_lookup(|_| None).expect("default config");
        let App { router, background } = build_app(&config).await.expect("failed to build app");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url,
            handle,
            _background: background,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn apple() -> Value {
    json!({
        "name": "Apple",
        "region": "Himachal",
        "season": "Autumn",
        "shelf_life_days": 30,
        "price": 120.0,
        "ripe": true
    })
}

fn inventory_item(quantity: u64) -> Value {
    json!({
        "fruit": apple(),
        "quantity": quantity,
        "last_updated": "2026-01-01T08:00:00Z"
    })
}

async fn add_inventory(client: &reqwest::Client, srv: &TestServer, quantity: u64) -> String {
    let res = client
        .post(srv.url("/add_inventory"))
        .json(&inventory_item(quantity))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Inventory item added successfully");
    body["inventory_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn welcome_page_and_health() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().contains("Welcome to the Fruit Supply Project!"));

    let res = client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn fruit_lifecycle() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.post(srv.url("/add_fruit")).json(&apple()).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let added: Value = res.json().await.unwrap();
    assert_eq!(added["message"], "Fruit added successfully");
    let fruit_id = added["fruit_id"].as_str().unwrap().to_string();

    let res = client.get(srv.url("/get_fruit/Apple")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let mut fetched: Value = res.json().await.unwrap();
    assert_eq!(fetched["_id"], fruit_id.as_str());
    fetched.as_object_mut().unwrap().remove("_id");
    assert_eq!(fetched, apple());

    let res = client
        .put(srv.url("/update_fruit_price/Apple"))
        .json(&json!({ "price": 99.5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Fruit price updated successfully");

    let fetched: Value = client
        .get(srv.url("/get_fruit/Apple"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["price"], 99.5);

    let res = client.delete(srv.url("/delete_fruit/Apple")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(srv.url("/get_fruit/Apple")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn duplicate_fruit_name_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.post(srv.url("/add_fruit")).json(&apple()).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let mut again = apple();
    again["price"] = json!(1.0);
    let res = client.post(srv.url("/add_fruit")).json(&again).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("duplicate"));

    // The original record is untouched.
    let fetched: Value = client
        .get(srv.url("/get_fruit/Apple"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["price"], 120.0);
}

#[tokio::test]
async fn price_update_on_missing_fruit_creates_nothing() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .put(srv.url("/update_fruit_price/Mango"))
        .json(&json!({ "price": 45.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.get(srv.url("/get_fruit/Mango")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn order_lifecycle_and_unknown_ids() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let order = json!({
        "fruit_name": "Apple",
        "quantity": 12,
        "delivery_address": "14 Market Road, Pune",
        "total_price": 1440.0,
        "delivery_type": "express"
    });
    let res = client.post(srv.url("/place_order")).json(&order).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let placed: Value = res.json().await.unwrap();
    assert_eq!(placed["message"], "Order placed successfully");
    let id = placed["order_id"].as_str().unwrap().to_string();

    let mut updated = order.clone();
    updated["delivery_type"] = json!("standard");
    updated["comments"] = json!("leave at the gate");
    let res = client
        .put(srv.url(&format!("/update_order/{id}")))
        .json(&updated)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let fetched: Value = client
        .get(srv.url(&format!("/get_order/{id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["delivery_type"], "standard");
    assert_eq!(fetched["comments"], "leave at the gate");

    let res = client.delete(srv.url(&format!("/delete_order/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Well-formed but never issued.
    let res = client
        .delete(srv.url("/delete_order/0190a5d2-7c4e-7b1a-9f3e-123456789abc"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.get(srv.url("/get_order/not-an-id")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("invalid identifier"));
}

#[tokio::test]
async fn malformed_payload_gets_uniform_error_body() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/add_fruit"))
        .json(&json!({ "name": "Apple", "price": "cheap" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn quantity_update_reads_back() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let id = add_inventory(&client, &srv, 50).await;

    let res = client
        .put(srv.url(&format!("/update_inventory_quantity/{id}")))
        .json(&json!({ "quantity": 7 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let fetched: Value = client
        .get(srv.url(&format!("/get_inventory/{id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["quantity"], 7);
    assert_eq!(fetched["last_updated"], "2026-01-01T08:00:00Z");
    assert_eq!(fetched["fruit"]["name"], "Apple");

    let res = client.delete(srv.url(&format!("/delete_inventory/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let res = client.get(srv.url(&format!("/get_inventory/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn full_inventory_update_replaces_record() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let id = add_inventory(&client, &srv, 50).await;

    let replacement = json!({
        "fruit": {
            "name": "Lychee",
            "region": "Muzaffarpur",
            "season": "Summer",
            "shelf_life_days": 3,
            "price": 240.0,
            "ripe": false
        },
        "quantity": 42,
        "last_updated": "2026-06-15T18:30:00Z"
    });
    let res = client
        .put(srv.url(&format!("/update_inventory/{id}")))
        .json(&replacement)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Inventory item updated successfully");

    let mut fetched: Value = client
        .get(srv.url(&format!("/get_inventory/{id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["_id"], id.as_str());
    fetched.as_object_mut().unwrap().remove("_id");
    assert_eq!(fetched, replacement);

    // Well-formed but never issued.
    let res = client
        .put(srv.url("/update_inventory/0190a5d2-7c4e-7b1a-9f3e-123456789abc"))
        .json(&replacement)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("not found"));

    let res = client
        .put(srv.url("/update_inventory/not-an-id"))
        .json(&replacement)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("invalid identifier"));
}

#[tokio::test]
async fn reset_trigger_eventually_sets_quantity() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let id = add_inventory(&client, &srv, 3).await;

    let res = client
        .post(srv.url(&format!("/reset_inventory/{id}")))
        .json(&json!({ "quantity": 100 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let queued: Value = res.json().await.unwrap();
    assert_eq!(queued["message"], "Inventory reset task queued");
    let task_id = queued["task_id"].as_str().unwrap().to_string();

    // The worker runs out of band; poll until the task is done.
    let mut status = Value::Null;
    for _ in 0..100 {
        status = client
            .get(srv.url(&format!("/task_status/{task_id}")))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        if status["state"] == "success" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(status["state"], "success", "task did not finish: {status}");
    assert_eq!(status["result"], "Reset inventory data");

    let fetched: Value = client
        .get(srv.url(&format!("/get_inventory/{id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["quantity"], 100);
}

#[tokio::test]
async fn unknown_task_reads_as_pending() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(srv.url("/task_status/0190a5d2-7c4e-7b1a-9f3e-123456789abc"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["state"], "pending");

    let res = client.get(srv.url("/task_status/nope")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[allow(dead_code)]
mod common;

use common::{TestServer, game_body};
use serde_json::Value;

fn names(body: &Value) -> Vec<String> {
    body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap().to_owned())
        .collect()
}

#[tokio::test]
async fn crud_lifecycle() {
    let server = TestServer::seeded().await;

    let resp = server.create(&game_body("Test", "Test", 9.99)).await;
    assert_eq!(resp.status(), 201);
    let location = resp.headers()["location"].to_str().unwrap().to_owned();
    let created: Value = resp.json().await.unwrap();
    let id = created["id"].to_string();
    assert_eq!(location, format!("/games/{id}"));
    assert_eq!(created["createdAt"], created["updatedAt"]);

    let (status, fetched) = server.get_json(&location).await;
    assert_eq!(status, 200);
    assert_eq!(fetched["name"], "Test");
    assert_eq!(fetched["genre"], "Test");
    assert_eq!(fetched["price"], 9.99);
    assert_eq!(fetched["releaseDate"], "2020-01-01");

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let resp = server
        .client
        .put(server.url(&location))
        .json(&game_body("Test", "Test", 19.99))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let (status, updated) = server.get_json(&location).await;
    assert_eq!(status, 200);
    assert_eq!(updated["price"], 19.99);
    assert_eq!(updated["createdAt"], created["createdAt"]);
    assert_ne!(updated["updatedAt"], created["updatedAt"]);

    let resp = server
        .client
        .delete(server.url(&location))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let (status, body) = server.get_json(&location).await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], format!("game with id {id} not found"));
}

#[tokio::test]
async fn second_delete_is_not_found() {
    let server = TestServer::seeded().await;
    let first = server.client.delete(server.url("/games/2")).send().await.unwrap();
    let second = server.client.delete(server.url("/games/2")).send().await.unwrap();

    assert_eq!(first.status(), 204);
    assert_eq!(second.status(), 404);
}

#[tokio::test]
async fn malformed_ids_are_not_found() {
    let server = TestServer::seeded().await;
    let (status, body) = server.get_json("/games/not-an-id").await;
    assert_eq!(status, 404);
    assert!(body["message"].as_str().unwrap().contains("not-an-id"));

    let resp = server
        .client
        .put(server.url("/games/not-an-id"))
        .json(&game_body("Test", "Test", 1.0))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn validation_errors_enumerate_fields() {
    let server = TestServer::seeded().await;

    let resp = server
        .create(&serde_json::json!({"name": "", "genre": "Test", "price": 1000.0}))
        .await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "validation failed");
    let errors = body["errors"].as_object().unwrap();
    assert!(errors.contains_key("name"));
    assert!(errors.contains_key("price"));
    assert!(errors.contains_key("releaseDate"));
    assert!(!errors.contains_key("genre"));

    let (_, page) = server.get_json("/games").await;
    assert_eq!(page["totalCount"], 5);
}

#[tokio::test]
async fn price_boundaries() {
    let server = TestServer::empty().await;

    for price in [0.01, 999.99] {
        let resp = server.create(&game_body("Edge", "Test", price)).await;
        assert_eq!(resp.status(), 201, "price {price} should be accepted");
    }
    for price in [0.0, 1000.0] {
        let resp = server.create(&game_body("Edge", "Test", price)).await;
        assert_eq!(resp.status(), 400, "price {price} should be rejected");
    }
}

#[tokio::test]
async fn sub_cent_prices_are_rejected() {
    let server = TestServer::empty().await;

    let resp = server.create(&game_body("Edge", "Test", 9.999)).await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["errors"]["price"][0],
        "Price must have at most two decimal places"
    );

    let (_, page) = server.get_json("/games").await;
    assert_eq!(page["totalCount"], 0);
}

#[tokio::test]
async fn update_validates_before_lookup() {
    let server = TestServer::seeded().await;
    let resp = server
        .client
        .put(server.url("/games/999"))
        .json(&game_body("", "Test", 10.0))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let server = TestServer::seeded().await;
    let resp = server
        .client
        .post(server.url("/games"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn genre_filter_ignores_case() {
    let server = TestServer::seeded().await;
    for genre in ["football", "FOOTBALL", "Football"] {
        let (status, body) = server.get_json(&format!("/games?genre={genre}")).await;
        assert_eq!(status, 200);
        assert_eq!(names(&body), ["E-Football", "FIFA 23"]);
        assert_eq!(body["totalCount"], 2);
    }
}

#[tokio::test]
async fn price_range_filter_is_inclusive() {
    let server = TestServer::seeded().await;
    let (_, body) = server.get_json("/games?minPrice=49.99&maxPrice=59.99").await;
    assert_eq!(
        names(&body),
        ["FIFA 23", "Call of Duty: Modern Warfare", "Assassin's Creed Valhalla"]
    );
}

#[tokio::test]
async fn sort_by_price_descending() {
    let server = TestServer::seeded().await;
    let (_, body) = server
        .get_json("/games?sortBy=price&descending=true")
        .await;

    let prices: Vec<f64> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["price"].as_f64().unwrap())
        .collect();
    assert!(prices.windows(2).all(|pair| pair[0] >= pair[1]));
    // Equal prices keep creation order.
    assert_eq!(names(&body)[1..3], ["FIFA 23", "Assassin's Creed Valhalla"]);
}

#[tokio::test]
async fn pagination_covers_all_records() {
    let server = TestServer::seeded().await;
    let mut total = 0;
    for page in 1..=3 {
        let (_, body) = server
            .get_json(&format!("/games?page={page}&pageSize=2&sortBy=name"))
            .await;
        assert_eq!(body["totalPages"], 3);
        assert_eq!(body["totalCount"], 5);
        assert_eq!(body["page"], page);
        total += body["items"].as_array().unwrap().len();
    }
    assert_eq!(total, 5);

    let (_, beyond) = server.get_json("/games?page=4&pageSize=2").await;
    assert!(beyond["items"].as_array().unwrap().is_empty());
    assert_eq!(beyond["totalCount"], 5);
}

#[tokio::test]
async fn out_of_range_paging_is_coerced() {
    let server = TestServer::seeded().await;
    let (_, body) = server.get_json("/games?page=-2&pageSize=500").await;
    assert_eq!(body["page"], 1);
    assert_eq!(body["pageSize"], 100);
    assert_eq!(body["items"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn astronomically_distant_page_is_empty() {
    let server = TestServer::seeded().await;
    let (status, body) = server
        .get_json("/games?page=100000000000000000&pageSize=100")
        .await;
    assert_eq!(status, 200);
    assert!(body["items"].as_array().unwrap().is_empty());
    assert_eq!(body["totalCount"], 5);
}

#[tokio::test]
async fn non_numeric_price_filter_is_a_bad_request() {
    let server = TestServer::seeded().await;
    let resp = server
        .client
        .get(server.url("/games?minPrice=cheap"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn health_reports_ok() {
    let server = TestServer::empty().await;
    let (status, body) = server.get_json("/health").await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
}

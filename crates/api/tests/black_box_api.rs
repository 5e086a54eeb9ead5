use reqwest::StatusCode;
use serde_json::{Value, json};

use eoi_api::app::{router_with, services::AppServices};

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod over in-memory stores, bound to an ephemeral port.
        let app = router_with(AppServices::in_memory());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self.client.post(self.url(path)).json(&body).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let res = self.client.get(self.url(path)).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }

    async fn seed(&self) -> Value {
        let res = self.client.post(self.url("/products")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        res.json().await.unwrap()
    }

    async fn graphql(&self, query: &str, variables: Value) -> Value {
        let (status, body) = self
            .post("/graphql", json!({ "query": query, "variables": variables }))
            .await;
        assert_eq!(status, StatusCode::OK);
        body
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn john(interests: Value) -> Value {
    json!({
        "name": "John Doe",
        "email": "john@example.com",
        "mobile": "1234567890",
        "postcode": "12345",
        "interests": interests,
    })
}

fn names(items: &Value) -> Vec<String> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn health_is_ok() {
    let server = TestServer::spawn().await;
    let res = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn seeding_twice_conflicts() {
    let server = TestServer::spawn().await;

    let created = server.seed().await;
    assert_eq!(names(&created["items"]), vec!["Delivery", "Pick-up", "Payment"]);

    let res = server.client.post(server.url("/products")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "constraint_violation");

    // The failed batch added nothing.
    let (_, list) = server.get("/products").await;
    assert_eq!(list["items"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn register_returns_contact_fields_and_persists_interests() {
    let server = TestServer::spawn().await;
    server.seed().await;

    let (status, body) = server.post("/register", john(json!(["Payment"]))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "John Doe");
    assert_eq!(body["email"], "john@example.com");
    assert_eq!(body["mobile"], "1234567890");
    assert_eq!(body["postcode"], "12345");
    assert!(body.get("interests").is_none());

    let id = body["id"].as_i64().unwrap();
    let (status, user) = server.get(&format!("/users/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&user["interests"]), vec!["Payment"]);
}

#[tokio::test]
async fn unknown_interest_is_404_and_writes_nothing() {
    let server = TestServer::spawn().await;
    server.seed().await;

    let (status, body) = server
        .post("/register", john(json!(["Delivery", "Nonexistent"])))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert!(body["message"].as_str().unwrap().contains("Nonexistent"));

    let (_, users) = server.get("/users").await;
    assert_eq!(users["items"], json!([]));

    let (_, delivery) = server.get("/products/1").await;
    assert_eq!(delivery["interested_users"], json!([]));
}

#[tokio::test]
async fn register_without_interests() {
    let server = TestServer::spawn().await;

    let mut body = john(json!([]));
    body.as_object_mut().unwrap().remove("interests");

    let (status, created) = server.post("/register", body).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, user) = server
        .get(&format!("/users/{}", created["id"].as_i64().unwrap()))
        .await;
    assert_eq!(user["interests"], json!([]));
}

#[tokio::test]
async fn interests_reload_in_request_order() {
    let server = TestServer::spawn().await;
    server.seed().await;

    let (status, created) = server
        .post("/register", john(json!(["Payment", "Delivery", "Pick-up"])))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, user) = server
        .get(&format!("/users/{}", created["id"].as_i64().unwrap()))
        .await;
    assert_eq!(names(&user["interests"]), vec!["Payment", "Delivery", "Pick-up"]);
}

#[tokio::test]
async fn product_lists_interested_users() {
    let server = TestServer::spawn().await;
    let seeded = server.seed().await;
    let pickup_id = seeded["items"][1]["id"].as_i64().unwrap();

    server.post("/register", john(json!(["Pick-up"]))).await;
    let mut jane = john(json!(["Delivery"]));
    jane["email"] = json!("jane@example.com");
    server.post("/register", jane).await;

    let (status, product) = server.get(&format!("/products/{pickup_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(product["name"], "Pick-up");
    let users = product["interested_users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], "john@example.com");
}

#[tokio::test]
async fn invalid_register_bodies_use_the_error_shape() {
    let server = TestServer::spawn().await;

    let (status, body) = server
        .post("/register", json!({ "name": "John Doe", "email": "john@example.com" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "invalid_body");
    assert!(body["message"].as_str().unwrap().contains("mobile"));

    let res = server
        .client
        .post(server.url("/register"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_body");

    let (_, users) = server.get("/users").await;
    assert_eq!(users["items"], json!([]));
}

#[tokio::test]
async fn bad_and_missing_ids() {
    let server = TestServer::spawn().await;

    let (status, body) = server.get("/users/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_id");

    let (status, body) = server.get("/products/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn graphql_register_and_read_back() {
    let server = TestServer::spawn().await;
    server.seed().await;

    let body = server
        .graphql(
            r#"mutation Register($input: RegisterInput!) {
                register(input: $input) { id name email mobile postcode }
            }"#,
            json!({ "input": john(json!(["Delivery", "Payment"])) }),
        )
        .await;
    assert!(body.get("errors").is_none(), "{body}");
    let id = body["data"]["register"]["id"].as_i64().unwrap();

    let body = server
        .graphql(
            "query User($id: Int!) { user(id: $id) { email interests { name } } }",
            json!({ "id": id }),
        )
        .await;
    assert_eq!(body["data"]["user"]["email"], "john@example.com");
    assert_eq!(
        names(&body["data"]["user"]["interests"]),
        vec!["Delivery", "Payment"]
    );
}

#[tokio::test]
async fn graphql_unknown_interest_reports_code() {
    let server = TestServer::spawn().await;
    server.seed().await;

    let body = server
        .graphql(
            r#"mutation Register($input: RegisterInput!) {
                register(input: $input) { id }
            }"#,
            json!({ "input": john(json!(["Nonexistent"])) }),
        )
        .await;
    assert_eq!(body["errors"][0]["extensions"]["code"], "not_found");

    let (_, users) = server.get("/users").await;
    assert_eq!(users["items"], json!([]));
}

#[tokio::test]
async fn graphiql_is_served() {
    let server = TestServer::spawn().await;
    let res = server.client.get(server.url("/graphql")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let html = res.text().await.unwrap();
    assert!(html.contains("graphiql"));
}

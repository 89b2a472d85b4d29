use std::path::PathBuf;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{Value, json};

use shopfront_api::config::AppConfig;
use shopfront_auth::{AccessRules, JwtClaims, PrincipalId};

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    db_path: PathBuf,
    images_dir: PathBuf,
    handle: tokio::task::JoinHandle<()>,
    _dir: tempfile::TempDir,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with_rules(AccessRules::default()).await
    }

    async fn spawn_with_rules(access_rules: AccessRules) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let config = AppConfig {
            port: 0,
            db_path: dir.path().join("db.json"),
            static_dir: dir.path().join("public"),
            images_dir: dir.path().join("public").join("images"),
            max_body_bytes: AppConfig::DEFAULT_MAX_BODY_BYTES,
            jwt_secret: JWT_SECRET.to_string(),
            access_rules,
        };

        // Same router as prod, bound to an ephemeral port.
        let app = shopfront_api::app::build_app(&config).expect("failed to build app");
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
            db_path: config.db_path,
            images_dir: config.images_dir,
            handle,
            _dir: dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn stored(&self) -> Value {
        serde_json::from_slice(&std::fs::read(&self.db_path).unwrap()).unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(user_id: u64) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: PrincipalId::from(user_id),
        email: Some(format!("user{user_id}@example.com")),
        iat: now.timestamp(),
        exp: (now + ChronoDuration::minutes(10)).timestamp(),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn valid_product() -> Value {
    json!({
        "name": "Air Zoom",
        "brand": "Nike",
        "category": "Shoes",
        "price": "50",
        "description": "Good shoes for running",
    })
}

fn product_form(image: Vec<u8>) -> reqwest::multipart::Form {
    reqwest::multipart::Form::new()
        .text("name", "Air Zoom")
        .text("brand", "Nike")
        .text("category", "Shoes")
        .text("price", "79.99")
        .text("description", "Good shoes for running")
        .part(
            "image",
            reqwest::multipart::Part::bytes(image).file_name("shoe.png"),
        )
}

fn valid_order(user_id: u64) -> Value {
    json!({
        "userId": user_id,
        "items": [
            { "price": 10, "quantity": 2 },
            { "price": 5, "quantity": 1 },
        ],
        "total": 25.0,
        "shippingDetails": {
            "firstName": "Ada",
            "lastName": "Lovelace",
            "address": "12 Analytical St",
            "phone": "555-0100",
        },
    })
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn products_are_publicly_readable_but_not_writable() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/products")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap(), json!([]));

    let res = client
        .post(srv.url("/products"))
        .json(&valid_product())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn product_validation_runs_before_authentication() {
    let srv = TestServer::spawn().await;

    let mut body = valid_product();
    body["name"] = json!("A");
    let res = reqwest::Client::new()
        .post(srv.url("/products"))
        .json(&body)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({ "name": "The name length should be at least 2 characters" })
    );
}

#[tokio::test]
async fn product_violations_are_reported_together() {
    let srv = TestServer::spawn().await;
    let res = reqwest::Client::new()
        .post(srv.url("/products"))
        .bearer_auth(mint_jwt(1))
        .json(&json!({
            "name": "A",
            "brand": "Nike",
            "category": "S",
            "price": "free",
            "description": "short",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    let keys: Vec<&str> = body.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys.len(), 4);
    for key in ["name", "category", "price", "description"] {
        assert!(keys.contains(&key), "missing {key} in {body}");
    }
    assert_eq!(body["price"], "The price is not valid");
}

#[tokio::test]
async fn product_creation_stamps_and_stores() {
    let srv = TestServer::spawn().await;
    let res = reqwest::Client::new()
        .post(srv.url("/products"))
        .bearer_auth(mint_jwt(1))
        .json(&valid_product())
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["id"], 1);
    assert_eq!(created["price"], 50.0);
    assert!(created["createdAt"].as_str().unwrap().ends_with('Z'));

    assert_eq!(srv.stored()["products"][0]["name"], "Air Zoom");
}

#[tokio::test]
async fn multipart_product_upload_stores_image() {
    let srv = TestServer::spawn().await;

    let res = reqwest::Client::new()
        .post(srv.url("/products"))
        .bearer_auth(mint_jwt(1))
        .multipart(product_form(b"fake-png".to_vec()))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["price"], 79.99);

    let filename = created["imageFilename"].as_str().unwrap();
    let (millis, original) = filename.split_once('_').unwrap();
    assert!(millis.parse::<i64>().is_ok());
    assert_eq!(original, "shoe.png");
    assert_eq!(std::fs::read(srv.images_dir.join(filename)).unwrap(), b"fake-png");
}

#[tokio::test]
async fn uploaded_images_are_served_from_the_static_root() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/products"))
        .bearer_auth(mint_jwt(1))
        .multipart(product_form(b"fake-png".to_vec()))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    let filename = created["imageFilename"].as_str().unwrap();

    let res = client
        .get(srv.url(&format!("/images/{filename}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.bytes().await.unwrap().as_ref(), b"fake-png");

    let res = client
        .get(srv.url("/images/missing.png"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_allow_cross_origin_and_disable_caching() {
    let srv = TestServer::spawn().await;

    let res = reqwest::Client::new()
        .get(srv.url("/products"))
        .header("Origin", "http://shop.example.com")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let headers = res.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["cache-control"], "no-cache");
    assert_eq!(headers["pragma"], "no-cache");
    assert_eq!(headers["expires"], "-1");
}

#[tokio::test]
async fn uploads_larger_than_two_mebibytes_are_accepted() {
    let srv = TestServer::spawn().await;
    let photo = vec![0x89u8; 3 * 1024 * 1024];

    let res = reqwest::Client::new()
        .post(srv.url("/products"))
        .bearer_auth(mint_jwt(1))
        .multipart(product_form(photo.clone()))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    let filename = created["imageFilename"].as_str().unwrap();
    assert_eq!(std::fs::read(srv.images_dir.join(filename)).unwrap(), photo);
}

#[tokio::test]
async fn order_rejections_use_error_messages() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = mint_jwt(1);

    let cases = [
        (json!({ "items": [], "total": 0 }), "Missing required fields"),
        (
            {
                let mut o = valid_order(1);
                o["shippingDetails"]["phone"] = json!("");
                o
            },
            "Missing shipping details",
        ),
        (
            {
                let mut o = valid_order(1);
                o["items"] = json!([]);
                o
            },
            "Order must contain at least one item",
        ),
        (
            {
                let mut o = valid_order(1);
                o["total"] = json!(25.02);
                o
            },
            "Order total doesn't match items total",
        ),
    ];

    for (body, message) in cases {
        let res = client
            .post(srv.url("/orders"))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(res.json::<Value>().await.unwrap(), json!({ "error": message }));
    }
}

#[tokio::test]
async fn valid_orders_are_stamped_pending() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let mut order = valid_order(1);
    order["total"] = json!(25.009);
    let res = client
        .post(srv.url("/orders"))
        .bearer_auth(mint_jwt(1))
        .json(&order)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["status"], "pending");
    assert!(created["createdAt"].is_string());

    assert_eq!(srv.stored()["orders"][0]["status"], "pending");
}

#[tokio::test]
async fn orders_require_a_token_to_read() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/orders")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(srv.url("/orders"))
        .bearer_auth(mint_jwt(1))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn forged_tokens_are_rejected() {
    let srv = TestServer::spawn().await;
    let res = reqwest::Client::new()
        .get(srv.url("/products"))
        .bearer_auth("not.a.jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn whoami_reflects_the_token() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/whoami")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(srv.url("/whoami"))
        .bearer_auth(mint_jwt(9))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["id"], "9");
    assert_eq!(body["email"], "user9@example.com");
}

#[tokio::test]
async fn owner_only_rules_isolate_users() {
    let rules: AccessRules = "orders:600,products:664".parse().unwrap();
    let srv = TestServer::spawn_with_rules(rules).await;
    let client = reqwest::Client::new();
    let alice = mint_jwt(1);
    let bob = mint_jwt(2);

    // Creating an order for someone else is refused.
    let res = client
        .post(srv.url("/orders"))
        .bearer_auth(&bob)
        .json(&valid_order(1))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .post(srv.url("/orders"))
        .bearer_auth(&alice)
        .json(&valid_order(1))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let id = res.json::<Value>().await.unwrap()["id"].to_string();

    let res = client
        .get(srv.url(&format!("/orders/{id}")))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .get(srv.url("/orders"))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(res.json::<Value>().await.unwrap(), json!([]));

    let res = client
        .delete(srv.url(&format!("/orders/{id}")))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .get(srv.url(&format!("/orders/{id}")))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn owner_only_replacements_keep_the_owner() {
    let rules: AccessRules = "orders:600".parse().unwrap();
    let srv = TestServer::spawn_with_rules(rules).await;
    let client = reqwest::Client::new();
    let alice = mint_jwt(1);

    let res = client
        .post(srv.url("/orders"))
        .bearer_auth(&alice)
        .json(&valid_order(1))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .put(srv.url("/orders/1"))
        .bearer_auth(&alice)
        .json(&json!({ "status": "cancelled" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({ "id": 1, "status": "cancelled", "userId": 1 })
    );

    let res = client
        .get(srv.url("/orders/1"))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(srv.url("/orders"))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(res.json::<Value>().await.unwrap().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn records_can_be_updated_filtered_and_deleted() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = mint_jwt(1);

    for _ in 0..2 {
        let res = client
            .post(srv.url("/orders"))
            .bearer_auth(&token)
            .json(&valid_order(1))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = client
        .patch(srv.url("/orders/2"))
        .bearer_auth(&token)
        .json(&json!({ "status": "shipped" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let patched: Value = res.json().await.unwrap();
    assert_eq!(patched["status"], "shipped");
    assert_eq!(patched["total"], 25.0);

    let res = client
        .get(srv.url("/orders?status=shipped"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let shipped: Value = res.json().await.unwrap();
    assert_eq!(shipped.as_array().unwrap().len(), 1);
    assert_eq!(shipped[0]["id"], 2);

    let res = client
        .put(srv.url("/orders/1"))
        .bearer_auth(&token)
        .json(&json!({ "userId": 1, "status": "cancelled" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({ "id": 1, "userId": 1, "status": "cancelled" })
    );

    let res = client
        .delete(srv.url("/orders/1"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(srv.url("/orders/1"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

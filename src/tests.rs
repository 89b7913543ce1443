//! Integration tests for the StaffNet backend.

use std::sync::Arc;

use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::auth::SESSION_HEADER;
use crate::config::Config;
use crate::db::{init_database, Repository};
use crate::events::EventBus;
use crate::service::{Dashboard, SEED_ADMIN_EMAIL, SEED_ADMIN_PASSWORD};
use crate::{create_router, AppState};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    admin_id: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_seed(true).await
    }

    async fn with_seed(allow_seed: bool) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        // Initialize database
        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let dashboard = Arc::new(Dashboard::new(
            Arc::new(Repository::new(pool)),
            EventBus::new(64),
        ));
        dashboard.seed().await.expect("Failed to seed");

        // Create config
        let config = Config {
            db_path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            log_json: false,
            allow_seed,
            seed_on_start: false,
            event_capacity: 64,
        };

        let state = AppState {
            dashboard,
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let client = Client::new();
        let login: Value = client
            .post(format!("{}/api/login", base_url))
            .json(&json!({ "email": SEED_ADMIN_EMAIL, "password": SEED_ADMIN_PASSWORD }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let admin_id = login["data"]["id"].as_str().unwrap().to_string();

        TestFixture {
            client,
            base_url,
            admin_id,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get_as(&self, user_id: &str, path: &str) -> RequestBuilder {
        self.client.get(self.url(path)).header(SESSION_HEADER, user_id)
    }

    fn post_as(&self, user_id: &str, path: &str) -> RequestBuilder {
        self.client.post(self.url(path)).header(SESSION_HEADER, user_id)
    }

    fn put_as(&self, user_id: &str, path: &str) -> RequestBuilder {
        self.client.put(self.url(path)).header(SESSION_HEADER, user_id)
    }

    /// Create a staff member as the admin and return their id.
    async fn add_staff(&self, name: &str, access_level: &str) -> String {
        let email = format!("{}@staffnet.com", name.to_lowercase().replace(' ', "."));
        let resp = self
            .post_as(&self.admin_id, "/api/staff")
            .json(&json!({
                "fullName": name,
                "email": email,
                "password": "secret",
                "accessLevel": access_level,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        body["data"]["id"].as_str().unwrap().to_string()
    }

    /// Create a task as the given user and return its id.
    async fn add_task(&self, creator: &str, title: &str, assignee: &str) -> String {
        let resp = self
            .post_as(creator, "/api/tasks")
            .json(&json!({
                "title": title,
                "priority": "High",
                "dueDate": "2024-12-01",
                "assignedTo": assignee,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        body["data"]["id"].as_str().unwrap().to_string()
    }
}

async fn json_body(resp: reqwest::Response) -> Value {
    resp.json().await.unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_login() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/login"))
        .json(&json!({ "email": "Admin@StaffNet.com", "password": SEED_ADMIN_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body = json_body(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["fullName"], "Admin User");
    assert_eq!(body["data"]["accessLevel"], "Admin");
    assert!(body["data"].get("password").is_none());

    let resp = fixture
        .client
        .post(fixture.url("/api/login"))
        .json(&json!({ "email": SEED_ADMIN_EMAIL, "password": "nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body = json_body(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    assert_eq!(body["error"]["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_missing_session_header() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/roles"))
        .json(&json!({ "name": "Intern" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body = json_body(resp).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    assert!(body["revisionId"].is_number());

    let resp = fixture
        .post_as("no-such-user", "/api/roles")
        .json(&json!({ "name": "Intern" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_staff_crud() {
    let fixture = TestFixture::new().await;
    let staff_id = fixture.add_staff("Sam Staff", "Staff").await;

    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/staff/{}", staff_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body = json_body(resp).await;
    assert_eq!(body["data"]["fullName"], "Sam Staff");
    assert_eq!(body["data"]["roleBadge"]["color"], "bg-blue-600");
    let revision_after_create = body["revisionId"].as_i64().unwrap();

    let resp = fixture
        .put_as(&fixture.admin_id, &format!("/api/staff/{}", staff_id))
        .json(&json!({ "accessLevel": "Manager", "role": "Manager", "jobTitle": "Lead" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body = json_body(resp).await;
    assert_eq!(body["data"]["accessLevel"], "Manager");
    assert_eq!(body["data"]["jobTitle"], "Lead");
    assert!(body["revisionId"].as_i64().unwrap() > revision_after_create);

    let resp = fixture.client.get(fixture.url("/api/staff")).send().await.unwrap();
    let body = json_body(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/staff/{}", staff_id)))
        .header(SESSION_HEADER, &fixture.admin_id)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/staff/{}", staff_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body = json_body(resp).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_staff_admin_only() {
    let fixture = TestFixture::new().await;
    let manager_id = fixture.add_staff("Mia Manager", "Manager").await;

    let resp = fixture
        .post_as(&manager_id, "/api/staff")
        .json(&json!({
            "fullName": "Sneaky Hire",
            "email": "sneaky@staffnet.com",
            "password": "pw",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    let body = json_body(resp).await;
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    let resp = fixture
        .get_as(&manager_id, "/api/audit-logs")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = fixture
        .get_as(&fixture.admin_id, "/api/audit-logs")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body = json_body(resp).await;
    assert_eq!(body["data"][0]["action"], "Added staff: Mia Manager");
}

#[tokio::test]
async fn test_roles() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .post_as(&fixture.admin_id, "/api/roles")
        .json(&json!({ "name": "Designer", "color": "bg-pink-500" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .post_as(&fixture.admin_id, "/api/roles")
        .json(&json!({ "name": "DESIGNER" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body = json_body(resp).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let resp = fixture.client.get(fixture.url("/api/roles")).send().await.unwrap();
    let body = json_body(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_task_review_flow() {
    let fixture = TestFixture::new().await;
    let manager = fixture.add_staff("Mia Manager", "Manager").await;
    let staff = fixture.add_staff("Sam Staff", "Staff").await;
    let task_id = fixture.add_task(&manager, "Fix bug", &staff).await;

    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/tasks/{}", task_id)))
        .send()
        .await
        .unwrap();
    let body = json_body(resp).await;
    assert_eq!(body["data"]["status"], "Todo");
    assert_eq!(body["data"]["proofStatus"], "none");
    assert_eq!(body["data"]["assignee"]["fullName"], "Sam Staff");

    // Someone other than the assignee cannot submit
    let resp = fixture
        .post_as(&manager, &format!("/api/tasks/{}/proof", task_id))
        .json(&json!({ "proofUrl": "http://x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = fixture
        .post_as(&staff, &format!("/api/tasks/{}/proof", task_id))
        .json(&json!({ "proofUrl": "http://x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body = json_body(resp).await;
    assert_eq!(body["data"]["status"], "Review");
    assert_eq!(body["data"]["proofStatus"], "pending");
    assert_eq!(body["data"]["proofUrl"], "http://x");

    // The assignee cannot review their own work
    let resp = fixture
        .post_as(&staff, &format!("/api/tasks/{}/review", task_id))
        .json(&json!({ "decision": "approved" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = fixture
        .post_as(&manager, &format!("/api/tasks/{}/review", task_id))
        .json(&json!({ "decision": "rejected" }))
        .send()
        .await
        .unwrap();
    let body = json_body(resp).await;
    assert_eq!(body["data"]["status"], "Rejected");
    assert_eq!(body["data"]["proofStatus"], "rejected");

    fixture
        .post_as(&staff, &format!("/api/tasks/{}/proof", task_id))
        .json(&json!({ "proofUrl": "http://x/v2" }))
        .send()
        .await
        .unwrap();

    let resp = fixture
        .post_as(&manager, &format!("/api/tasks/{}/review", task_id))
        .json(&json!({ "decision": "approved" }))
        .send()
        .await
        .unwrap();
    let body = json_body(resp).await;
    assert_eq!(body["data"]["status"], "Approved");
    assert_eq!(body["data"]["proofStatus"], "approved");

    // Approved tasks no longer accept proof
    let resp = fixture
        .post_as(&staff, &format!("/api/tasks/{}/proof", task_id))
        .json(&json!({ "proofUrl": "http://x/v3" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
    let body = json_body(resp).await;
    assert_eq!(body["error"]["code"], "INVALID_TRANSITION");

    let resp = fixture
        .post_as(&staff, &format!("/api/tasks/{}/complete", task_id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body = json_body(resp).await;
    assert_eq!(body["data"]["status"], "Done");

    let resp = fixture.client.get(fixture.url("/api/stats")).send().await.unwrap();
    let body = json_body(resp).await;
    assert_eq!(body["data"]["totalStaff"], 3);
    assert_eq!(body["data"]["activeTasks"], 0);
    assert_eq!(body["data"]["pendingReviews"], 0);
}

#[tokio::test]
async fn test_task_progress_and_filter() {
    let fixture = TestFixture::new().await;
    let staff = fixture.add_staff("Sam Staff", "Staff").await;
    let first = fixture.add_task(&fixture.admin_id, "First", &staff).await;
    fixture.add_task(&fixture.admin_id, "Second", &staff).await;

    let resp = fixture
        .put_as(&staff, &format!("/api/tasks/{}/status", first))
        .json(&json!({ "status": "In Progress" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .put_as(&staff, &format!("/api/tasks/{}/status", first))
        .json(&json!({ "status": "Done" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);

    let resp = fixture
        .client
        .get(fixture.url("/api/tasks?status=In%20Progress"))
        .send()
        .await
        .unwrap();
    let body = json_body(resp).await;
    let tasks = body["data"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "First");
}

#[tokio::test]
async fn test_staff_cannot_create_tasks() {
    let fixture = TestFixture::new().await;
    let staff = fixture.add_staff("Sam Staff", "Staff").await;

    let resp = fixture
        .post_as(&staff, "/api/tasks")
        .json(&json!({ "title": "Self-assigned", "assignedTo": staff }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = fixture
        .post_as(&fixture.admin_id, "/api/tasks")
        .json(&json!({ "title": "Bad date", "dueDate": "tomorrow" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_fired_assignee_is_placeholder() {
    let fixture = TestFixture::new().await;
    let staff = fixture.add_staff("Sam Staff", "Staff").await;
    fixture.add_task(&fixture.admin_id, "Orphaned", &staff).await;

    fixture
        .client
        .delete(fixture.url(&format!("/api/staff/{}", staff)))
        .header(SESSION_HEADER, &fixture.admin_id)
        .send()
        .await
        .unwrap();

    let resp = fixture.client.get(fixture.url("/api/tasks")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body = json_body(resp).await;
    assert_eq!(body["data"][0]["assignee"]["fullName"], "Unassigned");
    assert_eq!(body["data"][0]["assignee"]["placeholder"], true);
}

#[tokio::test]
async fn test_chat() {
    let fixture = TestFixture::new().await;

    let before = json_body(
        fixture
            .client
            .get(fixture.url("/api/revision"))
            .send()
            .await
            .unwrap(),
    )
    .await["revisionId"]
        .as_i64()
        .unwrap();

    let resp = fixture
        .post_as(&fixture.admin_id, "/api/chat")
        .json(&json!({ "content": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body = json_body(resp).await;
    assert!(body["data"].is_null());
    assert_eq!(body["revisionId"].as_i64().unwrap(), before);

    let resp = fixture
        .post_as(&fixture.admin_id, "/api/chat")
        .json(&json!({ "content": "Morning all" }))
        .send()
        .await
        .unwrap();
    let body = json_body(resp).await;
    assert_eq!(body["data"]["sender"]["fullName"], "Admin User");
    assert_eq!(body["data"]["channelId"], "general");
    assert_eq!(body["revisionId"].as_i64().unwrap(), before + 1);

    // Without a session the admin is used as sender
    let resp = fixture
        .client
        .post(fixture.url("/api/chat"))
        .json(&json!({ "content": "Anonymous note" }))
        .send()
        .await
        .unwrap();
    let body = json_body(resp).await;
    assert_eq!(body["data"]["senderId"], fixture.admin_id.as_str());

    let resp = fixture.client.get(fixture.url("/api/chat")).send().await.unwrap();
    let body = json_body(resp).await;
    let messages = body["data"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["content"], "Morning all");
}

#[tokio::test]
async fn test_event_stream_reports_changes() {
    let fixture = TestFixture::new().await;

    // Headers arrive once the handler has subscribed to the bus
    let mut stream = fixture.client.get(fixture.url("/api/events")).send().await.unwrap();
    assert_eq!(stream.status(), 200);
    assert!(stream.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let resp = fixture
        .post_as(&fixture.admin_id, "/api/chat")
        .json(&json!({ "content": "Stand-up in five" }))
        .send()
        .await
        .unwrap();
    let revision_id = json_body(resp).await["revisionId"].as_i64().unwrap();

    let mut received = String::new();
    tokio::time::timeout(std::time::Duration::from_secs(5), async {
        while !received
            .split_once("event: change")
            .is_some_and(|(_, frame)| frame.contains("\n\n"))
        {
            let chunk = stream.chunk().await.unwrap().expect("event stream ended");
            received.push_str(&String::from_utf8_lossy(&chunk));
        }
    })
    .await
    .expect("no change event within 5s");

    assert!(received.contains("event: change"), "{}", received);
    assert!(received.contains(r#""collection":"messages""#), "{}", received);
    assert!(
        received.contains(&format!(r#""revisionId":{}"#, revision_id)),
        "{}",
        received
    );
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/login"))
        .header("content-type", "application/json")
        .body("{\"email\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_seed_resets_data() {
    let fixture = TestFixture::new().await;
    fixture.add_staff("Temp Worker", "Staff").await;

    let resp = fixture.client.get(fixture.url("/api/seed")).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture.client.get(fixture.url("/api/staff")).send().await.unwrap();
    let body = json_body(resp).await;
    let staff = body["data"].as_array().unwrap();
    assert_eq!(staff.len(), 1);
    assert_eq!(staff[0]["email"], SEED_ADMIN_EMAIL);
}

#[tokio::test]
async fn test_seed_disabled() {
    let fixture = TestFixture::with_seed(false).await;

    let resp = fixture.client.get(fixture.url("/api/seed")).send().await.unwrap();
    assert_eq!(resp.status(), 403);
    let body = json_body(resp).await;
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_revision_and_not_found() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/revision"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body = json_body(resp).await;
    assert!(body["data"]["revisionId"].is_number());
    assert!(body["data"]["generatedAt"].is_string());

    let resp = fixture
        .client
        .get(fixture.url("/api/tasks/missing"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = fixture
        .post_as(&fixture.admin_id, "/api/tasks/missing/complete")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

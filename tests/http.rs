use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct Summary {
    limit: i64,
    total: i64,
    consumed: i64,
    burned: i64,
    remaining: i64,
    progress_percent: f64,
    alert: String,
}

#[derive(Debug, Deserialize)]
struct Entry {
    id: String,
    name: String,
    calories: i64,
}

#[derive(Debug, Deserialize)]
struct TrackerView {
    summary: Summary,
    meals: Vec<Entry>,
    workouts: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct UpdateResponse {
    view: TrackerView,
    events: Vec<serde_json::Value>,
}

struct TestServer {
    base_url: String,
    child: Child,
    _data_dir: tempfile::TempDir,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::{Once, OnceLock};

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);
    static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

    // The shared server lives in a static and is never dropped, so the
    // process and its data directory are torn down at exit instead.
    pub fn register(pid: u32, data_dir: PathBuf) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            let _ = DATA_DIR.set(data_dir);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
        if let Some(dir) = DATA_DIR.get() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/tracker")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_dir = tempfile::Builder::new()
        .prefix("calorie_tracker_http")
        .tempdir()
        .expect("create data dir");
    let child = Command::new(env!("CARGO_BIN_EXE_calorie_tracker"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_dir.path().join("tracker.json"))
        .env("CALORIE_LIMIT", "2000")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id(), data_dir.path().to_path_buf());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer {
        base_url,
        child,
        _data_dir: data_dir,
    }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn fresh_tracker(client: &Client, base_url: &str, limit: i64) {
    let response = client
        .put(format!("{base_url}/api/limit"))
        .json(&serde_json::json!({ "limit": limit }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let response = client.post(format!("{base_url}/api/reset")).send().await.unwrap();
    assert!(response.status().is_success());
}

async fn add(client: &Client, base_url: &str, kind: &str, name: &str, calories: i64) -> UpdateResponse {
    client
        .post(format!("{base_url}/api/{kind}s"))
        .json(&serde_json::json!({ "name": name, "calories": calories }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_meals_and_workouts_update_balance() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    fresh_tracker(&client, &server.base_url, 2000).await;

    let update = add(&client, &server.base_url, "meal", "Eggs", 300).await;
    assert_eq!(update.view.summary.total, 300);
    assert_eq!(update.view.summary.consumed, 300);
    assert_eq!(update.view.summary.remaining, 1700);
    assert_eq!(update.events.len(), 2);
    assert_eq!(update.events[1]["type"], "entry_added");

    let update = add(&client, &server.base_url, "workout", "Run", 400).await;
    assert_eq!(update.view.summary.total, -100);
    assert_eq!(update.view.summary.burned, 400);
    assert_eq!(update.view.summary.remaining, 2100);

    let meal_id = update.view.meals[0].id.clone();
    let response = client
        .delete(format!("{}/api/meals/{meal_id}", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let view: TrackerView = client
        .get(format!("{}/api/tracker", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view.summary.total, -400);
    assert_eq!(view.summary.remaining, 2400);
    assert!(view.meals.is_empty());
    assert_eq!(view.workouts[0].name, "Run");
    assert_eq!(view.workouts[0].calories, 400);
}

#[tokio::test]
async fn http_remove_unknown_id_is_noop() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    fresh_tracker(&client, &server.base_url, 2000).await;
    add(&client, &server.base_url, "workout", "Swim", 250).await;

    let update: UpdateResponse = client
        .delete(format!("{}/api/workouts/does-not-exist", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(update.events.is_empty());
    assert_eq!(update.view.summary.total, -250);
    assert_eq!(update.view.workouts.len(), 1);
}

#[tokio::test]
async fn http_rejects_invalid_entries() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    fresh_tracker(&client, &server.base_url, 2000).await;

    let response = client
        .post(format!("{}/api/meals", server.base_url))
        .json(&serde_json::json!({ "name": "  ", "calories": 100 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .post(format!("{}/api/workouts", server.base_url))
        .json(&serde_json::json!({ "name": "Row", "calories": -5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .post(format!("{}/api/meals", server.base_url))
        .json(&serde_json::json!({ "name": "Soup", "calories": "lots" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());

    let response = client
        .put(format!("{}/api/limit", server.base_url))
        .json(&serde_json::json!({ "limit": -1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    add(&client, &server.base_url, "workout", "Stretch", 1).await;
    let response = client
        .put(format!("{}/api/limit", server.base_url))
        .json(&serde_json::json!({ "limit": i64::MAX }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .post(format!("{}/api/meals", server.base_url))
        .json(&serde_json::json!({ "name": "Huge", "calories": i64::MAX }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    fresh_tracker(&client, &server.base_url, 2000).await;

    let view: TrackerView = client
        .get(format!("{}/api/tracker", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view.summary.total, 0);
    assert_eq!(view.summary.limit, 2000);
    assert!(view.meals.is_empty());
}

#[tokio::test]
async fn http_reset_keeps_limit_and_zero_limit_is_finite() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    fresh_tracker(&client, &server.base_url, 1500).await;
    add(&client, &server.base_url, "meal", "Pizza", 900).await;

    let update: UpdateResponse = client
        .post(format!("{}/api/reset", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(update.view.summary.limit, 1500);
    assert_eq!(update.view.summary.total, 0);
    assert!(update.view.meals.is_empty());
    assert!(update.view.workouts.is_empty());

    let update: UpdateResponse = client
        .put(format!("{}/api/limit", server.base_url))
        .json(&serde_json::json!({ "limit": 0 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(update.view.summary.progress_percent, 0.0);
    assert_eq!(update.view.summary.alert, "danger");
}

#[tokio::test]
async fn http_filter_and_index_page() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    fresh_tracker(&client, &server.base_url, 2000).await;
    add(&client, &server.base_url, "meal", "Greek salad", 320).await;
    add(&client, &server.base_url, "meal", "Burrito", 750).await;

    let salads: Vec<Entry> = client
        .get(format!("{}/api/meals?q=SALAD", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(salads.len(), 1);
    assert_eq!(salads[0].name, "Greek salad");

    let html = client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("Burrito"));
    assert!(html.contains(r#"id="calories-total">1070<"#));
}

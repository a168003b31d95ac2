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
struct HabitView {
    id: String,
    name: String,
    time: Option<String>,
    days: Vec<String>,
    completed_today: bool,
    current_streak: u32,
    longest_streak: u32,
}

#[derive(Debug, Deserialize)]
struct HabitList {
    loaded: bool,
    today: String,
    habits: Vec<HabitView>,
}

#[derive(Debug, Deserialize)]
struct Today {
    completed: u32,
    total: u32,
}

#[derive(Debug, Deserialize)]
struct DailyPoint {
    date: String,
    completed: u32,
    total: u32,
}

#[derive(Debug, Deserialize)]
struct Stats {
    weekly: Vec<DailyPoint>,
}

#[derive(Debug, Deserialize)]
struct Coach {
    message: String,
    fallback: bool,
}

struct TestServer {
    base_url: String,
    child: Child,
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
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
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
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("habit_tracker_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/today")).send().await {
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
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_habit_tracker"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("REMINDERS_ENABLED", "false")
        .env("ASSISTANT_TIMEOUT_SECS", "2")
        .env_remove("ASSISTANT_API_KEY")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
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

async fn list(client: &Client, base_url: &str) -> HabitList {
    client
        .get(format!("{base_url}/api/habits"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn create(client: &Client, base_url: &str, body: serde_json::Value) -> HabitList {
    let response = client
        .post(format!("{base_url}/api/habits"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    response.json().await.unwrap()
}

fn find<'a>(list: &'a HabitList, name: &str) -> &'a HabitView {
    list.habits
        .iter()
        .find(|habit| habit.name == name)
        .unwrap_or_else(|| panic!("habit {name:?} missing"))
}

#[tokio::test]
async fn http_toggle_updates_streaks_and_stats() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let created = create(&client, &server.base_url, serde_json::json!({ "name": "  Drink water " })).await;
    assert!(created.loaded);
    let habit = find(&created, "Drink water");
    assert!(!habit.completed_today);
    assert_eq!(habit.current_streak, 0);
    let id = habit.id.clone();

    let before: Today = client
        .get(format!("{}/api/today", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let toggled: HabitList = client
        .post(format!("{}/api/habits/{id}/toggle", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let habit = find(&toggled, "Drink water");
    assert!(habit.completed_today);
    assert_eq!(habit.current_streak, 1);
    assert_eq!(habit.longest_streak, 1);

    let after: Today = client
        .get(format!("{}/api/today", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(after.total, before.total);
    assert_eq!(after.completed, before.completed + 1);

    let stats: Stats = client
        .get(format!("{}/api/stats", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats.weekly.len(), 7);
    let last = stats.weekly.last().unwrap();
    assert_eq!(last.date, toggled.today);
    assert_eq!(last.completed, after.completed);
    assert_eq!(last.total, after.total);

    // Second toggle restores the original state.
    let toggled_back: HabitList = client
        .post(format!("{}/api/habits/{id}/toggle", server.base_url))
        .json(&serde_json::json!({ "date": toggled.today }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!find(&toggled_back, "Drink water").completed_today);
}

#[tokio::test]
async fn http_toggle_with_invalid_date_is_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let created = create(&client, &server.base_url, serde_json::json!({ "name": "Floss" })).await;
    let id = find(&created, "Floss").id.clone();

    let response = client
        .post(format!("{}/api/habits/{id}/toggle", server.base_url))
        .json(&serde_json::json!({ "date": "2026-02-30" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let after = list(&client, &server.base_url).await;
    assert!(!find(&after, "Floss").completed_today);
}

#[tokio::test]
async fn http_blank_names_are_ignored() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = list(&client, &server.base_url).await.habits.len();
    let after = create(&client, &server.base_url, serde_json::json!({ "name": "   " })).await;
    assert_eq!(after.habits.len(), before);
}

#[tokio::test]
async fn http_edit_and_delete() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let created = create(
        &client,
        &server.base_url,
        serde_json::json!({ "name": "Run", "time": "06:30", "days": ["Mon", "Thu"] }),
    )
    .await;
    let habit = find(&created, "Run");
    assert_eq!(habit.time.as_deref(), Some("06:30"));
    assert_eq!(habit.days, ["Mon", "Thu"]);
    let id = habit.id.clone();

    let edited: HabitList = client
        .put(format!("{}/api/habits/{id}", server.base_url))
        .json(&serde_json::json!({ "name": " Evening run ", "time": "", "days": [] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let habit = find(&edited, "Evening run");
    assert_eq!(habit.time, None);
    assert!(habit.days.is_empty());

    let deleted: HabitList = client
        .delete(format!("{}/api/habits/{id}", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(deleted.habits.iter().all(|habit| habit.id != id));
}

#[tokio::test]
async fn http_rejects_malformed_time() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/habits", server.base_url))
        .json(&serde_json::json!({ "name": "Nap", "time": "25:99" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_assistant_falls_back_without_service() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/suggestions", server.base_url))
        .json(&serde_json::json!({ "interests": "running and reading" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        response.text().await.unwrap(),
        "Failed to get suggestions. Please try again."
    );

    let coach: Coach = client
        .get(format!("{}/api/coach", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(coach.fallback);
    assert!(!coach.message.is_empty());
}

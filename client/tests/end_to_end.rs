use client::api::{ApiClient, AuthApi, TaskApi};
use client::auth::AuthContext;
use client::board::FormField;
use client::dashboard::{Dashboard, DragOutcome};
use client::error::ClientError;
use client::login::LoginForm;
use common::{LoginRequest, Priority, Role, TaskStatus};
use server::auth::{AuthSettings, hash_password};
use server::database;
use server::routes::{AppState, create_router};
use sqlx::sqlite::SqlitePoolOptions;

const TEST_ITERATIONS: u32 = 1_000;
const ADMIN_EMAIL: &str = "admin1@gmail.com";
const ADMIN_PASSWORD: &str = "123admin";

/// Starts the real router on an ephemeral port and returns its base URL.
async fn spawn_server() -> String {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory SQLite");
    database::create_schema(&pool).await.unwrap();
    let hash = hash_password(ADMIN_PASSWORD, TEST_ITERATIONS);
    database::create_user_in_db(&pool, "Admin", ADMIN_EMAIL, &hash, Role::Admin)
        .await
        .unwrap();

    let settings = AuthSettings {
        pbkdf2_iterations: TEST_ITERATIONS,
        ..AuthSettings::default()
    };
    let app = create_router(AppState::new(pool, settings));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn logged_in_client(base_url: &str) -> ApiClient {
    let api = ApiClient::new(base_url, AuthContext::in_memory()).unwrap();
    let mut form = LoginForm::new(ADMIN_EMAIL, ADMIN_PASSWORD);
    form.submit(&api).await.expect("admin login should succeed");
    assert!(api.auth().is_authenticated());
    api
}

#[tokio::test]
async fn test_dashboard_against_live_server() {
    let base_url = spawn_server().await;
    let api = logged_in_client(&base_url).await;

    let session = api.verify().await.unwrap();
    assert_eq!(session.user.email, ADMIN_EMAIL);

    let dashboard = Dashboard::new(api);
    dashboard.load().await.unwrap();
    assert!(dashboard.snapshot().tasks.is_empty());

    // Add through the form.
    dashboard.open_create();
    dashboard.edit_field(FormField::Title("Write report".to_string()));
    dashboard.edit_field(FormField::AssignedTo("Alice".to_string()));
    dashboard.edit_field(FormField::DueDate("2024-01-01".to_string()));
    dashboard.edit_field(FormField::Priority(Priority::High));
    let task = dashboard.submit_form().await.unwrap();
    assert_eq!(task.status, TaskStatus::Todo);
    assert!(!dashboard.snapshot().show_modal);

    // A confirmed move sticks, locally and on the server.
    let outcome = dashboard
        .drag_end(task.id, Some(TaskStatus::InProgress))
        .await
        .unwrap();
    assert_eq!(outcome, DragOutcome::Committed);
    let remote = dashboard.api().list_tasks().await.unwrap();
    assert_eq!(remote[0].status, TaskStatus::InProgress);

    // Edit the title; the reply replaces the local record.
    dashboard.open_edit(task.id);
    dashboard.edit_field(FormField::Title("Write final report".to_string()));
    let edited = dashboard.submit_form().await.unwrap();
    assert_eq!(edited.title, "Write final report");
    assert_eq!(dashboard.snapshot().task(task.id).unwrap().status, TaskStatus::InProgress);

    // The task disappears server-side; the next move is rolled back.
    dashboard.api().delete_task(task.id).await.unwrap();
    let err = dashboard
        .drag_end(task.id, Some(TaskStatus::Done))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));

    let board = dashboard.snapshot();
    assert_eq!(board.task(task.id).unwrap().status, TaskStatus::InProgress);
    assert!(board.error.as_deref().unwrap().starts_with("Failed to move task:"));

    dashboard.load().await.unwrap();
    assert!(dashboard.snapshot().tasks.is_empty());
}

#[tokio::test]
async fn test_wrong_password_is_refused() {
    let base_url = spawn_server().await;
    let api = ApiClient::new(&base_url, AuthContext::in_memory()).unwrap();

    let err = api
        .login(&LoginRequest {
            email: ADMIN_EMAIL.to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::InvalidCredentials(ref m) if m == "Invalid email or password."));
    assert!(!api.auth().is_authenticated());
}

#[tokio::test]
async fn test_logout_revokes_the_token() {
    let base_url = spawn_server().await;
    let api = logged_in_client(&base_url).await;
    let stale = AuthContext::in_memory();
    stale.set_token(&api.auth().token().unwrap()).unwrap();

    api.logout().await.unwrap();
    assert!(!api.auth().is_authenticated());

    let replay = ApiClient::new(&base_url, stale).unwrap();
    let err = replay.list_tasks().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized(_)));
}

#[tokio::test]
async fn test_token_file_survives_between_clients() {
    let base_url = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session").join("token");

    let first = ApiClient::new(&base_url, AuthContext::with_token_file(&path).unwrap()).unwrap();
    let mut form = LoginForm::new(ADMIN_EMAIL, ADMIN_PASSWORD);
    form.submit(&first).await.unwrap();
    assert!(path.exists());

    let second = ApiClient::new(&base_url, AuthContext::with_token_file(&path).unwrap()).unwrap();
    assert!(second.list_tasks().await.unwrap().is_empty());

    second.logout().await.unwrap();
    assert!(!path.exists());
}

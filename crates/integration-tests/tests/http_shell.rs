//! Form submissions through the router land in SQLite

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use ddbackup_api_http::{router, AppState};
use ddbackup_core::application::{
    BackupExecutor, DeviceRegistry, ScheduleService, ScheduleStore, SchedulerController,
};
use ddbackup_core::domain::BackupCommand;
use ddbackup_core::port::id_provider::mocks::SequentialIdProvider;
use ddbackup_core::port::remote_executor::mocks::RecordingExecutor;
use ddbackup_core::port::time_provider::SystemTimeProvider;
use ddbackup_infra_sqlite::{
    create_pool, run_migrations, SqliteDeviceRepository, SqliteScheduleRepository,
};
use tower::ServiceExt;

async fn app_state() -> AppState {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();

    let registry = Arc::new(DeviceRegistry::new(Arc::new(SqliteDeviceRepository::new(
        pool.clone(),
    ))));
    let executor = Arc::new(BackupExecutor::new(
        Arc::new(RecordingExecutor::new_success()),
        Arc::new(SystemTimeProvider),
        Arc::new(SequentialIdProvider::default()),
        BackupCommand::default(),
    ));
    let controller = Arc::new(SchedulerController::new(
        registry.clone(),
        executor,
        Arc::new(SystemTimeProvider),
    ));
    let schedules = Arc::new(ScheduleService::new(
        Arc::new(ScheduleStore::new(Arc::new(SqliteScheduleRepository::new(pool)))),
        controller,
    ));

    AppState::new(registry, schedules)
}

fn form(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_register_then_render() {
    let state = app_state().await;
    let dir = tempfile::tempdir().unwrap();
    let app = router(state, dir.path());

    let response = app
        .clone()
        .oneshot(form("/add-device", "user=pi&ip=192.168.1.20&outputFile=pi.img"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app
        .clone()
        .oneshot(form("/set-schedule", "schedule=0+3+*+*+0"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("<td>pi</td><td>192.168.1.20</td><td>pi.img</td>"));
    assert!(html.contains("<code>0 3 * * 0</code>"));
    assert!(!html.contains("not scheduled"));
}

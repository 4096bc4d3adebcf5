//! End-to-end reporting scenarios: deduplication, error paths, and the
//! issue payload the gateway receives.

use std::sync::Arc;
use std::time::Duration;

use domains::{
    GatewayError, IssueRecord, MockRepositoryGateway, NewProject, ProjectStore, RepositoryHandle,
};
use integration_tests::{
    acme_channel, bare_report_command, fixed_time, report_command, RecordingTransport, HUMAN,
};
use services::{DispatchConfig, Dispatcher};
use storage_adapters::SqliteRecordStore;

const CHAT: i64 = -200;
const ISSUE_URL: &str = "https://github.com/acme/repo/issues/1";

fn config() -> DispatchConfig {
    DispatchConfig {
        cleanup_delay: Duration::from_millis(10),
        session_ttl: Duration::from_secs(60),
    }
}

fn acme_handle() -> RepositoryHandle {
    RepositoryHandle {
        full_name: "acme/repo".to_string(),
        url: "https://github.com/acme/repo".to_string(),
    }
}

async fn store() -> Arc<SqliteRecordStore> {
    Arc::new(SqliteRecordStore::in_memory().await.unwrap())
}

/// Seeds a bound project for channel 42 and returns its id.
async fn seed_bound_project(store: &SqliteRecordStore) -> i64 {
    let id = store
        .insert_project(NewProject {
            channel_id: 42,
            channel_title: "Acme".to_string(),
            post_ref: "https://t.me/acme/10".to_string(),
            post_at: fixed_time(),
        })
        .await
        .unwrap();
    store
        .set_project_repository(id, "https://github.com/acme/repo", "acme/repo")
        .await
        .unwrap();
    id
}

#[tokio::test]
async fn report_creates_issue_and_link() {
    let store = store().await;
    let project_id = seed_bound_project(&store).await;
    let transport = Arc::new(RecordingTransport::new());
    let mut gateway = MockRepositoryGateway::new();
    gateway
        .expect_resolve()
        .withf(|locator| locator == "acme/repo")
        .times(1)
        .returning(|_| Ok(acme_handle()));
    gateway
        .expect_create_issue()
        .withf(|_, title, body| {
            title == "Acme/90"
                && body
                    == "[2024-05-03 12:00:00] - [false] - [5]\n//\n\
                        [ChatPostURL](https://t.me/acme/10) - \
                        [ChatPostCommentURL](https://t.me/acme/10?comment=90)"
        })
        .times(1)
        .returning(|_, _, _| {
            Ok(IssueRecord {
                id: 4321,
                url: ISSUE_URL.to_string(),
                created_at: fixed_time(),
            })
        });

    let dispatcher = Dispatcher::new(store.clone(), Arc::new(gateway), transport.clone(), config());
    dispatcher
        .dispatch(report_command(CHAT, 90, &acme_channel(), 10, HUMAN))
        .await;

    let reply = transport.last_sent().expect("reply should be sent");
    assert_eq!(reply.text, format!("[!] Created an Issue at: {}", ISSUE_URL));

    let link = store
        .find_issue_link(project_id, "https://t.me/acme/10")
        .await
        .unwrap()
        .expect("issue link should be recorded");
    assert_eq!(link.issue_id, 4321);
    assert_eq!(link.issue_url, ISSUE_URL);
    assert_eq!(link.reporter_id, HUMAN.id);
    assert!(!link.reporter_is_automated);
    assert_eq!(link.report_url, "https://t.me/acme/10?comment=90");
}

#[tokio::test]
async fn repeated_report_returns_the_existing_issue() {
    let store = store().await;
    seed_bound_project(&store).await;
    let transport = Arc::new(RecordingTransport::new());
    let mut gateway = MockRepositoryGateway::new();
    // One resolve + one create across both invocations.
    gateway
        .expect_resolve()
        .times(1)
        .returning(|_| Ok(acme_handle()));
    gateway.expect_create_issue().times(1).returning(|_, _, _| {
        Ok(IssueRecord {
            id: 4321,
            url: ISSUE_URL.to_string(),
            created_at: fixed_time(),
        })
    });

    let dispatcher = Dispatcher::new(store.clone(), Arc::new(gateway), transport.clone(), config());
    dispatcher
        .dispatch(report_command(CHAT, 90, &acme_channel(), 10, HUMAN))
        .await;
    dispatcher
        .dispatch(report_command(CHAT, 95, &acme_channel(), 10, HUMAN))
        .await;

    let replies = transport.sent();
    assert_eq!(replies.len(), 2);
    assert_eq!(
        replies[1].text,
        format!("[!] An Issue already has been created at: {}", ISSUE_URL)
    );
}

#[tokio::test]
async fn report_on_an_unregistered_channel_is_refused() {
    let store = store().await;
    let transport = Arc::new(RecordingTransport::new());
    // No project, so neither gateway method may run.
    let gateway = MockRepositoryGateway::new();

    let dispatcher = Dispatcher::new(store.clone(), Arc::new(gateway), transport.clone(), config());
    dispatcher
        .dispatch(report_command(CHAT, 90, &acme_channel(), 10, HUMAN))
        .await;

    let reply = transport.last_sent().unwrap();
    assert_eq!(
        reply.text,
        "[?] Project is not registered for the chat: Acme\n[!] Bot/Admin only /start"
    );
    assert!(store.find_project_by_channel(42).await.unwrap().is_none());
}

#[tokio::test]
async fn report_must_reply_to_a_channel_post() {
    let store = store().await;
    seed_bound_project(&store).await;
    let transport = Arc::new(RecordingTransport::new());
    let gateway = MockRepositoryGateway::new();

    let dispatcher = Dispatcher::new(store.clone(), Arc::new(gateway), transport.clone(), config());
    dispatcher.dispatch(bare_report_command(CHAT, 90, HUMAN)).await;

    let reply = transport.last_sent().unwrap();
    assert_eq!(
        reply.text,
        "[?] /report only works as a reply inside a channel discussion"
    );
}

#[tokio::test]
async fn incomplete_registration_is_reported() {
    let store = store().await;
    store
        .insert_project(NewProject {
            channel_id: 42,
            channel_title: "Acme".to_string(),
            post_ref: "https://t.me/acme/10".to_string(),
            post_at: fixed_time(),
        })
        .await
        .unwrap();
    let transport = Arc::new(RecordingTransport::new());
    let gateway = MockRepositoryGateway::new();

    let dispatcher = Dispatcher::new(store.clone(), Arc::new(gateway), transport.clone(), config());
    dispatcher
        .dispatch(report_command(CHAT, 90, &acme_channel(), 10, HUMAN))
        .await;

    let reply = transport.last_sent().unwrap();
    assert!(reply.text.contains("registration is not completed"));
}

#[tokio::test]
async fn inaccessible_repository_writes_nothing() {
    let store = store().await;
    let project_id = seed_bound_project(&store).await;
    let transport = Arc::new(RecordingTransport::new());
    let mut gateway = MockRepositoryGateway::new();
    gateway
        .expect_resolve()
        .times(1)
        .returning(|_| Err(GatewayError::NotFoundOrForbidden("acme/repo".to_string())));

    let dispatcher = Dispatcher::new(store.clone(), Arc::new(gateway), transport.clone(), config());
    dispatcher
        .dispatch(report_command(CHAT, 90, &acme_channel(), 10, HUMAN))
        .await;

    let reply = transport.last_sent().unwrap();
    assert_eq!(reply.text, "[?] Repository is not accessible: acme/repo");
    assert!(store
        .find_issue_link(project_id, "https://t.me/acme/10")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn remote_create_failure_writes_nothing() {
    let store = store().await;
    let project_id = seed_bound_project(&store).await;
    let transport = Arc::new(RecordingTransport::new());
    let mut gateway = MockRepositoryGateway::new();
    gateway
        .expect_resolve()
        .times(1)
        .returning(|_| Ok(acme_handle()));
    gateway
        .expect_create_issue()
        .times(1)
        .returning(|_, _, _| Err(GatewayError::Remote("503 from the tracker".to_string())));

    let dispatcher = Dispatcher::new(store.clone(), Arc::new(gateway), transport.clone(), config());
    dispatcher
        .dispatch(report_command(CHAT, 90, &acme_channel(), 10, HUMAN))
        .await;

    let reply = transport.last_sent().unwrap();
    assert_eq!(reply.text, "[?] Could not create the Issue, try again later");
    assert!(store
        .find_issue_link(project_id, "https://t.me/acme/10")
        .await
        .unwrap()
        .is_none());
}

use std::sync::{Arc, Mutex};
use std::time::Duration;

use reelflow_client::StudioClient;
use reelflow_core::domain::job::{JobKind, JobSnapshot, ResultPayload};
use reelflow_core::domain::status::JobStatus;
use reelflow_core::domain::wizard::WizardStep;
use reelflow_flow::{FlowConfig, JobPoller, SessionContext, StepOutcome, StepWizard};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> FlowConfig {
    FlowConfig::new(server.uri())
        .with_poll_interval(Duration::from_millis(20))
        .with_redirect_delay(Duration::from_millis(10))
}

fn poller(server: &MockServer) -> JobPoller {
    let client = Arc::new(StudioClient::new(server.uri()));
    JobPoller::new(client, &config(server))
}

#[tokio::test]
async fn merge_job_succeeds_after_two_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/videos/merge/status/merge-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "processing",
            "progress": {"percent": 40}
        })))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/videos/merge/status/merge-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "succeeded",
            "final_video_url": "https://x/video.mp4"
        })))
        .with_priority(2)
        .mount(&server)
        .await;

    let terminals: Arc<Mutex<Vec<JobSnapshot>>> = Arc::default();
    let recorded = Arc::clone(&terminals);
    let handle = poller(&server)
        .start(
            "merge-1",
            JobKind::Merge,
            |_| {},
            move |snapshot| recorded.lock().unwrap().push(snapshot),
        )
        .unwrap();

    let terminal = handle.wait().await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(terminal.status, JobStatus::Succeeded);
    assert_eq!(
        terminal.result.as_ref().and_then(ResultPayload::url),
        Some("https://x/video.mp4")
    );
    assert_eq!(terminals.lock().unwrap().len(), 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn server_error_fails_once_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/images/status/img-1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let (handle, mut updates) = poller(&server).watch("img-1", JobKind::Images).unwrap();

    let terminal = updates.recv().await.unwrap();
    assert_eq!(terminal.status, JobStatus::Failed);
    assert_eq!(terminal.error.as_deref(), Some("HTTP 500: internal error"));
    assert!(updates.recv().await.is_none());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
    assert!(handle.is_finished());
}

#[tokio::test]
async fn wizard_redirects_after_images_job() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/images/status/img-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "COMPLETED",
            "images": [{"url": "https://x/1.png"}, {"url": "https://x/2.png"}]
        })))
        .mount(&server)
        .await;

    let config = config(&server);
    let session = SessionContext::in_memory();
    let mut wizard = StepWizard::new(session.clone(), &config);
    wizard.go_to(WizardStep::Images, Some(json!({"script": "draft"})));

    let handle = poller(&server).start("img-9", JobKind::Images, |_| {}, |_| {}).unwrap();
    wizard.attach_job(WizardStep::Images, handle);
    assert_eq!(session.job_for(WizardStep::Images).as_deref(), Some("img-9"));

    let outcome = wizard.await_job(WizardStep::Images).await.unwrap();
    assert_eq!(
        outcome,
        StepOutcome::Redirect {
            to: WizardStep::Videos,
            after: Duration::from_millis(10)
        }
    );
    assert_eq!(
        wizard.payload(WizardStep::Images),
        Some(&json!(["https://x/1.png", "https://x/2.png"]))
    );
    assert_eq!(session.job_status("img-9"), Some(JobStatus::Succeeded));

    assert!(wizard.follow(&outcome).await);
    assert_eq!(wizard.current_step(), WizardStep::Videos);
    assert!(wizard.job(WizardStep::Images).is_none());
}

#[tokio::test]
async fn teardown_stops_outstanding_polls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/videos/status/vid-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "running"})))
        .mount(&server)
        .await;

    let config = config(&server);
    let mut wizard = StepWizard::new(SessionContext::in_memory(), &config);
    let handle = poller(&server).start("vid-1", JobKind::Videos, |_| {}, |_| {}).unwrap();
    wizard.attach_job(WizardStep::Videos, handle);

    tokio::time::sleep(Duration::from_millis(50)).await;
    wizard.teardown();
    let seen = server.received_requests().await.unwrap().len();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(server.received_requests().await.unwrap().len(), seen);
    assert!(wizard.job(WizardStep::Videos).is_none());
}

#[tokio::test]
async fn attaching_a_new_job_cancels_the_previous_one() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/videos/status/old"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "running"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/videos/status/new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "done",
            "videos": ["https://x/1.mp4"]
        })))
        .mount(&server)
        .await;

    let config = config(&server);
    let poller = poller(&server);
    let mut wizard = StepWizard::new(SessionContext::in_memory(), &config);

    let old = poller.start("old", JobKind::Videos, |_| {}, |_| {}).unwrap();
    let old_waiter = old.waiter();
    wizard.attach_job(WizardStep::Videos, old);

    let new = poller.start("new", JobKind::Videos, |_| {}, |_| {}).unwrap();
    wizard.attach_job(WizardStep::Videos, new);

    assert_eq!(old_waiter.wait().await, None);
    let outcome = wizard.await_job(WizardStep::Videos).await.unwrap();
    assert!(matches!(
        outcome,
        StepOutcome::Redirect {
            to: WizardStep::FinalVideo,
            ..
        }
    ));
}

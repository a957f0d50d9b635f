mod common;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use restock::audit::Artifacts;
use restock::checkout::{run_checkout, CheckoutContext, Step, StepFuture};
use restock::errors::RestockError;
use restock::models::{CustomerProfile, StepStatus};
use restock::notify::{Milestones, Notifier};
use restock::browser::PageSession;
use restock::poller::{poll_until_available, PollConfig, PollEnd};

use common::{test_profile, RecordingNotifier, ScriptedSession};

// --- availability poller ---

#[tokio::test(start_paused = true)]
async fn test_poll_succeeds_after_k_refreshes_within_delay_bounds() {
    let session = ScriptedSession::new();
    let evals = AtomicU32::new(0);
    let config = PollConfig::default();
    let cancel = CancellationToken::new();

    let started = tokio::time::Instant::now();
    let end = poll_until_available(
        &session,
        || {
            let n = evals.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, RestockError>(n >= 3) }
        },
        &config,
        &cancel,
    )
    .await
    .unwrap();

    // False three times, true on the fourth evaluation: three refreshes,
    // each preceded by one jittered backoff.
    assert_eq!(end, PollEnd::Available);
    assert_eq!(evals.load(Ordering::SeqCst), 4);
    assert_eq!(session.refreshes.load(Ordering::SeqCst), 3);

    let elapsed = started.elapsed();
    let lower = (config.min_delay + config.settle) * 3;
    let upper = (config.max_delay + config.settle) * 3;
    assert!(elapsed >= lower, "elapsed {:?} under lower bound", elapsed);
    assert!(elapsed <= upper, "elapsed {:?} over upper bound", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_poll_immediate_availability_never_refreshes() {
    let session = ScriptedSession::new();
    let config = PollConfig::default();
    let cancel = CancellationToken::new();

    let started = tokio::time::Instant::now();
    let end = poll_until_available(
        &session,
        || async { Ok::<_, RestockError>(true) },
        &config,
        &cancel,
    )
    .await
    .unwrap();

    assert_eq!(end, PollEnd::Available);
    assert_eq!(session.refreshes.load(Ordering::SeqCst), 0);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_poll_cancel_during_backoff_skips_further_refresh() {
    let session = ScriptedSession::new();
    let config = PollConfig::default();
    let cancel = CancellationToken::new();

    let canceller = cancel.clone();
    tokio::spawn(async move {
        // Fires one second in, well inside the first backoff window.
        tokio::time::sleep(Duration::from_secs(1)).await;
        canceller.cancel();
    });

    let end = poll_until_available(
        &session,
        || async { Ok::<_, RestockError>(false) },
        &config,
        &cancel,
    )
    .await
    .unwrap();

    assert_eq!(end, PollEnd::Cancelled);
    assert_eq!(session.refreshes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_poll_missing_predicate_target_escalates_structurally() {
    let session = ScriptedSession::new();
    let config = PollConfig::default();
    let cancel = CancellationToken::new();
    let evals = AtomicU32::new(0);

    let err = poll_until_available(
        &session,
        || {
            evals.fetch_add(1, Ordering::SeqCst);
            async { Err::<bool, _>(RestockError::ElementNotFound("css `#playstation-5 a`".into())) }
        },
        &config,
        &cancel,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, RestockError::StructuralMismatch(_)));
    assert_eq!(evals.load(Ordering::SeqCst), 1);
    assert_eq!(session.refreshes.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_poll_attempt_budget_exhausts() {
    let session = ScriptedSession::new();
    let config = PollConfig {
        max_attempts: Some(2),
        ..Default::default()
    };
    let cancel = CancellationToken::new();

    let end = poll_until_available(
        &session,
        || async { Ok::<_, RestockError>(false) },
        &config,
        &cancel,
    )
    .await
    .unwrap();

    assert_eq!(end, PollEnd::AttemptsExhausted { attempts: 2 });
    assert_eq!(session.refreshes.load(Ordering::SeqCst), 1);
}

// --- checkout state machine ---

fn completed_step<'a>(
    _session: &'a dyn PageSession,
    _profile: &'a CustomerProfile,
    _context: &'a mut CheckoutContext,
) -> StepFuture<'a> {
    Box::pin(async { Ok(StepStatus::Completed) })
}

fn skipped_step<'a>(
    _session: &'a dyn PageSession,
    _profile: &'a CustomerProfile,
    _context: &'a mut CheckoutContext,
) -> StepFuture<'a> {
    Box::pin(async { Ok(StepStatus::Skipped) })
}

fn failing_step<'a>(
    _session: &'a dyn PageSession,
    _profile: &'a CustomerProfile,
    _context: &'a mut CheckoutContext,
) -> StepFuture<'a> {
    Box::pin(async { Err(RestockError::step("second", "unexpected page state")) })
}

static AFTER_FAILURE_RUNS: AtomicU32 = AtomicU32::new(0);

fn counting_step<'a>(
    _session: &'a dyn PageSession,
    _profile: &'a CustomerProfile,
    _context: &'a mut CheckoutContext,
) -> StepFuture<'a> {
    AFTER_FAILURE_RUNS.fetch_add(1, Ordering::SeqCst);
    Box::pin(async { Ok(StepStatus::Completed) })
}

fn machine_fixture(dir: &tempfile::TempDir) -> (ScriptedSession, CustomerProfile, Artifacts) {
    (
        ScriptedSession::new(),
        test_profile(),
        Artifacts::new(dir.path().to_path_buf()),
    )
}

#[tokio::test]
async fn test_machine_halts_on_first_failure_and_names_the_step() {
    let dir = tempfile::tempdir().unwrap();
    let (session, profile, artifacts) = machine_fixture(&dir);
    let steps = vec![
        Step::new("first", completed_step),
        Step::new("second", failing_step),
        Step::new("third", counting_step),
    ];

    let err = run_checkout(
        &session,
        &profile,
        &steps,
        &Milestones::none(),
        &artifacts,
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    match err {
        RestockError::Step { step, .. } => assert_eq!(step, "second"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(AFTER_FAILURE_RUNS.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_machine_records_skipped_steps_and_continues() {
    let dir = tempfile::tempdir().unwrap();
    let (session, profile, artifacts) = machine_fixture(&dir);
    let steps = vec![
        Step::new("delivery-details", skipped_step),
        Step::new("delivery-slot", completed_step),
    ];

    let trail = run_checkout(
        &session,
        &profile,
        &steps,
        &Milestones::none(),
        &artifacts,
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    let outcomes: Vec<_> = trail.iter().map(|r| (r.step.as_str(), r.outcome.as_str())).collect();
    assert_eq!(
        outcomes,
        vec![("delivery-details", "skipped"), ("delivery-slot", "completed")]
    );
}

#[tokio::test]
async fn test_machine_fires_milestone_before_final_submission() {
    let dir = tempfile::tempdir().unwrap();
    let (session, profile, artifacts) = machine_fixture(&dir);
    let notifier = Arc::new(RecordingNotifier::new());
    let milestones = Milestones::new(Some(notifier.clone() as Arc<dyn Notifier>));
    let steps = vec![
        Step::new("payment-details", completed_step),
        Step::final_submission("final-confirm", completed_step),
    ];

    run_checkout(
        &session,
        &profile,
        &steps,
        &milestones,
        &artifacts,
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(notifier.events(), vec!["final-details".to_string()]);
    assert_eq!(session.screenshots.load(Ordering::SeqCst), 1);
    assert!(dir.path().join("final_payment.png").exists());
}

static CANCELLED_RUNS: AtomicU32 = AtomicU32::new(0);

fn cancelled_probe_step<'a>(
    _session: &'a dyn PageSession,
    _profile: &'a CustomerProfile,
    _context: &'a mut CheckoutContext,
) -> StepFuture<'a> {
    CANCELLED_RUNS.fetch_add(1, Ordering::SeqCst);
    Box::pin(async { Ok(StepStatus::Completed) })
}

#[tokio::test]
async fn test_machine_checks_cancellation_before_each_step() {
    let dir = tempfile::tempdir().unwrap();
    let (session, profile, artifacts) = machine_fixture(&dir);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = run_checkout(
        &session,
        &profile,
        &[Step::new("first", cancelled_probe_step)],
        &Milestones::none(),
        &artifacts,
        &cancel,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, RestockError::Cancelled(_)));
    assert_eq!(CANCELLED_RUNS.load(Ordering::SeqCst), 0);
}

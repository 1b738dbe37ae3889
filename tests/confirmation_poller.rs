//! Confirmation poller state machine against scripted backends.

use std::sync::Arc;
use std::time::Duration;

use da_submitter::lifecycle::CancelSignal;
use da_submitter::submission::{
    BackendStatus, Commitment, ConfirmationPoller, ConfirmationState, PollPolicy,
    SubmissionHandle, SubmitError, TerminalMarkers, Verification,
};

mod common;
use common::{count, dispersal_backend, namespace_backend, policy, Step};

fn request_handle() -> SubmissionHandle {
    SubmissionHandle::Request(alloy::primitives::Bytes::from_static(b"request-1"))
}

#[tokio::test(start_paused = true)]
async fn test_finalizes_after_three_ticks() {
    let backend = dispersal_backend().with_statuses(vec![
        BackendStatus::Processing,
        BackendStatus::Processing,
        BackendStatus::Finalized,
    ]);
    let poller = ConfirmationPoller::new(policy(1, 10_000).with_markers(TerminalMarkers::finalized()));

    let result = poller
        .confirm(&backend, &request_handle(), None, None)
        .await
        .unwrap();

    assert_eq!(result.state, ConfirmationState::Finalized);
    assert_eq!(result.polls, 3);
    assert_eq!(result.last_status, Some(BackendStatus::Finalized));
    assert_eq!(result.elapsed, Duration::from_secs(3));
    assert_eq!(count(&backend.fetch_calls), 0);
}

#[tokio::test(start_paused = true)]
async fn test_tick_on_the_deadline_is_polled() {
    let backend = dispersal_backend().with_statuses(vec![
        BackendStatus::Processing,
        BackendStatus::Processing,
        BackendStatus::Finalized,
    ]);
    let poller = ConfirmationPoller::new(policy(1, 3_000).with_markers(TerminalMarkers::finalized()));

    let result = poller
        .confirm(&backend, &request_handle(), None, None)
        .await
        .unwrap();

    assert_eq!(result.state, ConfirmationState::Finalized);
    assert_eq!(result.polls, 3);
    assert_eq!(result.elapsed, Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_zero_interval_does_not_panic() {
    let backend = dispersal_backend().with_statuses(vec![BackendStatus::Processing]);

    let built = PollPolicy::new(Duration::ZERO, Duration::from_millis(10));
    let result = ConfirmationPoller::new(built)
        .confirm(&backend, &request_handle(), None, None)
        .await
        .unwrap();
    assert_eq!(result.state, ConfirmationState::TimedOut);
    assert!(result.polls >= 1);
    assert!(result.elapsed <= Duration::from_millis(11));

    let literal = PollPolicy {
        interval: Duration::ZERO,
        ..policy(1, 10)
    };
    let result = ConfirmationPoller::new(literal)
        .confirm(&backend, &request_handle(), None, None)
        .await
        .unwrap();
    assert_eq!(result.state, ConfirmationState::TimedOut);
}

#[tokio::test(start_paused = true)]
async fn test_times_out_when_deadline_allows_two_ticks() {
    let backend = dispersal_backend().with_statuses(vec![
        BackendStatus::Processing,
        BackendStatus::Processing,
        BackendStatus::Finalized,
    ]);
    let poller = ConfirmationPoller::new(policy(1, 2_500).with_markers(TerminalMarkers::finalized()));

    let result = poller
        .confirm(&backend, &request_handle(), None, None)
        .await
        .unwrap();

    assert_eq!(result.state, ConfirmationState::TimedOut);
    assert_eq!(result.polls, 2);
    assert_eq!(result.last_status, Some(BackendStatus::Processing));

    let err = result.into_result().unwrap_err();
    assert!(matches!(
        err,
        SubmitError::TimedOut {
            last_status: Some(BackendStatus::Processing),
            ..
        }
    ));
    assert!(err.is_retryable());
}

#[tokio::test(start_paused = true)]
async fn test_backend_failure_is_terminal() {
    let backend = dispersal_backend().with_statuses(vec![
        BackendStatus::Processing,
        BackendStatus::Failed("insufficient signatures".into()),
        BackendStatus::Finalized,
    ]);
    let poller = ConfirmationPoller::new(policy(1, 60_000).with_markers(TerminalMarkers::finalized()));

    let result = poller
        .confirm(&backend, &request_handle(), None, None)
        .await
        .unwrap();

    assert_eq!(result.state, ConfirmationState::Failed);
    assert_eq!(result.polls, 2);
    match result.into_result().unwrap_err() {
        SubmitError::BackendFailed { reason, .. } => assert_eq!(reason, "insufficient signatures"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_always_returns_within_deadline_plus_interval() {
    for (interval_secs, deadline_ms) in [(1, 1), (1, 999), (2, 5_000), (5, 4_000), (3, 30_000)] {
        let backend = dispersal_backend().with_statuses(vec![BackendStatus::Processing]);
        let poll = policy(interval_secs, deadline_ms);
        let poller = ConfirmationPoller::new(poll);

        let result = poller
            .confirm(&backend, &request_handle(), None, None)
            .await
            .unwrap();

        assert_eq!(result.state, ConfirmationState::TimedOut);
        assert!(result.elapsed <= poll.deadline + poll.interval);
    }
}

#[tokio::test(start_paused = true)]
async fn test_first_query_waits_one_interval() {
    let backend = dispersal_backend().with_statuses(vec![BackendStatus::Finalized]);
    let poller = ConfirmationPoller::new(policy(5, 4_000).with_markers(TerminalMarkers::finalized()));

    let result = poller
        .confirm(&backend, &request_handle(), None, None)
        .await
        .unwrap();

    // The deadline passes before the first tick, so nothing is queried.
    assert_eq!(result.state, ConfirmationState::TimedOut);
    assert_eq!(result.polls, 0);
    assert_eq!(result.last_status, None);
    assert_eq!(count(&backend.status_calls), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_stops_polling() {
    let backend = Arc::new(dispersal_backend().with_statuses(vec![BackendStatus::Processing]));
    let poller = ConfirmationPoller::new(policy(1, 60_000));
    let cancel = CancelSignal::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        trigger.cancel();
    });

    let result = poller
        .confirm(backend.as_ref(), &request_handle(), None, Some(&cancel))
        .await
        .unwrap();

    assert_eq!(result.state, ConfirmationState::Cancelled);
    assert_eq!(result.polls, 2);
    assert!(result.elapsed < Duration::from_secs(3));
    assert!(matches!(
        result.into_result(),
        Err(SubmitError::Cancelled {
            last_status: Some(BackendStatus::Processing),
            ..
        })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_status_error_carries_last_status() {
    let backend = dispersal_backend().with_script(vec![
        Step::Status(BackendStatus::Processing),
        Step::Unreachable,
    ]);
    let poller = ConfirmationPoller::new(policy(1, 60_000));

    let err = poller
        .confirm(&backend, &request_handle(), None, None)
        .await
        .unwrap_err();

    match err {
        SubmitError::Confirmation {
            handle,
            last_status,
            source,
        } => {
            assert_eq!(handle, request_handle());
            assert_eq!(last_status, Some(BackendStatus::Processing));
            assert!(matches!(*source, SubmitError::Network { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_verification_match() {
    let expected = Commitment::digest(b"blob");
    let backend = namespace_backend()
        .with_statuses(vec![BackendStatus::Pending, BackendStatus::Confirmed])
        .with_fetched(expected.clone());
    let poller = ConfirmationPoller::new(policy(1, 60_000));

    let result = poller
        .confirm(&backend, &request_handle(), Some(&expected), None)
        .await
        .unwrap();

    assert_eq!(result.state, ConfirmationState::Confirmed);
    assert_eq!(result.verification, Some(Verification::Matched));
    assert_eq!(count(&backend.fetch_calls), 1);
}

#[tokio::test(start_paused = true)]
async fn test_verification_mismatch_is_integrity_failure() {
    let expected = Commitment::digest(b"blob");
    let mut tampered = expected.as_bytes().to_vec();
    tampered[31] ^= 0x01;
    let tampered = Commitment::new(tampered);

    let backend = namespace_backend()
        .with_statuses(vec![BackendStatus::Confirmed])
        .with_fetched(tampered.clone());
    let poller = ConfirmationPoller::new(policy(1, 60_000));

    let result = poller
        .confirm(&backend, &request_handle(), Some(&expected), None)
        .await
        .unwrap();

    assert_eq!(result.state, ConfirmationState::IntegrityFailure);
    assert_eq!(
        result.verification,
        Some(Verification::Mismatch {
            expected: expected.clone(),
            actual: tampered.clone(),
        })
    );

    let err = result.into_result().unwrap_err();
    assert!(!err.is_retryable());
    assert!(matches!(err, SubmitError::IntegrityFailure { actual, .. } if actual == tampered));
}

#[tokio::test(start_paused = true)]
async fn test_missing_blob_on_fetch_is_not_integrity_failure() {
    let expected = Commitment::digest(b"blob");
    let backend = namespace_backend()
        .with_statuses(vec![BackendStatus::Confirmed])
        .with_unreachable_fetch();
    let poller = ConfirmationPoller::new(policy(1, 60_000));

    let err = poller
        .confirm(&backend, &request_handle(), Some(&expected), None)
        .await
        .unwrap_err();

    assert!(err.is_retryable());
    match err {
        SubmitError::Confirmation {
            last_status,
            source,
            ..
        } => {
            assert_eq!(last_status, Some(BackendStatus::Confirmed));
            assert!(matches!(*source, SubmitError::Network { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

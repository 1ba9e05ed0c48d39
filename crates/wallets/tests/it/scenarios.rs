//! End-to-end walks through the session as the presentation layer drives it.

use crate::utils::{MockGateway, Outcome, Step};
use wrap_wallets::{ConnectionStatus, ErrorKind, SessionState, SubmissionState};

#[tokio::test]
async fn connect_then_wrap_one_ether() {
    let gateway = MockGateway::new();
    let session = gateway.session();
    let mut rx = session.subscribe();
    assert_eq!(session.snapshot().connection_status, ConnectionStatus::Disconnected);

    session.connect().await.unwrap();
    assert_eq!(session.snapshot().connection_status, ConnectionStatus::Connected);

    session.set_amount_input("1.0");
    let gate = gateway.gate(Step::Confirm);
    let (res, saw_pending) = tokio::join!(session.submit(), async {
        let mut saw_pending = false;
        loop {
            let state: SessionState = rx.borrow_and_update().clone();
            if state.submission.is_pending() && !saw_pending {
                saw_pending = true;
                gate.notify_one();
            }
            if matches!(state.submission, SubmissionState::Confirmed { .. })
                || rx.changed().await.is_err()
            {
                break;
            }
        }
        saw_pending
    });
    let receipt = res.unwrap();
    assert!(receipt.success);

    assert!(saw_pending, "never observed Pending");

    let state = session.snapshot();
    match &state.submission {
        SubmissionState::Confirmed { summary, receipt: r } => {
            assert_eq!(summary, "Successfully wrapped 1.0 ETH to WETH");
            assert_eq!(r, &receipt);
        }
        other => panic!("expected Confirmed, got {other:?}"),
    }
    assert_eq!(state.last_error, None);
}

#[tokio::test]
async fn zero_amount_is_rejected_before_the_provider() {
    let gateway = MockGateway::new();
    let session = gateway.session();
    session.connect().await.unwrap();
    let calls = gateway.total_calls();

    session.set_amount_input("0");
    let before = session.snapshot().submission;
    let err = session.submit().await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::InvalidAmount);
    assert_eq!(session.snapshot().submission, before);
    assert_eq!(gateway.total_calls(), calls);
    assert_eq!(gateway.calls(Step::Invoke), 0);
}

#[tokio::test]
async fn failed_confirmation_keeps_amount_for_retry() {
    let gateway = MockGateway::new();
    gateway.script(Step::Confirm, Outcome::Fail);
    let session = gateway.session();
    session.connect().await.unwrap();
    session.set_amount_input("0.75");

    let err = session.submit().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::ConfirmationFailed);
    assert_eq!(gateway.calls(Step::Invoke), 1);

    let state = session.snapshot();
    assert_eq!(state.submission, SubmissionState::Failed { error: err.clone() });
    assert_eq!(state.amount_input, "0.75");
    assert_eq!(state.connection_status, ConnectionStatus::Connected);
}

use crate::utils::{Invocation, MockGateway, Outcome, Step};
use alloy_primitives::U256;
use std::time::Duration;
use wrap_wallets::{
    DEPOSIT_SELECTOR, ErrorKind, SubmissionState, TransactionOrchestrator, TxHandle, WETH9,
    WrapSession,
};

async fn connected(gateway: &MockGateway) -> WrapSession {
    let session = gateway.session();
    session.connect().await.unwrap();
    session
}

#[tokio::test]
async fn submit_requires_connection() {
    let gateway = MockGateway::new();
    let session = gateway.session();
    session.set_amount_input("1");

    let err = session.submit().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::SubmissionFailed);
    assert_eq!(err.message, "Please connect your wallet first");

    let state = session.snapshot();
    assert_eq!(state.submission, SubmissionState::Idle);
    assert_eq!(state.last_error, Some(err));
    assert_eq!(gateway.total_calls(), 0);
}

#[tokio::test]
async fn submit_without_provider_prompts_to_connect() {
    let session = WrapSession::new(None);
    session.set_amount_input("1");
    assert_eq!(session.submit().await.unwrap_err().kind, ErrorKind::SubmissionFailed);
}

#[tokio::test]
async fn invalid_amounts_never_reach_the_provider() {
    let gateway = MockGateway::new();
    let session = connected(&gateway).await;
    let before = gateway.total_calls();

    for input in ["", "abc", "-1", "0.0", "1.1234567890123456789", "1e3"] {
        session.set_amount_input(input);
        let err = session.submit().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidAmount, "{input}");

        let state = session.snapshot();
        assert_eq!(state.submission, SubmissionState::Idle, "{input}");
        assert_eq!(state.amount_input, input);
    }
    assert_eq!(gateway.total_calls(), before);
}

#[tokio::test]
async fn deposits_exact_value_into_weth() {
    let gateway = MockGateway::new();
    let session = connected(&gateway).await;
    session.set_amount_input("2.5");

    session.submit().await.unwrap();

    similar_asserts::assert_eq!(
        gateway.invocations(),
        vec![Invocation {
            contract: WETH9,
            selector: DEPOSIT_SELECTOR,
            value: U256::from(2_500_000_000_000_000_000u64),
        }]
    );
}

#[tokio::test]
async fn rejects_submit_while_pending() {
    let gateway = MockGateway::new();
    let session = connected(&gateway).await;
    session.set_amount_input("1");
    let gate = gateway.gate(Step::Invoke);

    let (first, second) = tokio::join!(session.submit(), async {
        assert_eq!(session.snapshot().submission, SubmissionState::Pending { tx: None });
        let second = session.submit().await;
        gate.notify_one();
        second
    });

    let err = second.unwrap_err();
    assert_eq!(err.kind, ErrorKind::SubmissionFailed);
    assert_eq!(err.message, "A wrap transaction is already pending");
    assert!(first.is_ok());
    assert_eq!(gateway.calls(Step::Invoke), 1);

    let state = session.snapshot();
    assert!(matches!(state.submission, SubmissionState::Confirmed { .. }));
    assert_eq!(state.last_error, None);
}

#[tokio::test]
async fn pending_exposes_tx_handle_while_confirming() {
    let gateway = MockGateway::new();
    let session = connected(&gateway).await;
    session.set_amount_input("0.1");
    let gate = gateway.gate(Step::Confirm);

    let (res, ()) = tokio::join!(session.submit(), async {
        let mut rx = session.subscribe();
        let state = rx
            .wait_for(|s| matches!(s.submission, SubmissionState::Pending { tx: Some(_) }))
            .await
            .unwrap()
            .clone();
        let SubmissionState::Pending { tx: Some(tx) } = state.submission else { unreachable!() };
        assert_eq!(tx, TxHandle::new(alloy_primitives::B256::with_last_byte(1)));
        gate.notify_one();
    });

    assert_eq!(res.unwrap().tx_hash, alloy_primitives::B256::with_last_byte(1));
}

#[tokio::test]
async fn invoke_failure_is_submission_failed() {
    let gateway = MockGateway::new();
    gateway.script(Step::Invoke, Outcome::Reject);
    let session = connected(&gateway).await;
    session.set_amount_input("1");

    let err = session.submit().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::SubmissionFailed);
    assert_eq!(err.message, "Failed to wrap Ether: User rejected the request.");

    let state = session.snapshot();
    assert_eq!(state.submission, SubmissionState::Failed { error: err.clone() });
    assert_eq!(state.last_error, Some(err));
    assert_eq!(state.amount_input, "1");
    assert_eq!(gateway.calls(Step::Confirm), 0);
}

#[tokio::test]
async fn reverted_receipt_is_confirmation_failed() {
    let gateway = MockGateway::new();
    gateway.script(Step::Confirm, Outcome::Revert);
    let session = connected(&gateway).await;
    session.set_amount_input("1");

    let err = session.submit().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::ConfirmationFailed);
    assert!(err.message.contains("reverted"), "{}", err.message);
}

#[tokio::test(start_paused = true)]
async fn confirmation_timeout_fails_locally() {
    let gateway = MockGateway::new();
    let _gate = gateway.gate(Step::Confirm);
    let session = gateway.session_with(
        TransactionOrchestrator::new().with_confirmation_timeout(Some(Duration::from_secs(30))),
    );
    session.connect().await.unwrap();
    session.set_amount_input("1");

    let err = session.submit().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::ConfirmationFailed);
    assert!(err.message.contains("may still be mined"), "{}", err.message);
    assert!(err.message.contains("after 30s"), "{}", err.message);

    let state = session.snapshot();
    assert!(matches!(state.submission, SubmissionState::Failed { .. }));
    assert_eq!(state.amount_input, "1");
}

#[tokio::test(start_paused = true)]
async fn sub_second_timeout_is_reported_exactly() {
    let gateway = MockGateway::new();
    let _gate = gateway.gate(Step::Confirm);
    let session = gateway.session_with(
        TransactionOrchestrator::new().with_confirmation_timeout(Some(Duration::from_millis(250))),
    );
    session.connect().await.unwrap();
    session.set_amount_input("1");

    let err = session.submit().await.unwrap_err();
    assert!(err.message.contains("after 250ms"), "{}", err.message);
}

#[tokio::test(start_paused = true)]
async fn dropped_submit_while_confirming_can_be_retried() {
    let gateway = MockGateway::new();
    let gate = gateway.gate(Step::Confirm);
    let session = connected(&gateway).await;
    session.set_amount_input("1");

    let res = tokio::time::timeout(Duration::from_millis(50), session.submit()).await;
    assert!(res.is_err());

    let state = session.snapshot();
    let SubmissionState::Failed { error } = &state.submission else {
        panic!("expected Failed, got {:?}", state.submission);
    };
    assert_eq!(error.kind, ErrorKind::ConfirmationFailed);
    assert!(error.message.contains("may still be mined"), "{}", error.message);
    assert_eq!(state.last_error.as_ref(), Some(error));
    assert_eq!(state.amount_input, "1");

    gate.notify_one();
    session.submit().await.unwrap();
    assert!(matches!(session.snapshot().submission, SubmissionState::Confirmed { .. }));
    assert_eq!(gateway.calls(Step::Invoke), 2);
}

#[tokio::test(start_paused = true)]
async fn dropped_submit_before_broadcast_is_submission_failed() {
    let gateway = MockGateway::new();
    let gate = gateway.gate(Step::Invoke);
    let session = connected(&gateway).await;
    session.set_amount_input("1");

    let res = tokio::time::timeout(Duration::from_millis(50), session.submit()).await;
    assert!(res.is_err());

    let state = session.snapshot();
    let SubmissionState::Failed { error } = state.submission else {
        panic!("expected Failed");
    };
    assert_eq!(error.kind, ErrorKind::SubmissionFailed);
    assert!(gateway.invocations().is_empty());

    gate.notify_one();
    session.submit().await.unwrap();
    assert_eq!(gateway.invocations().len(), 1);
}

#[tokio::test]
async fn retry_after_failure_confirms() {
    let gateway = MockGateway::new();
    gateway.script(Step::Confirm, Outcome::Fail);
    let session = connected(&gateway).await;
    session.set_amount_input("3");

    session.submit().await.unwrap_err();
    assert!(matches!(session.snapshot().submission, SubmissionState::Failed { .. }));

    gateway.script(Step::Confirm, Outcome::Succeed);
    session.submit().await.unwrap();

    let state = session.snapshot();
    assert!(matches!(state.submission, SubmissionState::Confirmed { .. }));
    assert_eq!(state.last_error, None);
    assert_eq!(gateway.calls(Step::Invoke), 2);
}

#[tokio::test]
async fn resubmit_after_confirmation() {
    let gateway = MockGateway::new();
    let session = connected(&gateway).await;
    session.set_amount_input("1");
    session.submit().await.unwrap();

    session.set_amount_input("2");
    session.submit().await.unwrap();

    let SubmissionState::Confirmed { summary, .. } = session.snapshot().submission else {
        panic!("expected confirmation");
    };
    assert_eq!(summary, "Successfully wrapped 2 ETH to WETH");
    assert_eq!(gateway.invocations().len(), 2);
}

#[tokio::test]
async fn validation_error_does_not_disturb_previous_result() {
    let gateway = MockGateway::new();
    let session = connected(&gateway).await;
    session.set_amount_input("1");
    session.submit().await.unwrap();
    let confirmed = session.snapshot().submission;

    session.set_amount_input("nope");
    session.submit().await.unwrap_err();

    let state = session.snapshot();
    assert_eq!(state.submission, confirmed);
    assert_eq!(state.last_error.map(|e| e.kind), Some(ErrorKind::InvalidAmount));
}

use std::sync::Arc;

use basket_shared::push::{CLICK_ACTION, MAX_MULTICAST_TOKENS};
use basket_shared::test_utils::mock_push_dispatcher::MockPushDispatcher;
use basket_shared::test_utils::test_logging::init_test_logging;

use super::tokens;
use crate::operation::NotificationFanoutOperation;

fn operation(
    dispatcher: &Arc<MockPushDispatcher>,
) -> NotificationFanoutOperation<MockPushDispatcher> {
    init_test_logging();
    NotificationFanoutOperation::new(dispatcher.clone())
}

#[tokio::test]
async fn test_notify_reports_counts() {
    let dispatcher = Arc::new(MockPushDispatcher::with_failing_tokens(&["tok2"]));

    let batch = operation(&dispatcher)
        .notify("Hi", "Body", tokens(&["tok1", "tok2"]), "general", Some("u1"))
        .await
        .unwrap();

    assert_eq!(batch.success_count, 1);
    assert_eq!(batch.failure_count, 1);
    assert!(batch.responses[0].success);
    assert_eq!(batch.responses[1].token, "tok2");
    assert!(!batch.responses[1].success);
    assert_eq!(dispatcher.call_count(), 1);
}

#[tokio::test]
async fn test_notify_builds_single_multicast() {
    let dispatcher = Arc::new(MockPushDispatcher::new());

    operation(&dispatcher)
        .notify("Hi", "Body", tokens(&["tok1", "tok2", "tok3"]), "general", Some("u1"))
        .await
        .unwrap();

    let sent = dispatcher.sent_messages();
    assert_eq!(sent.len(), 1);
    let message = &sent[0];
    assert_eq!(message.tokens, tokens(&["tok1", "tok2", "tok3"]));
    assert_eq!(message.payload.notification.title, "Hi");
    assert_eq!(message.payload.notification.body, "Body");
    assert_eq!(
        message.payload.android.as_ref().unwrap().notification.channel_id,
        "general"
    );
    assert_eq!(message.payload.data["click_action"], CLICK_ACTION);
}

#[tokio::test]
async fn test_empty_tokens_is_invalid_argument() {
    let dispatcher = Arc::new(MockPushDispatcher::new());

    let err = operation(&dispatcher)
        .notify("Hi", "Body", vec![], "general", Some("u1"))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "invalid-argument");
    assert_eq!(err.to_string(), "No FCM tokens provided.");
    assert_eq!(dispatcher.call_count(), 0);
}

#[tokio::test]
async fn test_unauthenticated_makes_no_dispatch() {
    let dispatcher = Arc::new(MockPushDispatcher::new());
    let op = operation(&dispatcher);

    for caller in [None, Some("")] {
        let err = op
            .notify("Hi", "Body", tokens(&["tok1"]), "general", caller)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "unauthenticated");
    }

    assert_eq!(dispatcher.call_count(), 0);
}

#[tokio::test]
async fn test_too_many_tokens_is_invalid_argument() {
    let dispatcher = Arc::new(MockPushDispatcher::new());
    let op = operation(&dispatcher);

    let at_limit: Vec<String> = (0..MAX_MULTICAST_TOKENS).map(|i| format!("tok{}", i)).collect();
    let batch = op
        .notify("Hi", "Body", at_limit, "general", Some("u1"))
        .await
        .unwrap();
    assert_eq!(batch.success_count, MAX_MULTICAST_TOKENS);

    let over_limit: Vec<String> = (0..=MAX_MULTICAST_TOKENS)
        .map(|i| format!("tok{}", i))
        .collect();
    let err = op
        .notify("Hi", "Body", over_limit, "general", Some("u1"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "invalid-argument");
    assert_eq!(dispatcher.call_count(), 1);
}

#[tokio::test]
async fn test_transport_failure_is_unknown() {
    let dispatcher = Arc::new(MockPushDispatcher::new_error());

    let err = operation(&dispatcher)
        .notify("Hi", "Body", tokens(&["tok1"]), "general", Some("u1"))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "unknown");
    assert!(err.to_string().starts_with("Failed to send notifications:"));
    assert_eq!(dispatcher.call_count(), 1);
}

#[tokio::test]
async fn test_all_tokens_failing_still_succeeds() {
    let dispatcher = Arc::new(MockPushDispatcher::with_failing_tokens(&["tok1", "tok2"]));

    let batch = operation(&dispatcher)
        .notify("Hi", "Body", tokens(&["tok1", "tok2"]), "", Some("u1"))
        .await
        .unwrap();

    assert_eq!(batch.success_count, 0);
    assert_eq!(batch.failure_count, 2);
    assert!(dispatcher.sent_messages()[0].payload.android.is_none());
}

use std::sync::Arc;

use basket_shared::test_utils::mock_basket_store::MockBasketStore;
use basket_shared::test_utils::test_logging::init_test_logging;

use super::basket;
use crate::operation::BasketJoinOperation;

fn operation(store: &Arc<MockBasketStore>) -> BasketJoinOperation<MockBasketStore> {
    init_test_logging();
    BasketJoinOperation::new(store.clone())
}

#[tokio::test]
async fn test_join_adds_new_member() {
    let store = Arc::new(MockBasketStore::with_data(vec![basket(
        "basket-1",
        "ABC123",
        &["u1"],
    )]));

    let joined = operation(&store)
        .join("ABC123", Some("u2"), None)
        .await
        .unwrap();

    assert_eq!(joined.basket_id, "basket-1");
    assert_eq!(joined.basket.member_ids, vec!["u1", "u2"]);
    assert_eq!(store.basket("basket-1").unwrap().member_ids, vec!["u1", "u2"]);
}

#[tokio::test]
async fn test_join_records_token_with_new_member() {
    let store = Arc::new(MockBasketStore::with_data(vec![basket(
        "basket-1",
        "ABC123",
        &["u1"],
    )]));

    let joined = operation(&store)
        .join("ABC123", Some("u2"), Some("fcm-token-u2"))
        .await
        .unwrap();

    assert_eq!(joined.basket.member_tokens, vec!["fcm-token-u2"]);
}

#[tokio::test]
async fn test_empty_token_is_ignored() {
    let store = Arc::new(MockBasketStore::with_data(vec![basket(
        "basket-1",
        "ABC123",
        &[],
    )]));

    let joined = operation(&store)
        .join("ABC123", Some("u2"), Some(""))
        .await
        .unwrap();

    assert_eq!(joined.basket.member_ids, vec!["u2"]);
    assert!(joined.basket.member_tokens.is_empty());
}

#[tokio::test]
async fn test_rejoin_is_noop() {
    let store = Arc::new(MockBasketStore::with_data(vec![basket(
        "basket-1",
        "ABC123",
        &["u1", "u2"],
    )]));
    let op = operation(&store);

    for _ in 0..3 {
        let joined = op
            .join("ABC123", Some("u1"), Some("another-device"))
            .await
            .unwrap();
        assert_eq!(joined.basket.member_ids, vec!["u1", "u2"]);
    }

    // Identity-keyed: no write happened and the new token was not recorded
    assert_eq!(store.write_count(), 0);
    let stored = store.basket("basket-1").unwrap();
    assert_eq!(stored.member_ids, vec!["u1", "u2"]);
    assert!(stored.member_tokens.is_empty());
}

#[tokio::test]
async fn test_join_leaves_other_members_untouched() {
    let members = ["a", "b", "c", "d"];
    let store = Arc::new(MockBasketStore::with_data(vec![basket("basket-1", "CODE", &members)]));

    let joined = operation(&store)
        .join("CODE", Some("e"), None)
        .await
        .unwrap();

    assert_eq!(joined.basket.member_ids, vec!["a", "b", "c", "d", "e"]);
}

#[tokio::test]
async fn test_unknown_code_is_not_found() {
    let store = Arc::new(MockBasketStore::with_data(vec![basket(
        "basket-1",
        "ABC123",
        &["u1"],
    )]));

    let err = operation(&store)
        .join("ZZZ999", Some("u1"), None)
        .await
        .unwrap_err();

    assert_eq!(err.code(), "not-found");
    assert_eq!(err.to_string(), "No basket found with this invitation code.");
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_unauthenticated_makes_no_store_calls() {
    let store = Arc::new(MockBasketStore::with_data(vec![basket(
        "basket-1",
        "ABC123",
        &[],
    )]));
    let op = operation(&store);

    for caller in [None, Some("")] {
        let err = op.join("ABC123", caller, None).await.unwrap_err();
        assert_eq!(err.code(), "unauthenticated");
    }

    assert_eq!(store.read_count(), 0);
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_blank_code_is_invalid_argument() {
    let store = Arc::new(MockBasketStore::new());

    let err = operation(&store)
        .join("   ", Some("u1"), None)
        .await
        .unwrap_err();

    assert_eq!(err.code(), "invalid-argument");
    assert_eq!(store.read_count(), 0);
}

#[tokio::test]
async fn test_padded_code_is_not_trimmed() {
    let store = Arc::new(MockBasketStore::with_data(vec![basket(
        "basket-1",
        "ABC123",
        &[],
    )]));
    let op = operation(&store);

    for code in [" ABC123", "ABC123\t", "ABC123 "] {
        let err = op.join(code, Some("u1"), None).await.unwrap_err();
        assert_eq!(err.code(), "not-found");
    }
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_code_with_whitespace_matches_exactly() {
    let store = Arc::new(MockBasketStore::with_data(vec![basket(
        "basket-1",
        "ABC123 ",
        &["u1"],
    )]));

    let joined = operation(&store)
        .join("ABC123 ", Some("u2"), None)
        .await
        .unwrap();

    assert_eq!(joined.basket_id, "basket-1");
    assert_eq!(joined.basket.member_ids, vec!["u1", "u2"]);
}

#[tokio::test]
async fn test_ambiguous_code_is_refused() {
    let store = Arc::new(MockBasketStore::with_data(vec![
        basket("basket-1", "DUP", &[]),
        basket("basket-2", "DUP", &[]),
    ]));

    let err = operation(&store)
        .join("DUP", Some("u1"), None)
        .await
        .unwrap_err();

    assert_eq!(err.code(), "unknown");
    assert!(err.to_string().contains("not unique"));
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_store_failure_is_unknown() {
    let store = Arc::new(MockBasketStore::new_error());

    let err = operation(&store)
        .join("ABC123", Some("u1"), None)
        .await
        .unwrap_err();

    assert_eq!(err.code(), "unknown");
    assert!(err.to_string().starts_with("Error fetching basket:"));
}

#[tokio::test]
async fn test_lost_race_returns_current_basket() {
    let store = Arc::new(MockBasketStore::with_lost_race(vec![basket(
        "basket-1",
        "ABC123",
        &["u1"],
    )]));

    let joined = operation(&store)
        .join("ABC123", Some("u2"), None)
        .await
        .unwrap();

    // The winning request already stored u2; we re-read instead of writing again
    assert_eq!(joined.basket.member_ids, vec!["u1", "u2"]);
    assert_eq!(store.write_count(), 1);
    assert_eq!(store.read_count(), 2);
}

#[tokio::test]
async fn test_concurrent_joins_add_member_once() {
    let store = Arc::new(MockBasketStore::with_data(vec![basket(
        "basket-1",
        "ABC123",
        &["u1"],
    )]));
    let op = Arc::new(operation(&store));

    let mut handles = Vec::new();
    for _ in 0..10 {
        let op = op.clone();
        handles.push(tokio::spawn(async move {
            op.join("ABC123", Some("u2"), Some("tok")).await
        }));
    }
    for handle in handles {
        let joined = handle.await.unwrap().unwrap();
        assert!(joined.basket.has_member("u2"));
    }

    let stored = store.basket("basket-1").unwrap();
    assert_eq!(stored.member_ids, vec!["u1", "u2"]);
    assert_eq!(stored.member_tokens, vec!["tok"]);
}

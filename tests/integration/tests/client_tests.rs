//! Optimistic toggle client against a running server
//!
//! Run with: cargo test -p integration-tests --test client_tests

use std::sync::Arc;

use integration_tests::{post, unique_user, TestServer};
use manada_client::{HttpReactionBackend, Identity, OptimisticToggle, ToggleError};
use manada_core::{collections, DocId, ReactionTarget};

async fn setup(likes: i64) -> (TestServer, OptimisticToggle, DocId, Identity) {
    let server = TestServer::start().await.unwrap();
    let owner = unique_user("owner");
    let fan = unique_user("fan");
    let post_id = DocId::generate();
    server.seed(&post(&post_id, &owner, likes)).await.unwrap();

    let backend = Arc::new(HttpReactionBackend::new(server.base_url()));
    let toggle = OptimisticToggle::new(ReactionTarget::POST_LIKES, backend);
    let identity = Identity::with_token(fan.clone(), server.token(&fan).unwrap());
    (server, toggle, post_id, identity)
}

#[tokio::test]
async fn test_toggle_round_trip() {
    let (server, toggle, post_id, identity) = setup(3).await;

    let liked = toggle.toggle(&post_id, Some(&identity), None).await.unwrap();
    assert_eq!(liked.count, 4);
    assert!(liked.has_reacted());
    assert_eq!(
        server
            .state
            .service_context()
            .marker_repo()
            .count_for(&ReactionTarget::POST_LIKES, &post_id)
            .await
            .unwrap(),
        1
    );

    let unliked = toggle.toggle(&post_id, Some(&identity), None).await.unwrap();
    assert_eq!(unliked.count, 3);
    assert!(!unliked.has_reacted());

    let err = toggle.remove(&post_id, Some(&identity)).await.unwrap_err();
    assert!(matches!(err, ToggleError::NotReacted));
}

#[tokio::test]
async fn test_rejected_write_rolls_back() {
    let (server, toggle, post_id, identity) = setup(7).await;
    let before = toggle.hydrate(&post_id, &identity).await.unwrap();
    assert_eq!(before.count, 7);

    // The parent disappears between load and click
    server
        .state
        .service_context()
        .document_repo()
        .delete(collections::POSTS, &post_id)
        .await
        .unwrap();

    let err = toggle.toggle(&post_id, Some(&identity), None).await.unwrap_err();
    match err {
        ToggleError::Backend(e) => assert_eq!(e.status(), Some(404)),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(toggle.state(&post_id, &identity.user_id), Some(before));
    assert!(!toggle.is_pending(&post_id, &identity.user_id));
}

#[tokio::test]
async fn test_anonymous_toggle_refused() {
    let (_server, toggle, post_id, _identity) = setup(0).await;
    let err = toggle.toggle(&post_id, None, None).await.unwrap_err();
    assert!(matches!(err, ToggleError::Unauthenticated));
}

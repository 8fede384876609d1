//! API integration tests over real HTTP
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_json, assert_status, post, unique_user, AdActionRequest, AdBody, CreateAdRequest,
    Envelope, NotificationBody, TestServer, ADMIN_ID,
};
use manada_core::DocId;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.unwrap();

    let response = server.get("/health").await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server.get("/health/ready").await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_request_id_header() {
    let server = TestServer::start().await.unwrap();
    let response = server.get("/api/ads").await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_like_creates_one_notification() {
    let server = TestServer::start().await.unwrap();
    let owner = unique_user("owner");
    let fan = unique_user("fan");
    let post_id = DocId::generate();
    server.seed(&post(&post_id, &owner, 3)).await.unwrap();

    let path = format!("/api/reactions/post_likes/{post_id}/@me/toggle");
    let token = server.token(&fan).unwrap();
    let response = server.post_empty_auth(&path, &token).await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["data"]["count"], 4);

    let owner_token = server.token(&owner).unwrap();
    let response = server.get_auth("/api/notifications", &owner_token).await.unwrap();
    let list: Envelope<Vec<NotificationBody>> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(list.data.len(), 1);
    assert_eq!(list.data[0].notification_type, "new_like");
    assert_eq!(list.data[0].from_user_id, fan.as_str());
    assert!(!list.data[0].id.is_empty());
}

#[tokio::test]
async fn test_ad_status_guard() {
    let server = TestServer::start().await.unwrap();
    let advertiser = unique_user("adv");
    let adv_token = server.token(&advertiser).unwrap();
    let admin_token = server.token(&DocId::parse(ADMIN_ID).unwrap()).unwrap();

    let response = server
        .post_auth("/api/ads", &adv_token, &CreateAdRequest::unique())
        .await
        .unwrap();
    let created: Envelope<AdBody> = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(created.data.status, "pending");
    let path = format!("/api/ads/{}", created.data.id);

    let response = server
        .patch_auth(&path, &admin_token, &AdActionRequest::new("approve"))
        .await
        .unwrap();
    let approved: Envelope<AdBody> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(approved.data.status, "approved");

    let response = server
        .patch_auth(&path, &admin_token, &AdActionRequest::new("approve"))
        .await
        .unwrap();
    let error: Value = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(error["error"]["code"], "INVALID_STATUS_TRANSITION");

    let response = server.get(&path).await.unwrap();
    let current: Envelope<AdBody> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(current.data.status, "approved");
}

#[tokio::test]
async fn test_error_envelope_on_unknown_target() {
    let server = TestServer::start().await.unwrap();
    let response = server.get("/api/reactions/stickers/p1").await.unwrap();
    let body: Value = assert_json(response, StatusCode::NOT_FOUND).await.unwrap();
    assert!(body["error"]["message"].is_string());
}

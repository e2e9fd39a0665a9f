use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::app;
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, "Bearer test-key")
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn missing_bearer_token_returns_401() {
    let app = app();
    let resp = app
        .oneshot(Request::builder().uri("/inboxes").body(String::new()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn empty_bearer_token_returns_401() {
    let app = app();
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/inboxes")
                .header(http::header::AUTHORIZATION, "Bearer ")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- inboxes ---

#[tokio::test]
async fn list_inboxes_empty() {
    let app = app();
    let resp = app
        .oneshot(request("GET", "/inboxes", ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["inboxes"], serde_json::json!([]));
    assert_eq!(body["count"], 0);
    assert!(body.get("next_page_token").is_none());
}

#[tokio::test]
async fn create_inbox_returns_201_with_address() {
    let app = app();
    let resp = app
        .oneshot(request(
            "POST",
            "/inboxes",
            r#"{"name":"Dev","metadata":{"device_id":"abc123"}}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["name"], "Dev");
    assert!(body["inbox_id"].as_str().unwrap().ends_with("@agentmail.to"));
    assert_eq!(body["inbox_id"], body["address"]);
    assert_eq!(body["metadata"]["device_id"], "abc123");
    assert!(body["created_at"].as_str().unwrap().contains('T'));
}

#[tokio::test]
async fn get_inbox_not_found() {
    let app = app();
    let resp = app
        .oneshot(request("GET", "/inboxes/missing@agentmail.to", ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_inbox_not_found() {
    let app = app();
    let resp = app
        .oneshot(request("DELETE", "/inboxes/missing@agentmail.to", ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- messages ---

#[tokio::test]
async fn list_messages_for_unknown_inbox_returns_404() {
    let app = app();
    let resp = app
        .oneshot(request("GET", "/inboxes/missing@agentmail.to/messages", ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn send_without_recipient_is_rejected() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("POST", "/inboxes", "{}"))
        .await
        .unwrap();
    let inbox_id = body_json(resp).await["inbox_id"].as_str().unwrap().to_string();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request(
            "POST",
            &format!("/inboxes/{inbox_id}/messages/send"),
            r#"{"subject":"no recipient"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- full lifecycle ---

#[tokio::test]
async fn inbox_and_message_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create inbox
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("POST", "/inboxes", r#"{"name":"Lifecycle"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let inbox = body_json(resp).await;
    let inbox_id = inbox["inbox_id"].as_str().unwrap().to_string();

    // update name
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request(
            "PATCH",
            &format!("/inboxes/{inbox_id}"),
            r#"{"name":"Renamed"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["name"], "Renamed");

    // send a message
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request(
            "POST",
            &format!("/inboxes/{inbox_id}/messages/send"),
            r#"{"to":"user@example.com","subject":"Hi","body_text":"Hello"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let sent = body_json(resp).await;
    let message_id = sent["message_id"].as_str().unwrap().to_string();
    let thread_id = sent["thread_id"].as_str().unwrap().to_string();
    assert!(message_id.starts_with("msg_"));

    // list — one unread message with the send fields mapped
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request(
            "GET",
            &format!("/inboxes/{inbox_id}/messages?limit=20&unread=true"),
            "",
        ))
        .await
        .unwrap();
    let listing = body_json(resp).await;
    assert_eq!(listing["count"], 1);
    assert_eq!(listing["messages"][0]["message_id"], message_id.as_str());
    assert_eq!(listing["messages"][0]["text"], "Hello");
    assert_eq!(listing["messages"][0]["is_read"], false);

    // mark read, then the unread filter excludes it
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request(
            "PATCH",
            &format!("/inboxes/{inbox_id}/messages/{message_id}"),
            r#"{"is_read":true}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["is_read"], true);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request(
            "GET",
            &format!("/inboxes/{inbox_id}/messages?unread=true"),
            "",
        ))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["count"], 0);

    // reply joins the same thread
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request(
            "POST",
            &format!("/inboxes/{inbox_id}/messages/{message_id}/reply"),
            r#"{"text":"Thanks"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let reply = body_json(resp).await;
    assert_eq!(reply["thread_id"], thread_id.as_str());

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request(
            "GET",
            &format!("/inboxes/{inbox_id}/messages?thread_id={thread_id}"),
            "",
        ))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["count"], 2);

    // raw MIME carries the headers and body
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request(
            "GET",
            &format!("/inboxes/{inbox_id}/messages/{message_id}/raw"),
            "",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let raw = body_text(resp).await;
    assert!(raw.contains("Subject: Hi"));
    assert!(raw.contains("Hello"));

    // delete the message, then the inbox
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request(
            "DELETE",
            &format!("/inboxes/{inbox_id}/messages/{message_id}"),
            "",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("DELETE", &format!("/inboxes/{inbox_id}"), ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", &format!("/inboxes/{inbox_id}"), ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- pagination ---

#[tokio::test]
async fn inbox_pagination_walks_with_cursors() {
    use tower::Service;

    let mut app = app().into_service();
    for i in 0..3 {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(request("POST", "/inboxes", &format!(r#"{{"name":"inbox {i}"}}"#)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", "/inboxes?limit=2", ""))
        .await
        .unwrap();
    let first = body_json(resp).await;
    assert_eq!(first["inboxes"].as_array().unwrap().len(), 2);
    assert_eq!(first["count"], 3);
    let cursor = first["next_page_token"].as_str().unwrap().to_string();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", &format!("/inboxes?limit=2&cursor={cursor}"), ""))
        .await
        .unwrap();
    let second = body_json(resp).await;
    assert_eq!(second["inboxes"].as_array().unwrap().len(), 1);
    assert!(second.get("next_page_token").is_none());
}

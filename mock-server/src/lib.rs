//! In-memory mock of the AgentMail v0 REST surface.
//!
//! Serves the endpoints the client consumes: inbox CRUD, message
//! list/get/send/reply/mark-read/delete, and raw MIME. Every route sits
//! behind a bearer-token check so the auth error path is exercisable.
//! Pagination uses numeric offset cursors surfaced as `next_page_token`.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize)]
pub struct Inbox {
    pub inbox_id: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Message {
    pub message_id: String,
    pub thread_id: String,
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    pub created_at: String,
    pub is_read: bool,
}

/// Payload for inbox create and update; both accept the same fields.
#[derive(Deserialize)]
pub struct InboxPatch {
    pub name: Option<String>,
    pub metadata: Option<Value>,
}

#[derive(Deserialize)]
pub struct SendMessage {
    pub to: String,
    pub subject: Option<String>,
    pub body_text: Option<String>,
    pub body_html: Option<String>,
    pub thread_id: Option<String>,
}

#[derive(Deserialize)]
pub struct Reply {
    pub to: Option<String>,
    pub subject: Option<String>,
    pub text: Option<String>,
    pub html: Option<String>,
}

#[derive(Deserialize)]
pub struct ReadFlag {
    pub is_read: bool,
}

#[derive(Deserialize)]
pub struct PageParams {
    pub limit: Option<usize>,
    pub cursor: Option<String>,
}

#[derive(Deserialize)]
pub struct MessageParams {
    pub limit: Option<usize>,
    pub cursor: Option<String>,
    pub unread: Option<bool>,
    pub thread_id: Option<String>,
}

#[derive(Default)]
pub struct Store {
    inboxes: Vec<Inbox>,
    messages: HashMap<String, Vec<Message>>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/inboxes", post(create_inbox).get(list_inboxes))
        .route(
            "/inboxes/{inbox_id}",
            get(get_inbox).patch(update_inbox).delete(delete_inbox),
        )
        .route("/inboxes/{inbox_id}/messages", get(list_messages))
        .route("/inboxes/{inbox_id}/messages/send", post(send_message))
        .route(
            "/inboxes/{inbox_id}/messages/{message_id}",
            get(get_message).patch(mark_read).delete(delete_message),
        )
        .route(
            "/inboxes/{inbox_id}/messages/{message_id}/reply",
            post(reply_message),
        )
        .route(
            "/inboxes/{inbox_id}/messages/{message_id}/raw",
            get(raw_message),
        )
        .layer(middleware::from_fn(require_bearer))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_bearer(request: Request, next: Next) -> Result<Response, StatusCode> {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|token| !token.is_empty());
    if !authorized {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(request).await)
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn new_address() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{}@agentmail.to", &id[..12])
}

/// Offset pagination over an in-order slice; the cursor is the next offset.
fn paginate<T: Clone>(items: &[T], limit: Option<usize>, cursor: Option<&str>) -> (Vec<T>, Option<String>) {
    let limit = limit.unwrap_or(20).clamp(1, 100);
    let start = cursor
        .and_then(|c| c.parse::<usize>().ok())
        .unwrap_or(0)
        .min(items.len());
    let end = (start + limit).min(items.len());
    let next = (end < items.len()).then(|| end.to_string());
    (items[start..end].to_vec(), next)
}

// ---------------------------------------------------------------------------
// Inbox handlers
// ---------------------------------------------------------------------------

async fn create_inbox(
    State(db): State<Db>,
    Json(input): Json<InboxPatch>,
) -> (StatusCode, Json<Inbox>) {
    let address = new_address();
    let inbox = Inbox {
        inbox_id: address.clone(),
        address,
        name: input.name,
        created_at: now(),
        metadata: input.metadata,
    };
    let mut store = db.write().await;
    store.messages.insert(inbox.inbox_id.clone(), Vec::new());
    store.inboxes.push(inbox.clone());
    (StatusCode::CREATED, Json(inbox))
}

async fn list_inboxes(State(db): State<Db>, Query(params): Query<PageParams>) -> Json<Value> {
    let store = db.read().await;
    let (page, next) = paginate(&store.inboxes, params.limit, params.cursor.as_deref());
    let mut body = json!({ "inboxes": page, "count": store.inboxes.len() });
    if let Some(next) = next {
        body["next_page_token"] = json!(next);
    }
    Json(body)
}

async fn get_inbox(
    State(db): State<Db>,
    Path(inbox_id): Path<String>,
) -> Result<Json<Inbox>, StatusCode> {
    let store = db.read().await;
    store
        .inboxes
        .iter()
        .find(|i| i.inbox_id == inbox_id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_inbox(
    State(db): State<Db>,
    Path(inbox_id): Path<String>,
    Json(input): Json<InboxPatch>,
) -> Result<Json<Inbox>, StatusCode> {
    let mut store = db.write().await;
    let inbox = store
        .inboxes
        .iter_mut()
        .find(|i| i.inbox_id == inbox_id)
        .ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = input.name {
        inbox.name = Some(name);
    }
    if let Some(metadata) = input.metadata {
        inbox.metadata = Some(metadata);
    }
    Ok(Json(inbox.clone()))
}

async fn delete_inbox(
    State(db): State<Db>,
    Path(inbox_id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    let before = store.inboxes.len();
    store.inboxes.retain(|i| i.inbox_id != inbox_id);
    if store.inboxes.len() == before {
        return Err(StatusCode::NOT_FOUND);
    }
    store.messages.remove(&inbox_id);
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Message handlers
// ---------------------------------------------------------------------------

async fn list_messages(
    State(db): State<Db>,
    Path(inbox_id): Path<String>,
    Query(params): Query<MessageParams>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    let all = store.messages.get(&inbox_id).ok_or(StatusCode::NOT_FOUND)?;
    let filtered: Vec<Message> = all
        .iter()
        .filter(|m| !params.unread.unwrap_or(false) || !m.is_read)
        .filter(|m| params.thread_id.as_deref().map_or(true, |t| m.thread_id == t))
        .cloned()
        .collect();
    let (page, next) = paginate(&filtered, params.limit, params.cursor.as_deref());
    let mut body = json!({ "messages": page, "count": filtered.len() });
    if let Some(next) = next {
        body["next_page_token"] = json!(next);
    }
    Ok(Json(body))
}

async fn send_message(
    State(db): State<Db>,
    Path(inbox_id): Path<String>,
    Json(input): Json<SendMessage>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let mut store = db.write().await;
    let messages = store
        .messages
        .get_mut(&inbox_id)
        .ok_or(StatusCode::NOT_FOUND)?;
    let message = Message {
        message_id: format!("msg_{}", Uuid::new_v4().simple()),
        thread_id: input
            .thread_id
            .unwrap_or_else(|| format!("thread_{}", Uuid::new_v4().simple())),
        from: inbox_id.clone(),
        to: input.to,
        subject: input.subject,
        text: input.body_text,
        html: input.body_html,
        created_at: now(),
        is_read: false,
    };
    let body = json!({ "message_id": message.message_id, "thread_id": message.thread_id });
    messages.push(message);
    Ok((StatusCode::CREATED, Json(body)))
}

async fn get_message(
    State(db): State<Db>,
    Path((inbox_id, message_id)): Path<(String, String)>,
) -> Result<Json<Message>, StatusCode> {
    let store = db.read().await;
    store
        .messages
        .get(&inbox_id)
        .and_then(|messages| messages.iter().find(|m| m.message_id == message_id))
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn mark_read(
    State(db): State<Db>,
    Path((inbox_id, message_id)): Path<(String, String)>,
    Json(input): Json<ReadFlag>,
) -> Result<Json<Message>, StatusCode> {
    let mut store = db.write().await;
    let messages = store
        .messages
        .get_mut(&inbox_id)
        .ok_or(StatusCode::NOT_FOUND)?;
    let message = messages
        .iter_mut()
        .find(|m| m.message_id == message_id)
        .ok_or(StatusCode::NOT_FOUND)?;
    message.is_read = input.is_read;
    Ok(Json(message.clone()))
}

async fn delete_message(
    State(db): State<Db>,
    Path((inbox_id, message_id)): Path<(String, String)>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    let messages = store
        .messages
        .get_mut(&inbox_id)
        .ok_or(StatusCode::NOT_FOUND)?;
    let before = messages.len();
    messages.retain(|m| m.message_id != message_id);
    if messages.len() == before {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn reply_message(
    State(db): State<Db>,
    Path((inbox_id, message_id)): Path<(String, String)>,
    Json(input): Json<Reply>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let mut store = db.write().await;
    let messages = store
        .messages
        .get_mut(&inbox_id)
        .ok_or(StatusCode::NOT_FOUND)?;
    let original = messages
        .iter()
        .find(|m| m.message_id == message_id)
        .cloned()
        .ok_or(StatusCode::NOT_FOUND)?;
    let reply = Message {
        message_id: format!("msg_{}", Uuid::new_v4().simple()),
        thread_id: original.thread_id,
        from: inbox_id.clone(),
        to: input.to.unwrap_or(original.from),
        subject: input.subject.or(original.subject),
        text: input.text,
        html: input.html,
        created_at: now(),
        is_read: false,
    };
    let body = json!({ "message_id": reply.message_id, "thread_id": reply.thread_id });
    messages.push(reply);
    Ok((StatusCode::CREATED, Json(body)))
}

async fn raw_message(
    State(db): State<Db>,
    Path((inbox_id, message_id)): Path<(String, String)>,
) -> Result<String, StatusCode> {
    let store = db.read().await;
    let message = store
        .messages
        .get(&inbox_id)
        .and_then(|messages| messages.iter().find(|m| m.message_id == message_id))
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(format!(
        "From: {}\r\nTo: {}\r\nSubject: {}\r\nDate: {}\r\nMessage-ID: <{}>\r\n\r\n{}",
        message.from,
        message.to,
        message.subject.as_deref().unwrap_or(""),
        message.created_at,
        message.message_id,
        message.text.as_deref().unwrap_or(""),
    ))
}

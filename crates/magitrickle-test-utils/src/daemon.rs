//! In-process stand-in for the MagiTrickle daemon.
//!
//! Serves HTTP/1.1 on a Unix socket inside a temp directory that is removed
//! when the [`FakeDaemon`] is dropped.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::net::UnixListener;
use tokio::sync::oneshot;
use tracing::debug;

// ── Recorded traffic ────────────────────────────────────────────────

/// One request as seen on the wire.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path plus query string, e.g. `/api/v1/groups/g1?save=true`.
    pub uri: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// The body parsed as JSON, or `Value::Null` when empty or invalid.
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn query(&self) -> Option<&str> {
        self.uri.split_once('?').map(|(_, q)| q)
    }
}

// ── Scripted replies ────────────────────────────────────────────────

/// A canned response that overrides the in-memory model for one request.
#[derive(Debug, Clone)]
pub struct Reply {
    status: StatusCode,
    body: Option<Vec<u8>>,
    delay: Option<Duration>,
}

impl Reply {
    pub fn json(status: u16, value: &Value) -> Self {
        Self::raw(status, value.to_string())
    }

    pub fn raw(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: status_from(status),
            body: Some(body.into()),
            delay: None,
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status: status_from(status),
            body: None,
            delay: None,
        }
    }

    /// `{"error": message}` with the given status.
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, &json!({ "error": message }))
    }

    /// Hold the response back for `delay` before answering.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self.body {
            Some(body) => (self.status, [(CONTENT_TYPE, "application/json")], body).into_response(),
            None => self.status.into_response(),
        }
    }
}

fn status_from(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

// ── In-memory model ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
struct RuleRecord {
    id: String,
    name: String,
    #[serde(rename = "type")]
    rule_type: String,
    rule: String,
    enable: bool,
}

#[derive(Debug, Clone)]
struct GroupRecord {
    id: String,
    name: String,
    interface: String,
    enable: bool,
    color: String,
    rules: Vec<RuleRecord>,
}

impl GroupRecord {
    fn view(&self, with_rules: bool) -> Value {
        let mut value = json!({
            "id": self.id,
            "name": self.name,
            "interface": self.interface,
            "enable": self.enable,
            "color": self.color,
        });
        if with_rules {
            value["rules"] = json!(self.rules);
        }
        value
    }
}

#[derive(Debug, Deserialize)]
struct GroupBody {
    name: String,
    interface: String,
    enable: bool,
    color: String,
}

#[derive(Debug, Deserialize)]
struct RuleBody {
    name: String,
    #[serde(rename = "type")]
    rule_type: String,
    rule: String,
    enable: bool,
}

impl RuleBody {
    fn into_record(self, id: String) -> RuleRecord {
        RuleRecord {
            id,
            name: self.name,
            rule_type: self.rule_type,
            rule: self.rule,
            enable: self.enable,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RulesBody {
    rules: Vec<RuleBody>,
}

#[derive(Debug, Deserialize)]
struct HookBody {
    #[serde(rename = "type")]
    hook_type: String,
    table: String,
}

#[derive(Debug)]
struct Inner {
    live: Vec<GroupRecord>,
    persisted: Vec<GroupRecord>,
    interfaces: Vec<String>,
    requests: Vec<RecordedRequest>,
    scripted: VecDeque<Reply>,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            live: Vec::new(),
            persisted: Vec::new(),
            interfaces: vec!["br0".into(), "eth0".into()],
            requests: Vec::new(),
            scripted: VecDeque::new(),
        }
    }
}

type Shared = Arc<Mutex<Inner>>;

fn lock(shared: &Shared) -> MutexGuard<'_, Inner> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn parse<T: DeserializeOwned>(body: &[u8]) -> Result<T, Reply> {
    serde_json::from_slice(body).map_err(|e| Reply::error(400, &format!("invalid body: {e}")))
}

fn not_found(what: &str) -> Reply {
    Reply::error(404, &format!("{what} not found"))
}

impl Inner {
    fn group_mut(&mut self, id: &str) -> Result<&mut GroupRecord, Reply> {
        self.live
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| not_found("group"))
    }

    fn route(&mut self, method: &Method, segments: &[&str], with_rules: bool, body: &[u8]) -> Reply {
        match self.try_route(method, segments, with_rules, body) {
            Ok(reply) | Err(reply) => reply,
        }
    }

    fn try_route(
        &mut self,
        method: &Method,
        segments: &[&str],
        with_rules: bool,
        body: &[u8],
    ) -> Result<Reply, Reply> {
        match (method.as_str(), segments) {
            ("GET", ["groups"]) => {
                let groups: Vec<Value> = self.live.iter().map(|g| g.view(with_rules)).collect();
                Ok(Reply::json(200, &json!({ "groups": groups })))
            }
            ("POST", ["groups"]) => {
                let req: GroupBody = parse(body)?;
                let group = GroupRecord {
                    id: new_id(),
                    name: req.name,
                    interface: req.interface,
                    enable: req.enable,
                    color: req.color,
                    rules: Vec::new(),
                };
                let view = group.view(false);
                self.live.push(group);
                Ok(Reply::json(200, &view))
            }
            ("PUT", ["groups", id]) => {
                let req: GroupBody = parse(body)?;
                let group = self.group_mut(id)?;
                group.name = req.name;
                group.interface = req.interface;
                group.enable = req.enable;
                group.color = req.color;
                Ok(Reply::json(200, &group.view(false)))
            }
            ("DELETE", ["groups", id]) => {
                let before = self.live.len();
                self.live.retain(|g| g.id != *id);
                if self.live.len() == before {
                    return Err(not_found("group"));
                }
                Ok(Reply::empty(200))
            }
            ("GET", ["groups", id, "rules"]) => {
                let group = self.group_mut(id)?;
                Ok(Reply::json(200, &json!({ "rules": group.rules })))
            }
            ("PUT", ["groups", id, "rules"]) => {
                let req: RulesBody = parse(body)?;
                let group = self.group_mut(id)?;
                group.rules = req
                    .rules
                    .into_iter()
                    .map(|r| r.into_record(new_id()))
                    .collect();
                Ok(Reply::json(200, &json!({ "rules": group.rules })))
            }
            ("POST", ["groups", id, "rules"]) => {
                let req: RuleBody = parse(body)?;
                let group = self.group_mut(id)?;
                let rule = req.into_record(new_id());
                let view = json!(rule);
                group.rules.push(rule);
                Ok(Reply::json(200, &view))
            }
            ("GET", ["groups", id, "rules", rule_id]) => {
                let group = self.group_mut(id)?;
                let rule = group
                    .rules
                    .iter()
                    .find(|r| r.id == *rule_id)
                    .ok_or_else(|| not_found("rule"))?;
                Ok(Reply::json(200, &json!(rule)))
            }
            ("PUT", ["groups", id, "rules", rule_id]) => {
                let req: RuleBody = parse(body)?;
                let group = self.group_mut(id)?;
                let rule = group
                    .rules
                    .iter_mut()
                    .find(|r| r.id == *rule_id)
                    .ok_or_else(|| not_found("rule"))?;
                *rule = req.into_record((*rule_id).to_owned());
                Ok(Reply::json(200, &json!(rule)))
            }
            ("DELETE", ["groups", id, "rules", rule_id]) => {
                let group = self.group_mut(id)?;
                let before = group.rules.len();
                group.rules.retain(|r| r.id != *rule_id);
                if group.rules.len() == before {
                    return Err(not_found("rule"));
                }
                Ok(Reply::empty(200))
            }
            ("GET", ["system", "interfaces"]) => {
                let interfaces: Vec<Value> =
                    self.interfaces.iter().map(|id| json!({ "id": id })).collect();
                Ok(Reply::json(200, &json!({ "interfaces": interfaces })))
            }
            ("POST", ["system", "hooks", "netfilterd"]) => {
                let hook: HookBody = parse(body)?;
                debug!(hook_type = %hook.hook_type, table = %hook.table, "netfilterd hook");
                Ok(Reply::empty(200))
            }
            ("POST", ["system", "config", "save"]) => {
                self.persisted = self.live.clone();
                Ok(Reply::empty(200))
            }
            _ => Err(not_found("route")),
        }
    }
}

// ── HTTP plumbing ───────────────────────────────────────────────────

fn router(shared: Shared) -> Router {
    Router::new().fallback(handle).with_state(shared)
}

async fn handle(
    State(shared): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let reply = {
        let mut inner = lock(&shared);
        inner.requests.push(RecordedRequest {
            method: method.to_string(),
            uri: uri.to_string(),
            content_type: headers
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned),
            body: body.to_vec(),
        });
        debug!(%method, %uri, "fake daemon request");

        if let Some(scripted) = inner.scripted.pop_front() {
            scripted
        } else {
            let flags: Vec<&str> = uri.query().map(|q| q.split('&').collect()).unwrap_or_default();
            let with_rules = flags.contains(&"with_rules=true");
            let save = flags.contains(&"save=true");

            let path = uri.path().strip_prefix("/api/v1/").unwrap_or_default();
            let segments: Vec<&str> = path.split('/').collect();
            let reply = inner.route(&method, &segments, with_rules, &body);

            if save && reply.status.is_success() {
                let snapshot = inner.live.clone();
                inner.persisted = snapshot;
            }
            reply
        }
    };

    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }
    reply.into_response()
}

// ── FakeDaemon ──────────────────────────────────────────────────────

/// A running fake daemon. Shuts down when dropped.
pub struct FakeDaemon {
    socket_path: PathBuf,
    shared: Shared,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
    _temp_dir: TempDir,
}

impl FakeDaemon {
    /// Start serving on the current tokio runtime.
    pub async fn start() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let socket_path = temp_dir.path().join("magitrickle.sock");
        let shared = Shared::default();

        let listener = UnixListener::bind(&socket_path).expect("failed to bind fake daemon socket");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = router(Arc::clone(&shared));
        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Self {
            socket_path,
            shared,
            shutdown: Some(shutdown_tx),
            thread: None,
            _temp_dir: temp_dir,
        }
    }

    /// Start serving on a dedicated thread with its own runtime.
    ///
    /// For synchronous tests that drive the CLI binary as a subprocess.
    pub fn start_detached() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let socket_path = temp_dir.path().join("magitrickle.sock");
        let shared = Shared::default();

        let (ready_tx, ready_rx) = std::sync::mpsc::channel::<()>();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = router(Arc::clone(&shared));
        let bind_path = socket_path.clone();

        let thread = std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("failed to build fake daemon runtime");
            runtime.block_on(async move {
                let listener =
                    UnixListener::bind(&bind_path).expect("failed to bind fake daemon socket");
                let _ = ready_tx.send(());
                let _ = axum::serve(listener, app)
                    .with_graceful_shutdown(async move {
                        let _ = shutdown_rx.await;
                    })
                    .await;
            });
        });
        ready_rx.recv().expect("fake daemon failed to start");

        Self {
            socket_path,
            shared,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
            _temp_dir: temp_dir,
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Answer the next unanswered request with `reply` instead of the model.
    pub fn enqueue(&self, reply: Reply) {
        lock(&self.shared).scripted.push_back(reply);
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.shared).requests.clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        lock(&self.shared).requests.last().cloned()
    }

    pub fn set_interfaces(&self, names: &[&str]) {
        lock(&self.shared).interfaces = names.iter().map(|n| (*n).to_owned()).collect();
    }

    /// Insert a group directly into live state and return its ID.
    pub fn seed_group(&self, name: &str, interface: &str) -> String {
        let id = new_id();
        lock(&self.shared).live.push(GroupRecord {
            id: id.clone(),
            name: name.to_owned(),
            interface: interface.to_owned(),
            enable: true,
            color: "#ffffff".to_owned(),
            rules: Vec::new(),
        });
        id
    }

    /// Simulate a daemon restart: live state reverts to what was persisted.
    pub fn restart(&self) {
        let mut inner = lock(&self.shared);
        let snapshot = inner.persisted.clone();
        inner.live = snapshot;
    }
}

impl Drop for FakeDaemon {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#![allow(dead_code)]
use http_client::{HttpClient, Request, Response};
use http_types::{Error, StatusCode};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const API_URL: &str = "http://playlist.test/api/playlist";
pub const AUTH_URL: &str = "http://auth.test/v1";
pub const STORE_URL: &str = "http://store.test/v1";
pub const MEDIA_URL: &str = "http://media.test";

/// A request as seen by one of the fake transports.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: String,
    pub authorization: Option<String>,
}

impl RecordedRequest {
    async fn capture(mut req: Request) -> Self {
        let authorization = req
            .header("Authorization")
            .and_then(|values| values.get(0))
            .map(|value| value.as_str().to_string());
        Self {
            method: req.method().to_string(),
            path: req.url().path().to_string(),
            query: req.url().query().map(str::to_string),
            body: req.body_string().await.unwrap_or_default(),
            authorization,
        }
    }

    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }

    /// "METHOD /path", handy for asserting call order.
    pub fn line(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

pub fn json_response(status: StatusCode, body: Value) -> Response {
    let mut response = Response::new(status);
    let _ = response.insert_header("Content-Type", "application/json");
    response.set_body(body.to_string());
    response
}

#[derive(Debug, Default)]
struct ServerState {
    entries: Vec<Value>,
    next_id: u64,
    requests: Vec<RecordedRequest>,
    offline: bool,
    reject_mutations: bool,
    fail_lists: bool,
}

/// In-memory playlist API living at [`API_URL`].
///
/// Ids are handed out as JSON numbers, the way the deployed API does.
#[derive(Debug, Clone, Default)]
pub struct FakePlaylistServer {
    state: Arc<Mutex<ServerState>>,
}

impl FakePlaylistServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: &[(&str, &str, &str)]) -> Self {
        let server = Self::new();
        for (title, performer, label) in entries {
            server.insert(title, performer, label);
        }
        server
    }

    pub fn insert(&self, title: &str, performer: &str, label: &str) -> u64 {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        state.entries.push(json!({
            "id": id,
            "nm_musica": title,
            "artista": performer,
            "gravadora": label,
        }));
        id
    }

    pub fn shared(&self) -> Arc<dyn HttpClient + Send + Sync> {
        Arc::new(self.clone())
    }

    pub fn go_offline(&self) {
        self.state.lock().unwrap().offline = true;
    }

    pub fn reject_mutations(&self) {
        self.state.lock().unwrap().reject_mutations = true;
    }

    pub fn fail_lists(&self) {
        self.state.lock().unwrap().fail_lists = true;
    }

    pub fn entry_count(&self) -> usize {
        self.state.lock().unwrap().entries.len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn request_lines(&self) -> Vec<String> {
        self.requests().iter().map(RecordedRequest::line).collect()
    }

    fn handle(&self, request: &RecordedRequest) -> Response {
        let mut state = self.state.lock().unwrap();
        let id = request
            .path
            .strip_prefix("/api/playlist/")
            .and_then(|id| id.parse::<u64>().ok());

        match (request.method.as_str(), id) {
            ("GET", None) if state.fail_lists => {
                json_response(StatusCode::InternalServerError, json!({"error": "boom"}))
            }
            ("GET", None) => json_response(StatusCode::Ok, Value::Array(state.entries.clone())),
            (_, _) if state.reject_mutations => {
                json_response(StatusCode::BadRequest, json!({"error": "rejected"}))
            }
            ("POST", None) => {
                state.next_id += 1;
                let mut entry = request.json();
                entry["id"] = json!(state.next_id);
                state.entries.push(entry.clone());
                json_response(StatusCode::Created, entry)
            }
            ("PUT", Some(id)) => {
                let fields = request.json();
                match state.entries.iter_mut().find(|e| e["id"] == json!(id)) {
                    Some(entry) => {
                        for key in ["nm_musica", "artista", "gravadora"] {
                            entry[key] = fields[key].clone();
                        }
                        json_response(StatusCode::Ok, entry.clone())
                    }
                    None => json_response(StatusCode::NotFound, json!({"error": "not found"})),
                }
            }
            ("DELETE", Some(id)) => {
                let before = state.entries.len();
                state.entries.retain(|e| e["id"] != json!(id));
                if state.entries.len() < before {
                    json_response(StatusCode::NoContent, Value::Null)
                } else {
                    json_response(StatusCode::NotFound, json!({"error": "not found"}))
                }
            }
            _ => json_response(StatusCode::MethodNotAllowed, json!({"error": "unsupported"})),
        }
    }
}

#[async_trait::async_trait]
impl HttpClient for FakePlaylistServer {
    async fn send(&self, req: Request) -> Result<Response, Error> {
        let request = RecordedRequest::capture(req).await;
        let offline = {
            let mut state = self.state.lock().unwrap();
            state.requests.push(request.clone());
            state.offline
        };

        if offline {
            return Err(Error::from_str(
                StatusCode::ServiceUnavailable,
                "connection refused",
            ));
        }
        Ok(self.handle(&request))
    }
}

/// Answers requests from a queue of canned responses and records what it was sent.
#[derive(Debug, Clone, Default)]
pub struct ScriptedHttpClient {
    responses: Arc<Mutex<VecDeque<(StatusCode, Value)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: StatusCode, body: Value) -> Self {
        self.responses.lock().unwrap().push_back((status, body));
        self
    }

    pub fn shared(&self) -> Arc<dyn HttpClient + Send + Sync> {
        Arc::new(self.clone())
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl HttpClient for ScriptedHttpClient {
    async fn send(&self, req: Request) -> Result<Response, Error> {
        let request = RecordedRequest::capture(req).await;
        self.requests.lock().unwrap().push(request);

        match self.responses.lock().unwrap().pop_front() {
            Some((status, body)) => Ok(json_response(status, body)),
            None => Err(Error::from_str(
                StatusCode::ServiceUnavailable,
                "no scripted response left",
            )),
        }
    }
}

/// Identity provider answer for a successful sign-in or sign-up.
pub fn account_body(uid: &str, email: &str) -> Value {
    json!({
        "kind": "identitytoolkit#VerifyPasswordResponse",
        "localId": uid,
        "email": email,
        "idToken": format!("id-token-{uid}"),
        "refreshToken": "refresh-token",
        "expiresIn": "3600"
    })
}

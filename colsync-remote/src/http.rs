//! HTTP client for the collection service.
//!
//! Endpoints:
//!
//! ```text
//! POST {base}/collections[?workspace=<id>]   {"collection": <body>} -> {"collection": {"uid": ..}}
//! PUT  {base}/collections/<uid>              {"collection": <body>} -> {"collection": {"uid": ..}}
//! GET  {base}/collections                                           -> {"collections": [..]}
//! ```
//!
//! Every exchange is first reduced to an [`Envelope`] carrying an explicit
//! success/fail discriminator; failure classification only ever looks at
//! the envelope, never at the transport error type.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

use colsync_core::{ApiKey, Artifact, Config, RemoteId, RemoteSummary};

use crate::client::{CollectionClient, RemoteResult};
use crate::error::{RemoteError, RemoteErrorKind};

const API_KEY_HEADER: &str = "X-Api-Key";
const NOT_FOUND_ERROR_NAMES: &[&str] = &["instanceNotFoundError", "collectionNotFoundError"];

/// Connection settings. The key is passed in; the client never reads the
/// environment.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: ApiKey,
    pub workspace: Option<String>,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, api_key: ApiKey) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            workspace: None,
            timeout: Duration::from_secs(colsync_core::config::DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn from_config(config: &Config, api_key: ApiKey) -> Self {
        Self {
            base_url: config.base_url.clone(),
            api_key,
            workspace: config.workspace.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Outcome of one HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
enum Envelope {
    Success { data: Value },
    Fail { cause: FailCause, error: Value },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailCause {
    Status(u16),
    Transport,
    Undecodable,
}

#[derive(Debug, Deserialize)]
struct CollectionResponse {
    collection: CollectionRef,
}

#[derive(Debug, Deserialize)]
struct CollectionRef {
    uid: RemoteId,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    collections: Vec<RemoteSummary>,
}

/// [`CollectionClient`] backed by a blocking `ureq` agent.
pub struct HttpCollectionClient {
    agent: ureq::Agent,
    config: ClientConfig,
}

impl HttpCollectionClient {
    pub fn new(config: ClientConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        Self { agent, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        self.agent
            .request(method, &self.url(path))
            .set(API_KEY_HEADER, self.config.api_key.expose())
            .set("Accept", "application/json")
    }

    fn exchange(&self, request: ureq::Request, body: Option<Value>) -> Envelope {
        let method = request.method().to_string();
        let url = request.url().to_string();
        tracing::debug!(%method, %url, "collection service request");

        let response = match body {
            Some(body) => request.send_json(body),
            None => request.call(),
        };

        match response {
            Ok(response) => match response.into_json::<Value>() {
                Ok(data) => Envelope::Success { data },
                Err(err) => Envelope::Fail {
                    cause: FailCause::Undecodable,
                    error: json!({ "message": format!("undecodable response body: {err}") }),
                },
            },
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_json::<Value>().unwrap_or(Value::Null);
                let error = body.get("error").cloned().unwrap_or(body);
                Envelope::Fail {
                    cause: FailCause::Status(status),
                    error,
                }
            }
            Err(ureq::Error::Transport(transport)) => Envelope::Fail {
                cause: FailCause::Transport,
                error: json!({ "message": transport.to_string() }),
            },
        }
    }

    fn collection_body(artifact: &Artifact) -> Value {
        json!({ "collection": artifact.body })
    }
}

/// Turn an envelope into a result, classifying failures.
fn into_result(envelope: Envelope) -> RemoteResult<Value> {
    match envelope {
        Envelope::Success { data } => Ok(data),
        Envelope::Fail { cause, error } => Err(classify(cause, error)),
    }
}

fn classify(cause: FailCause, error: Value) -> RemoteError {
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_else(|| match cause {
            FailCause::Status(code) => format!("HTTP {code}"),
            FailCause::Transport => "no response".to_string(),
            FailCause::Undecodable => "undecodable response".to_string(),
        });
    let named_not_found = error
        .get("name")
        .and_then(Value::as_str)
        .is_some_and(|name| NOT_FOUND_ERROR_NAMES.contains(&name));

    let kind = match cause {
        FailCause::Status(_) if named_not_found => RemoteErrorKind::NotFound,
        FailCause::Status(code) => RemoteErrorKind::Rejected { status: code },
        FailCause::Transport => RemoteErrorKind::Transport,
        FailCause::Undecodable => RemoteErrorKind::UnexpectedResponse,
    };
    RemoteError::new(kind, message, error)
}

/// `uid` as one encoded path segment. Dot segments cannot be encoded away,
/// so they are refused.
fn uid_segment(uid: &RemoteId) -> RemoteResult<String> {
    match uid.as_str() {
        "" | "." | ".." => Err(RemoteError::new(
            RemoteErrorKind::InvalidIdentifier,
            format!("'{uid}' is not a usable collection uid"),
            Value::Null,
        )),
        raw => Ok(urlencoding::encode(raw).into_owned()),
    }
}

fn decode<T: for<'de> Deserialize<'de>>(data: Value) -> RemoteResult<T> {
    serde_json::from_value(data.clone()).map_err(|err| {
        RemoteError::new(
            RemoteErrorKind::UnexpectedResponse,
            format!("unexpected response shape: {err}"),
            data,
        )
    })
}

impl CollectionClient for HttpCollectionClient {
    fn create(&self, artifact: &Artifact) -> RemoteResult<RemoteId> {
        let mut request = self.request("POST", "collections");
        if let Some(workspace) = &self.config.workspace {
            request = request.query("workspace", workspace);
        }
        let data = into_result(self.exchange(request, Some(Self::collection_body(artifact))))?;
        Ok(decode::<CollectionResponse>(data)?.collection.uid)
    }

    fn update(&self, artifact: &Artifact, uid: &RemoteId) -> RemoteResult<RemoteId> {
        let request = self.request("PUT", &format!("collections/{}", uid_segment(uid)?));
        let data = into_result(self.exchange(request, Some(Self::collection_body(artifact))))?;
        Ok(decode::<CollectionResponse>(data)?.collection.uid)
    }

    fn list(&self) -> RemoteResult<Vec<RemoteSummary>> {
        let request = self.request("GET", "collections");
        let data = into_result(self.exchange(request, None))?;
        Ok(decode::<ListResponse>(data)?.collections)
    }
}

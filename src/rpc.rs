use std::collections::HashMap;

use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::error::{Classification, ConsoleError, ConsoleResult};
use crate::registry::FollowerForm;
use crate::store::Store;

/// String-typed request parameters, as parsed from a query string or form.
pub type Params = HashMap<String, String>;

/// Default for `active` when the caller omits it.
const DEFAULT_ACTIVE: &str = "1";

/// Accepted spellings for each parameter, first match wins.
const CREDENTIAL_KEYS: &[&str] = &["credential", "gsid"];
const RISK_KEYS: &[&str] = &["risk_multiplier", "riskMultiplier", "riskx"];

/// Result of a single RPC call.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcOutcome {
    Success(Map<String, Value>),
    Failure {
        message: String,
        classification: Classification,
    },
}

impl RpcOutcome {
    fn success(payload: Value) -> Self {
        match payload {
            Value::Object(map) => Self::Success(map),
            other => {
                let mut map = Map::new();
                map.insert("result".to_string(), other);
                Self::Success(map)
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// HTTP status the transport should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Success(_) => 200,
            Self::Failure { classification, .. } => classification.status_code(),
        }
    }

    /// Wire body: `{ok: true, ..payload}` or `{ok: false, error}`.
    pub fn into_body(self) -> Value {
        match self {
            Self::Success(mut payload) => {
                payload.insert("ok".to_string(), Value::Bool(true));
                Value::Object(payload)
            }
            Self::Failure { message, .. } => json!({ "ok": false, "error": message }),
        }
    }
}

impl From<ConsoleError> for RpcOutcome {
    fn from(err: ConsoleError) -> Self {
        Self::Failure {
            classification: err.classification(),
            message: err.to_string(),
        }
    }
}

/// Run one named operation against the store.
///
/// Never fails outright: every error is folded into [`RpcOutcome::Failure`].
pub fn execute(store: &Store, op: &str, params: &Params) -> RpcOutcome {
    let op = op.trim();
    match dispatch(store, op, params) {
        Ok(payload) => {
            debug!("rpc {op} ok");
            RpcOutcome::success(payload)
        }
        Err(err) => {
            warn!("rpc {op:?} rejected: {err}");
            err.into()
        }
    }
}

/// Convenience for transports that carry `op` inside the parameter bag.
pub fn execute_params(store: &Store, params: &Params) -> RpcOutcome {
    let op = params.get("op").map(String::as_str).unwrap_or_default();
    execute(store, op, params)
}

fn dispatch(store: &Store, op: &str, params: &Params) -> ConsoleResult<Value> {
    match op {
        "master.save" => {
            let master = store.save_master(
                param(params, &["label"]),
                param(params, &["domain"]),
                param(params, CREDENTIAL_KEYS),
            )?;
            Ok(json!({ "saved": "master", "master": master }))
        }
        "follower.upsert" => {
            let active = match param(params, &["active"]) {
                "" => DEFAULT_ACTIVE,
                raw => raw,
            };
            let follower = store.upsert_follower(FollowerForm {
                name: param(params, &["name"]),
                domain: param(params, &["domain"]),
                credential: param(params, CREDENTIAL_KEYS),
                risk_multiplier: param(params, RISK_KEYS),
                active,
            })?;
            Ok(json!({ "saved": "follower", "name": follower.name, "follower": follower }))
        }
        "follower.delete" => {
            let name = param(params, &["name"]).trim();
            store.delete_follower(name)?;
            Ok(json!({ "deleted": name }))
        }
        "live.set" => {
            let link = store.publish_live(param(params, &["url"]))?;
            Ok(json!({
                "live_url": link.url,
                "live_updated": link.published_at.timestamp(),
            }))
        }
        "live.get" => Ok(match store.fetch_live() {
            Ok(link) => json!({
                "available": true,
                "url": link.url,
                "published_at": link.published_at.timestamp(),
                "age_secs": link.age_secs(store.now()),
            }),
            Err(unavailable) => json!({
                "available": false,
                "reason": unavailable.reason(),
            }),
        }),
        "state.get" => Ok(serde_json::to_value(store.snapshot()).unwrap_or_default()),
        other => Err(ConsoleError::UnknownOperation(other.to_string())),
    }
}

/// First non-empty value among `keys`, or `""`.
fn param<'a>(params: &'a Params, keys: &[&str]) -> &'a str {
    keys.iter()
        .filter_map(|key| params.get(*key))
        .map(String::as_str)
        .find(|value| !value.trim().is_empty())
        .unwrap_or_default()
}

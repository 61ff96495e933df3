//! Request classification for authorization and response caching.
//!
//! Every request routed to a cluster is labelled with the Kubernetes resource
//! kind it targets and the semantic verb it performs. The label feeds the
//! access review against the target cluster and the response cache's key and
//! invalidation logic.
//!
//! Classification never fails. Inputs that cannot be resolved degrade to an
//! empty kind with [`Verb::Unknown`], and a malformed `watch` parameter is read
//! as `false`.
//!
//! Author: kelexine (<https://github.com/kelexine>)

mod query;

pub use query::{parse_bool, query_value};

use axum::http::Method;
use serde::Serialize;
use std::fmt;

/// Semantic operation attributed to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    Get,
    Watch,
    Unknown,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Watch => "watch",
            Verb::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `(kind, verb)` label of a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Classification {
    /// Trailing segment of the API path, empty when no path was resolved.
    pub kind: String,
    pub verb: Verb,
}

impl Classification {
    /// Label used when the request carries no API path.
    pub fn unresolved() -> Self {
        Self {
            kind: String::new(),
            verb: Verb::Unknown,
        }
    }

    pub fn has_kind(&self) -> bool {
        !self.kind.is_empty()
    }
}

/// Classify a request from its method, router-matched API path and raw query.
///
/// # Arguments
///
/// * `method` - HTTP method of the inbound request.
/// * `api_path` - Trailing API path captured by the router, e.g. `api/v1/pods`.
/// * `query` - Raw, still percent-encoded query string without the `?`.
pub fn classify(method: &Method, api_path: Option<&str>, query: Option<&str>) -> Classification {
    let Some(path) = api_path.filter(|path| !path.is_empty()) else {
        return Classification::unresolved();
    };

    let kind = path
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or_default()
        .to_string();

    let watch = query
        .and_then(|query| query_value(query, "watch"))
        .and_then(|value| parse_bool(&value))
        .unwrap_or(false);

    let verb = match *method {
        Method::GET if watch => Verb::Watch,
        Method::GET => Verb::Get,
        _ => Verb::Unknown,
    };

    Classification { kind, verb }
}

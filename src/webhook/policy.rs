//! Per-endpoint admission policy.

use crate::config::{EndpointConfig, WebhookConfig};
use crate::config::schema::DEFAULT_MAX_BODY_BYTES;
use crate::security::{AllowList, InvalidSource};

/// Immutable settings one webhook route is served with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointPolicy {
    pub name: String,
    pub path: String,
    pub allow_list: AllowList,
    pub log_headers: bool,
    pub log_body: bool,
    /// `None` reads bodies without a cap.
    pub max_body_bytes: Option<usize>,
}

impl EndpointPolicy {
    /// An unrestricted policy with default logging and body cap.
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            allow_list: AllowList::allow_all(),
            log_headers: true,
            log_body: true,
            max_body_bytes: body_limit(DEFAULT_MAX_BODY_BYTES),
        }
    }

    pub fn with_allow_list(mut self, allow_list: AllowList) -> Self {
        self.allow_list = allow_list;
        self
    }

    pub fn with_logging(mut self, headers: bool, body: bool) -> Self {
        self.log_headers = headers;
        self.log_body = body;
        self
    }

    pub fn with_max_body_bytes(mut self, limit: Option<usize>) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Build the policy for `endpoint`, inheriting process-wide settings.
    pub fn from_config(
        endpoint: &EndpointConfig,
        config: &WebhookConfig,
    ) -> Result<Self, InvalidSource> {
        Ok(Self {
            name: endpoint.name.clone(),
            path: endpoint.path.clone(),
            allow_list: AllowList::parse(&endpoint.allowed_sources)?,
            log_headers: config.log_headers,
            log_body: config.log_body,
            max_body_bytes: body_limit(config.max_body_bytes),
        })
    }

    /// Name used in logs and responses: the configured name, else the
    /// configured path, else the path the request arrived on.
    pub fn label<'a>(&'a self, request_path: &'a str) -> &'a str {
        if !self.name.is_empty() {
            &self.name
        } else if !self.path.is_empty() {
            &self.path
        } else {
            request_path
        }
    }
}

/// One policy per configured endpoint, in configured order.
pub fn build_policies(config: &WebhookConfig) -> Result<Vec<EndpointPolicy>, InvalidSource> {
    config
        .endpoints
        .iter()
        .map(|endpoint| EndpointPolicy::from_config(endpoint, config))
        .collect()
}

fn body_limit(max_body_bytes: u64) -> Option<usize> {
    (max_body_bytes > 0).then(|| usize::try_from(max_body_bytes).unwrap_or(usize::MAX))
}

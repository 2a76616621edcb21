// magitrickle-api: client for the MagiTrickle daemon over its Unix socket

pub mod client;
pub mod error;
pub mod path;
pub mod transport;
pub mod types;

pub use client::DaemonClient;
pub use error::{Error, TransportError, translate_error};
pub use path::{API_PREFIX, ApiPath, Resource};
pub use transport::{
    DEFAULT_SOCKET_PATH, DEFAULT_TIMEOUT, RawResponse, TransportConfig, UnixTransport,
};
pub use types::{
    ErrorResponse, Group, GroupRequest, GroupsResponse, HookRequest, Interface,
    InterfacesResponse, Rule, RuleRequest, RuleSetDocument, RulesRequest, RulesResponse,
};

// Re-exported so callers can match on statuses without a direct hyper dependency.
pub use hyper::StatusCode;

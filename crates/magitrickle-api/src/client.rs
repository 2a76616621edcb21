// Typed client for the daemon's `/api/v1` endpoints.
//
// Each public method is exactly one transport call: it picks the method,
// path, query flags and body, then either decodes the success body or hands
// the response to the error translator.

use hyper::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, TransportError, translate_error};
use crate::path::{ApiPath, Resource};
use crate::transport::{RawResponse, TransportConfig, UnixTransport};
use crate::types::{
    Group, GroupRequest, GroupsResponse, HookRequest, Interface, InterfacesResponse, Rule,
    RuleRequest, RulesRequest, RulesResponse,
};

const SAVE: &str = "save";
const WITH_RULES: &str = "with_rules";

/// Async client for the MagiTrickle daemon.
///
/// Holds no connection state: every call opens and closes its own socket
/// connection.
#[derive(Debug, Clone)]
pub struct DaemonClient {
    transport: UnixTransport,
}

impl DaemonClient {
    pub fn new(config: TransportConfig) -> Self {
        Self {
            transport: UnixTransport::new(config),
        }
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &ApiPath, what: &'static str) -> Result<T, Error> {
        let resp = self.send(Method::GET, path, None).await?;
        self.handle_response(&resp, what)
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &ApiPath,
        body: &B,
        what: &'static str,
    ) -> Result<T, Error> {
        let resp = self.send(Method::POST, path, Some(encode(body)?)).await?;
        self.handle_response(&resp, what)
    }

    async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &ApiPath,
        body: &B,
        what: &'static str,
    ) -> Result<T, Error> {
        let resp = self.send(Method::PUT, path, Some(encode(body)?)).await?;
        self.handle_response(&resp, what)
    }

    async fn delete(&self, path: &ApiPath) -> Result<(), Error> {
        let resp = self.send(Method::DELETE, path, None).await?;
        handle_empty(&resp, &[StatusCode::OK])
    }

    async fn send(
        &self,
        method: Method,
        path: &ApiPath,
        body: Option<Vec<u8>>,
    ) -> Result<RawResponse, Error> {
        Ok(self.transport.send(method, &path.to_string(), body).await?)
    }

    // ── Response handling ────────────────────────────────────────────

    fn handle_response<T: DeserializeOwned>(
        &self,
        resp: &RawResponse,
        what: &'static str,
    ) -> Result<T, Error> {
        if resp.status != StatusCode::OK {
            return Err(translate_error(resp.status, resp.body()));
        }

        let body = resp.body().map_err(|reason| TransportError::Body {
            path: self.transport.socket_path().to_path_buf(),
            reason: reason.to_owned(),
        })?;

        serde_json::from_slice(body).map_err(|source| {
            let text = String::from_utf8_lossy(body);
            Error::Deserialization {
                what,
                body_preview: text.chars().take(200).collect(),
                source,
            }
        })
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Groups ───────────────────────────────────────────────────────

    /// `GET /groups[?with_rules=true]`
    pub async fn list_groups(&self, with_rules: bool) -> Result<Vec<Group>, Error> {
        let path = ApiPath::groups().flag(WITH_RULES, with_rules);
        let resp: GroupsResponse = self.get(&path, "groups").await?;
        Ok(resp.into_items())
    }

    /// `POST /groups[?save=true]`
    pub async fn create_group(&self, req: &GroupRequest, save: bool) -> Result<Group, Error> {
        let path = ApiPath::groups().flag(SAVE, save);
        self.post(&path, req, "created group").await
    }

    /// `PUT /groups/{id}[?save=true]`, full replace.
    pub async fn update_group(
        &self,
        group_id: &str,
        req: &GroupRequest,
        save: bool,
    ) -> Result<Group, Error> {
        let path = ApiPath::group(group_id)?.flag(SAVE, save);
        self.put(&path, req, "updated group").await
    }

    /// `DELETE /groups/{id}[?save=true]`
    pub async fn delete_group(&self, group_id: &str, save: bool) -> Result<(), Error> {
        let path = ApiPath::group(group_id)?.flag(SAVE, save);
        self.delete(&path).await
    }

    // ── Rules ────────────────────────────────────────────────────────

    /// `GET /groups/{id}/rules`
    pub async fn list_rules(&self, group_id: &str) -> Result<Vec<Rule>, Error> {
        let path = ApiPath::rules(group_id)?;
        let resp: RulesResponse = self.get(&path, "rules").await?;
        Ok(resp.into_items())
    }

    /// `PUT /groups/{id}/rules[?save=true]`, replacing the whole rule set.
    pub async fn replace_rules(
        &self,
        group_id: &str,
        rules: &[RuleRequest],
        save: bool,
    ) -> Result<Vec<Rule>, Error> {
        let path = ApiPath::rules(group_id)?.flag(SAVE, save);
        let resp: RulesResponse = self
            .put(&path, &RulesRequest { rules }, "replaced rules")
            .await?;
        Ok(resp.into_items())
    }

    /// `POST /groups/{id}/rules[?save=true]`
    pub async fn create_rule(
        &self,
        group_id: &str,
        req: &RuleRequest,
        save: bool,
    ) -> Result<Rule, Error> {
        let path = ApiPath::rules(group_id)?.flag(SAVE, save);
        self.post(&path, req, "created rule").await
    }

    /// `GET /groups/{id}/rules/{rule}`
    pub async fn get_rule(&self, group_id: &str, rule_id: &str) -> Result<Rule, Error> {
        let path = ApiPath::rule(group_id, rule_id)?;
        self.get(&path, "rule").await
    }

    /// `PUT /groups/{id}/rules/{rule}[?save=true]`, full replace.
    pub async fn update_rule(
        &self,
        group_id: &str,
        rule_id: &str,
        req: &RuleRequest,
        save: bool,
    ) -> Result<Rule, Error> {
        let path = ApiPath::rule(group_id, rule_id)?.flag(SAVE, save);
        self.put(&path, req, "updated rule").await
    }

    /// `DELETE /groups/{id}/rules/{rule}[?save=true]`
    pub async fn delete_rule(&self, group_id: &str, rule_id: &str, save: bool) -> Result<(), Error> {
        let path = ApiPath::rule(group_id, rule_id)?.flag(SAVE, save);
        self.delete(&path).await
    }

    // ── System ───────────────────────────────────────────────────────

    /// `GET /system/interfaces`
    pub async fn list_interfaces(&self) -> Result<Vec<Interface>, Error> {
        let path = ApiPath::new(Resource::Interfaces);
        let resp: InterfacesResponse = self.get(&path, "interfaces").await?;
        Ok(resp.into_items())
    }

    /// `POST /system/hooks/netfilterd`. The daemon acknowledges without a payload.
    pub async fn trigger_netfilterd(&self, req: &HookRequest) -> Result<(), Error> {
        let path = ApiPath::new(Resource::NetfilterdHook);
        let resp = self.send(Method::POST, &path, Some(encode(req)?)).await?;
        handle_empty(&resp, &[StatusCode::OK])
    }

    /// `POST /system/config/save`. Accepts both 200 and 204.
    pub async fn save_config(&self) -> Result<(), Error> {
        let path = ApiPath::new(Resource::ConfigSave);
        let resp = self.send(Method::POST, &path, None).await?;
        handle_empty(&resp, &[StatusCode::OK, StatusCode::NO_CONTENT])
    }
}

fn encode<B: Serialize>(body: &B) -> Result<Vec<u8>, Error> {
    serde_json::to_vec(body).map_err(Error::Serialization)
}

fn handle_empty(resp: &RawResponse, accepted: &[StatusCode]) -> Result<(), Error> {
    if accepted.contains(&resp.status) {
        Ok(())
    } else {
        Err(translate_error(resp.status, resp.body()))
    }
}

// Request/response shapes for the daemon's `/api/v1` surface.
//
// Request types never carry server-assigned fields; response types do.
// List envelopes hold optional containers: an absent or `null` array is a
// valid "no items" answer.

use serde::{Deserialize, Serialize};

// ── Groups ───────────────────────────────────────────────────────────

/// Body of `POST /groups` and `PUT /groups/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRequest {
    pub name: String,
    pub interface: String,
    pub enable: bool,
    pub color: String,
}

/// A group as reported by the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub interface: String,
    pub enable: bool,
    pub color: String,
    /// Only populated when the listing asked for `with_rules=true`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<Rule>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupsResponse {
    #[serde(default)]
    pub groups: Option<Vec<Group>>,
}

impl GroupsResponse {
    pub fn into_items(self) -> Vec<Group> {
        self.groups.unwrap_or_default()
    }
}

// ── Rules ────────────────────────────────────────────────────────────

/// Body of `POST /groups/{id}/rules` and `PUT /groups/{id}/rules/{rule}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRequest {
    pub name: String,
    /// Matcher kind: `domain`, `namespace`, `wildcard`, `regex`, `subnet`, ...
    #[serde(rename = "type")]
    pub rule_type: String,
    /// Matcher expression, interpreted according to `rule_type`.
    pub rule: String,
    pub enable: bool,
}

/// Body of `PUT /groups/{id}/rules` (bulk replace).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RulesRequest<'a> {
    pub rules: &'a [RuleRequest],
}

/// A rule-set document as accepted on disk by `rule replace --file`.
///
/// Either the `{"rules": [...]}` envelope the daemon speaks, or a bare array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RuleSetDocument {
    Envelope { rules: Vec<RuleRequest> },
    Bare(Vec<RuleRequest>),
}

impl RuleSetDocument {
    pub fn into_rules(self) -> Vec<RuleRequest> {
        match self {
            Self::Envelope { rules } | Self::Bare(rules) => rules,
        }
    }
}

/// A rule as reported by the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub rule_type: String,
    pub rule: String,
    pub enable: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesResponse {
    #[serde(default)]
    pub rules: Option<Vec<Rule>>,
}

impl RulesResponse {
    pub fn into_items(self) -> Vec<Rule> {
        self.rules.unwrap_or_default()
    }
}

// ── System ───────────────────────────────────────────────────────────

/// A network interface known to the daemon. Read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    pub id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterfacesResponse {
    #[serde(default)]
    pub interfaces: Option<Vec<Interface>>,
}

impl InterfacesResponse {
    pub fn into_items(self) -> Vec<Interface> {
        self.interfaces.unwrap_or_default()
    }
}

/// Body of `POST /system/hooks/netfilterd`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookRequest {
    #[serde(rename = "type")]
    pub hook_type: String,
    pub table: String,
}

// ── Errors ───────────────────────────────────────────────────────────

/// Error body returned by the daemon on failure. The message may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn group_request_wire_shape() {
        let req = GroupRequest {
            name: "MyGroup".into(),
            interface: "br0".into(),
            enable: true,
            color: "#ffffff".into(),
        };
        assert_eq!(
            serde_json::to_string(&req).expect("serialize"),
            r##"{"name":"MyGroup","interface":"br0","enable":true,"color":"#ffffff"}"##
        );
    }

    #[test]
    fn rule_request_uses_type_key() {
        let req = RuleRequest {
            name: "ads".into(),
            rule_type: "domain".into(),
            rule: "example.com".into(),
            enable: false,
        };
        let value = serde_json::to_value(&req).expect("serialize");
        assert_eq!(
            value,
            json!({"name": "ads", "type": "domain", "rule": "example.com", "enable": false})
        );
        assert!(value.get("id").is_none());
    }

    #[test]
    fn absent_and_null_containers_are_empty() {
        let absent: GroupsResponse = serde_json::from_str("{}").expect("decode");
        assert!(absent.into_items().is_empty());

        let null: RulesResponse = serde_json::from_str(r#"{"rules":null}"#).expect("decode");
        assert!(null.into_items().is_empty());

        let ifaces: InterfacesResponse =
            serde_json::from_str(r#"{"interfaces":[]}"#).expect("decode");
        assert!(ifaces.into_items().is_empty());
    }

    #[test]
    fn group_with_nested_rules_decodes() {
        let body = json!({
            "groups": [{
                "id": "3f1c2a7e-0000-4000-8000-000000000001",
                "name": "Streaming",
                "interface": "nwg0",
                "enable": true,
                "color": "#ff0000",
                "rules": [{
                    "id": "r-1",
                    "name": "netflix",
                    "type": "namespace",
                    "rule": "netflix.com",
                    "enable": true,
                    "extra": "ignored"
                }]
            }]
        });
        let groups = serde_json::from_value::<GroupsResponse>(body)
            .map(GroupsResponse::into_items)
            .expect("decode");
        assert_eq!(groups.len(), 1);
        let rules = groups[0].rules.clone().unwrap_or_default();
        assert_eq!(rules[0].rule_type, "namespace");
        assert_eq!(rules[0].rule, "netflix.com");
    }

    #[test]
    fn rule_set_document_accepts_both_shapes() {
        let rule = json!({"name": "a", "type": "domain", "rule": "a.com", "enable": true});

        let envelope: RuleSetDocument =
            serde_json::from_value(json!({ "rules": [rule.clone()] })).expect("envelope");
        let bare: RuleSetDocument = serde_json::from_value(json!([rule])).expect("bare");

        assert_eq!(envelope.into_rules(), bare.into_rules());
    }

    #[test]
    fn error_response_message_is_optional() {
        let parsed: ErrorResponse = serde_json::from_str("{}").expect("decode");
        assert_eq!(parsed.error, None);
    }
}

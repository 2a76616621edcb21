// Request path builder.
//
// Every call goes to `/api/v1/<collection>[/<segment>...][?flag=true&...]`.
// Segments are identifiers passed through verbatim, so they are validated
// instead of escaped.

use std::fmt;

use crate::error::Error;

/// Fixed prefix for every daemon endpoint.
pub const API_PREFIX: &str = "/api/v1";

/// Top-level resource collections exposed by the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Groups,
    Interfaces,
    NetfilterdHook,
    ConfigSave,
}

impl Resource {
    fn collection(self) -> &'static str {
        match self {
            Self::Groups => "groups",
            Self::Interfaces => "system/interfaces",
            Self::NetfilterdHook => "system/hooks/netfilterd",
            Self::ConfigSave => "system/config/save",
        }
    }
}

/// A fully-resolved request target (path plus query string).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPath {
    resource: Resource,
    segments: Vec<String>,
    flags: Vec<&'static str>,
}

impl ApiPath {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            segments: Vec::new(),
            flags: Vec::new(),
        }
    }

    /// Append a fixed path segment such as `rules`.
    pub fn segment(mut self, segment: &'static str) -> Self {
        self.segments.push(segment.to_owned());
        self
    }

    /// Append a caller-supplied identifier, rejecting values that would
    /// change the shape of the path.
    pub fn id(mut self, kind: &'static str, value: &str) -> Result<Self, Error> {
        validate_id(kind, value)?;
        self.segments.push(value.to_owned());
        Ok(self)
    }

    /// Append `name=true` to the query string when `enabled` is set.
    pub fn flag(mut self, name: &'static str, enabled: bool) -> Self {
        if enabled {
            self.flags.push(name);
        }
        self
    }

    // ── Common targets ───────────────────────────────────────────────

    pub fn groups() -> Self {
        Self::new(Resource::Groups)
    }

    pub fn group(group_id: &str) -> Result<Self, Error> {
        Self::groups().id("group", group_id)
    }

    pub fn rules(group_id: &str) -> Result<Self, Error> {
        Ok(Self::group(group_id)?.segment("rules"))
    }

    pub fn rule(group_id: &str, rule_id: &str) -> Result<Self, Error> {
        Self::rules(group_id)?.id("rule", rule_id)
    }
}

impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{API_PREFIX}/{}", self.resource.collection())?;
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        for (i, flag) in self.flags.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{flag}=true")?;
        }
        Ok(())
    }
}

fn validate_id(kind: &'static str, value: &str) -> Result<(), Error> {
    let reason = if value.is_empty() {
        "must not be empty"
    } else if value.contains(['/', '?', '#']) {
        "must not contain '/', '?' or '#'"
    } else if value.chars().any(char::is_whitespace) {
        "must not contain whitespace"
    } else if !value.bytes().all(is_path_byte) {
        "may only contain letters, digits and URL path punctuation"
    } else {
        return Ok(());
    };

    Err(Error::InvalidIdentifier {
        kind,
        value: value.to_owned(),
        reason,
    })
}

/// RFC 3986 `pchar`, with `%` accepted on its own since segments are sent
/// as given.
fn is_path_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"-._~!$&'()*+,;=:@%".contains(&b)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn collection_paths() {
        assert_eq!(ApiPath::groups().to_string(), "/api/v1/groups");
        assert_eq!(
            ApiPath::new(Resource::Interfaces).to_string(),
            "/api/v1/system/interfaces"
        );
        assert_eq!(
            ApiPath::new(Resource::NetfilterdHook).to_string(),
            "/api/v1/system/hooks/netfilterd"
        );
        assert_eq!(
            ApiPath::new(Resource::ConfigSave).to_string(),
            "/api/v1/system/config/save"
        );
    }

    #[test]
    fn nested_rule_path_with_save() {
        let path = ApiPath::rule("g1", "r1").expect("valid ids").flag("save", true);
        assert_eq!(path.to_string(), "/api/v1/groups/g1/rules/r1?save=true");
    }

    #[test]
    fn unset_flag_leaves_no_query() {
        let path = ApiPath::rules("g1").expect("valid id").flag("save", false);
        assert_eq!(path.to_string(), "/api/v1/groups/g1/rules");
    }

    #[test]
    fn multiple_flags_are_joined() {
        let path = ApiPath::groups()
            .flag("with_rules", true)
            .flag("save", true);
        assert_eq!(path.to_string(), "/api/v1/groups?with_rules=true&save=true");
    }

    #[test]
    fn uuid_ids_pass_through() {
        let id = "6f9619ff-8b86-d011-b42d-00c04fc964ff";
        let path = ApiPath::group(id).expect("uuid is valid");
        assert_eq!(path.to_string(), format!("/api/v1/groups/{id}"));
    }

    #[test]
    fn rejects_ids_that_reshape_the_path() {
        for bad in ["", "a/b", "a?save=true", "a#b", "a b"] {
            let err = ApiPath::group(bad).expect_err(bad);
            assert!(
                matches!(err, Error::InvalidIdentifier { kind: "group", .. }),
                "unexpected error for {bad:?}: {err}"
            );
        }
        for bad in ["a<b", "a>b", "a`b", "a\u{1}b", "a\"b", "grüppe"] {
            let err = ApiPath::rule("g1", bad).expect_err(bad);
            assert!(
                matches!(err, Error::InvalidIdentifier { kind: "rule", .. }),
                "unexpected error for {bad:?}: {err}"
            );
        }
        assert!(matches!(
            ApiPath::rule("g1", ""),
            Err(Error::InvalidIdentifier { kind: "rule", .. })
        ));
    }
}

//! Configuration for the static authentication source.

use secrecy::SecretString;
use serde::Deserialize;

/// Static token-to-identity mapping.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticAuthnConfig {
    /// Tokens accepted by the authenticator.
    pub tokens: Vec<TokenMapping>,
}

/// A single accepted token and the identity it stands for.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenMapping {
    /// Bearer token value.
    pub token: SecretString,

    /// User id, e.g. `alice@canonical.com`.
    pub user: String,

    #[serde(default)]
    pub display_name: Option<String>,

    /// Groups asserted for the user.
    #[serde(default)]
    pub groups: Vec<String>,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn token_mappings_parse() {
        let yaml = r#"
tokens:
  - token: "t-alice"
    user: "alice@canonical.com"
    groups: ["ops", "dev"]
  - token: "t-bob"
    user: "bob@canonical.com"
    display_name: "Bob"
"#;

        let parsed: Result<StaticAuthnConfig, _> = serde_saphyr::from_str(yaml);
        let cfg = match parsed {
            Ok(cfg) => cfg,
            Err(e) => panic!("failed to parse config: {e}"),
        };

        assert_eq!(cfg.tokens.len(), 2);
        assert_eq!(cfg.tokens[0].token.expose_secret(), "t-alice");
        assert_eq!(cfg.tokens[0].groups, vec!["ops", "dev"]);
        assert_eq!(cfg.tokens[1].display_name.as_deref(), Some("Bob"));
        assert!(cfg.tokens[1].groups.is_empty());
    }

    #[test]
    fn token_is_redacted_in_debug_output() {
        let cfg: StaticAuthnConfig =
            serde_saphyr::from_str("tokens: [{token: \"hunter2\", user: \"alice\"}]").unwrap();
        assert!(!format!("{cfg:?}").contains("hunter2"));
    }

    #[test]
    fn config_rejects_unknown_fields() {
        let parsed: Result<StaticAuthnConfig, _> =
            serde_saphyr::from_str("mode: accept_all\n");
        assert!(parsed.is_err());
    }
}

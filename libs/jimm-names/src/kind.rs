//! Closed set of entity kinds known to the authorization model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TagError;

/// Kind of a principal or protected resource.
///
/// The textual prefix of each kind is what appears before the first `-`
/// in a rendered tag (`user-alice`, `serviceaccount-acme-bot`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Kind {
    User,
    Group,
    ServiceAccount,
    Model,
    Controller,
    Cloud,
    CloudCredential,
    Offer,
}

impl Kind {
    /// Every kind, in declaration order.
    pub const ALL: [Kind; 8] = [
        Kind::User,
        Kind::Group,
        Kind::ServiceAccount,
        Kind::Model,
        Kind::Controller,
        Kind::Cloud,
        Kind::CloudCredential,
        Kind::Offer,
    ];

    /// Tag prefix for this kind.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Kind::User => "user",
            Kind::Group => "group",
            Kind::ServiceAccount => "serviceaccount",
            Kind::Model => "model",
            Kind::Controller => "controller",
            Kind::Cloud => "cloud",
            Kind::CloudCredential => "cloudcred",
            Kind::Offer => "applicationoffer",
        }
    }

    /// Whether tags of this kind may act as subjects of a tuple.
    #[must_use]
    pub const fn is_principal(self) -> bool {
        matches!(self, Kind::User | Kind::Group | Kind::ServiceAccount)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for Kind {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kind::ALL
            .into_iter()
            .find(|k| k.prefix() == s)
            .ok_or_else(|| TagError::UnknownKind(s.to_owned()))
    }
}

impl TryFrom<String> for Kind {
    type Error = TagError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Kind> for String {
    fn from(kind: Kind) -> Self {
        kind.prefix().to_owned()
    }
}

//! The authorization model the relation store enforces.
//!
//! | target           | relations (strongest first)                 | subjects                            |
//! |------------------|---------------------------------------------|-------------------------------------|
//! | group            | member                                      | user                                |
//! | serviceaccount   | administrator                               | user, group#member                  |
//! | model            | administrator ⊇ writer ⊇ reader             | user, serviceaccount, group#member  |
//! | controller       | administrator ⊇ audit_log_viewer, reader    | user, serviceaccount, group#member  |
//! | cloud            | administrator ⊇ can_addmodel                | user, serviceaccount, group#member  |
//! | cloudcred        | administrator ⊇ reader                      | user, serviceaccount, group#member  |
//! | applicationoffer | administrator ⊇ consumer ⊇ reader           | user, serviceaccount, group#member  |
//!
//! Users are never targets.

use jimm_names::{Kind, Relation, Tag};

use crate::error::RelationStoreError;
use crate::models::Tuple;

use Relation::{Administrator, AuditLogViewer, CanAddModel, Consumer, Member, Reader, Writer};

/// Relations defined on targets of `kind`.
#[must_use]
pub fn allowed_relations(kind: Kind) -> &'static [Relation] {
    match kind {
        Kind::User => &[],
        Kind::Group => &[Member],
        Kind::ServiceAccount => &[Administrator],
        Kind::Model => &[Administrator, Writer, Reader],
        Kind::Controller => &[Administrator, AuditLogViewer, Reader],
        Kind::Cloud => &[Administrator, CanAddModel],
        Kind::CloudCredential => &[Administrator, Reader],
        Kind::Offer => &[Administrator, Consumer, Reader],
    }
}

/// Relations whose holders also hold `relation` on a target of `kind`,
/// including `relation` itself. Empty if `relation` is not defined there.
#[must_use]
pub fn implied_by(kind: Kind, relation: Relation) -> &'static [Relation] {
    match (kind, relation) {
        (Kind::Model, Reader) => &[Reader, Writer, Administrator],
        (Kind::Model, Writer) => &[Writer, Administrator],
        (Kind::Offer, Reader) => &[Reader, Consumer, Administrator],
        (Kind::Offer, Consumer) => &[Consumer, Administrator],
        (Kind::Controller | Kind::CloudCredential, Reader) => &[Reader, Administrator],
        (Kind::Controller, AuditLogViewer) => &[AuditLogViewer, Administrator],
        (Kind::Cloud, CanAddModel) => &[CanAddModel, Administrator],
        (Kind::Group, Member) => &[Member],
        (_, Administrator) if kind != Kind::User && kind != Kind::Group => &[Administrator],
        _ => &[],
    }
}

/// Whether `relation` is defined on targets of `kind`.
#[must_use]
pub fn is_defined(kind: Kind, relation: Relation) -> bool {
    allowed_relations(kind).contains(&relation)
}

fn subject_allowed(target: Kind, subject: &Tag) -> bool {
    let group_members = subject.kind() == Kind::Group && subject.relation() == Some(Member);
    let bare = subject.relation().is_none();

    match (target, subject.kind()) {
        (Kind::User, _) => false,
        (Kind::Group, Kind::User) => bare,
        (Kind::Group, _) => false,
        (Kind::ServiceAccount, Kind::User) => bare,
        (Kind::ServiceAccount, _) => group_members,
        (_, Kind::User | Kind::ServiceAccount) => bare,
        (_, Kind::Group) => group_members,
        _ => false,
    }
}

/// Reject tuples the authorization model cannot hold.
///
/// # Errors
///
/// Returns [`RelationStoreError::SchemaViolation`] if the relation is not
/// defined on the target's kind or the subject may not hold it.
pub fn validate(tuple: &Tuple) -> Result<(), RelationStoreError> {
    let target = tuple.target.kind();

    if tuple.target.relation().is_some() {
        return Err(RelationStoreError::SchemaViolation(format!(
            "target {} must not carry a relation",
            tuple.target
        )));
    }
    if !is_defined(target, tuple.relation) {
        return Err(RelationStoreError::SchemaViolation(format!(
            "relation {} is not defined on {target}",
            tuple.relation
        )));
    }
    if !subject_allowed(target, &tuple.object) {
        return Err(RelationStoreError::SchemaViolation(format!(
            "{} may not hold {} on {target}",
            tuple.object, tuple.relation
        )));
    }
    Ok(())
}

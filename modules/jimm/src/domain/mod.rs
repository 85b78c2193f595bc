//! Domain layer of the authorization core.

pub mod authorizer;
pub mod service_account;
pub mod tag_resolver;

pub use authorizer::{Authorizer, administrator_tuple, grantee};
pub use service_account::{ServiceAccountState, ServiceAccounts};
pub use tag_resolver::{CanonicalTagResolver, TagResolver};

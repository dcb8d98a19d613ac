mod crypto;
mod extractor;
mod identity;

pub use crypto::{hash_password, verify_password};
pub use extractor::{AuthUser, MaybeAuthUser};
pub use identity::{Identity, IdentityProvider, SessionIdentity};

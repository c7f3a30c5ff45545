//! Identity for studyNest: signed session credentials, the cookie that carries
//! them, the per-request authenticated principal, and ownership checks.
//! Keep the public surface thin and split implementation across sub-modules.

mod principal;
mod token;
mod session;
mod request_context;
mod authorizer;

pub use principal::Principal;
pub use token::{Credential, TokenCodec, TokenError, TOKEN_TTL_SECS};
pub use session::{parse_cookie, CookiePolicy, TOKEN_COOKIE};
pub use request_context::Authenticated;
pub use authorizer::{
    asserted_owner, delete_owned, ensure_same_principal, owner_filter, stamp_owner, update_owned, EXAMINEE_FIELD,
    OWNER_FIELD,
};

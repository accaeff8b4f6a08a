//! Authentication: password hashing, session tokens, signup/login.

mod handlers;
mod jwt;
mod password;
mod service;

pub use handlers::{login, signup};
pub use jwt::{Claims, Identity, TokenError, TokenIssuer, DEFAULT_TOKEN_TTL};
pub use password::{HashingError, PasswordHasher};
pub use service::{AuthError, AuthService, NewAccount, Session, INVALID_CREDENTIALS};

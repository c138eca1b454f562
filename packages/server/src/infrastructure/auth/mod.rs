//! Credential Verifier 実装（JWT）

mod token;

pub use token::{JwtTokenVerifier, extract_token_from_cookie, issue_access_token};

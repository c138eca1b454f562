//! JWT（HS256）による TokenVerifier 実装
//!
//! "access" クラスのトークンのみを扱う。リフレッシュ・アクティベーション等の
//! 他クラスのトークンは認証サブシステム側の責務であり、ここでは検証しない。

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use tsumugi_shared::time::get_utc_timestamp;

use crate::domain::{TokenError, TokenVerifier, UserId};

/// アクセストークンのクレーム
#[derive(Debug, Serialize, Deserialize)]
struct AccessClaims {
    /// ユーザー ID
    id: String,
    /// 有効期限（Unix 秒）
    exp: u64,
}

/// JWT による TokenVerifier 実装
pub struct JwtTokenVerifier {
    decoding_key: DecodingKey,
}

impl JwtTokenVerifier {
    /// 共有シークレットから新しい JwtTokenVerifier を作成
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

impl TokenVerifier for JwtTokenVerifier {
    fn verify_access(&self, token: &str) -> Result<UserId, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<AccessClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;
        UserId::new(data.claims.id).map_err(|_| TokenError::Invalid)
    }
}

/// アクセストークンを発行する
///
/// 認証サブシステムのログインフローと、テスト・デモ用のトークン発行に使用する。
pub fn issue_access_token(secret: &str, user_id: &UserId, ttl_secs: i64) -> String {
    let now_secs = get_utc_timestamp() / 1000;
    let claims = AccessClaims {
        id: user_id.as_str().to_string(),
        exp: (now_secs + ttl_secs).max(0) as u64,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("HS256 token encoding cannot fail")
}

/// Cookie ヘッダーから指定した名前のトークンを取り出す
///
/// `"a=1; accessToken=xyz"` 形式の `Cookie` ヘッダー値を `"; "` 区切りで走査する。
pub fn extract_token_from_cookie(cookie_header: &str, cookie_name: &str) -> Option<String> {
    cookie_header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == cookie_name && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

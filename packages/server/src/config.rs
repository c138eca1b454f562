//! Server configuration.

/// 認証関連の設定
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// アクセストークンの署名・検証に使う共有シークレット
    pub access_secret: String,
    /// トークンのフォールバック読み出しに使う Cookie 名
    pub cookie_name: String,
    /// 発行するアクセストークンの有効期間（秒）
    pub access_ttl_secs: i64,
}

impl AuthConfig {
    /// 環境変数から設定を読み込む
    ///
    /// `TSUMUGI_ACCESS_SECRET` が未設定の場合は開発用の既定値にフォールバックし、
    /// 警告を出す。本番運用では必ず環境変数で上書きすること。
    pub fn from_env() -> Self {
        let access_secret = match std::env::var("TSUMUGI_ACCESS_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!(
                    "TSUMUGI_ACCESS_SECRET is not set; using an insecure development secret"
                );
                "tsumugi-dev-secret".to_string()
            }
        };
        Self {
            access_secret,
            cookie_name: "accessToken".to_string(),
            access_ttl_secs: 15 * 60,
        }
    }
}

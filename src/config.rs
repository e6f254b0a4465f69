//! Service configuration from environment variables

use crate::db::UserId;
use chrono::Duration;
use std::collections::HashSet;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_ACCESS_CODE_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub port: u16,
    /// Webhook of the messaging-channel transport for outbound messages
    pub outbound_url: Option<String>,
    /// Deep-link base that join codes are appended to, e.g. `https://t.me/confbot`
    pub bot_link: Option<String>,
    /// Users granted the admin flag on first interaction
    pub admin_ids: HashSet<UserId>,
    pub access_code_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let db_path = get("CONFNET_DB_PATH").unwrap_or_else(|| {
            let home = get("HOME").unwrap_or_else(|| "/tmp".to_string());
            format!("{home}/.confnet/confnet.db")
        });

        let port = get("CONFNET_PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let admin_ids = get("CONFNET_ADMIN_IDS")
            .map(|ids| {
                ids.split(',')
                    .filter_map(|id| id.trim().parse().ok())
                    .collect()
            })
            .unwrap_or_default();

        let ttl_hours = get("CONFNET_ACCESS_CODE_TTL_HOURS")
            .and_then(|h| h.parse::<i64>().ok())
            .filter(|h| *h > 0)
            .unwrap_or(DEFAULT_ACCESS_CODE_TTL_HOURS);

        Self {
            db_path,
            port,
            outbound_url: get("CONFNET_OUTBOUND_URL").filter(|u| !u.is_empty()),
            bot_link: get("CONFNET_BOT_LINK").filter(|u| !u.is_empty()),
            admin_ids,
            access_code_ttl: Duration::hours(ttl_hours),
        }
    }
}

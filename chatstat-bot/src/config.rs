//! Bot configuration loaded from environment variables.

use anyhow::{anyhow, Context, Result};

/// Runtime configuration for the stats bot.
///
/// Required: `BOT_TOKEN`, `STATS_CHAT_ID`. Everything else has a default or is optional.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram bot token.
    pub bot_token: String,
    /// SQLite database URL, e.g. `sqlite://chatstat.db`.
    pub database_url: String,
    /// Path of the log file.
    pub log_file: String,
    /// Chat whose activity is counted and where the summary message lives.
    pub stats_chat_id: i64,
    /// Users allowed to run /refreshstats. None means no restriction.
    pub admin_user_ids: Option<Vec<i64>>,
    /// Override for the Telegram API base URL (mock server in tests).
    pub api_url: Option<String>,
}

impl BotConfig {
    /// Loads configuration from the environment. `token` overrides `BOT_TOKEN` when given.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(t) => t,
            None => std::env::var("BOT_TOKEN")
                .map_err(|_| anyhow!("BOT_TOKEN environment variable not set"))?,
        };

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://chatstat.db".to_string());

        let log_file =
            std::env::var("LOG_FILE").unwrap_or_else(|_| "logs/chatstat.log".to_string());

        let stats_chat_id = std::env::var("STATS_CHAT_ID")
            .map_err(|_| anyhow!("STATS_CHAT_ID environment variable not set"))?
            .trim()
            .parse::<i64>()
            .context("STATS_CHAT_ID must be a chat id (i64)")?;

        let admin_user_ids = match std::env::var("ADMIN_USER_IDS") {
            Ok(raw) => Some(parse_id_list(&raw)?),
            Err(_) => None,
        };

        let api_url = std::env::var("TELEGRAM_API_URL").ok();

        Ok(Self {
            bot_token,
            database_url,
            log_file,
            stats_chat_id,
            admin_user_ids,
            api_url,
        })
    }

    /// Whether this user may run admin-only commands. An unset ADMIN_USER_IDS allows
    /// everyone; an empty one allows no one.
    pub fn is_admin(&self, user_id: i64) -> bool {
        match &self.admin_user_ids {
            Some(ids) => ids.contains(&user_id),
            None => true,
        }
    }
}

fn parse_id_list(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .with_context(|| format!("ADMIN_USER_IDS entry is not a user id: {:?}", s))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        std::env::remove_var("BOT_TOKEN");
        std::env::remove_var("DATABASE_URL");
        std::env::remove_var("LOG_FILE");
        std::env::remove_var("STATS_CHAT_ID");
        std::env::remove_var("ADMIN_USER_IDS");
        std::env::remove_var("TELEGRAM_API_URL");
    }

    #[test]
    #[serial]
    fn test_load_with_defaults() {
        clear_env();
        std::env::set_var("BOT_TOKEN", "test_token");
        std::env::set_var("STATS_CHAT_ID", "-1001234567890");

        let config = BotConfig::load(None).unwrap();

        assert_eq!(config.bot_token, "test_token");
        assert_eq!(config.database_url, "sqlite://chatstat.db");
        assert_eq!(config.log_file, "logs/chatstat.log");
        assert_eq!(config.stats_chat_id, -1001234567890);
        assert!(config.admin_user_ids.is_none());
        assert!(config.api_url.is_none());
    }

    #[test]
    #[serial]
    fn test_load_with_custom_values() {
        clear_env();
        std::env::set_var("BOT_TOKEN", "custom_token");
        std::env::set_var("DATABASE_URL", "sqlite:///tmp/custom.db");
        std::env::set_var("LOG_FILE", "/tmp/custom.log");
        std::env::set_var("STATS_CHAT_ID", "-42");
        std::env::set_var("ADMIN_USER_IDS", "100, 200,300");
        std::env::set_var("TELEGRAM_API_URL", "http://localhost:8081");

        let config = BotConfig::load(None).unwrap();

        assert_eq!(config.database_url, "sqlite:///tmp/custom.db");
        assert_eq!(config.log_file, "/tmp/custom.log");
        assert_eq!(config.stats_chat_id, -42);
        assert_eq!(config.admin_user_ids, Some(vec![100, 200, 300]));
        assert_eq!(config.api_url.as_deref(), Some("http://localhost:8081"));
    }

    #[test]
    #[serial]
    fn test_token_argument_overrides_env() {
        clear_env();
        std::env::set_var("BOT_TOKEN", "env_token");
        std::env::set_var("STATS_CHAT_ID", "-42");

        let config = BotConfig::load(Some("cli_token".to_string())).unwrap();

        assert_eq!(config.bot_token, "cli_token");
    }

    #[test]
    #[serial]
    fn test_missing_token_fails() {
        clear_env();
        std::env::set_var("STATS_CHAT_ID", "-42");

        let err = BotConfig::load(None).unwrap_err();

        assert!(err.to_string().contains("BOT_TOKEN"));
    }

    #[test]
    #[serial]
    fn test_missing_stats_chat_id_fails() {
        clear_env();
        std::env::set_var("BOT_TOKEN", "test_token");

        let err = BotConfig::load(None).unwrap_err();

        assert!(err.to_string().contains("STATS_CHAT_ID"));
    }

    #[test]
    #[serial]
    fn test_malformed_stats_chat_id_fails() {
        clear_env();
        std::env::set_var("BOT_TOKEN", "test_token");
        std::env::set_var("STATS_CHAT_ID", "not-a-number");

        assert!(BotConfig::load(None).is_err());
    }

    #[test]
    #[serial]
    fn test_malformed_admin_list_fails() {
        clear_env();
        std::env::set_var("BOT_TOKEN", "test_token");
        std::env::set_var("STATS_CHAT_ID", "-42");
        std::env::set_var("ADMIN_USER_IDS", "100,bogus");

        let err = BotConfig::load(None).unwrap_err();

        assert!(err.to_string().contains("ADMIN_USER_IDS"));
    }

    #[test]
    #[serial]
    fn test_empty_admin_list_denies_everyone() {
        clear_env();
        std::env::set_var("BOT_TOKEN", "test_token");
        std::env::set_var("STATS_CHAT_ID", "-42");
        std::env::set_var("ADMIN_USER_IDS", "");

        let config = BotConfig::load(None).unwrap();

        assert_eq!(config.admin_user_ids, Some(vec![]));
        assert!(!config.is_admin(100));
    }

    #[test]
    #[serial]
    fn test_unset_admin_list_allows_everyone() {
        clear_env();
        std::env::set_var("BOT_TOKEN", "test_token");
        std::env::set_var("STATS_CHAT_ID", "-42");

        let config = BotConfig::load(None).unwrap();

        assert!(config.is_admin(100));
        assert!(config.is_admin(-5));
    }
}

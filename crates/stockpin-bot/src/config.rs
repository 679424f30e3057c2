use std::fmt;
use std::time::Duration;

use stockpin_channel::{ChatId, UserId};
use stockpin_ledger::LedgerConfig;
use stockpin_server::HealthConfig;
use thiserror::Error;

use crate::cli::Cli;
use crate::poller::PollConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("BOT_TOKEN is empty")]
    MissingToken,

    #[error("ADMIN_ID must be a non-zero user id")]
    ZeroAdmin,

    #[error("DB_CHANNEL_ID must be a non-zero chat id")]
    ZeroChannel,

    #[error("POLL_TIMEOUT_SECS must be at most 50, got {0}")]
    PollTimeoutTooLong(u64),
}

/// Validated runtime configuration.
#[derive(Clone)]
pub struct BotConfig {
    pub token: String,
    pub api_base_url: String,
    pub admin: UserId,
    pub ledger: LedgerConfig,
    pub health: HealthConfig,
    pub poll: PollConfig,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("admin", &self.admin)
            .field("ledger", &self.ledger)
            .field("health", &self.health)
            .field("poll", &self.poll)
            .finish()
    }
}

impl TryFrom<Cli> for BotConfig {
    type Error = ConfigError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let token = cli.bot_token.trim().to_string();
        if token.is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if cli.admin_id == 0 {
            return Err(ConfigError::ZeroAdmin);
        }
        if cli.db_channel_id == 0 {
            return Err(ConfigError::ZeroChannel);
        }
        // Telegram caps long polling at 50 seconds.
        if cli.poll_timeout_secs > 50 {
            return Err(ConfigError::PollTimeoutTooLong(cli.poll_timeout_secs));
        }

        Ok(Self {
            token,
            api_base_url: cli.api_base_url,
            admin: UserId(cli.admin_id),
            ledger: LedgerConfig::new(ChatId(cli.db_channel_id))
                .with_file_name(cli.ledger_file_name)
                .with_read_policy(cli.read_policy)
                .with_conflict_check(cli.conflict_check),
            health: HealthConfig::new(cli.http_host, cli.port),
            poll: PollConfig {
                timeout: Duration::from_secs(cli.poll_timeout_secs),
                retry_delay: Duration::from_secs(cli.retry_delay_secs),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(extra: &[&str]) -> Cli {
        let base = [
            "stockpin",
            "--bot-token",
            "123:secret",
            "--admin-id",
            "42",
            "--db-channel-id",
            "-1001234",
        ];
        Cli::try_parse_from(base.iter().chain(extra)).unwrap()
    }

    #[test]
    fn builds_from_cli() {
        let config = BotConfig::try_from(cli(&["--port", "9999"])).unwrap();
        assert_eq!(config.admin, UserId(42));
        assert_eq!(config.ledger.channel, ChatId(-1001234));
        assert_eq!(config.ledger.file_name, "database.txt");
        assert!(config.ledger.check_conflicts);
        assert_eq!(config.health.port, 9999);
        assert_eq!(config.poll.timeout, Duration::from_secs(30));
    }

    #[test]
    fn zero_ids_are_rejected() {
        assert_eq!(
            BotConfig::try_from(cli(&["--admin-id", "0"])).unwrap_err(),
            ConfigError::ZeroAdmin
        );
        assert_eq!(
            BotConfig::try_from(cli(&["--db-channel-id", "0"])).unwrap_err(),
            ConfigError::ZeroChannel
        );
    }

    #[test]
    fn blank_token_is_rejected() {
        assert_eq!(
            BotConfig::try_from(cli(&["--bot-token", "  "])).unwrap_err(),
            ConfigError::MissingToken
        );
    }

    #[test]
    fn long_poll_timeout_is_capped() {
        assert_eq!(
            BotConfig::try_from(cli(&["--poll-timeout-secs", "60"])).unwrap_err(),
            ConfigError::PollTimeoutTooLong(60)
        );
    }

    #[test]
    fn debug_redacts_token() {
        let config = BotConfig::try_from(cli(&[])).unwrap();
        assert!(!format!("{config:?}").contains("secret"));
    }
}

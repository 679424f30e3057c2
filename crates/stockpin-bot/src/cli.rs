use std::net::IpAddr;

use clap::{ArgAction, Parser};
use stockpin_channel::telegram::DEFAULT_API_BASE;
use stockpin_ledger::{ReadPolicy, DEFAULT_FILE_NAME};

/// Every option can also be set through the environment variable named
/// next to it, which is how hosted deployments configure the bot.
#[derive(Debug, Parser)]
#[command(
    name = "stockpin",
    about = "Dispense text records from a stock file pinned in a Telegram channel",
    version,
    args_override_self = true
)]
pub struct Cli {
    /// Bot API token.
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    pub bot_token: String,

    /// User id allowed to restock.
    #[arg(long, env = "ADMIN_ID")]
    pub admin_id: i64,

    /// Channel whose pinned document holds the stock (usually starts with -100).
    #[arg(long, env = "DB_CHANNEL_ID", allow_negative_numbers = true)]
    pub db_channel_id: i64,

    #[arg(long, env = "HTTP_HOST", default_value = "0.0.0.0")]
    pub http_host: IpAddr,

    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    #[arg(long, env = "LEDGER_FILE_NAME", default_value = DEFAULT_FILE_NAME)]
    pub ledger_file_name: String,

    /// `strict` or `degrade-to-empty`.
    #[arg(long, env = "READ_POLICY", default_value = "strict")]
    pub read_policy: ReadPolicy,

    /// Abort a commit if the pinned snapshot changed since it was read.
    #[arg(long, env = "CONFLICT_CHECK", default_value_t = true, action = ArgAction::Set)]
    pub conflict_check: bool,

    #[arg(long, env = "POLL_TIMEOUT_SECS", default_value_t = 30)]
    pub poll_timeout_secs: u64,

    /// Pause after a failed poll before trying again.
    #[arg(long, env = "RETRY_DELAY_SECS", default_value_t = 5)]
    pub retry_delay_secs: u64,

    #[arg(long, env = "API_BASE_URL", default_value = DEFAULT_API_BASE)]
    pub api_base_url: String,
}

//! Run configuration
//!
//! Everything the job needs is collected once at startup into an immutable
//! [`DisbursementConfig`] and handed to each component. Values come from
//! command-line flags first and the environment second; a `.env` file in the
//! working directory (or a parent) is loaded into the environment before
//! anything is read. The signing key is only ever taken from the environment.
//!
//! ## Required
//! - `PRIVATE_KEY`: hex private key of the sending wallet
//! - `RPC_URL` / `--rpc-url`: JSON-RPC endpoint
//! - `TOKEN_ADDRESS` / `--token-address`: ERC-20 contract
//! - `MIN_TOKEN`, `MAX_TOKEN`: whole-token amount bounds per transfer
//! - `MIN_DELAY`, `MAX_DELAY`: pacing bounds in seconds
//! - `MIN_TX`, `MAX_TX`: transfers per day
//!
//! ## Optional
//! - `TELEGRAM_BOT_TOKEN` + `TELEGRAM_CHAT_ID`: notification target
//! - `TELEGRAM_API_BASE`: Bot API base URL, default `https://api.telegram.org`
//! - `ELIGIBILITY_URL`: allow-list location
//! - `STATE_DIR`: directory holding the ledger files

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use shared::InclusiveRange;
use url::Url;

use crate::error::{DisburserError, DisburserResult};

/// Published allow-list used when none is configured
pub const DEFAULT_ELIGIBILITY_URL: &str =
    "https://raw.githubusercontent.com/clwkevin/LayerOS/main/addressteasepoliakyc.txt";

/// Telegram Bot API base used when none is configured
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Daily ERC-20 disbursement to an allow-listed set of recipients
#[derive(Parser, Debug, Default, Clone)]
#[command(name = "disburser")]
#[command(about = "Sends randomized token amounts to allow-listed addresses once a day")]
pub struct Args {
    /// JSON-RPC endpoint (falls back to RPC_URL)
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// ERC-20 token contract address (falls back to TOKEN_ADDRESS)
    #[arg(long)]
    pub token_address: Option<String>,

    /// Minimum whole tokens per transfer (falls back to MIN_TOKEN)
    #[arg(long)]
    pub min_token: Option<u64>,

    /// Maximum whole tokens per transfer (falls back to MAX_TOKEN)
    #[arg(long)]
    pub max_token: Option<u64>,

    /// Minimum pacing delay in seconds (falls back to MIN_DELAY)
    #[arg(long)]
    pub min_delay: Option<u64>,

    /// Maximum pacing delay in seconds (falls back to MAX_DELAY)
    #[arg(long)]
    pub max_delay: Option<u64>,

    /// Minimum transfers per day (falls back to MIN_TX)
    #[arg(long)]
    pub min_tx: Option<u64>,

    /// Maximum transfers per day (falls back to MAX_TX)
    #[arg(long)]
    pub max_tx: Option<u64>,

    /// Allow-list URL (falls back to ELIGIBILITY_URL)
    #[arg(long)]
    pub eligibility_url: Option<String>,

    /// Directory for the ledger files (falls back to STATE_DIR, then ".")
    #[arg(long)]
    pub state_dir: Option<PathBuf>,

    /// Blocks a transfer must be buried under before it counts as sent
    #[arg(long)]
    pub confirmations: Option<u64>,

    /// Give up waiting for confirmations after this many seconds
    #[arg(long)]
    pub confirmation_timeout_secs: Option<u64>,

    /// Upper bound of the random delay added after midnight, in seconds
    #[arg(long)]
    pub jitter_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Run a single disbursement and exit instead of looping daily
    #[arg(long)]
    pub once: bool,
}

/// Opaque signing credential; never printed
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey(String);

impl SigningKey {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

/// Telegram bot credentials and destination chat
#[derive(Clone, PartialEq, Eq)]
pub struct TelegramTarget {
    pub api_base: Url,
    pub bot_token: String,
    pub chat_id: String,
}

impl fmt::Debug for TelegramTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramTarget")
            .field("api_base", &self.api_base.as_str())
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Immutable configuration validated once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct DisbursementConfig {
    pub signing_key: SigningKey,
    pub rpc_url: Url,
    pub token_address: String,
    pub eligibility_url: Url,
    pub state_dir: PathBuf,
    pub token_amount: InclusiveRange,
    /// Pacing bounds in milliseconds
    pub delay_ms: InclusiveRange,
    pub tx_per_day: InclusiveRange,
    pub confirmations: u64,
    pub confirmation_timeout: Duration,
    pub midnight_jitter: Duration,
    pub telegram: Option<TelegramTarget>,
}

impl DisbursementConfig {
    pub const DEFAULT_CONFIRMATIONS: u64 = 3;
    pub const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 600;
    pub const DEFAULT_JITTER_SECS: u64 = 300;

    /// Load `.env`, then build from the flags and the process environment
    pub fn load(args: &Args) -> DisburserResult<Self> {
        // Silently ignored when no .env file exists
        let _ = dotenv::dotenv();
        Self::from_sources(args, |key| std::env::var(key).ok())
    }

    /// Build from flags and an environment lookup
    pub fn from_sources<E>(args: &Args, env: E) -> DisburserResult<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let signing_key = lookup("PRIVATE_KEY")
            .map(SigningKey::new)
            .ok_or_else(|| DisburserError::config("PRIVATE_KEY is not set"))?;

        let rpc_url = args
            .rpc_url
            .clone()
            .or_else(|| lookup("RPC_URL"))
            .ok_or_else(|| DisburserError::config("RPC_URL is not set"))?;
        let rpc_url = parse_url("RPC_URL", &rpc_url)?;

        let token_address = args
            .token_address
            .clone()
            .or_else(|| lookup("TOKEN_ADDRESS"))
            .ok_or_else(|| DisburserError::config("TOKEN_ADDRESS is not set"))?;

        let eligibility_url = args
            .eligibility_url
            .clone()
            .or_else(|| lookup("ELIGIBILITY_URL"))
            .unwrap_or_else(|| DEFAULT_ELIGIBILITY_URL.to_string());
        let eligibility_url = parse_url("ELIGIBILITY_URL", &eligibility_url)?;

        let state_dir = args
            .state_dir
            .clone()
            .or_else(|| lookup("STATE_DIR").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));

        let min_token = required(args.min_token, "MIN_TOKEN", &lookup)?;
        let max_token = required(args.max_token, "MAX_TOKEN", &lookup)?;
        let token_amount = InclusiveRange::new("token amount", min_token, max_token)?;

        let min_delay = required(args.min_delay, "MIN_DELAY", &lookup)?;
        let max_delay = required(args.max_delay, "MAX_DELAY", &lookup)?;
        let delay_secs = InclusiveRange::new("delay", min_delay, max_delay)?;
        let delay_ms = InclusiveRange::new(
            "delay",
            seconds_to_ms(delay_secs.min())?,
            seconds_to_ms(delay_secs.max())?,
        )?;

        let min_tx = required(args.min_tx, "MIN_TX", &lookup)?;
        let max_tx = required(args.max_tx, "MAX_TX", &lookup)?;
        let tx_per_day = InclusiveRange::new("transactions per day", min_tx, max_tx)?;

        let telegram = match (lookup("TELEGRAM_BOT_TOKEN"), lookup("TELEGRAM_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramTarget {
                api_base: parse_url(
                    "TELEGRAM_API_BASE",
                    &lookup("TELEGRAM_API_BASE").unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string()),
                )?,
                bot_token,
                chat_id,
            }),
            _ => None,
        };

        Ok(Self {
            signing_key,
            rpc_url,
            token_address,
            eligibility_url,
            state_dir,
            token_amount,
            delay_ms,
            tx_per_day,
            confirmations: args.confirmations.unwrap_or(Self::DEFAULT_CONFIRMATIONS),
            confirmation_timeout: Duration::from_secs(
                args.confirmation_timeout_secs
                    .unwrap_or(Self::DEFAULT_CONFIRMATION_TIMEOUT_SECS),
            ),
            midnight_jitter: Duration::from_secs(args.jitter_secs.unwrap_or(Self::DEFAULT_JITTER_SECS)),
            telegram,
        })
    }
}

fn required<T, L>(flag: Option<T>, key: &str, lookup: &L) -> DisburserResult<T>
where
    T: FromStr,
    T::Err: fmt::Display,
    L: Fn(&str) -> Option<String>,
{
    if let Some(value) = flag {
        return Ok(value);
    }
    let raw = lookup(key).ok_or_else(|| DisburserError::config(format!("{key} is not set")))?;
    raw.parse::<T>()
        .map_err(|e| DisburserError::config(format!("{key} = {raw:?} is invalid: {e}")))
}

fn parse_url(field: &str, raw: &str) -> DisburserResult<Url> {
    Url::parse(raw).map_err(|e| DisburserError::config(format!("{field} = {raw:?} is not a valid URL: {e}")))
}

fn seconds_to_ms(seconds: u64) -> DisburserResult<u64> {
    seconds
        .checked_mul(1000)
        .ok_or_else(|| DisburserError::config(format!("delay of {seconds}s is too large")))
}

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use eyre::WrapErr as _;
use qogam_core::{ClientConfig, OtpChannel};

/// Qogam developer CLI: log in by phone, inspect the session and browse content against a real
/// or local backend.
#[derive(Debug, Parser)]
#[command(name = "qogam", version, about)]
pub struct Cli {
    /// Backend base URL.
    #[arg(long, env = "QOGAM_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// JSON client configuration (`base_url`, `request_timeout_ms`, `otp_channel`,
    /// `resend_cooldown_secs`). Flags override it.
    #[arg(long, env = "QOGAM_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the session file. Defaults to the user data directory.
    #[arg(long, env = "QOGAM_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Channel for one-time codes (`whatsapp` or `sms`).
    #[arg(long, global = true)]
    pub channel: Option<OtpChannel>,

    /// Per-request timeout in seconds.
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "warn", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// What to do.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Request a one-time code for a phone number.
    RequestCode {
        /// Phone number in any format, e.g. "+7 700 123 45 67".
        #[arg(long)]
        phone: String,
    },
    /// Confirm the code sent to the pending phone.
    Confirm {
        /// The four-digit code.
        #[arg(long)]
        code: String,
    },
    /// Show the persisted session.
    Status,
    /// Forget the session.
    Logout,
    /// List courses.
    Courses,
    /// Show one course with its lessons.
    Course {
        /// Course identifier.
        id: u64,
    },
    /// Show one lesson with its materials.
    Lesson {
        /// Lesson identifier.
        id: u64,
    },
    /// Mark a lesson as completed.
    CompleteLesson {
        /// Lesson identifier.
        id: u64,
    },
    /// Show the profile of the logged-in user.
    Profile,
    /// List the certificates of the logged-in user.
    Certificates,
    /// Show or change the interface language.
    Locale {
        /// New language: `ru`, `kk` or `en`.
        set: Option<String>,
    },
}

impl Cli {
    /// Builds the client configuration from the config file and flags.
    pub fn client_config(&self) -> eyre::Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .wrap_err_with(|| format!("reading {}", path.display()))?;
                ClientConfig::from_json(&json)?
            }
            None => ClientConfig::default(),
        };
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(channel) = self.channel {
            config.otp_channel = channel;
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        config.validate()?;
        Ok(config)
    }

    /// Path of the session file.
    pub fn session_file(&self) -> eyre::Result<PathBuf> {
        let dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_dir()
                .ok_or_else(|| eyre::eyre!("no user data directory; pass --data-dir"))?
                .join("qogam"),
        };
        Ok(dir.join("session.json"))
    }
}

pub mod config;
pub mod error;
pub mod mail;
pub mod paths;

pub use config::{MonitorConfig, ProbeConfig, ProbeStrategy, SmtpConfig, TargetConfig};
pub use error::ConfigError;
pub use mail::{MailEnv, ALERT_TO_VAR, FROM_EMAIL_VAR, SMTP_KEY_VAR, SMTP_USER_VAR};
pub use paths::{PathManager, container_base_path};

use std::fmt;

pub const SMTP_USER_VAR: &str = "BREVO_SMTP_USER";
pub const SMTP_KEY_VAR: &str = "BREVO_SMTP_KEY";
pub const FROM_EMAIL_VAR: &str = "BREVO_FROM_EMAIL";
pub const ALERT_TO_VAR: &str = "ALERT_TO_EMAIL";

/// Relay credentials and addresses. Secrets only ever come from the
/// environment, never from the config file.
#[derive(Clone, Default, PartialEq)]
pub struct MailEnv {
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl MailEnv {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as missing
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            username: get(SMTP_USER_VAR),
            password: get(SMTP_KEY_VAR),
            from: get(FROM_EMAIL_VAR),
            to: get(ALERT_TO_VAR),
        }
    }

    /// Recipient, defaulting to the sender address when unset
    pub fn recipient(&self) -> Option<&str> {
        self.to.as_deref().or(self.from.as_deref())
    }

    /// Names of the variables that still need a value
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.username.is_none() {
            missing.push(SMTP_USER_VAR);
        }
        if self.password.is_none() {
            missing.push(SMTP_KEY_VAR);
        }
        if self.from.is_none() {
            missing.push(FROM_EMAIL_VAR);
        }
        if self.recipient().is_none() {
            missing.push(ALERT_TO_VAR);
        }
        missing
    }
}

impl fmt::Debug for MailEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailEnv")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

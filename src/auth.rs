use std::fmt;

use log::{debug, info, warn};

use crate::api::error::OperationError;
use crate::common::constants::FAULT_BAD_CREDENTIALS;
use crate::xmlrpc::Value;

#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Password { username: String, password: String },
    DelegatedToken { token: String },
}

impl Credential {
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credential::Password {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn token(token: impl Into<String>) -> Self {
        Credential::DelegatedToken {
            token: token.into(),
        }
    }

    pub fn rpc_params(&self) -> [Value; 2] {
        match self {
            Credential::Password { username, password } => {
                [Value::from(username.as_str()), Value::from(password.as_str())]
            }
            Credential::DelegatedToken { .. } => [Value::from(""), Value::from("")],
        }
    }

    pub fn bearer_token(&self) -> Option<&str> {
        match self {
            Credential::Password { .. } => None,
            Credential::DelegatedToken { token } => Some(token),
        }
    }
}

// Keep secrets out of logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Credential::DelegatedToken { .. } => f
                .debug_struct("DelegatedToken")
                .field("token", &"<redacted>")
                .finish(),
        }
    }
}

/// A bad-credentials fault is `Ok(false)`; every other failure passes through.
pub fn classify_check(outcome: Result<Value, OperationError>) -> Result<bool, OperationError> {
    match outcome {
        Ok(_) => {
            info!("Credentials verified");
            Ok(true)
        }
        Err(err) if err.is_fault() && err.code == FAULT_BAD_CREDENTIALS => {
            warn!("Server rejected credentials: {}", err.message);
            Ok(false)
        }
        Err(err) => {
            debug!("Credential check could not complete: {}", err);
            Err(err)
        }
    }
}

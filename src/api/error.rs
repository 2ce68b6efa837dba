use std::fmt;

use thiserror::Error;

use crate::common::constants::{CODE_MALFORMED, CODE_PARSE_ERROR, CODE_TRANSPORT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorDomain {
    Transport,
    Fault,
    Response,
}

impl fmt::Display for ErrorDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorDomain::Transport => write!(f, "transport"),
            ErrorDomain::Fault => write!(f, "fault"),
            ErrorDomain::Response => write!(f, "response"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{domain} error {code}: {message}")]
pub struct OperationError {
    pub domain: ErrorDomain,
    pub code: i64,
    pub message: String,
}

impl OperationError {
    pub fn new(domain: ErrorDomain, code: i64, message: impl Into<String>) -> Self {
        Self {
            domain,
            code,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorDomain::Transport, CODE_TRANSPORT, message)
    }

    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::new(ErrorDomain::Transport, i64::from(status), message)
    }

    pub fn fault(code: i64, message: impl Into<String>) -> Self {
        Self::new(ErrorDomain::Fault, code, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorDomain::Response, CODE_PARSE_ERROR, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorDomain::Response, CODE_MALFORMED, message)
    }

    pub fn is_transport(&self) -> bool {
        self.domain == ErrorDomain::Transport
    }

    pub fn is_fault(&self) -> bool {
        self.domain == ErrorDomain::Fault
    }
}

impl From<reqwest::Error> for OperationError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => OperationError::http_status(status.as_u16(), err.to_string()),
            None => OperationError::transport(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no XML-RPC endpoint found for {site}")]
pub struct DiscoveryError {
    pub site: String,
}

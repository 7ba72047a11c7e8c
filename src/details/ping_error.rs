use std::{error::Error, fmt};

/// Which stage of a ping invocation failed.
///
/// Per-attempt conditions (timeouts, TTL expiry, unreachable hosts) are not errors; they
/// are recorded in the attempt's record instead.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PingErrorKind {
    /// Invalid invocation parameters, detected before any socket is opened.
    Configuration,
    /// The target host could not be resolved.
    Resolution,
    /// Socket creation or socket option setting failed.
    Setup,
    /// A non-timeout send or receive failure. Aborts the whole session.
    Io,
}

impl fmt::Display for PingErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PingErrorKind::Configuration => "configuration",
            PingErrorKind::Resolution => "resolution",
            PingErrorKind::Setup => "setup",
            PingErrorKind::Io => "io",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug)]
pub struct PingError {
    pub kind: PingErrorKind,
    pub message: String,
    // no chained error
}

impl PingError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        PingError { kind: PingErrorKind::Configuration, message: message.into() }
    }

    pub(crate) fn resolution(message: impl Into<String>) -> Self {
        PingError { kind: PingErrorKind::Resolution, message: message.into() }
    }

    pub(crate) fn setup(error: &std::io::Error) -> Self {
        PingError { kind: PingErrorKind::Setup, message: error.to_string() }
    }
}

impl fmt::Display for PingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "PingError")?;
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

impl Error for PingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

impl From<std::io::Error> for PingError {
    fn from(error: std::io::Error) -> PingError {
        PingError { kind: PingErrorKind::Io, message: error.to_string() }
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckError {
    /// A feed page request failed: network error, non-2xx status, or a body
    /// that could not be read or parsed. Terminates the run; never retried.
    #[error("feed request failed: {0}")]
    Transport(String),

    /// Caller-supplied date or time string did not parse. Raised before any
    /// network call is made.
    #[error("invalid input: {0}")]
    Input(String),

    /// A single slot's timestamps did not parse. Recovered locally by
    /// dropping the slot during filtering; never fatal.
    #[error("malformed slot record: {0}")]
    MalformedSlot(String),
}

pub type Result<T> = std::result::Result<T, CheckError>;

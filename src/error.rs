use derive_more::{Display, Error};

/// Why a run did not complete.
#[derive(Debug, Display, Error)]
pub enum RunError {
    /// The inverter could not be read, the next run retries.
    #[display("failed to fetch the reading: {_0:#}")]
    Fetch(#[error(not(source))] anyhow::Error),

    /// Another run holds the store lock.
    #[display("another run is in progress")]
    Conflict,

    /// The output locations are unusable, nothing the next run could fix.
    #[display("configuration error: {_0:#}")]
    Configuration(#[error(not(source))] anyhow::Error),
}

impl RunError {
    /// Whether the process should exit with a failure code.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

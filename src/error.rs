/// Errors that can occur when operating on a [`crate::manager::LoadManager`] or
/// [`crate::router::RendezvousRouter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The router was asked for a node but has none registered.
    NoServers,
    /// `refresh_rate` must be an integer of at least one second.
    InvalidRefreshRate,
    /// `window_size` must be at least two samples (a single-sample window has no stddev).
    InvalidWindowSize,
    /// A server handle failed in a way that was surfaced to the caller rather than swallowed
    /// by the refresher (the steady-state refresh path never produces this; see
    /// [`HandleError`]).
    Handle(HandleError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NoServers => write!(f, "no servers registered"),
            Error::InvalidRefreshRate => write!(f, "refresh_rate must be >= 1 second"),
            Error::InvalidWindowSize => write!(f, "window_size must be >= 2"),
            Error::Handle(e) => write!(f, "server handle error: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<HandleError> for Error {
    fn from(e: HandleError) -> Self {
        Error::Handle(e)
    }
}

/// An error raised by a [`crate::handle::ServerHandle`]'s `stats()` probe.
///
/// Modeled as an opaque message rather than an enum of transport-specific causes, since the
/// core treats every `stats()` failure identically: skip the server for this round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleError(pub String);

impl std::fmt::Display for HandleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for HandleError {}

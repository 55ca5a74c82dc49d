use axum::http::StatusCode;
use log::debug;

/// A media player which expects a different response status than the default partial content.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientQuirk {
    /// The value which should be contained within the `User-Agent` header.
    pub user_agent: &'static str,
    /// The status to respond with.
    pub status: StatusCode,
}

/// The known client quirks, the first matching entry wins.
pub const CLIENT_QUIRKS: &[ClientQuirk] = &[ClientQuirk {
    user_agent: "Java",
    status: StatusCode::OK,
}];

/// Returns the status override of the given user agent, if any.
pub fn status_override(user_agent: &str) -> Option<StatusCode> {
    CLIENT_QUIRKS
        .iter()
        .find(|e| user_agent.contains(e.user_agent))
        .map(|e| {
            debug!(
                "Detected {} user agent, using status {} instead",
                e.user_agent, e.status
            );
            e.status
        })
}

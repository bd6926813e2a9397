//! User-agent navigation port.

use url::Url;

/// Port for hard navigation of the hosting user agent.
///
/// Used as the fallback exit from a broken session: when the provider
/// cannot complete sign-out, the shell is sent to the login entry point
/// directly.
pub trait Navigator: Send + Sync {
    /// Navigates the user agent to `url`, abandoning the current view.
    fn navigate(&self, url: &Url);
}

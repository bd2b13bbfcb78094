/// Router Module Index
///
/// Splits the web shell's routes by what they need from the request. The split
/// is what decides whether the browser-session layer runs.

/// Routes that need no browser session: health and the static auth error page.
pub mod public;

/// Routes that run the authentication flow. Wrapped in `session_middleware`,
/// so every handler receives the request's `BrowserSession`.
pub mod flow;

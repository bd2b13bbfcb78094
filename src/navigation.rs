use std::sync::{Arc, Mutex};

/// NavigationMode
///
/// How a navigation leaves the current page.
/// - `Assign`: a full page load (the transport's auth redirects, the IdP hop).
/// - `Replace`: a client-side navigation that replaces the current history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationMode {
    Assign,
    Replace,
}

/// Navigation
///
/// A single terminal navigation decided by the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub target: String,
    pub mode: NavigationMode,
}

impl Navigation {
    pub fn assign(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            mode: NavigationMode::Assign,
        }
    }

    pub fn replace(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            mode: NavigationMode::Replace,
        }
    }

    pub fn is_full_reload(&self) -> bool {
        self.mode == NavigationMode::Assign
    }
}

/// Navigator
///
/// The host's navigation surface. The flow reads the current location only at
/// failure time (so deep links resume exactly where the user was) and hands
/// every terminal navigation to `navigate`.
pub trait Navigator: Send + Sync {
    /// Path + query + hash of the page currently being processed.
    fn current_location(&self) -> String;

    fn navigate(&self, navigation: &Navigation);
}

pub type NavigatorState = Arc<dyn Navigator>;

/// CapturingNavigator
///
/// Records navigations instead of performing them. The web shell creates one per
/// request and turns the last captured navigation into the HTTP redirect; tests
/// use it to assert on where a flow went.
pub struct CapturingNavigator {
    location: String,
    captured: Mutex<Vec<Navigation>>,
}

impl CapturingNavigator {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            captured: Mutex::new(Vec::new()),
        }
    }

    pub fn shared(location: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new(location))
    }

    pub fn navigations(&self) -> Vec<Navigation> {
        self.captured
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// The navigation that wins: once the page has been left, nothing after it is observable.
    pub fn last(&self) -> Option<Navigation> {
        self.captured
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .last()
            .cloned()
    }
}

impl Navigator for CapturingNavigator {
    fn current_location(&self) -> String {
        self.location.clone()
    }

    fn navigate(&self, navigation: &Navigation) {
        tracing::info!(
            target_path = %navigation.target,
            mode = ?navigation.mode,
            "Navigating"
        );
        self.captured
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(navigation.clone());
    }
}

/// with_return_to
///
/// Builds `<path>?returnTo=<percent-encoded return_to>`.
pub fn with_return_to(path: &str, return_to: &str) -> String {
    format!("{}?returnTo={}", path, urlencoding::encode(return_to))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn return_to_is_percent_encoded() {
        assert_eq!(
            with_return_to("/sso", "/continue?intent=leveltest#top"),
            "/sso?returnTo=%2Fcontinue%3Fintent%3Dleveltest%23top"
        );
    }

    #[test]
    fn capturing_navigator_keeps_order() {
        let navigator = CapturingNavigator::new("/here");
        navigator.navigate(&Navigation::replace("/a"));
        navigator.navigate(&Navigation::assign("/b"));
        assert_eq!(navigator.navigations().len(), 2);
        assert_eq!(navigator.last(), Some(Navigation::assign("/b")));
        assert_eq!(navigator.current_location(), "/here");
    }
}

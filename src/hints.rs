use crate::{api::BackendApi, client::Outcome, storage::StoreState};

/// Storage key of the cached nickname hint.
pub const NICKNAME_HINT_KEY: &str = "nickname_hint";

/// SessionHints
///
/// Optimistic, tab-scoped hints for the UI. Nothing here is trusted for gating:
/// the intent handlers always re-validate against the server.
#[derive(Clone)]
pub struct SessionHints {
    store: StoreState,
}

impl SessionHints {
    pub fn new(store: StoreState) -> Self {
        Self { store }
    }

    pub fn cached_nickname(&self) -> Option<String> {
        self.store.get(NICKNAME_HINT_KEY)
    }

    pub fn remember_nickname(&self, nickname: &str) {
        self.store.set(NICKNAME_HINT_KEY, nickname);
    }

    pub fn forget_nickname(&self) {
        self.store.remove(NICKNAME_HINT_KEY);
    }

    /// prefetch_nickname
    ///
    /// Best-effort refresh of the hint. Failures are swallowed and the cached
    /// value is returned unchanged. `api` must be built on a navigator whose
    /// navigations are discarded: a prefetch never leaves the page.
    pub async fn prefetch_nickname(&self, api: &BackendApi) -> Option<String> {
        match api.nickname().await {
            Outcome::Resolved(profile) => match profile.registered_nickname() {
                Some(nickname) => {
                    self.remember_nickname(nickname);
                    Some(nickname.to_string())
                }
                None => {
                    self.forget_nickname();
                    None
                }
            },
            Outcome::Redirected(_) | Outcome::Rejected(_) => {
                tracing::debug!("Nickname prefetch failed, keeping cached hint");
                self.cached_nickname()
            }
        }
    }
}

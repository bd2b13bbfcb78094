use crate::{
    api::BackendApi,
    client::ApiClient,
    hints::SessionHints,
    navigation::{Navigation, NavigatorState},
    redirect_guard::RedirectGuard,
    storage::StoreState,
    transport::TransportState,
};

/// FlowScope
///
/// Everything one page visit needs, wired to the same navigator and the same
/// tab-scoped store. Built fresh for every visit; nothing in it outlives the page.
#[derive(Clone)]
pub struct FlowScope {
    pub api: BackendApi,
    pub guard: RedirectGuard,
    pub hints: SessionHints,
    navigator: NavigatorState,
}

impl FlowScope {
    pub fn new(transport: TransportState, navigator: NavigatorState, store: StoreState) -> Self {
        let client = ApiClient::new(transport, navigator.clone());
        Self {
            api: BackendApi::new(client),
            guard: RedirectGuard::new(store.clone()),
            hints: SessionHints::new(store),
            navigator,
        }
    }

    /// Performs a terminal navigation and returns it.
    pub fn navigate(&self, navigation: Navigation) -> Navigation {
        self.navigator.navigate(&navigation);
        navigation
    }
}

use std::sync::Arc;

use sharegate_core::{IdentityProvider, ShareLinks};

#[derive(Clone)]
pub struct AppState {
    links: Arc<dyn ShareLinks>,
    identities: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(links: Arc<dyn ShareLinks>, identities: Arc<dyn IdentityProvider>) -> Self {
        Self { links, identities }
    }

    pub fn links(&self) -> &dyn ShareLinks {
        self.links.as_ref()
    }

    pub fn identities(&self) -> &dyn IdentityProvider {
        self.identities.as_ref()
    }
}

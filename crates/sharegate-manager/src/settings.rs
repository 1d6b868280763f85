use std::time::Duration;
use typed_builder::TypedBuilder;

pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_MAX_TTL: Duration = Duration::from_secs(90 * 24 * 60 * 60);
pub const DEFAULT_MAX_SUBJECTS: usize = 100;

/// Tunables of a [`ShareLinkManager`](crate::ShareLinkManager).
#[derive(Debug, Clone, TypedBuilder)]
pub struct ManagerSettings {
    /// Public origin prepended to capability URLs, e.g. `https://share.example.org`.
    #[builder(setter(into))]
    pub origin: String,
    /// Upper bound for every individual store call.
    #[builder(default = DEFAULT_STORE_TIMEOUT)]
    pub store_timeout: Duration,
    /// Longest lifetime a link may be created with.
    #[builder(default = DEFAULT_MAX_TTL)]
    pub max_ttl: Duration,
    /// Most subjects a single link may expose.
    #[builder(default = DEFAULT_MAX_SUBJECTS)]
    pub max_subjects: usize,
}

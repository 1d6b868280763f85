use crate::settings::ManagerSettings;
use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use sharegate_core::{
    AllowAll, Clock, CreateParams, CreatedLink, LinkId, LinkSummary, OwnerId, Repository,
    ShareError, ShareLink, ShareLinks, ShareToken, StorageError, SubjectAuthorizer, Unavailable,
};
use sharegate_generator::{generate_token, Generator};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

type Result<T> = std::result::Result<T, ShareError>;

/// The share-link state machine.
///
/// Wraps a `Repository`, a `Generator`, a `SubjectAuthorizer` and a `Clock`.
/// Holds no link state of its own: every decision is made against the store,
/// whose per-record atomicity serializes concurrent callers.
///
/// The generator is responsible for id uniqueness. No collision retry is
/// performed: a duplicate id surfaces as `ShareError::Persistence`.
pub struct ShareLinkManager<R, G, A = AllowAll> {
    repository: Arc<R>,
    generator: Arc<G>,
    authorizer: Arc<A>,
    clock: Arc<dyn Clock>,
    settings: ManagerSettings,
}

impl<R, G, A> Clone for ShareLinkManager<R, G, A> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            generator: Arc::clone(&self.generator),
            authorizer: Arc::clone(&self.authorizer),
            clock: Arc::clone(&self.clock),
            settings: self.settings.clone(),
        }
    }
}

impl<R: Repository, G: Generator, A: SubjectAuthorizer> ShareLinkManager<R, G, A> {
    pub fn new(
        repository: R,
        generator: G,
        authorizer: A,
        clock: Arc<dyn Clock>,
        settings: ManagerSettings,
    ) -> Self {
        Self {
            repository: Arc::new(repository),
            generator: Arc::new(generator),
            authorizer: Arc::new(authorizer),
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> &ManagerSettings {
        &self.settings
    }

    /// Runs a store call, failing it with `StorageError::Timeout` once
    /// `store_timeout` has elapsed.
    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> std::result::Result<T, StorageError>
    where
        F: Future<Output = std::result::Result<T, StorageError>>,
    {
        let limit = self.settings.store_timeout;
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(StorageError::Timeout(format!(
                "{operation} did not complete within {limit:?}"
            ))),
        }
    }

    fn validate(&self, params: &CreateParams) -> Result<SignedDuration> {
        if params.subject_ids.is_empty() {
            return Err(ShareError::Validation(
                "at least one subject id is required".to_string(),
            ));
        }
        if params.subject_ids.len() > self.settings.max_subjects {
            return Err(ShareError::Validation(format!(
                "a link may expose at most {} subjects, got {}",
                self.settings.max_subjects,
                params.subject_ids.len()
            )));
        }
        if params.ttl.is_zero() {
            return Err(ShareError::Validation("ttl must be positive".to_string()));
        }
        if params.ttl > self.settings.max_ttl {
            return Err(ShareError::Validation(format!(
                "ttl of {}s exceeds the maximum of {}s",
                params.ttl.as_secs(),
                self.settings.max_ttl.as_secs()
            )));
        }

        SignedDuration::try_from(params.ttl)
            .map_err(|e| ShareError::Validation(format!("invalid ttl: {e}")))
    }

    async fn authorize(&self, owner: &OwnerId, params: &CreateParams) -> Result<()> {
        for subject in &params.subject_ids {
            if !self.authorizer.can_share(owner, subject).await {
                return Err(ShareError::Authorization(format!(
                    "owner '{owner}' may not share subject '{subject}'"
                )));
            }
        }
        Ok(())
    }

    /// Loads a link and checks that `owner` created it.
    async fn owned_link(&self, id: &LinkId, owner: &OwnerId) -> Result<ShareLink> {
        let link = self
            .bounded("get", self.repository.get(id))
            .await?
            .ok_or_else(|| ShareError::NotFound(id.to_string()))?;

        if &link.owner_id != owner {
            return Err(ShareError::Authorization(format!(
                "link '{id}' belongs to another owner"
            )));
        }
        Ok(link)
    }

    fn expiry_cutoff(now: Timestamp, retention: Duration) -> Result<Timestamp> {
        let retention = SignedDuration::try_from(retention)
            .map_err(|e| ShareError::Validation(format!("invalid retention: {e}")))?;
        now.checked_sub(retention)
            .map_err(|e| ShareError::Validation(format!("invalid retention: {e}")))
    }
}

#[async_trait]
impl<R: Repository, G: Generator, A: SubjectAuthorizer> ShareLinks for ShareLinkManager<R, G, A> {
    async fn create(&self, owner: &OwnerId, params: CreateParams) -> Result<CreatedLink> {
        let ttl = self.validate(&params)?;
        self.authorize(owner, &params).await?;

        let created_at = self.clock.now();
        let expires_at = created_at
            .checked_add(ttl)
            .map_err(|e| ShareError::Validation(format!("expiry is out of range: {e}")))?;

        let link = ShareLink {
            id: self.generator.generate(),
            token: generate_token(),
            owner_id: owner.clone(),
            subject_ids: params.subject_ids,
            created_at,
            expires_at,
            access_count: 0,
            is_active: true,
        };

        self.bounded("insert", self.repository.insert(&link)).await?;

        info!(
            id = %link.id,
            owner = %owner,
            subjects = link.subject_ids.len(),
            expires_at = %link.expires_at,
            "created share link"
        );

        let url = link.to_url(&self.settings.origin);
        Ok(CreatedLink { link, url })
    }

    async fn resolve(&self, id: &str, token: &str) -> std::result::Result<ShareLink, Unavailable> {
        let Ok(id) = LinkId::parse(id) else {
            std::hint::black_box(ShareToken::placeholder().matches(token));
            debug!("rejected malformed link id");
            return Err(Unavailable);
        };

        let now = self.clock.now();
        let link = match self.bounded("get", self.repository.get(&id)).await {
            Ok(Some(link)) => link,
            Ok(None) => {
                std::hint::black_box(ShareToken::placeholder().matches(token));
                debug!(id = %id, "link not found");
                return Err(Unavailable);
            }
            Err(e) => {
                debug!(id = %id, error = %e, "failed to load link");
                return Err(Unavailable);
            }
        };

        if !link.token.matches(token) {
            debug!(id = %id, "token mismatch");
            return Err(Unavailable);
        }
        if !link.is_resolvable(now) {
            debug!(id = %id, status = ?link.status(now), "link is not resolvable");
            return Err(Unavailable);
        }

        // The store re-checks revocation and expiry in the same atomic step
        // as the increment.
        match self
            .bounded("record_access", self.repository.record_access(&id, now))
            .await
        {
            Ok(Some(link)) => {
                debug!(id = %id, access_count = link.access_count, "resolved link");
                Ok(link)
            }
            Ok(None) => {
                debug!(id = %id, "link became unresolvable before access was counted");
                Err(Unavailable)
            }
            Err(e) => {
                debug!(id = %id, error = %e, "failed to record access");
                Err(Unavailable)
            }
        }
    }

    async fn inspect(&self, id: &LinkId, owner: &OwnerId) -> Result<LinkSummary> {
        let link = self.owned_link(id, owner).await?;
        let status = link.status(self.clock.now());
        Ok(LinkSummary { link, status })
    }

    async fn revoke(&self, id: &LinkId, owner: &OwnerId) -> Result<()> {
        self.owned_link(id, owner).await?;

        let existed = self
            .bounded("deactivate", self.repository.deactivate(id))
            .await?;
        if !existed {
            return Err(ShareError::NotFound(id.to_string()));
        }

        info!(id = %id, owner = %owner, "revoked share link");
        Ok(())
    }

    async fn delete(&self, id: &LinkId, owner: &OwnerId) -> Result<()> {
        self.owned_link(id, owner).await?;

        let deleted = self.bounded("delete", self.repository.delete(id)).await?;
        if !deleted {
            return Err(ShareError::NotFound(id.to_string()));
        }

        info!(id = %id, owner = %owner, "deleted share link");
        Ok(())
    }

    async fn list_for_owner(&self, owner: &OwnerId) -> Result<Vec<LinkSummary>> {
        let links = self
            .bounded("list_by_owner", self.repository.list_by_owner(owner))
            .await?;

        let now = self.clock.now();
        Ok(links
            .into_iter()
            .map(|link| {
                let status = link.status(now);
                LinkSummary { link, status }
            })
            .collect())
    }

    async fn sweep_expired(&self, retention: Duration) -> Result<u64> {
        let cutoff = Self::expiry_cutoff(self.clock.now(), retention)?;
        let purged = self
            .bounded(
                "purge_expired_before",
                self.repository.purge_expired_before(cutoff),
            )
            .await?;

        if purged > 0 {
            info!(purged, cutoff = %cutoff, "purged expired share links");
        } else {
            debug!(cutoff = %cutoff, "no expired share links to purge");
        }
        Ok(purged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharegate_core::{LinkStatus, ManualClock, ReadRepository, SubjectId};
    use sharegate_generator::{RandomGenerator, SeqGenerator};
    use sharegate_storage::InMemoryRepository;

    const HOUR: Duration = Duration::from_secs(3600);

    fn start() -> Timestamp {
        "2026-04-01T08:00:00Z".parse().unwrap()
    }

    fn settings() -> ManagerSettings {
        ManagerSettings::builder()
            .origin("https://share.example.org")
            .build()
    }

    fn manager() -> (ShareLinkManager<InMemoryRepository, SeqGenerator>, ManualClock) {
        let clock = ManualClock::new(start());
        let manager = ShareLinkManager::new(
            InMemoryRepository::new(),
            SeqGenerator::with_prefix("sg"),
            AllowAll,
            Arc::new(clock.clone()),
            settings(),
        );
        (manager, clock)
    }

    fn owner(name: &str) -> OwnerId {
        OwnerId::new(name).unwrap()
    }

    fn params(ttl: Duration) -> CreateParams {
        CreateParams {
            subject_ids: vec![
                SubjectId::new("moca-2026-03").unwrap(),
                SubjectId::new("clock-drawing-2026-03").unwrap(),
            ],
            ttl,
        }
    }

    /// Refuses to let anyone share the subject with the given id.
    struct DenySubject(&'static str);

    #[async_trait]
    impl SubjectAuthorizer for DenySubject {
        async fn can_share(&self, _owner: &OwnerId, subject: &SubjectId) -> bool {
            subject.as_str() != self.0
        }
    }

    /// A store whose every call hangs forever.
    struct StalledRepository;

    #[async_trait]
    impl ReadRepository for StalledRepository {
        async fn get(&self, _id: &LinkId) -> sharegate_core::repository::Result<Option<ShareLink>> {
            std::future::pending().await
        }

        async fn list_by_owner(
            &self,
            _owner: &OwnerId,
        ) -> sharegate_core::repository::Result<Vec<ShareLink>> {
            std::future::pending().await
        }
    }

    #[async_trait]
    impl Repository for StalledRepository {
        async fn insert(&self, _link: &ShareLink) -> sharegate_core::repository::Result<()> {
            std::future::pending().await
        }

        async fn record_access(
            &self,
            _id: &LinkId,
            _now: Timestamp,
        ) -> sharegate_core::repository::Result<Option<ShareLink>> {
            std::future::pending().await
        }

        async fn deactivate(&self, _id: &LinkId) -> sharegate_core::repository::Result<bool> {
            std::future::pending().await
        }

        async fn delete(&self, _id: &LinkId) -> sharegate_core::repository::Result<bool> {
            std::future::pending().await
        }

        async fn purge_expired_before(
            &self,
            _cutoff: Timestamp,
        ) -> sharegate_core::repository::Result<u64> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn create_sets_exact_expiry_and_url() {
        let (manager, _) = manager();

        let created = manager
            .create(&owner("alice"), params(Duration::from_secs(86_400)))
            .await
            .unwrap();
        let link = &created.link;

        assert_eq!(link.id.as_str(), "sg000000");
        assert_eq!(link.created_at, start());
        assert_eq!(link.ttl(), SignedDuration::from_hours(24));
        assert_eq!(link.access_count, 0);
        assert!(link.is_active);
        assert_ne!(link.id.as_str(), link.token.as_str());
        assert_eq!(
            created.url,
            format!(
                "https://share.example.org/shared/sg000000?token={}",
                link.token.as_str()
            )
        );
    }

    #[tokio::test]
    async fn create_with_random_ids_produces_distinct_links() {
        let clock = ManualClock::new(start());
        let manager = ShareLinkManager::new(
            InMemoryRepository::new(),
            RandomGenerator::new(),
            AllowAll,
            Arc::new(clock),
            settings(),
        );

        let a = manager.create(&owner("alice"), params(HOUR)).await.unwrap();
        let b = manager.create(&owner("alice"), params(HOUR)).await.unwrap();

        assert_ne!(a.link.id, b.link.id);
        assert_ne!(a.link.token, b.link.token);
    }

    #[tokio::test]
    async fn create_rejects_invalid_params_before_touching_the_store() {
        let (manager, _) = manager();
        let alice = owner("alice");

        let empty = CreateParams {
            subject_ids: vec![],
            ttl: HOUR,
        };
        assert!(matches!(
            manager.create(&alice, empty).await,
            Err(ShareError::Validation(_))
        ));

        assert!(matches!(
            manager.create(&alice, params(Duration::ZERO)).await,
            Err(ShareError::Validation(_))
        ));

        let too_long = settings().max_ttl + Duration::from_secs(1);
        assert!(matches!(
            manager.create(&alice, params(too_long)).await,
            Err(ShareError::Validation(_))
        ));

        let crowded = CreateParams {
            subject_ids: (0..101)
                .map(|i| SubjectId::new(format!("subject-{i}")).unwrap())
                .collect(),
            ttl: HOUR,
        };
        assert!(matches!(
            manager.create(&alice, crowded).await,
            Err(ShareError::Validation(_))
        ));

        assert!(manager.list_for_owner(&alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_accepts_the_maximum_ttl() {
        let (manager, _) = manager();
        let created = manager
            .create(&owner("alice"), params(settings().max_ttl))
            .await
            .unwrap();
        assert_eq!(created.link.ttl(), SignedDuration::from_hours(90 * 24));
    }

    #[tokio::test]
    async fn create_requires_every_subject_to_be_shareable() {
        let clock = ManualClock::new(start());
        let manager = ShareLinkManager::new(
            InMemoryRepository::new(),
            SeqGenerator::with_prefix("sg"),
            DenySubject("clock-drawing-2026-03"),
            Arc::new(clock),
            settings(),
        );

        let err = manager
            .create(&owner("alice"), params(HOUR))
            .await
            .unwrap_err();
        assert!(matches!(err, ShareError::Authorization(_)));
        assert!(manager
            .list_for_owner(&owner("alice"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn create_surfaces_id_collisions_as_persistence_errors() {
        let clock = ManualClock::new(start());
        let repository = InMemoryRepository::new();
        let manager = ShareLinkManager::new(
            repository,
            SeqGenerator::with_prefix("sg"),
            AllowAll,
            Arc::new(clock.clone()),
            settings(),
        );
        manager.create(&owner("alice"), params(HOUR)).await.unwrap();

        // a second generator restarting the sequence collides with the first
        let colliding = ShareLinkManager {
            generator: Arc::new(SeqGenerator::with_prefix("sg")),
            ..manager.clone()
        };
        let err = colliding
            .create(&owner("alice"), params(HOUR))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ShareError::Persistence(StorageError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn first_resolve_counts_one_access() {
        let (manager, _) = manager();
        let created = manager.create(&owner("alice"), params(HOUR)).await.unwrap();

        let resolved = manager
            .resolve(created.link.id.as_str(), created.link.token.as_str())
            .await
            .unwrap();

        assert_eq!(resolved.access_count, 1);
        assert_eq!(resolved.subject_ids, created.link.subject_ids);

        let again = manager
            .resolve(created.link.id.as_str(), created.link.token.as_str())
            .await
            .unwrap();
        assert_eq!(again.access_count, 2);
    }

    #[tokio::test]
    async fn wrong_token_is_indistinguishable_from_missing_id() {
        let (manager, _) = manager();
        let created = manager.create(&owner("alice"), params(HOUR)).await.unwrap();

        let wrong_token = manager
            .resolve(created.link.id.as_str(), "not-the-token")
            .await;
        let missing_id = manager
            .resolve("sg999999", created.link.token.as_str())
            .await;
        let malformed_id = manager.resolve("../etc", created.link.token.as_str()).await;
        let empty_token = manager.resolve(created.link.id.as_str(), "").await;

        assert_eq!(wrong_token, Err(Unavailable));
        assert_eq!(missing_id, Err(Unavailable));
        assert_eq!(malformed_id, Err(Unavailable));
        assert_eq!(empty_token, Err(Unavailable));

        // failed attempts are not counted
        let summary = manager
            .inspect(&created.link.id, &owner("alice"))
            .await
            .unwrap();
        assert_eq!(summary.link.access_count, 0);
    }

    #[tokio::test]
    async fn token_prefix_does_not_resolve() {
        let (manager, _) = manager();
        let created = manager.create(&owner("alice"), params(HOUR)).await.unwrap();
        let token = created.link.token.as_str();

        let result = manager
            .resolve(created.link.id.as_str(), &token[..token.len() - 1])
            .await;
        assert_eq!(result, Err(Unavailable));
    }

    #[tokio::test]
    async fn link_stops_resolving_at_expiry() {
        let (manager, clock) = manager();
        let created = manager.create(&owner("alice"), params(HOUR)).await.unwrap();
        let (id, token) = (created.link.id.as_str(), created.link.token.as_str());

        clock.advance(SignedDuration::from_mins(59));
        assert!(manager.resolve(id, token).await.is_ok());

        clock.set(created.link.expires_at);
        assert_eq!(manager.resolve(id, token).await, Err(Unavailable));

        let summary = manager.inspect(&created.link.id, &owner("alice")).await.unwrap();
        assert_eq!(summary.status, LinkStatus::Expired);
        assert_eq!(summary.link.access_count, 1);
    }

    #[tokio::test]
    async fn revoke_blocks_resolution_and_is_idempotent() {
        let (manager, _) = manager();
        let alice = owner("alice");
        let created = manager.create(&alice, params(HOUR)).await.unwrap();
        let (id, token) = (created.link.id.as_str(), created.link.token.as_str());

        assert!(manager.resolve(id, token).await.is_ok());

        manager.revoke(&created.link.id, &alice).await.unwrap();
        assert_eq!(manager.resolve(id, token).await, Err(Unavailable));

        manager.revoke(&created.link.id, &alice).await.unwrap();
        let summary = manager.inspect(&created.link.id, &alice).await.unwrap();
        assert_eq!(summary.status, LinkStatus::Revoked);
        assert_eq!(summary.link.access_count, 1);
    }

    #[tokio::test]
    async fn revoked_status_takes_precedence_over_expired() {
        let (manager, clock) = manager();
        let alice = owner("alice");
        let created = manager.create(&alice, params(HOUR)).await.unwrap();

        manager.revoke(&created.link.id, &alice).await.unwrap();
        clock.advance(SignedDuration::from_hours(2));

        let summary = manager.inspect(&created.link.id, &alice).await.unwrap();
        assert_eq!(summary.status, LinkStatus::Revoked);
    }

    #[tokio::test]
    async fn only_the_owner_can_manage_a_link() {
        let (manager, _) = manager();
        let alice = owner("alice");
        let mallory = owner("mallory");
        let created = manager.create(&alice, params(HOUR)).await.unwrap();
        let id = &created.link.id;

        assert!(matches!(
            manager.revoke(id, &mallory).await,
            Err(ShareError::Authorization(_))
        ));
        assert!(matches!(
            manager.delete(id, &mallory).await,
            Err(ShareError::Authorization(_))
        ));
        assert!(matches!(
            manager.inspect(id, &mallory).await,
            Err(ShareError::Authorization(_))
        ));

        let summary = manager.inspect(id, &alice).await.unwrap();
        assert_eq!(summary.status, LinkStatus::Active);
    }

    #[tokio::test]
    async fn managing_a_missing_link_is_not_found() {
        let (manager, _) = manager();
        let alice = owner("alice");
        let id = LinkId::new_unchecked("sg424242");

        assert!(matches!(
            manager.revoke(&id, &alice).await,
            Err(ShareError::NotFound(_))
        ));
        assert!(matches!(
            manager.delete(&id, &alice).await,
            Err(ShareError::NotFound(_))
        ));
        assert!(matches!(
            manager.inspect(&id, &alice).await,
            Err(ShareError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_removes_the_link() {
        let (manager, _) = manager();
        let alice = owner("alice");
        let created = manager.create(&alice, params(HOUR)).await.unwrap();

        manager.delete(&created.link.id, &alice).await.unwrap();

        assert_eq!(
            manager
                .resolve(created.link.id.as_str(), created.link.token.as_str())
                .await,
            Err(Unavailable)
        );
        assert!(matches!(
            manager.delete(&created.link.id, &alice).await,
            Err(ShareError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_for_owner_is_most_recent_first_with_status() {
        let (manager, clock) = manager();
        let alice = owner("alice");

        let first = manager.create(&alice, params(HOUR)).await.unwrap();
        clock.advance(SignedDuration::from_mins(1));
        let second = manager.create(&alice, params(HOUR * 24)).await.unwrap();
        clock.advance(SignedDuration::from_mins(1));
        let third = manager.create(&alice, params(HOUR * 24)).await.unwrap();
        manager.create(&owner("bob"), params(HOUR)).await.unwrap();

        manager.revoke(&third.link.id, &alice).await.unwrap();
        clock.advance(SignedDuration::from_hours(1));

        let listed = manager.list_for_owner(&alice).await.unwrap();
        let view: Vec<(&str, LinkStatus)> = listed
            .iter()
            .map(|s| (s.link.id.as_str(), s.status))
            .collect();

        assert_eq!(
            view,
            vec![
                (third.link.id.as_str(), LinkStatus::Revoked),
                (second.link.id.as_str(), LinkStatus::Active),
                (first.link.id.as_str(), LinkStatus::Expired),
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_resolves_are_all_counted() {
        let (manager, _) = manager();
        let created = manager.create(&owner("alice"), params(HOUR)).await.unwrap();
        let manager = Arc::new(manager);
        let start = Arc::new(tokio::sync::Barrier::new(32));

        let mut handles = vec![];
        for _ in 0..32 {
            let manager = Arc::clone(&manager);
            let start = Arc::clone(&start);
            let id = created.link.id.to_string();
            let token = created.link.token.as_str().to_string();
            handles.push(tokio::spawn(async move {
                start.wait().await;
                manager.resolve(&id, &token).await.map(|l| l.access_count)
            }));
        }

        let mut counts = vec![];
        for handle in handles {
            counts.push(handle.await.unwrap().unwrap());
        }
        counts.sort_unstable();
        assert_eq!(counts, (1..=32).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn sweep_respects_retention_boundary() {
        let (manager, clock) = manager();
        let alice = owner("alice");
        let retention = Duration::from_secs(7 * 24 * 3600);

        let short = manager.create(&alice, params(HOUR)).await.unwrap();
        let long = manager.create(&alice, params(HOUR * 2)).await.unwrap();

        // `short` expired exactly `retention` ago: kept.
        clock.set(short.link.expires_at);
        clock.advance(SignedDuration::try_from(retention).unwrap());
        assert_eq!(manager.sweep_expired(retention).await.unwrap(), 0);

        clock.advance(SignedDuration::from_nanos(1));
        assert_eq!(manager.sweep_expired(retention).await.unwrap(), 1);
        assert_eq!(manager.sweep_expired(retention).await.unwrap(), 0);

        let remaining = manager.list_for_owner(&alice).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].link.id, long.link.id);
    }

    #[tokio::test]
    async fn store_timeouts_fail_create_and_resolve() {
        let clock = ManualClock::new(start());
        let manager = ShareLinkManager::new(
            StalledRepository,
            SeqGenerator::with_prefix("sg"),
            AllowAll,
            Arc::new(clock),
            ManagerSettings::builder()
                .origin("https://share.example.org")
                .store_timeout(Duration::from_millis(20))
                .build(),
        );

        let err = manager
            .create(&owner("alice"), params(HOUR))
            .await
            .unwrap_err();
        assert!(matches!(err, ShareError::Persistence(StorageError::Timeout(_))));

        assert_eq!(manager.resolve("sg000000", "anything").await, Err(Unavailable));

        let err = manager
            .revoke(&LinkId::new_unchecked("sg000000"), &owner("alice"))
            .await
            .unwrap_err();
        assert!(matches!(err, ShareError::Persistence(StorageError::Timeout(_))));
    }
}

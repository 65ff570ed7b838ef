//! Test harness over the in-memory store.
//!
//! Each test gets a fresh store and spy notifier, so tests never see each
//! other's data.

use family_core::common::{FamilyId, UserId};
use family_core::domains::content::models::{ContentKind, ContentStatus};
use family_core::domains::families::models::Family;
use family_core::domains::memberships::models::MembershipRecord;
use family_core::domains::users::models::User;
use family_core::kernel::{BaseFamilyStore, FamilyDeps, MemoryStore, SpyNotifier, TestDependencies};
use test_context::AsyncTestContext;
use uuid::Uuid;

/// Test harness wiring the family operations to in-memory collaborators.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let owner = create_user(ctx, "mom").await;
///     // ... test code
/// }
/// ```
pub struct TestHarness {
    pub test_deps: TestDependencies,
    deps: FamilyDeps,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new()
    }

    async fn teardown(self) {}
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with(TestDependencies::new())
    }

    /// Harness over custom collaborators (scripted codes, failing notifier, ...).
    pub fn with(test_deps: TestDependencies) -> Self {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let deps = test_deps.deps();
        Self { test_deps, deps }
    }

    pub fn deps(&self) -> &FamilyDeps {
        &self.deps
    }

    pub fn store(&self) -> &MemoryStore {
        &self.test_deps.store
    }

    pub fn spy(&self) -> &SpyNotifier {
        &self.test_deps.spy
    }

    // =========================================================================
    // Read-back helpers (each opens and drops its own transaction)
    // =========================================================================

    pub async fn user(&self, id: UserId) -> User {
        let mut tx = self.test_deps.store.begin().await.unwrap();
        tx.find_user(id).await.unwrap().expect("user exists")
    }

    pub async fn family(&self, id: FamilyId) -> Family {
        let mut tx = self.test_deps.store.begin().await.unwrap();
        tx.find_family(id).await.unwrap().expect("family exists")
    }

    /// The non-INACTIVE record for (user, family), if any.
    pub async fn live_membership(&self, user: UserId, family: FamilyId) -> Option<MembershipRecord> {
        let mut tx = self.test_deps.store.begin().await.unwrap();
        tx.find_live_membership(user, family).await.unwrap()
    }

    /// Latest record for (user, family), INACTIVE included.
    pub async fn last_membership(&self, user: UserId, family: FamilyId) -> MembershipRecord {
        self.test_deps
            .store
            .membership_history(user)
            .await
            .into_iter()
            .filter(|m| m.family_id == family)
            .last()
            .expect("membership exists")
    }

    pub async fn content_status(&self, kind: ContentKind, id: impl Into<Uuid>) -> ContentStatus {
        let mut tx = self.test_deps.store.begin().await.unwrap();
        tx.content_status(kind, id.into())
            .await
            .unwrap()
            .expect("content exists")
    }
}

//! Expansion of container models into concrete cache entries
//!
//! Precedence: a container-level marker applies to every member of the
//! container and member markers are then ignored. Without one, only members
//! that carry their own marker produce entries.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use cachestorm_domain::{CachePolicy, InMemory, TypeKey, DEFAULT_EXPIRATION};
use tracing::{trace, warn};

use crate::materializer::EntityCollectionProvider;
use crate::metadata::{ContainerModel, MemberModel};

/// One (container, member, policy) triple to populate
#[derive(Clone)]
pub struct ScanEntry {
    container: TypeKey,
    member: &'static str,
    entity: TypeKey,
    policy: CachePolicy,
    provider: Arc<dyn EntityCollectionProvider>,
}

impl ScanEntry {
    fn new(container: TypeKey, member: &MemberModel, policy: CachePolicy) -> Self {
        Self {
            container,
            member: member.name(),
            entity: member.entity(),
            policy,
            provider: Arc::clone(member.provider()),
        }
    }

    pub fn container(&self) -> TypeKey {
        self.container
    }

    pub fn member(&self) -> &'static str {
        self.member
    }

    pub fn entity(&self) -> TypeKey {
        self.entity
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Shorthand for `policy().key()`
    pub fn key(&self) -> &str {
        self.policy.key()
    }

    pub fn provider(&self) -> &Arc<dyn EntityCollectionProvider> {
        &self.provider
    }
}

impl fmt::Debug for ScanEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanEntry")
            .field("container", &self.container.short_name())
            .field("member", &self.member)
            .field("entity", &self.entity.short_name())
            .field("policy", &self.policy)
            .finish()
    }
}

/// Turns [`ContainerModel`]s into [`ScanEntry`] lists
#[derive(Debug, Clone, Copy)]
pub struct MetadataScanner {
    default_expiration: Duration,
    quiet: bool,
}

impl Default for MetadataScanner {
    fn default() -> Self {
        Self { default_expiration: DEFAULT_EXPIRATION, quiet: false }
    }
}

impl MetadataScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expiration applied to markers that do not set one
    pub fn with_default_expiration(mut self, expiration: Duration) -> Self {
        self.default_expiration = expiration;
        self
    }

    /// Log skipped markers at trace level only
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// Entries for one container, in member declaration order
    ///
    /// Markers that fail validation are skipped with a warning. An invalid
    /// container-level marker skips the whole container.
    pub fn scan(&self, model: &ContainerModel) -> Vec<ScanEntry> {
        let container = model.container();

        if let Some(marker) = model.policy() {
            return match self.resolve(container, None, marker) {
                Some(policy) => model
                    .members()
                    .iter()
                    .map(|member| ScanEntry::new(container, member, policy.clone()))
                    .collect(),
                None => Vec::new(),
            };
        }

        model
            .members()
            .iter()
            .filter_map(|member| {
                let marker = member.policy()?;
                let policy = self.resolve(container, Some(member.name()), marker)?;
                Some(ScanEntry::new(container, member, policy))
            })
            .collect()
    }

    /// Entries for every model, containers in the given order
    pub fn scan_all<'a>(
        &self,
        models: impl IntoIterator<Item = &'a ContainerModel>,
    ) -> Vec<ScanEntry> {
        models.into_iter().flat_map(|model| self.scan(model)).collect()
    }

    fn resolve(
        &self,
        container: TypeKey,
        member: Option<&'static str>,
        marker: &InMemory,
    ) -> Option<CachePolicy> {
        match marker.resolve_with_default(self.default_expiration) {
            Ok(policy) => Some(policy),
            Err(err) => {
                let (container, member) = (container.short_name(), member.unwrap_or("*"));
                if self.quiet {
                    trace!(container, member, error = %err, "Ignoring invalid cache policy");
                } else {
                    warn!(container, member, error = %err, "Ignoring invalid cache policy");
                }
                None
            }
        }
    }
}

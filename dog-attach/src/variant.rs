use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::AttachResult;

/// When a variant's bytes are produced and whether they are kept
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Materialize {
    /// Produced and stored right after the primary content is attached
    OnAttach,
    /// Produced and stored by the first read that finds it missing
    #[default]
    OnGet,
    /// Produced on every read, never stored
    OnDemand,
}

impl Materialize {
    /// Whether produced bytes are written back to the store
    pub fn persists(&self) -> bool {
        !matches!(self, Self::OnDemand)
    }
}

/// Turns primary content into variant content.
///
/// Implementations must be pure and deterministic: concurrent first reads
/// may both run the transform and both store the result.
pub trait VariantTransform: Send + Sync {
    fn apply(&self, source: &[u8]) -> AttachResult<Vec<u8>>;
}

impl<F> VariantTransform for F
where
    F: Fn(&[u8]) -> AttachResult<Vec<u8>> + Send + Sync,
{
    fn apply(&self, source: &[u8]) -> AttachResult<Vec<u8>> {
        self(source)
    }
}

/// A named, policy-governed derivation of the primary content
#[derive(Clone)]
pub struct VariantSpec {
    name: String,
    policy: Materialize,
    transform: Arc<dyn VariantTransform>,
}

impl VariantSpec {
    /// New variant materialized on first read
    pub fn new<S, F>(name: S, transform: F) -> Self
    where
        S: Into<String>,
        F: Fn(&[u8]) -> AttachResult<Vec<u8>> + Send + Sync + 'static,
    {
        Self::with_transform(name, transform)
    }

    /// New variant backed by any [`VariantTransform`]
    pub fn with_transform<S, T>(name: S, transform: T) -> Self
    where
        S: Into<String>,
        T: VariantTransform + 'static,
    {
        Self {
            name: name.into(),
            policy: Materialize::default(),
            transform: Arc::new(transform),
        }
    }

    pub fn with_policy(mut self, policy: Materialize) -> Self {
        self.policy = policy;
        self
    }

    /// Materialize right after attaching
    pub fn on_attach(self) -> Self {
        self.with_policy(Materialize::OnAttach)
    }

    /// Materialize on first read (the default)
    pub fn on_get(self) -> Self {
        self.with_policy(Materialize::OnGet)
    }

    /// Recompute on every read without storing
    pub fn on_demand(self) -> Self {
        self.with_policy(Materialize::OnDemand)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> Materialize {
        self.policy
    }

    pub fn transform(&self) -> &dyn VariantTransform {
        self.transform.as_ref()
    }
}

impl fmt::Debug for VariantSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantSpec")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

use crate::{SupervisorResult, Upstream, UpstreamProbe};

use async_trait::async_trait;

/// Source of truth for whether an upstream is enabled and currently live.
///
/// The supervisor only reads from it. An `Err` marks that upstream as
/// failed for the current cycle; a panic tears the whole task tree down.
#[async_trait]
pub trait UpstreamRegistry: Send + Sync {
    async fn query(&self, upstream: Upstream) -> SupervisorResult<UpstreamProbe>;
}

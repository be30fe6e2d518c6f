use crate::{SupervisorResult, Upstream, UpstreamHandle, UpstreamProbe, UpstreamRegistry};

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use palm_config::{Config, UpstreamConfig};
use tracing::{debug, info};

#[derive(Debug, Clone)]
struct RegistryEntry {
    enabled: bool,
    port: u16,
    handle: Option<UpstreamHandle>,
}

impl From<&UpstreamConfig> for RegistryEntry {
    fn from(config: &UpstreamConfig) -> Self {
        Self {
            enabled: config.enabled,
            port: config.port,
            handle: None,
        }
    }
}

/// In-process registry the proxy endpoints attach their handles to.
///
/// Cloning shares the same entries.
#[derive(Debug, Clone)]
pub struct SharedRegistry {
    entries: Arc<RwLock<[RegistryEntry; 2]>>,
}

impl SharedRegistry {
    pub fn new(lm_studio: &UpstreamConfig, ollama: &UpstreamConfig) -> Self {
        Self {
            entries: Arc::new(RwLock::new([lm_studio.into(), ollama.into()])),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.lm_studio, &config.ollama)
    }

    /// Record that the upstream's endpoint is live, replacing any previous handle.
    pub fn attach(&self, upstream: Upstream, handle: UpstreamHandle) -> Option<UpstreamHandle> {
        info!("{upstream} handle attached: {}", handle.label());
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries[upstream.index()].handle.replace(handle)
    }

    pub fn detach(&self, upstream: Upstream) -> Option<UpstreamHandle> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let previous = entries[upstream.index()].handle.take();
        if previous.is_some() {
            info!("{upstream} handle detached");
        }
        previous
    }

    pub fn set_enabled(&self, upstream: Upstream, enabled: bool) {
        debug!("{upstream} enabled={enabled}");
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries[upstream.index()].enabled = enabled;
    }

    pub fn probe(&self, upstream: Upstream) -> UpstreamProbe {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = &entries[upstream.index()];
        UpstreamProbe {
            enabled: entry.enabled,
            port: entry.port,
            handle_present: entry.handle.is_some(),
        }
    }
}

#[async_trait]
impl UpstreamRegistry for SharedRegistry {
    async fn query(&self, upstream: Upstream) -> SupervisorResult<UpstreamProbe> {
        Ok(self.probe(upstream))
    }
}

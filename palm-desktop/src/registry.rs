//! Registry backed by TCP reachability of the upstream ports.

use palm_config::{Config, UpstreamConfig};
use palm_supervisor::{SupervisorResult, Upstream, UpstreamProbe, UpstreamRegistry};

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tracing::trace;

/// Treats an upstream as live when something accepts connections on its port.
///
/// The proxy endpoints listen on localhost, so a successful connect within
/// the timeout stands in for an attached handle.
#[derive(Debug, Clone)]
pub struct PortProbeRegistry {
    host: IpAddr,
    lm_studio: UpstreamConfig,
    ollama: UpstreamConfig,
    timeout: Duration,
}

impl PortProbeRegistry {
    pub fn new(config: &Config) -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            lm_studio: config.lm_studio.clone(),
            ollama: config.ollama.clone(),
            timeout: Duration::from_millis(config.supervisor.probe_timeout_ms),
        }
    }

    fn upstream_config(&self, upstream: Upstream) -> &UpstreamConfig {
        match upstream {
            Upstream::LmStudio => &self.lm_studio,
            Upstream::Ollama => &self.ollama,
        }
    }

    async fn is_listening(&self, port: u16) -> bool {
        let addr = SocketAddr::new(self.host, port);
        match tokio::time::timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                trace!("Connect to {addr} failed: {e}");
                false
            }
            Err(_) => {
                trace!("Connect to {addr} timed out after {:?}", self.timeout);
                false
            }
        }
    }
}

#[async_trait]
impl UpstreamRegistry for PortProbeRegistry {
    async fn query(&self, upstream: Upstream) -> SupervisorResult<UpstreamProbe> {
        let config = self.upstream_config(upstream);

        // Disabled upstreams are never contacted.
        let handle_present = config.enabled && self.is_listening(config.port).await;

        Ok(UpstreamProbe {
            enabled: config.enabled,
            port: config.port,
            handle_present,
        })
    }
}

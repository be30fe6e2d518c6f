/// Raw answer of an [`crate::UpstreamRegistry`] for one upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamProbe {
    pub enabled: bool,
    pub port: u16,
    pub handle_present: bool,
}

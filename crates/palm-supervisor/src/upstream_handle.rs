/// Opaque proof that an upstream's proxy endpoint is live.
///
/// Presence is all the supervisor looks at; the label is for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamHandle {
    label: String,
}

impl UpstreamHandle {
    pub fn new<S: Into<String>>(label: S) -> Self {
        Self {
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

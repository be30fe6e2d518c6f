/// What the operator sees next to an upstream's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayClassification {
    Running,
    Failed,
    Disabled,
}

impl DisplayClassification {
    /// A disabled upstream is `Disabled` whether or not a handle lingers.
    pub fn classify(enabled: bool, handle_present: bool) -> Self {
        match (enabled, handle_present) {
            (true, true) => DisplayClassification::Running,
            (true, false) => DisplayClassification::Failed,
            (false, _) => DisplayClassification::Disabled,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayClassification::Running => "Running",
            DisplayClassification::Failed => "Failed",
            DisplayClassification::Disabled => "Disabled",
        }
    }
}

/// How a run of the task tree ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeOutcome {
    /// `stop()`, a restart or the exit hook cancelled the scope.
    Cancelled,
    /// A task inside the scope failed; the message was logged.
    Failed { message: String },
}

impl ScopeOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, ScopeOutcome::Failed { .. })
    }
}

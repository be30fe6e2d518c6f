/// One chunk of text as delivered to the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// Position in the sink's total order, starting at 0
    pub sequence: u64,
    pub text: String,
}

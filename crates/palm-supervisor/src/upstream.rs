use std::fmt;

/// One of the two backend model servers fronted by the proxy.
///
/// The declaration order is the delivery order of status lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Upstream {
    LmStudio,
    Ollama,
}

impl Upstream {
    pub const ALL: [Upstream; 2] = [Upstream::LmStudio, Upstream::Ollama];

    pub fn display_name(&self) -> &'static str {
        match self {
            Upstream::LmStudio => "LM Studio",
            Upstream::Ollama => "Ollama",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Upstream::LmStudio => 0,
            Upstream::Ollama => 1,
        }
    }
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

//! Capabilities registered with a pipeline.

/// Optional feature a pipeline can advertise to its processors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Capability {
    /// Trailing `{#id .class key=value}` attribute lists.
    AttrList,
}

/// Set of active capabilities, queried by processors that adapt to them.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    capabilities: Vec<Capability>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability. Registering twice is a no-op.
    pub fn register(&mut self, capability: Capability) {
        if !self.has(capability) {
            self.capabilities.push(capability);
        }
    }

    /// Whether a capability is active.
    #[must_use]
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Active capabilities in registration order.
    #[must_use]
    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }
}

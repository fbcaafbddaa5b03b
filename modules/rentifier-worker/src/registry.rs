//! Process-wide connector registry. Populated once at startup, read-only
//! afterwards; a source whose name has no entry is skipped, not an error.

use std::collections::HashMap;
use std::sync::Arc;

use crate::traits::Connector;

#[derive(Default)]
pub struct Registry {
    connectors: HashMap<&'static str, Arc<dyn Connector>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, connector: Arc<dyn Connector>) {
        let name = connector.source_name();
        if self.connectors.insert(name, connector).is_some() {
            tracing::warn!(source = name, "Connector registered twice, keeping the latest");
        }
    }

    pub fn get(&self, source_name: &str) -> Option<Arc<dyn Connector>> {
        self.connectors.get(source_name).cloned()
    }

    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }
}

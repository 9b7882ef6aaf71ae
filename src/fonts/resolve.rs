//! Resolving font resource names to descriptors

use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};

use crate::fonts::FontDescriptor;
use crate::pdf::FontScope;

/// Resolves font resource names against a page's scopes.
///
/// The page-local scope is tried first, then the shared scope. A name that
/// neither scope can produce, whether because it is missing, broken or too
/// slow, gets a placeholder descriptor.
#[derive(Debug, Clone)]
pub struct FontResolver {
    lookup_timeout: Duration,
}

impl FontResolver {
    pub fn new(lookup_timeout: Duration) -> Self {
        Self { lookup_timeout }
    }

    pub async fn resolve(
        &self,
        name: &str,
        local: &dyn FontScope,
        shared: &dyn FontScope,
    ) -> FontDescriptor {
        for (scope_name, scope) in [("page", local), ("shared", shared)] {
            if let Some(descriptor) = self.lookup(scope_name, scope, name).await {
                return descriptor;
            }
        }

        debug!(font = name, "font resource unresolved, using placeholder");
        FontDescriptor::placeholder(name)
    }

    async fn lookup(&self, scope_name: &str, scope: &dyn FontScope, name: &str) -> Option<FontDescriptor> {
        if !scope.contains(name) {
            return None;
        }

        match timeout(self.lookup_timeout, scope.lookup(name)).await {
            Ok(Ok(descriptor)) => Some(descriptor),
            Ok(Err(e)) => {
                debug!(font = name, scope = scope_name, error = %e, "font lookup failed");
                None
            }
            Err(_) => {
                warn!(
                    font = name,
                    scope = scope_name,
                    timeout_ms = self.lookup_timeout.as_millis() as u64,
                    "font lookup timed out"
                );
                None
            }
        }
    }
}

//! Anchor resolution — whether a wizard step's highlight target exists.
//!
//! Highlight steps point at regions of the host page via CSS selectors.
//! The manager never inspects the page itself; it asks an injected
//! `AnchorResolver`, so headless tests can substitute a plain predicate.

use std::collections::HashSet;
use std::sync::RwLock;

/// Predicate over ambient UI state: can `selector` currently be shown?
pub trait AnchorResolver: Send + Sync {
    fn resolves(&self, selector: &str) -> bool;
}

/// Registry of anchor selectors the host page reports as mounted.
///
/// The dashboard frontend re-reports its mounted anchors whenever its
/// layout changes; each report replaces the previous set wholesale. An
/// empty registry resolves nothing, so highlight steps are skipped until
/// the first report arrives.
#[derive(Debug, Default)]
pub struct AnchorRegistry {
    mounted: RwLock<HashSet<String>>,
}

impl AnchorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the set of mounted selectors.
    pub fn set_mounted<I>(&self, selectors: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut mounted = self.mounted.write().unwrap_or_else(|e| e.into_inner());
        *mounted = selectors.into_iter().collect();
    }

    /// Number of currently mounted selectors.
    pub fn len(&self) -> usize {
        self.mounted
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AnchorResolver for AnchorRegistry {
    fn resolves(&self, selector: &str) -> bool {
        self.mounted
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_registry_resolves_nothing() {
        let registry = AnchorRegistry::new();
        assert!(registry.is_empty());
        assert!(!registry.resolves("#crm-panel"));
    }

    #[test]
    fn reports_replace_not_merge() {
        let registry = AnchorRegistry::new();
        registry.set_mounted(vec!["#crm-panel".to_string()]);
        assert!(registry.resolves("#crm-panel"));

        registry.set_mounted(vec!["#campaigns-panel".to_string()]);
        assert!(!registry.resolves("#crm-panel"));
        assert!(registry.resolves("#campaigns-panel"));
        assert_eq!(registry.len(), 1);
    }
}

use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Namespaced,
    ClusterScoped,
    /// Cluster scoped and never overwritten once it exists.
    GuardedSingleton,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeTable {
    pub cluster_scoped: BTreeSet<String>,
    pub guarded: BTreeSet<String>,
}

impl Default for ScopeTable {
    fn default() -> Self {
        Self {
            cluster_scoped: ["namespaces", "clusterroles", "clusterrolebindings"]
                .map(String::from)
                .into(),
            guarded: ["namespaces".to_string()].into(),
        }
    }
}

impl ScopeTable {
    pub fn route(&self, plural: &str) -> Route {
        if self.guarded.contains(plural) {
            Route::GuardedSingleton
        } else if self.cluster_scoped.contains(plural) {
            Route::ClusterScoped
        } else {
            Route::Namespaced
        }
    }
}

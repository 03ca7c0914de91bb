use prometheus::{IntCounterVec, Opts, Registry};

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,
    pub reconciliations: IntCounterVec,
    /// Agent manifest documents by action (`apply` or `delete`).
    pub manifest_documents: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("akuity_operator".into()), None)?;

        let reconciliations = IntCounterVec::new(
            Opts::new("reconciliations_total", "Reconcile passes"),
            &["kind", "outcome"],
        )?;
        let manifest_documents = IntCounterVec::new(
            Opts::new("manifest_documents_total", "Agent manifest documents written"),
            &["action"],
        )?;
        registry.register(Box::new(reconciliations.clone()))?;
        registry.register(Box::new(manifest_documents.clone()))?;

        Ok(Self {
            registry,
            reconciliations,
            manifest_documents,
        })
    }

    pub fn reconciled(&self, kind: &str, outcome: &str) {
        self.reconciliations.with_label_values(&[kind, outcome]).inc();
    }

    pub fn documents(&self, delete: bool, count: usize) {
        let action = if delete { "delete" } else { "apply" };
        self.manifest_documents
            .with_label_values(&[action])
            .inc_by(count as u64);
    }
}

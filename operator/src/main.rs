use akuity_operator::crd::{Cluster, Instance};
use akuity_operator::error::Error;
use kube::CustomResourceExt;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let crds = [
        serde_yaml::to_string(&Cluster::crd())?,
        serde_yaml::to_string(&Instance::crd())?,
    ];
    tracing::debug!(count = crds.len(), "rendering CRDs");
    print!("{}", crds.join("---\n"));
    Ok(())
}

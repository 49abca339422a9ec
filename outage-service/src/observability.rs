use tracing_subscriber::EnvFilter;

/// Installs the fmt subscriber. `RUST_LOG` wins when set; otherwise the service and
/// engine crates log at info, plus the calling binary's own target.
pub fn init_tracing(binary_target: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(binary_target));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn default_filter(binary_target: &str) -> EnvFilter {
    EnvFilter::new(format!(
        "warn,outage_service=info,outage_core=info,{binary_target}=info"
    ))
}

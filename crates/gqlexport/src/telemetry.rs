use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::args::Args;

/// Installs the global subscriber. `GQLEXPORT_RUST_LOG` takes precedence over `--log` and
/// accepts any `EnvFilter` directive.
pub(crate) fn init(args: &Args) {
    let env_filter = EnvFilter::try_from_env("GQLEXPORT_RUST_LOG")
        .unwrap_or_else(|_| EnvFilter::new(args.log_level.unwrap_or_default().as_filter_str()));

    tracing_subscriber::registry()
        .with(args.log_format())
        .with(env_filter)
        .init();
}

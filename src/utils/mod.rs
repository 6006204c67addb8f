pub mod paths;

use std::sync::Once;

use tracing_subscriber::{filter::Directive, fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// One per workspace crate that logs; everything else stays at `RUST_LOG`'s level.
const DEFAULT_DIRECTIVES: [&str; 3] = [
    "expense_core=info",
    "xpense_core=info",
    "xpense_storage_json=info",
];

/// Installs the global fmt subscriber. `RUST_LOG` adds to the default directives.
/// Logs go to stderr so script-mode stdout stays clean.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let filter = default_filter(EnvFilter::from_default_env());
        // another subscriber may already be installed by an embedding binary
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

fn default_filter(mut filter: EnvFilter) -> EnvFilter {
    for raw in DEFAULT_DIRECTIVES {
        if let Ok(directive) = raw.parse::<Directive>() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_covers_every_logging_crate() {
        let rendered = default_filter(EnvFilter::new("warn")).to_string();
        for target in ["expense_core", "xpense_core", "xpense_storage_json"] {
            assert!(
                rendered.contains(&format!("{target}=info")),
                "missing {target} in {rendered}"
            );
        }
    }
}

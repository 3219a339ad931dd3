use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

const FALLBACK_LEVEL: &str = "warn";

// Транспортные крейты на debug печатают каждое соединение.
const QUIET_TARGETS: [&str; 3] = ["hyper_util", "reqwest", "h2"];

/// Логи идут в stderr, чтобы не смешиваться с выводом команд.
///
/// `level` уже выбран в [`crate::settings::Settings`] (`LOG_LEVEL`, затем
/// `RUST_LOG`), поэтому окружение здесь повторно не читается.
pub fn init_logging(level: &str) -> Result<()> {
    fmt()
        .with_env_filter(build_filter(level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(())
}

fn build_filter(level: &str) -> EnvFilter {
    let mut filter =
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL));

    for target in QUIET_TARGETS {
        if level.contains(target) {
            continue;
        }
        if let Ok(directive) = format!("{target}=warn").parse() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

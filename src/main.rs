//! Inkcast launcher entry point.

use std::process::ExitCode;

use inkcast::cli::ArgumentMap;
use inkcast::config::LaunchConfig;
use inkcast::error::Result;
use inkcast::mode::{self, ExecutionMode};
use inkcast::platform::PlatformProfile;
use inkcast::provision;
use inkcast::requirements::{self, missing_programs, required_programs};
use inkcast::ui::{Output, ProgressSpinner};
use inkcast::{guard, launch};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by the `RUST_LOG` environment variable;
/// the default is INFO.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("inkcast=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let out = Output::new();

    match run(&out) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            out.error(&e.to_string());
            ExitCode::from(1)
        }
    }
}

fn run(out: &Output) -> Result<i32> {
    let tokens: Vec<String> = std::env::args().skip(1).collect();
    let args = ArgumentMap::parse(tokens)?;
    let platform = PlatformProfile::detect()?;
    let mode = mode::resolve(&args);
    let root = std::env::current_dir()?;
    let config = LaunchConfig::assemble(args, platform, mode, &root);

    tracing::debug!(mode = %config.mode.flag_value(), root = %config.root.display(), "resolved launch configuration");

    // Help is answered by the downstream application; skip provisioning so
    // the answer is immediate on a fresh host.
    if config.args.is_set("help") || config.args.is_set("h") {
        return launch::launch(&config);
    }

    if config.mode == ExecutionMode::Native {
        provision_host(&config, out)?;
    } else {
        tracing::info!("container mode; dependencies are baked into the image");
    }

    launch::launch(&config)
}

/// The whole Native provisioning pipeline, in order.
fn provision_host(config: &LaunchConfig, out: &Output) -> Result<()> {
    guard::check()?;

    let spinner = ProgressSpinner::new("checking required programs");
    let report = missing_programs(required_programs());
    if report.all_satisfied() {
        spinner.finish_success("all required programs present");
    } else {
        let names: Vec<&str> = report.missing().iter().map(|r| r.canonical_name).collect();
        spinner.finish_error(&format!("missing programs: {}", names.join(", ")));
        out.status("installing missing programs");

        let ctx =
            requirements::installer::default_context(config.platform.os_family, config.tmp_dir());
        requirements::install_missing(report.missing(), required_programs(), &ctx)?;
        out.success("required programs installed");
    }

    let ctx = provision::default_context(config.root.clone());
    let conda = provision::ensure_manager(&config.platform, &ctx)?;
    if provision::ensure_environment(&conda, &config.env, &ctx)? {
        out.success("runtime environment ready");
    }

    Ok(())
}

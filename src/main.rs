use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use morphfield::{Background, BackgroundConfig, BlendStrategy, Theme};

/// Shape-morphing cube background.
#[derive(Parser, Debug)]
#[command(name = "morphfield", version, about)]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Color theme (dark or light)
    #[arg(short, long)]
    theme: Option<Theme>,

    /// Number of cubes
    #[arg(short = 'n', long)]
    count: Option<u32>,

    /// Blend strategy
    #[arg(long, value_parser = parse_blend)]
    blend: Option<BlendStrategy>,

    /// Fixed RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Borderless window pinned beneath other windows
    #[arg(long)]
    background: bool,

    /// Log directive applied on top of RUST_LOG (e.g. morphfield=debug)
    #[arg(long, value_parser = parse_directive)]
    log_level: Option<Directive>,
}

const DEFAULT_LOG: &str = "morphfield=info";

fn parse_blend(s: &str) -> Result<BlendStrategy, String> {
    match s {
        "distance" => Ok(BlendStrategy::Distance),
        "radial" => Ok(BlendStrategy::Radial),
        other => Err(format!("unknown blend strategy `{other}` (distance, radial)")),
    }
}

fn parse_directive(s: &str) -> Result<Directive, String> {
    s.parse().map_err(|e| format!("invalid log directive `{s}`: {e}"))
}

/// RUST_LOG (or the default) with the `--log-level` directive layered on top.
fn log_filter(env: Option<EnvFilter>, level: Option<Directive>) -> EnvFilter {
    let filter = env.unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG));
    match level {
        Some(directive) => filter.add_directive(directive),
        None => filter,
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(
            EnvFilter::try_from_default_env().ok(),
            args.log_level.clone(),
        ))
        .init();

    let mut config = match &args.config {
        Some(path) => match BackgroundConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => BackgroundConfig::default(),
    };

    if let Some(theme) = args.theme {
        config.theme = theme;
    }
    if let Some(count) = args.count {
        config.object_count = count;
    }
    if let Some(strategy) = args.blend {
        config.blend.strategy = strategy;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.background {
        config.window.background = true;
    }

    match Background::new().with_config(config).run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_overrides_env() {
        let env = EnvFilter::new("morphfield=warn");
        let level = parse_directive("morphfield=debug").unwrap();
        let filter = log_filter(Some(env), Some(level)).to_string();
        assert!(filter.contains("morphfield=debug"), "{filter}");
        assert!(!filter.contains("morphfield=warn"), "{filter}");
    }

    #[test]
    fn test_log_level_keeps_other_env_targets() {
        let env = EnvFilter::new("wgpu_core=error");
        let level = parse_directive("morphfield=trace").unwrap();
        let filter = log_filter(Some(env), Some(level)).to_string();
        assert!(filter.contains("wgpu_core=error"));
        assert!(filter.contains("morphfield=trace"));
    }

    #[test]
    fn test_log_default() {
        assert_eq!(log_filter(None, None).to_string(), DEFAULT_LOG);
        let env = log_filter(Some(EnvFilter::new("morphfield=warn")), None);
        assert_eq!(env.to_string(), "morphfield=warn");
    }

    #[test]
    fn test_parse_log_level_arg() {
        let args = Args::try_parse_from(["morphfield", "--log-level", "morphfield=debug"]).unwrap();
        assert_eq!(args.log_level.map(|d| d.to_string()).as_deref(), Some("morphfield=debug"));

        let args = Args::try_parse_from(["morphfield"]).unwrap();
        assert!(args.log_level.is_none());

        assert!(Args::try_parse_from(["morphfield", "--log-level", "morphfield=loud"]).is_err());
    }
}

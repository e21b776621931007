use anyhow::Result;
use clap::Parser;
use pf_jar::cli::{Cli, Commands, OutputFormat};
use pf_jar::config::{resolve_classpath_elements, resolve_output_root, resolve_registry};
use pf_jar::pipeline::{ScanOptions, run};
use pf_jar::registry::Registry;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Scan {
            classpath,
            output,
            types,
            format,
            strict,
        } => {
            let registry = resolve_registry(types.as_deref())?;
            let classpath = resolve_classpath_elements(&classpath);
            let output_root = resolve_output_root(output.as_deref(), &classpath);

            let report = run(&ScanOptions {
                classpath,
                output_root,
                registry,
            });

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                OutputFormat::Text => print!("{}", report.to_text()),
            }

            if strict && !report.is_clean() {
                for path in report.failed_paths() {
                    tracing::error!("failed: {path}");
                }
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Types { types, format } => {
            let registry = resolve_registry(types.as_deref())?;
            write_types(&registry, format)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn write_types(registry: &Registry, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(registry.types())?),
        OutputFormat::Text => {
            for t in registry.types() {
                println!("{}: {}", t.file_name, t.markers.join(", "));
            }
        }
    }
    Ok(())
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pf_jar={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

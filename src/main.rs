use std::path::Path;

use anyhow::{bail, Context as _, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use basalt::cli::{Cli, Command};
use basalt::{parser, validation, Config, Generator, Registry, ResourceKind};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Scan { path } => run_scan(&path),
        Command::Validate { path } => run_validate(&path),
        Command::Generate { path, out } => run_generate(&path, &out, cli.config.as_deref()),
    }
}

fn ingest(path: &Path) -> Result<Registry> {
    let registry = Registry::new();
    let summary = parser::ingest_dir(&registry, path)?;
    tracing::info!(
        files = summary.files,
        resources = summary.resources,
        "ingested resource declarations"
    );
    Ok(registry)
}

fn run_scan(path: &Path) -> Result<()> {
    let registry = ingest(path)?;

    for kind in ResourceKind::ALL {
        let names = registry.names_by_kind(kind);
        if names.is_empty() {
            continue;
        }
        println!("{kind} ({}):", names.len());
        for name in names {
            println!("  - {name}");
        }
    }
    println!("total: {} resources", registry.total_count());
    Ok(())
}

fn run_validate(path: &Path) -> Result<()> {
    let registry = ingest(path)?;

    let issues = validation::validate(&registry);
    if issues.is_empty() {
        tracing::info!(resources = registry.total_count(), "no validation issues found");
        return Ok(());
    }

    for issue in &issues {
        tracing::error!("{issue}");
    }
    bail!("found {} validation issues", issues.len());
}

fn run_generate(path: &Path, out: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = Config::discover(path, config_path)?;
    let registry = ingest(path)?;

    let issues = validation::validate(&registry);
    if !issues.is_empty() {
        for issue in &issues {
            tracing::error!("{issue}");
        }
        bail!("found {} validation issues", issues.len());
    }

    let artifact = Generator::new(&registry, &config).generate()?;

    std::fs::create_dir_all(out)
        .with_context(|| format!("failed to create output directory {}", out.display()))?;
    let out_path = out.join("main.tf");
    std::fs::write(&out_path, artifact)
        .with_context(|| format!("failed to write {}", out_path.display()))?;

    tracing::info!(output = %out_path.display(), "generated main.tf");
    for kind in ResourceKind::ALL {
        let count = registry.count(kind);
        if count > 0 {
            tracing::info!(kind = %kind, count, "generated modules");
        }
    }
    Ok(())
}

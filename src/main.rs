//! Folio - a reader for statically hosted markdown documentation.

mod cli;
mod config;
mod fetch;
mod index;
mod logger;
mod manifest;
mod nav;
mod page;
mod render;
mod serve;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use config::FolioConfig;
use folio_core::{Collection, compile, search};
use manifest::{SearchManifest, parse_manifest};
use nav::humanize_section;
use page::{page_location, render_page};
use serve::serve_site;
use std::{fs, io::Write, path::Path};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = FolioConfig::load(&cli)?;
    let collection = config.viewer.collection;

    match &cli.command {
        Commands::Render { id, output, .. } => render(&config, collection, id.as_deref(), output.as_deref()),
        Commands::Search { query, limit, .. } => search_docs(&config, collection, &query.join(" "), *limit),
        Commands::Sanitize { file } => sanitize_file(&config, file),
        Commands::Index { collection } => {
            let targets = match collection {
                Some(one) => vec![Collection::from(*one)],
                None => vec![Collection::Primary, Collection::Secondary],
            };
            targets
                .into_iter()
                .try_for_each(|target| index::build_collection(&config, target).map(|_| ()))
        }
        Commands::Serve { .. } => serve_site(&config),
    }
}

/// Render one reader page headlessly.
fn render(config: &FolioConfig, collection: Collection, id: Option<&str>, output: Option<&Path>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let location = page_location(config, collection, id);
    let html = runtime.block_on(render_page(config, collection, location))?;

    match output {
        Some(path) => {
            fs::write(path, html).with_context(|| format!("Failed to write {}", path.display()))?;
            log!("render"; "wrote {}", path.display());
        }
        None => std::io::stdout().lock().write_all(html.as_bytes())?,
    }
    Ok(())
}

/// Rank the collection's search manifest against `query`.
fn search_docs(config: &FolioConfig, collection: Collection, query: &str, limit: usize) -> Result<()> {
    let path = config.collection_root(collection).join(&config.viewer.search);
    let body = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let manifest: SearchManifest =
        parse_manifest(&body).with_context(|| format!("`{}` is not a valid manifest", path.display()))?;

    let corpus = compile(manifest.items);
    let results = search(&corpus, query, limit);
    log!("search"; "{} of {} documents match `{query}`", results.len(), corpus.len());

    let mut stdout = std::io::stdout().lock();
    for item in results {
        writeln!(stdout, "{}\t{}\t{}", item.id, item.title, humanize_section(&item.section))?;
        if let Some(summary) = item.summary.as_deref().filter(|s| !s.is_empty()) {
            writeln!(stdout, "\t{summary}")?;
        }
    }
    Ok(())
}

/// Print a source file the way the reader sanitizes it before rendering.
fn sanitize_file(config: &FolioConfig, file: &Path) -> Result<()> {
    let markdown =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let sanitized = config.sanitizer()?.sanitize(&markdown);
    std::io::stdout().lock().write_all(sanitized.as_bytes())?;
    Ok(())
}

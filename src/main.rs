use std::path::{Path, PathBuf};

use bibfacet::{
    Catalog, CatalogConfig, CatalogSession, ConfigDb, DataDir, Error, Result,
    render, source,
};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Command, ConfigAction, FacetsArgs, SearchArgs, SourceAction};

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("BIBFACET_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Command::Completions(args) = &cli.command {
        args.generate();
        return Ok(());
    }

    let data_dir = DataDir::resolve(cli.data_dir.as_deref())?;
    let config_db = ConfigDb::open(&data_dir.config_db())?;
    let explicit_config = cli.config.as_deref();

    match cli.command {
        Command::Search(args) => {
            let config =
                CatalogConfig::resolve(explicit_config, &data_dir.config_toml())?;
            cmd_search(&config_db, &config, args)?;
        }
        Command::Facets(args) => {
            let config =
                CatalogConfig::resolve(explicit_config, &data_dir.config_toml())?;
            cmd_facets(&config_db, &config, &args)?;
        }
        Command::Source { action } => match action {
            SourceAction::Add {
                path,
                name,
                default,
            } => {
                let config = CatalogConfig::resolve(
                    explicit_config,
                    &data_dir.config_toml(),
                )?;
                source_add(&config_db, &config, &path, &name, default)?;
            }
            SourceAction::Remove { name } => {
                source_remove(&config_db, &name)?;
            }
            SourceAction::List { json } => {
                source_list(&config_db, json)?;
            }
            SourceAction::Default { name } => {
                source_default(&config_db, &name)?;
            }
        },
        Command::Config { action } => match action {
            ConfigAction::Show => {
                let config = CatalogConfig::resolve(
                    explicit_config,
                    &data_dir.config_toml(),
                )?;
                print!("{}", config.to_toml()?);
            }
            ConfigAction::Init { force } => {
                config_init(&data_dir, force)?;
            }
        },
        Command::Completions(_) => {}
    }

    Ok(())
}

/// Find the catalog file for `--source`: a registered name first, then a
/// path. Without `--source` the default registered source is used.
fn resolve_source(config_db: &ConfigDb, requested: Option<&str>) -> Result<PathBuf> {
    let name = match requested {
        Some(requested) => {
            if let Some(path) = config_db.get_source(requested)? {
                debug!(source = requested, path = %path, "using registered source");
                return Ok(PathBuf::from(path));
            }
            let path = Path::new(requested);
            if path.is_file() {
                return Ok(path.to_path_buf());
            }
            return Err(Error::NotFound {
                kind: "source",
                name: requested.to_string(),
            });
        }
        None => config_db.default_source()?.ok_or_else(|| {
            Error::Config(
                "no --source given and no default source registered \
                 (see `bibfacet source add --default`)"
                    .into(),
            )
        })?,
    };

    config_db
        .get_source(&name)?
        .map(PathBuf::from)
        .ok_or(Error::NotFound {
            kind: "source",
            name,
        })
}

fn load_catalog(
    config_db: &ConfigDb,
    config: &CatalogConfig,
    requested: Option<&str>,
) -> Result<Catalog> {
    let path = resolve_source(config_db, requested)?;
    let source = source::open_source(&path, config);
    Catalog::load(source.as_ref(), config)
}

fn cmd_search(
    config_db: &ConfigDb,
    config: &CatalogConfig,
    args: SearchArgs,
) -> Result<()> {
    let catalog = load_catalog(config_db, config, args.source.as_deref())?;

    let mut session = CatalogSession::new(&catalog);
    session.set_types(args.types);
    session.set_languages(args.languages);
    session.set_keywords(args.keywords);
    session.set_search_text(args.query.unwrap_or_default());

    let view = session.view();
    debug!(matches = view.match_count, total = view.total, "filters applied");

    let mut out = std::io::stdout().lock();
    if args.json {
        render::format_json(&mut out, &view, args.limit)
    } else if args.links {
        render::format_links(&mut out, &view)
    } else {
        render::format_human(&mut out, &view, args.limit)
    }
}

fn cmd_facets(
    config_db: &ConfigDb,
    config: &CatalogConfig,
    args: &FacetsArgs,
) -> Result<()> {
    let catalog = load_catalog(config_db, config, args.source.as_deref())?;

    let mut out = std::io::stdout().lock();
    if args.json {
        render::format_facets_json(&mut out, catalog.facets())
    } else {
        render::format_facets_human(&mut out, catalog.facets())
    }
}

fn source_add(
    config_db: &ConfigDb,
    config: &CatalogConfig,
    path: &Path,
    name: &str,
    make_default: bool,
) -> Result<()> {
    if !path.is_file() {
        return Err(Error::Config(format!(
            "not a readable file: {}",
            path.display()
        )));
    }

    let abs_path = path.canonicalize().map_err(|e| {
        Error::Config(format!("cannot resolve path {}: {e}", path.display()))
    })?;

    if config_db.get_source(name)?.is_some() {
        return Err(Error::Config(format!("source '{name}' already exists")));
    }

    // Refuse to register a file the pipeline cannot read.
    let catalog =
        Catalog::load(source::open_source(&abs_path, config).as_ref(), config)?;

    config_db.set_source(name, &abs_path.to_string_lossy())?;

    let first = config_db.default_source()?.is_none();
    if make_default || first {
        config_db.set_default_source(name)?;
        info!(source = name, "default source set");
    }

    println!(
        "Added source '{name}' -> {} ({} records)",
        abs_path.display(),
        catalog.len()
    );
    Ok(())
}

fn source_remove(config_db: &ConfigDb, name: &str) -> Result<()> {
    if !config_db.remove_source(name)? {
        return Err(Error::NotFound {
            kind: "source",
            name: name.to_string(),
        });
    }
    println!("Removed source '{name}'");
    Ok(())
}

fn source_list(config_db: &ConfigDb, json: bool) -> Result<()> {
    let sources = config_db.list_sources()?;
    let default = config_db.default_source()?;
    let is_default = |name: &str| default.as_deref() == Some(name);

    if json {
        let entries: Vec<_> = sources
            .iter()
            .map(|(name, path)| {
                serde_json::json!({
                    "name": name,
                    "path": path,
                    "default": is_default(name),
                })
            })
            .collect();
        println!("{}", serde_json::Value::Array(entries));
    } else if sources.is_empty() {
        println!("No sources registered.");
    } else {
        for (name, path) in &sources {
            let marker = if is_default(name) { "*" } else { " " };
            println!("{marker} {name}\t{path}");
        }
    }
    Ok(())
}

fn source_default(config_db: &ConfigDb, name: &str) -> Result<()> {
    if config_db.get_source(name)?.is_none() {
        return Err(Error::NotFound {
            kind: "source",
            name: name.to_string(),
        });
    }
    config_db.set_default_source(name)?;
    println!("Default source is now '{name}'");
    Ok(())
}

fn config_init(data_dir: &DataDir, force: bool) -> Result<()> {
    let path = data_dir.config_toml();
    if path.exists() && !force {
        return Err(Error::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    CatalogConfig::default().save(&path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

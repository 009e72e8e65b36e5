//! querydeck - run a handful of catalog queries as one merged table.

mod cli;
mod logging;

use std::future::Future;

use cli::{Cli, Command};
use db_querydeck::batch::{validate_selection, SchemaPolicy};
use db_querydeck::catalog::QueryCatalog;
use db_querydeck::config::{Config, ConnectionConfig};
use db_querydeck::db::{self, DataSource};
use db_querydeck::error::{DeckError, Result};
use db_querydeck::output::BatchOutput;
use db_querydeck::session::{scenario_selection, QuerySession};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse_args();
    logging::init_stderr_logging(cli.verbose);

    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!("Could not load .env: {e}");
        }
    }

    if let Err(e) = run(cli).await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let format = cli.parse_output_format().map_err(DeckError::config)?;
    let output = BatchOutput::new(format);

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let catalog = match &config.catalog {
        Some(catalog) => QueryCatalog::from_config(catalog)?,
        None => QueryCatalog::builtin(),
    };

    let text = match &cli.command {
        Command::Queries => output.format_queries(&catalog),
        Command::Scenarios => output.format_scenarios(&catalog),
        Command::Run { .. } => {
            run_batch_command(&cli, &config, catalog, &output, |conn| async move {
                db::connect(&conn).await
            })
            .await?
        }
    };
    print!("{text}");

    Ok(())
}

/// Handles `run`: resolve and validate the selection, then connect and execute.
///
/// Nothing touches the connection settings or the data source until the
/// selection has been accepted.
async fn run_batch_command<C, F>(
    cli: &Cli,
    config: &Config,
    catalog: QueryCatalog,
    output: &BatchOutput,
    connect: C,
) -> Result<String>
where
    C: FnOnce(ConnectionConfig) -> F,
    F: Future<Output = Result<Box<dyn DataSource>>>,
{
    let Command::Run {
        ids,
        scenario,
        strict,
    } = &cli.command
    else {
        return Err(DeckError::internal("run_batch_command called without `run`"));
    };

    let ordered = match scenario {
        Some(key) => validate_selection(scenario_selection(&catalog, key)?, &catalog)?,
        None => validate_selection(ids.iter().copied(), &catalog)?,
    };

    let connection = resolve_connection(cli, config)?.ok_or_else(|| {
        DeckError::config(
            "No database connection configured. Use --url, --host/--database, \
             or a [connections.default] entry in the config file.",
        )
    })?;
    info!("Connection: {}", connection.display_string());

    let policy = SchemaPolicy::from_strict(*strict || config.batch.strict_schema);
    let source = connect(connection).await?;
    let mut session = QuerySession::new(catalog, source).with_policy(policy);

    let outcome = session.run_validated(ordered).await;
    let text = match (&outcome, session.current()) {
        (Ok(summary), Some(result)) => {
            let queries = session.queries(&summary.query_ids);
            output.format_batch(result, &queries, summary.duration)
        }
        _ => String::new(),
    };

    if let Err(e) = session.close().await {
        warn!("Failed to close connection: {e}");
    }
    outcome?;

    Ok(text)
}

/// Resolves the final connection configuration from CLI args, config file, and environment.
///
/// CLI connection args override the fields of a named connection.
fn resolve_connection(cli: &Cli, config: &Config) -> Result<Option<ConnectionConfig>> {
    let from_args = cli.to_connection_config()?;

    let named = match cli.connection_name() {
        Some(name) => Some(config.get_connection(Some(name)).cloned().ok_or_else(|| {
            DeckError::config(format!("Connection '{}' not found in config file", name))
        })?),
        None => None,
    };

    let mut connection = match (named, from_args) {
        (Some(mut base), Some(overrides)) => {
            base.merge(&overrides);
            Some(base)
        }
        (Some(base), None) => Some(base),
        (None, Some(args)) => Some(args),
        (None, None) => config.get_connection(None).cloned(),
    };

    if connection.is_none() && std::env::var_os("PGDATABASE").is_some() {
        connection = Some(ConnectionConfig::default());
    }

    if let Some(ref mut conn) = connection {
        conn.apply_env_defaults();
    }

    Ok(connection)
}

//! `docqa` entry point.
//!
//! Without a subcommand the HTTP server starts; the other subcommands drive
//! the same pipeline from the terminal.

use anyhow::{Context, Result};
use docqa::{
    api::routes::create_router,
    cli::{
        init::{self, InitConfig, InitResult},
        output::Output,
        ClearTarget, Cli, Commands,
    },
    utils::toml_config::{DocqaConfig, ServerConfig},
    AppError, AppState, ChromaStore,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    if let Err(e) = run(cli, &output).await {
        output.error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    if let Some(Commands::Init {
        path,
        force,
        host,
        port,
        model,
    }) = cli.command
    {
        let config = InitConfig {
            path,
            force,
            host,
            port,
            model,
        };
        return match init::run(config, output) {
            InitResult::Success | InitResult::AlreadyExists => Ok(()),
            InitResult::Error(e) => Err(anyhow::anyhow!(e)),
        };
    }

    let mut config = DocqaConfig::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    let serving = matches!(cli.command, None | Some(Commands::Serve { .. }));
    init_tracing(&config.server, serving, cli.verbose);

    match cli.command {
        None => serve(config, cli.in_memory, output).await,
        Some(Commands::Serve { host, port }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config, cli.in_memory, output).await
        }
        Some(Commands::Config { validate }) => {
            show_config(&config, &cli.config, validate, output);
            Ok(())
        }
        Some(command) => {
            let state = AppState::from_config(config, cli.in_memory)?;
            state.workspace.ensure_dirs().await?;
            if cli.in_memory {
                output.warning("--in-memory: vectors are discarded when this command exits");
            }
            run_command(command, &state, output).await
        }
    }
}

/// Log filter precedence: `RUST_LOG`, then `--verbose`, then the configured
/// level for the server or `warn` for one-shot commands.
fn init_tracing(server: &ServerConfig, serving: bool, verbose: bool) {
    let default_level = if verbose {
        "debug"
    } else if serving {
        server.log_level.as_str()
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("docqa={0},tower_http={0}", default_level))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if server.log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn serve(config: DocqaConfig, in_memory: bool, output: &Output) -> Result<()> {
    let addr = config.bind_addr();
    let state = AppState::from_config(config, in_memory)?;
    state.workspace.ensure_dirs().await?;

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    output.banner();
    output.info(&format!("Listening on http://{}", addr));
    if in_memory {
        output.warning("Vectors are kept in memory and lost on restart");
    }
    tracing::info!(addr = %addr, in_memory, "Server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn run_command(command: Commands, state: &AppState, output: &Output) -> Result<()> {
    match command {
        Commands::Upload { files } => upload(files, state, output).await,
        Commands::Index => {
            output.info("Splitting documents into chunks and creating embeddings...");
            let report = match state.indexer.rebuild().await {
                Err(AppError::NoDocuments) => {
                    output.warning(&AppError::NoDocuments.to_string());
                    return Ok(());
                }
                other => other?,
            };
            output.index_report(&report);
            Ok(())
        }
        Commands::Ask {
            question,
            top_k,
            sources,
        } => {
            let response = match state.qa.ask(&question, top_k).await {
                Err(AppError::IndexMissing) => {
                    output.warning(&AppError::IndexMissing.to_string());
                    return Ok(());
                }
                other => other?,
            };
            output.answer(&response, sources);
            Ok(())
        }
        Commands::Status => status(state, output).await,
        Commands::Clear { target, yes } => {
            let prompt = match target {
                ClearTarget::Uploads => "Delete all uploaded files in data/?",
                ClearTarget::Index => "Clear the vector DB?",
                ClearTarget::All => "Delete uploaded files and the vector DB?",
            };
            if !yes && !output.confirm(prompt) {
                output.info("Cancelled");
                return Ok(());
            }
            if matches!(target, ClearTarget::Uploads | ClearTarget::All) {
                let removed = state.workspace.clear_uploads().await?;
                output.success(&format!("data/ cleaned ({} file(s) removed).", removed));
            }
            if matches!(target, ClearTarget::Index | ClearTarget::All) {
                state.indexer.clear().await?;
                output.success("db/ cleared.");
            }
            Ok(())
        }
        Commands::Init { .. } | Commands::Serve { .. } | Commands::Config { .. } => Ok(()),
    }
}

async fn upload(files: Vec<PathBuf>, state: &AppState, output: &Output) -> Result<()> {
    output.info(&format!(
        "Saving {} file(s) to the data/ folder...",
        files.len()
    ));
    for path in files {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Not a file: {}", path.display()))?
            .to_string();
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let saved = state.workspace.save_upload(&name, &bytes).await?;
        output.created("document", &saved.display().to_string());
    }
    output.success("Files saved. Now run 'docqa index' to create embeddings.");
    Ok(())
}

async fn status(state: &AppState, output: &Output) -> Result<()> {
    output.header("Documents");
    let documents = state.workspace.list_documents().await?;
    if documents.is_empty() {
        output.info("No documents uploaded");
    } else {
        output.documents(&documents);
    }

    output.header("Index");
    match state.workspace.read_manifest().await {
        Some(manifest) => output.manifest(&manifest),
        None if state.workspace.index_present().await => {
            output.warning("db/ is not empty but has no manifest");
        }
        None => {
            output.info("No index built");
            output.hint("Run 'docqa index' after uploading documents");
        }
    }

    output.header("Services");
    output.kv("Ollama", &state.config.ollama.base_url);
    let chroma = ChromaStore::from_config(&state.config.chroma)?;
    match chroma.heartbeat().await {
        Ok(()) => output.kv("Chroma", &format!("{} (reachable)", state.config.chroma.url)),
        Err(e) => output.warning(&format!("Chroma at {}: {}", state.config.chroma.url, e)),
    }
    Ok(())
}

fn show_config(config: &DocqaConfig, path: &std::path::Path, validate: bool, output: &Output) {
    output.header("Configuration");
    let source = if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found, using defaults)", path.display())
    };
    output.kv("File", &source);
    output.kv("Server", &config.bind_addr());
    output.kv("Data directory", &config.storage.data_dir.display().to_string());
    output.kv("DB directory", &config.storage.db_dir.display().to_string());
    output.kv("Ollama", &config.ollama.base_url);
    output.kv("Model", &config.ollama.model);
    output.kv("Embedding model", &config.ollama.embedding_model);
    output.kv("Chroma", &config.chroma.url);
    output.kv("Collection", &config.chroma.collection);
    output.kv(
        "Chunking",
        &format!(
            "{} chars, {} overlap",
            config.rag.chunk_size, config.rag.chunk_overlap
        ),
    );
    output.kv("Top k", &config.rag.top_k.to_string());

    if validate {
        // Loading already ran validation
        output.success("Configuration is valid");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

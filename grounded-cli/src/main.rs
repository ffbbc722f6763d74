use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use grounded_core::config::Config;
use grounded_core::server::{self, DocumentInput, Request, Response};
use grounded_core::Server;
use grounded_plugin::PluginRegistry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "grounded")]
#[command(about = "Answer questions grounded in a private knowledge base", long_about = None)]
#[command(version)]
struct Cli {
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Run the answering server on the configured socket")]
    Serve,

    #[command(about = "Ask a question")]
    Ask {
        #[arg(help = "The question to answer")]
        query: String,
    },

    #[command(about = "Add a text chunk to the knowledge base")]
    Add {
        content: String,

        #[arg(short, long, help = "Source label used when citing this chunk")]
        source: Option<String>,
    },

    #[command(about = "Index a directory of text files")]
    Index { path: PathBuf },

    #[command(about = "Show knowledge base statistics")]
    Stats,

    #[command(about = "List available tools")]
    Tools,

    #[command(about = "Call a tool")]
    Tool {
        name: String,

        #[arg(short, long, help = "Tool arguments as a JSON object")]
        args: Option<String>,
    },

    #[command(about = "Show current configuration")]
    Show,

    #[command(about = "Model management commands")]
    Model {
        #[command(subcommand)]
        command: ModelCommands,
    },
}

#[derive(Subcommand)]
enum ModelCommands {
    #[command(about = "Show current generation and embedding models")]
    Show,

    #[command(about = "Set the generation model")]
    Set {
        #[arg(help = "Model name (e.g., 'llama3.2:latest')")]
        model: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("grounded_core=info,grounded_plugin=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => serve(&cli.config).await,
        Commands::Ask { query } => ask(&cli.config, query).await,
        Commands::Add { content, source } => add(&cli.config, content, source).await,
        Commands::Index { path } => index(&cli.config, &path).await,
        Commands::Stats => request(&cli.config, Request::Stats).await,
        Commands::Tools => request(&cli.config, Request::Tools).await,
        Commands::Tool { name, args } => tool(&cli.config, name, args).await,
        Commands::Show => show_config(&cli.config),
        Commands::Model { command } => match command {
            ModelCommands::Show => show_model(&cli.config),
            ModelCommands::Set { model } => set_model(&cli.config, &model),
        },
    }
}

fn load_config(config_path: &Path) -> Result<Config> {
    Config::load_or_default(config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))
}

async fn serve(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;

    let mut registry = PluginRegistry::new(config.permission);
    grounded_std::register_defaults(&mut registry).context("Failed to register tools")?;

    println!(
        "{} Serving {} tools on {}",
        "→".blue(),
        registry.len(),
        config.server.socket_path.cyan()
    );
    Server::new(config, registry).start().await
}

async fn ask(config_path: &Path, query: String) -> Result<()> {
    request(config_path, Request::query(query)).await
}

async fn add(config_path: &Path, content: String, source: Option<String>) -> Result<()> {
    let metadata: HashMap<String, String> = source
        .map(|source| HashMap::from([("source".to_string(), source)]))
        .unwrap_or_default();
    let documents = vec![DocumentInput { content, metadata }];
    request(config_path, Request::Add { documents }).await
}

async fn index(config_path: &Path, path: &Path) -> Result<()> {
    let path = path
        .canonicalize()
        .with_context(|| format!("Cannot index {}", path.display()))?;
    request(
        config_path,
        Request::Index {
            path: path.to_string_lossy().to_string(),
        },
    )
    .await
}

async fn tool(config_path: &Path, name: String, args: Option<String>) -> Result<()> {
    let arguments = match args {
        Some(args) => serde_json::from_str(&args).context("Tool arguments must be valid JSON")?,
        None => serde_json::Value::Null,
    };
    request(config_path, Request::Tool { name, arguments }).await
}

/// Sends one request to the running server and prints the response.
async fn request(config_path: &Path, request: Request) -> Result<()> {
    let config = load_config(config_path)?;
    let response = server::send_request(&config.server.socket_path, &request)
        .await
        .with_context(|| {
            format!(
                "Failed to reach server at {}. Is `grounded serve` running?",
                config.server.socket_path
            )
        })?;
    print_response(response)
}

fn print_response(response: Response) -> Result<()> {
    match response {
        Response::Answer(answer) => {
            println!("{} {}", "Q:".bold(), answer.query);
            println!("{} {}", "A:".bold().green(), answer.answer);
        }
        Response::Message { message } => println!("{} {}", "✓".green().bold(), message),
        Response::Documents { documents } => {
            println!("Knowledge base contains {} documents", documents.to_string().cyan())
        }
        Response::Tools { tools } => {
            println!("{}", "Available tools:".bold().green());
            println!();
            for tool in tools {
                let name = tool["name"].as_str().unwrap_or_default();
                let description = tool["description"].as_str().unwrap_or_default();
                println!("  {} {} - {}", "•".cyan(), name.bold(), description);
            }
        }
        Response::Output { output, .. } => println!("{}", output),
        Response::Error { error, kind } => {
            bail!("{:?}: {}", kind, error)
        }
    }
    Ok(())
}

fn show_config(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;

    println!("{}", "Current Configuration:".bold().green());
    println!();
    println!("{}", "LLM:".bold());
    println!("  Model:            {}", config.llm.model.cyan());
    println!("  Base URL:         {}", config.llm.base_url);
    println!("  Temperature:      {}", config.llm.temperature);
    println!("  Timeout:          {}s", config.llm.timeout_secs);
    println!();
    println!("{}", "RAG:".bold());
    println!("  Embedding Model:  {}", config.rag.embedding_model.cyan());
    println!("  Top K:            {}", config.rag.top_k);
    println!("  Threshold:        {}", config.rag.similarity_threshold);
    println!("  On Empty Context: {:?}", config.rag.on_empty_context);
    println!("  Seed On Startup:  {}", config.rag.seed_on_startup);
    println!("  Chunk Size:       {}", config.rag.indexer.chunk_size);
    println!("  Chunk Overlap:    {}", config.rag.indexer.chunk_overlap);
    println!();
    println!("{}", "Server:".bold());
    println!("  Socket:           {}", config.server.socket_path);

    Ok(())
}

fn show_model(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;

    println!("{}: {}", "Generation model".bold(), config.llm.model.cyan());
    println!("{}: {}", "Embedding model".bold(), config.rag.embedding_model.cyan());
    Ok(())
}

/// Rewrites `llm.model` in the config file. The file is re-serialized, so
/// comments and formatting are not preserved.
fn set_model(config_path: &Path, model: &str) -> Result<()> {
    let content = std::fs::read_to_string(config_path).context("Failed to read config file")?;

    let mut config: serde_yaml::Value =
        serde_yaml::from_str(&content).context("Failed to parse config")?;

    let Some(llm) = config.get_mut("llm").and_then(|llm| llm.as_mapping_mut()) else {
        bail!("Config has no 'llm' section");
    };
    llm.insert(
        serde_yaml::Value::String("model".to_string()),
        serde_yaml::Value::String(model.to_string()),
    );

    let updated_content = serde_yaml::to_string(&config).context("Failed to serialize config")?;
    std::fs::write(config_path, updated_content).context("Failed to write config file")?;

    println!("{} Model updated to: {}", "✓".green().bold(), model.cyan());

    Ok(())
}

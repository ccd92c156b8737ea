use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use bugzap::{
    build_router, build_system_prompt, BotProfile, ChatMessage, Commands, Container,
    ContainerConfig,
};

#[derive(Parser)]
#[command(name = "bugzap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Serve {
            port,
            public,
            mock_provider,
        } => serve(port, public, mock_provider).await,
        Commands::Prompt {
            message,
            unprotected,
        } => {
            let prompt = build_system_prompt(
                &[ChatMessage::user(message)],
                !unprotected,
                &BotProfile::default(),
            );
            println!("{}", prompt);
            Ok(())
        }
    }
}

async fn serve(port: u16, public: bool, mock_provider: bool) -> Result<()> {
    let config = ContainerConfig {
        mock_provider,
        ..ContainerConfig::from_env()
    };
    let container = Arc::new(Container::new(config));

    if !container.credential_present() {
        warn!("GROQ_API_KEY is not set; chat requests will fail until it is configured");
    }

    let host = if public {
        Ipv4Addr::UNSPECIFIED
    } else {
        Ipv4Addr::LOCALHOST
    };
    let addr = SocketAddr::from((host, port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        "Chat relay listening on http://{} (provider: {}, {} allowed origin(s))",
        listener.local_addr()?,
        container.provider_name(),
        container.allowed_origins().len()
    );

    axum::serve(listener, build_router(container))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Chat relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

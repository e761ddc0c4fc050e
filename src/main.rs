use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use agora::auth::registration;
use agora::config::{Cli, Command, Config};
use agora::db;
use agora::error::AppError;
use agora::repository::{CategoryStore, SqliteRepository};
use agora::routes;
use agora::serializers::category;
use agora::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let data_dir = Config::data_dir(&cli);
    std::fs::create_dir_all(&data_dir)?;
    tracing::info!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;
    std::fs::create_dir_all(config.media_path())?;

    let pool = db::create_pool(&config.db_path())?;
    db::run_migrations(&pool)?;
    let repo = Arc::new(SqliteRepository::new(pool));

    match cli.command.clone().unwrap_or(Command::Serve) {
        Command::Serve => serve(AppState { repo, config }).await,
        Command::CreateSuperuser {
            username,
            email,
            first_name,
            last_name,
            password,
        } => {
            let body = json!({
                "username": username,
                "email": email,
                "first_name": first_name,
                "last_name": last_name,
                "password": password,
            });
            let account =
                registration::create_superuser(repo.as_ref(), &body, config.auth.bcrypt_cost)
                    .await
                    .map_err(|e| command_failed(e, "superuser"))?;
            println!("Superuser {} created (id {})", account.username, account.id);
            Ok(())
        }
        Command::CreateCategory { name } => {
            let name = category::validate_name(&name).map_err(|e| command_failed(e, "category"))?;
            let category = repo.create_category(&name).await?;
            println!("Category {} created (id {})", category.name, category.id);
            Ok(())
        }
    }
}

/// Prints field errors on stderr; any other failure passes through unchanged.
fn command_failed(err: AppError, what: &str) -> anyhow::Error {
    match err {
        AppError::Validation(errors) => {
            for (field, messages) in errors {
                for message in messages {
                    eprintln!("{field}: {message}");
                }
            }
            anyhow::anyhow!("{what} not created")
        }
        other => other.into(),
    }
}

async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr =
        format!("{}:{}", state.config.server.host, state.config.server.port).parse()?;
    let app = routes::app(state);

    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

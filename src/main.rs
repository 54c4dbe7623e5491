mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod state;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use services::auth_service::JwtKeys;
use state::AppState;
use std::process::ExitCode;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(Parser)]
#[command(name = "finaxial-api", version, about = "Finaxial workspace & insights API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Drop and recreate the Atlas vector search index on `vectordocuments`
    CreateVectorIndex,
}

#[actix_web::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = Cli::parse();
    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::CreateVectorIndex => create_vector_index().await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn serve() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::AppConfig::from_env()?;

    log::info!("🚀 Starting Finaxial API...");
    log::info!("📊 Database: {}", config.database_name);

    let db = database::MongoDB::new(&config.mongodb_uri, &config.database_name).await?;
    log::info!("✅ MongoDB connected successfully");

    let db_handle = Arc::new(db.clone());
    let state = web::Data::new(AppState {
        users: db_handle.clone(),
        workspaces: db_handle,
        jwt: JwtKeys::new(&config.jwt_secret, config.jwt_expiration_hours),
        bcrypt_cost: config.bcrypt_cost,
        cookie_secure: config.cookie_secure,
    });

    let bind = config.bind_address();
    log::info!("🌐 Server starting on {}", bind);
    log::info!("📚 Swagger UI available at: http://{}/swagger-ui/", bind);

    HttpServer::new(move || {
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(state.clone())
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi),
            )
            .configure(api::configure)
    })
    .bind(&bind)?
    .run()
    .await?;

    log::info!("🛑 Server stopped");
    db.shutdown().await;
    Ok(())
}

async fn create_vector_index() -> Result<(), Box<dyn std::error::Error>> {
    let uri = config::mongodb_uri_from_env()?;
    let db_name = config::database_name_from_env(&uri);

    database::vector_index::run(&uri, &db_name).await?;
    log::info!("✅ Vector index provisioning finished");
    Ok(())
}

use clap::Parser;
use dotenvy::dotenv;
use tracing::error;

use sparkledge::cli::{self, Cli, Commands};
use sparkledge::state::init_app_state;
use sparkledge_core::AppError;
use sparkledge_db::run_migrations;

#[tokio::main]
async fn main() {
    dotenv().ok();
    sparkledge_observability::init_logging();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command).await {
        let code = e
            .downcast_ref::<AppError>()
            .map(AppError::code)
            .unwrap_or("error");
        error!(code, "command failed: {:#}", e);
        eprintln!("\n❌ {}: {:#}", code, e);
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    let state = init_app_state().await?;

    if let Commands::Migrate = command {
        run_migrations(&state.db).await?;
        println!("✅ Migrations applied");
        return Ok(());
    }

    let output = cli::execute(&state.auth_service(), command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

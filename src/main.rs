use observex_seeder::{Config, app};
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    app::tracing::init_tracing();

    let config = match Config::from_args(std::env::args_os()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    match app::run(config).await {
        Ok(()) => {
            info!("Seeding finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Seeding failed");
            ExitCode::FAILURE
        }
    }
}

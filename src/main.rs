use clap::Parser;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = labelgate::cli::Cli::parse();
    let config = match labelgate::config::Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            return std::process::ExitCode::from(2);
        }
    };

    if let labelgate::cli::Commands::Serve { host, port } = &cli.command {
        return match labelgate::cli::serve(config, host, *port).await {
            Ok(()) => std::process::ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("Error: {err}");
                std::process::ExitCode::from(1)
            }
        };
    }

    match labelgate::cli::run(cli, config).await {
        Ok(output) => {
            println!("{output}");
            std::process::ExitCode::SUCCESS
        }
        Err(err) => {
            if let Some(gate_err) = err.downcast_ref::<labelgate::error::LabelGateError>() {
                eprintln!("Error: {gate_err}");
            } else {
                eprintln!("Error: {err}");
            }
            std::process::ExitCode::from(1)
        }
    }
}

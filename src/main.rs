use clap::{Parser, Subcommand};
use savings_goal::api::{PlanArgs, calculate_response, run_http_server};
use savings_goal::core::PlanCalculator;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    name = "savings-goal",
    about = "Solve the periodic interest rate a savings plan needs to reach its goal"
)]
struct Cli {
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the JSON calculation API.
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Solve one plan and print the result as JSON.
    Solve(PlanArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let calculator = PlanCalculator::default();
    match cli.command {
        Command::Serve { port } => {
            if let Err(e) = run_http_server(port, calculator).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Command::Solve(args) => {
            let response = match calculate_response(&calculator, args) {
                Ok(response) => response,
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(1);
                }
            };
            match serde_json::to_string_pretty(&response) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("Failed to encode result: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

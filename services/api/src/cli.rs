use crate::report::{run_analysis, AnalyzeArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use credit_risk::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Credit Risk Analytics",
    about = "Serve and inspect threshold-based credit risk analytics",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print threshold metrics, confusion matrix, AUC and the optimal threshold for a population CSV
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Analyze(args) => run_analysis(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_optional() {
        let cli = Cli::try_parse_from(["credit-risk-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn analyze_accepts_threshold_and_objective() {
        let cli = Cli::try_parse_from([
            "credit-risk-api",
            "analyze",
            "--population",
            "data/population.csv",
            "--threshold",
            "0.35",
            "--objective",
            "risk",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Analyze(args)) => {
                assert_eq!(args.threshold, 0.35);
                assert_eq!(args.objective, "risk");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn analyze_defaults_to_half_threshold_and_profit() {
        let cli = Cli::try_parse_from(["credit-risk-api", "analyze", "--population", "p.csv"])
            .expect("parses");

        match cli.command {
            Some(Command::Analyze(args)) => {
                assert_eq!(args.threshold, 0.5);
                assert_eq!(args.objective, "profit");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}

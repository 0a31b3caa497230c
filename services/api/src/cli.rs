use crate::commands::{
    run_list, run_stats, run_status, run_submit, StatsArgs, StatusArgs, SubmitArgs,
};
use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use loan_intake::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Loan Intake",
    about = "Collect, review, and summarise loan applications from the command line",
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
    /// Validate and record a new loan application
    Submit(SubmitArgs),
    /// List stored applications, newest last
    List,
    /// Approve or reject an application by id
    Status(StatusArgs),
    /// Print dashboard statistics and chart series
    Stats(StatsArgs),
    /// Run an in-memory walkthrough of intake, review, and the dashboard
    Demo(DemoArgs),
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
        Command::Submit(args) => run_submit(args).await,
        Command::List => run_list(),
        Command::Status(args) => run_status(args),
        Command::Stats(args) => run_stats(args),
        Command::Demo(args) => run_demo(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_intake::applications::StatusDecision;

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["loan-intake-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn status_command_accepts_short_decisions() {
        let cli = Cli::try_parse_from(["loan-intake-api", "status", "abc123", "approve"])
            .expect("parses");
        match cli.command {
            Some(Command::Status(args)) => {
                assert_eq!(args.id, "abc123");
                assert_eq!(args.decision, StatusDecision::Approved);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn submit_command_requires_every_field() {
        let result = Cli::try_parse_from(["loan-intake-api", "submit", "--name", "Avery Chen"]);
        assert!(result.is_err());
    }

    #[test]
    fn submit_command_accepts_formatted_amounts() {
        let cli = Cli::try_parse_from([
            "loan-intake-api",
            "submit",
            "--name",
            "Avery Chen",
            "--email",
            "avery@example.com",
            "--phone",
            "5155550123",
            "--amount",
            "$12,000",
            "--purpose",
            "car",
            "--employment",
            "full-time",
            "--income",
            "64,000",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Submit(args)) => {
                assert_eq!(args.amount, 12000.0);
                assert_eq!(args.income, 64000.0);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}

use super::ConfigOverrides;
use crate::domain::model::{Activation, NewRunner};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "dash-client")]
#[command(about = "Terminal dashboard and command client for the trading backend")]
pub struct CliConfig {
    /// TOML 設定檔
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[arg(long, global = true, help = "Backend base URL, e.g. http://localhost:8000")]
    pub base_url: Option<String>,

    #[arg(long, global = true, help = "Leading path segment such as /api")]
    pub api_prefix: Option<String>,

    #[arg(long, global = true)]
    pub timeout_seconds: Option<u64>,

    #[arg(long, global = true, help = "File used to persist the bearer token")]
    pub token_file: Option<String>,

    #[arg(long, global = true)]
    pub token_key: Option<String>,

    #[arg(long, global = true, help = "Print raw JSON instead of tables")]
    pub json: bool,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base_url: self.base_url.clone(),
            api_prefix: self.api_prefix.clone(),
            timeout_seconds: self.timeout_seconds,
            token_file: self.token_file.clone(),
            token_key: self.token_key.clone(),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Load every panel and print the dashboard
    Dashboard,
    /// Today's account snapshot
    Snapshot,
    /// Open positions
    Positions,
    /// All orders
    Orders,
    /// All executed trades
    Trades,
    /// Brokerage connectivity
    IbStatus,
    /// Runner lifecycle
    #[command(subcommand)]
    Runner(RunnerCommand),
    /// Log in and store the access token
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Create a backend user
    Signup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        ib_username: Option<String>,
        #[arg(long)]
        ib_password: Option<String>,
    },
    /// Forget the stored token
    Logout,
}

#[derive(Debug, Clone, Subcommand)]
pub enum RunnerCommand {
    Create(CreateRunnerArgs),
    Delete(RunnerIdsArgs),
    Activate(RunnerIdsArgs),
    Deactivate(RunnerIdsArgs),
    /// Runners currently marked active
    Active,
    Orders {
        #[arg(long)]
        id: i64,
    },
    Trades {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Debug, Clone, Args)]
pub struct RunnerIdsArgs {
    #[arg(long, value_delimiter = ',', required = true)]
    pub ids: Vec<i64>,
}

#[derive(Debug, Clone, Args)]
pub struct CreateRunnerArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub strategy: String,
    #[arg(long)]
    pub budget: f64,
    #[arg(long)]
    pub stock: String,
    #[arg(long)]
    pub time_frame: u32,
    #[arg(long, allow_hyphen_values = true)]
    pub stop_loss: f64,
    #[arg(long)]
    pub take_profit: f64,
    /// 原樣交給後端解析
    #[arg(long)]
    pub time_range_from: Option<String>,
    #[arg(long)]
    pub time_range_to: Option<String>,
    #[arg(long)]
    pub commission_ratio: Option<f64>,
    #[arg(long)]
    pub exit_strategy: String,
    #[arg(long, help = "Create the runner inactive")]
    pub inactive: bool,
}

impl From<CreateRunnerArgs> for NewRunner {
    fn from(args: CreateRunnerArgs) -> Self {
        NewRunner {
            name: args.name,
            strategy: args.strategy,
            budget: args.budget,
            stock: args.stock,
            time_frame: args.time_frame,
            stop_loss: args.stop_loss,
            take_profit: args.take_profit,
            time_range_from: args.time_range_from,
            time_range_to: args.time_range_to,
            commission_ratio: args.commission_ratio,
            exit_strategy: args.exit_strategy,
            activation: if args.inactive {
                Activation::Inactive
            } else {
                Activation::Active
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_runner_create() {
        let cli = CliConfig::try_parse_from([
            "dash-client",
            "--api-prefix",
            "/api",
            "runner",
            "create",
            "--name",
            "r1",
            "--strategy",
            "momentum",
            "--budget",
            "500",
            "--stock",
            "tsla",
            "--time-frame",
            "15",
            "--stop-loss",
            "-3",
            "--take-profit",
            "6",
            "--time-range-from",
            "2024-05-01T09:30:00+02:00",
            "--exit-strategy",
            "fixed",
            "--inactive",
        ])
        .unwrap();

        assert_eq!(cli.overrides().api_prefix.as_deref(), Some("/api"));
        let Command::Runner(RunnerCommand::Create(args)) = cli.command else {
            panic!("expected runner create");
        };
        let runner = NewRunner::from(args);
        assert_eq!(runner.stop_loss, -3.0);
        assert_eq!(runner.activation, Activation::Inactive);
        assert_eq!(
            runner.time_range_from.as_deref(),
            Some("2024-05-01T09:30:00+02:00")
        );
    }

    #[test]
    fn test_parse_id_list() {
        let cli =
            CliConfig::try_parse_from(["dash-client", "runner", "activate", "--ids", "1,2,3"])
                .unwrap();
        let Command::Runner(RunnerCommand::Activate(args)) = cli.command else {
            panic!("expected runner activate");
        };
        assert_eq!(args.ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = CliConfig::try_parse_from(["dash-client", "orders", "--json", "--verbose"])
            .unwrap();
        assert!(cli.json);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Orders));
    }
}

use clap::Parser;
use dash_client::config::args::{Command, RunnerCommand};
use dash_client::config::toml_config::FileConfig;
use dash_client::core::render;
use dash_client::domain::model::{
    ActivationOutcome, Credentials, DeleteOutcome, ExecutedTrade, IbStatus, NewRunner,
    OpenPosition, Order, Runner, RunnerIds, SignupRequest,
};
use dash_client::domain::ports::{decode, ApiRequest};
use dash_client::utils::error::{DashError, ErrorSeverity};
use dash_client::utils::logger;
use dash_client::{App, CliConfig, ClientConfig, DashboardApi, FileTokenStore};
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;

/// `--json` 時原樣輸出後端回應，否則解碼後輸出表格
fn emit<T: DeserializeOwned>(
    json: bool,
    raw: &RawValue,
    table: impl FnOnce(&T) -> String,
) -> dash_client::Result<()> {
    if json {
        println!("{}", raw.get());
    } else {
        println!("{}", table(&decode(raw)?));
    }
    Ok(())
}

async fn run(cli: CliConfig, config: ClientConfig) -> dash_client::Result<()> {
    let app: App<FileTokenStore> = App::from_config(&config).await?;
    let api = &app.client;
    let json = cli.json;

    match cli.command {
        Command::Dashboard if json => {
            let view = app.dashboard.refresh_raw().await;
            println!("{}", serde_json::to_string(&view)?);
        }
        Command::Dashboard => {
            let view = app.dashboard.refresh().await;
            println!("{}", render::render_view(&view));
        }
        Command::Snapshot => {
            let raw = api.call(ApiRequest::AccountSnapshot).await?;
            emit(json, &raw, render::render_snapshot)?;
        }
        Command::Positions => {
            let raw = api.call(ApiRequest::OpenPositions).await?;
            emit(json, &raw, |p: &Vec<OpenPosition>| render::render_positions(p))?;
        }
        Command::Orders => {
            let raw = api.call(ApiRequest::Orders).await?;
            emit(json, &raw, |o: &Vec<Order>| render::render_orders(o))?;
        }
        Command::Trades => {
            let raw = api.call(ApiRequest::ExecutedTrades).await?;
            emit(json, &raw, |t: &Vec<ExecutedTrade>| render::render_trades(t))?;
        }
        Command::IbStatus => {
            let raw = api.call(ApiRequest::IbStatus).await?;
            emit(json, &raw, |status: &IbStatus| {
                render::render_ib_status(status.is_connected())
            })?;
        }
        Command::Runner(command) => run_runner_command(api, command, json).await?,
        Command::Login { username, password } => {
            app.session
                .login(&Credentials { username, password })
                .await?;
            println!("✅ Logged in, token saved to {}", config.token_file);
        }
        Command::Signup {
            username,
            email,
            password,
            ib_username,
            ib_password,
        } => {
            let request = SignupRequest {
                username,
                email,
                password,
                ib_username,
                ib_password,
            };
            let body = app.session.signup(&request).await?;
            println!("{}", body.get());
        }
        Command::Logout => {
            app.session.logout().await?;
            println!("👋 Logged out");
        }
    }

    Ok(())
}

async fn run_runner_command(
    api: &impl DashboardApi,
    command: RunnerCommand,
    json: bool,
) -> dash_client::Result<()> {
    match command {
        RunnerCommand::Create(args) => {
            let runner = NewRunner::from(args);
            let raw = api.call(ApiRequest::CreateRunner(&runner)).await?;
            emit(json, &raw, |r: &Runner| {
                render::render_runners(std::slice::from_ref(r))
            })?;
        }
        RunnerCommand::Delete(args) => {
            let ids = RunnerIds::new(args.ids);
            let raw = api.call(ApiRequest::DeleteRunners(&ids)).await?;
            emit(json, &raw, |o: &DeleteOutcome| {
                format!("Deleted {} runner(s)", o.deleted)
            })?;
        }
        RunnerCommand::Activate(args) => {
            let ids = RunnerIds::new(args.ids);
            let raw = api.call(ApiRequest::ActivateRunners(&ids)).await?;
            emit(json, &raw, |o: &ActivationOutcome| {
                format!("Activated {} runner(s)", o.updated)
            })?;
        }
        RunnerCommand::Deactivate(args) => {
            let ids = RunnerIds::new(args.ids);
            let raw = api.call(ApiRequest::DeactivateRunners(&ids)).await?;
            emit(json, &raw, |o: &ActivationOutcome| {
                format!("Deactivated {} runner(s)", o.updated)
            })?;
        }
        RunnerCommand::Active => {
            let raw = api.call(ApiRequest::ActiveRunners).await?;
            emit(json, &raw, |r: &Vec<Runner>| render::render_runners(r))?;
        }
        RunnerCommand::Orders { id } => {
            let raw = api.call(ApiRequest::RunnerOrders(id)).await?;
            emit(json, &raw, |o: &Vec<Order>| render::render_orders(o))?;
        }
        RunnerCommand::Trades { id } => {
            let raw = api.call(ApiRequest::RunnerTrades(id)).await?;
            emit(json, &raw, |t: &Vec<ExecutedTrade>| render::render_trades(t))?;
        }
    }
    Ok(())
}

fn report_and_exit(e: &DashError) -> ! {
    tracing::error!(
        "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    let file_config = match cli.config.as_deref().map(FileConfig::from_file).transpose() {
        Ok(file_config) => file_config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(3);
        }
    };

    let verbose = cli.verbose || file_config.as_ref().is_some_and(FileConfig::verbose);
    if cli.log_json || file_config.as_ref().is_some_and(FileConfig::json_logs) {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    let config = ClientConfig::layered(file_config.as_ref(), &cli.overrides());
    tracing::debug!("Resolved config: {:?}", config);

    if let Err(e) = run(cli, config).await {
        report_and_exit(&e);
    }
}

use clap::Parser;
use cuanbook::args::{Args, CategoriesCommand, Command, ProfileCommand, TxCommand};
use cuanbook::{commands, error_type_of, Config, ErrorType, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            if error_type_of(&e) == Some(ErrorType::Auth) {
                error!("Log in again with 'cuan login --email <EMAIL> --password <PASSWORD>'");
            }
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().cuan_home().path();

    // This allows for running the program without a CuanBook server. When CUANBOOK_IN_TEST_MODE
    // is set and non-empty, the in-memory backend is used, otherwise requests go over HTTP.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args.api_url()).await?.print(),

        Command::Register(register_args) => {
            let config = Config::load(home).await?;
            commands::register(&config, mode, register_args)
                .await?
                .print()
        }

        Command::Login(login_args) => {
            let config = Config::load(home).await?;
            commands::login(&config, mode, login_args).await?.print()
        }

        Command::Logout => commands::logout(&Config::load(home).await?).await?.print(),

        Command::Categories(categories_args) => {
            let config = Config::load(home).await?;
            match categories_args.command() {
                CategoriesCommand::List { kind } => {
                    commands::list_categories(&config, mode, *kind)
                        .await?
                        .print()
                }
                CategoriesCommand::Add { name, kind } => {
                    commands::add_category(&config, mode, name, *kind)
                        .await?
                        .print()
                }
                CategoriesCommand::Setup => {
                    commands::setup_categories(&config, mode).await?.print()
                }
            }
        }

        Command::Tx(tx_args) => {
            let config = Config::load(home).await?;
            match tx_args.command() {
                TxCommand::Add(args) => commands::add_transaction(&config, mode, args)
                    .await?
                    .print(),
                TxCommand::List(args) => commands::list_transactions(&config, mode, args)
                    .await?
                    .print(),
            }
        }

        Command::Summary(summary_args) => {
            let config = Config::load(home).await?;
            commands::summary(&config, mode, summary_args.period())
                .await?
                .print()
        }

        Command::Report(report_args) => {
            let config = Config::load(home).await?;
            commands::report(&config, mode, report_args).await?.print()
        }

        Command::Breakdown(breakdown_args) => {
            let config = Config::load(home).await?;
            commands::breakdown(&config, mode, breakdown_args)
                .await?
                .print()
        }

        Command::Export(export_args) => {
            let config = Config::load(home).await?;
            commands::export(&config, mode, export_args).await?.print()
        }

        Command::Profile(profile_args) => {
            let config = Config::load(home).await?;
            match profile_args.command() {
                ProfileCommand::Show => commands::show_profile(&config).await?.print(),
                ProfileCommand::Set(args) => commands::set_profile(&config, args).await?.print(),
            }
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        // RUST_LOG wins when it is set.
        Some(_) => EnvFilter::from_default_env(),
        // Otherwise only the library and this binary log, at `level`.
        None => EnvFilter::new(format!(
            "{}={},{}={}",
            env!("CARGO_PKG_NAME").replace('-', "_"),
            level,
            env!("CARGO_BIN_NAME"),
            level
        )),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

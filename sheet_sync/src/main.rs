#![deny(rust_2018_idioms)]
#![deny(clippy::all)]

use std::error::Error;

use clap::{crate_version, Arg, ArgMatches, Command};

use primitives::{config::configuration, util::logging::new_logger, Scope};
use serde::Serialize;
use sheet_sync::application::{connect, EnvConfig};
use slog::error;

fn scope_args() -> [Arg<'static>; 3] {
    [
        Arg::new("tenant")
            .long("tenant")
            .help("the tenant of the caller")
            .required(true)
            .takes_value(true),
        Arg::new("user")
            .long("user")
            .help("the user on whose behalf the sheet is accessed")
            .required(true)
            .takes_value(true),
        Arg::new("sheet")
            .long("sheet")
            .help("the spreadsheet document id")
            .required(true)
            .takes_value(true),
    ]
}

fn value<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    matches.value_of(name).unwrap_or_default()
}

fn scope(matches: &ArgMatches) -> Result<Scope, Box<dyn Error>> {
    let (tenant, user, sheet) = (
        value(matches, "tenant"),
        value(matches, "user"),
        value(matches, "sheet"),
    );

    Ok(Scope::new(tenant, user, sheet)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Command::new("Sheet sync")
        .version(crate_version!())
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("the config file for the sheet sync")
                .takes_value(true)
                .global(true),
        )
        .subcommand(
            Command::new("sync")
                .about("replaces the stored records of one tab with its rows")
                .arg(
                    Arg::new("kind")
                        .help("the tab to sync")
                        .required(true)
                        .possible_values(["campaigns", "ads", "keywords"]),
                )
                .args(scope_args()),
        )
        .subcommand(
            Command::new("sync-all")
                .about("syncs the campaigns, ads and keywords tabs")
                .args(scope_args()),
        )
        .subcommand(
            Command::new("dispatch")
                .about("submits the AllResources tab to the advertising platform")
                .args(scope_args()),
        )
        .subcommand(
            Command::new("sync-all-and-dispatch")
                .about("syncs every tab, then dispatches the AllResources tab")
                .args(scope_args()),
        )
        .subcommand(
            Command::new("create-sheet")
                .about("creates and registers a new spreadsheet document")
                .arg(
                    Arg::new("title")
                        .long("title")
                        .required(true)
                        .takes_value(true),
                )
                .arg(
                    Arg::new("tenant")
                        .long("tenant")
                        .required(true)
                        .takes_value(true),
                )
                .arg(
                    Arg::new("user")
                        .long("user")
                        .required(true)
                        .takes_value(true),
                ),
        )
        .get_matches();

    let env_config = EnvConfig::from_env()?;
    let config = configuration(env_config.env, cli.value_of("config"))?;

    let logger = new_logger("sheet-sync");
    let sync = connect(&env_config, config, logger.clone()).await?;

    let outcome = match cli.subcommand() {
        Some(("sync", matches)) => {
            let scope = scope(matches)?;
            let report = match value(matches, "kind") {
                "campaigns" => sync.campaigns.sync_from_sheet(&scope).await,
                "ads" => sync.ads.sync_from_sheet(&scope).await,
                _ => sync.keywords.sync_from_sheet(&scope).await,
            };

            report.map(|report| print_json(&report))
        }
        Some(("sync-all", matches)) => {
            let scope = scope(matches)?;
            sync.sync_all(&scope).await.map(|report| print_json(&report))
        }
        Some(("dispatch", matches)) => {
            let scope = scope(matches)?;
            sync.dispatcher
                .dispatch(&scope)
                .await
                .map(|statuses| print_json(&statuses))
        }
        Some(("sync-all-and-dispatch", matches)) => {
            let scope = scope(matches)?;
            sync.sync_all_and_dispatch(&scope)
                .await
                .map(|report| print_json(&report))
        }
        Some(("create-sheet", matches)) => {
            let (tenant, user) = (value(matches, "tenant"), value(matches, "user"));
            sync.provisioner
                .create_sheet(&tenant.into(), &user.into(), value(matches, "title"))
                .await
                .map(|entry| print_json(&entry))
        }
        _ => unreachable!("a subcommand is required"),
    };

    match outcome {
        Ok(printed) => printed,
        Err(err) => {
            error!(&logger, "{}", err; "main" => "run");
            Err(err.into())
        }
    }
}

use std::{path::PathBuf, process::exit, sync::Arc};

use clap::{Args as ClapArgs, Parser, Subcommand};
use color_eyre::eyre::{eyre, Result, WrapErr};
use pocketbase_client::{env_is_truthy, Client, ClientConfig, ParamsList, Record, REST_DEBUG_ENV};
use serde::Serialize;

use crate::{
    config::{default_config_path, load_config, save_config, PbqConfig},
    logging::{init_logging, LoggingConfig},
};

mod config;
mod logging;

/// Query PocketBase record collections from the command line
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Alternate path to the configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Print the path to the configuration file and exit.
    #[arg(short, long)]
    print_config_path: bool,
    /// PocketBase base URL, e.g. http://127.0.0.1:8090
    #[arg(long)]
    url: Option<String>,
    /// Email or username to authenticate with
    #[arg(long)]
    identity: Option<String>,
    #[arg(long)]
    password: Option<String>,
    /// Auth token to refresh instead of exchanging a password
    #[arg(long)]
    token: Option<String>,
    /// `_superusers`, `admins` (pre-0.23 servers) or an auth collection name
    #[arg(long)]
    auth_collection: Option<String>,
    /// Log every REST request and response
    #[arg(long)]
    rest_debug: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch one page of records
    List {
        collection: String,
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = 0)]
        size: u32,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Fetch every record across all pages
    FullList {
        collection: String,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Fetch a single record
    One {
        collection: String,
        id: String,
        #[arg(long, default_value = "")]
        expand: String,
        #[arg(long, default_value = "")]
        fields: String,
    },
    /// Create a record from a JSON object
    Create { collection: String, data: String },
    /// Update a record with the fields of a JSON object
    Update { collection: String, id: String, data: String },
    /// Delete a record
    Delete { collection: String, id: String },
    /// Write the connection options given on the command line to the config file
    Init,
}

#[derive(ClapArgs, Debug)]
struct QueryArgs {
    #[arg(long, default_value = "")]
    filter: String,
    #[arg(long, default_value = "")]
    sort: String,
    #[arg(long, default_value = "")]
    expand: String,
    #[arg(long, default_value = "")]
    fields: String,
}

impl QueryArgs {
    fn params(&self) -> ParamsList {
        ParamsList::new()
            .with_filters(self.filter.as_str())
            .with_sort(self.sort.as_str())
            .with_expand(self.expand.as_str())
            .with_fields(self.fields.as_str())
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let config_path = args.config.clone().unwrap_or_else(default_config_path);

    if args.print_config_path {
        println!("{}", config_path.display());
        exit(0);
    }

    let config = merge_args(
        load_config(&config_path).wrap_err("Failure reading configuration file")?,
        &args,
    );

    let rest_debug = args.rest_debug || env_is_truthy(REST_DEBUG_ENV);
    let logging_config = LoggingConfig::from_env()
        .with_level_fallback(config.log_level.as_deref())
        .with_rest_debug(rest_debug);
    let _log_guard = init_logging(logging_config)
        .map_err(|e| eyre!("Failed to initialize logging: {e}"))?;

    if let Command::Init = args.command {
        save_config(&config_path, &config).wrap_err("Failure writing configuration file")?;
        println!("{}", config_path.display());
        return Ok(());
    }

    if config.url.is_empty() {
        return Err(eyre!("no PocketBase URL; pass --url or run `pbq --url <URL> init`"));
    }

    let client_config = ClientConfig::builder()
        .base_url(config.url.as_str())
        .auth(config.auth_method())
        .rest_debug(rest_debug)
        .build()?;
    let client = Arc::new(Client::new(client_config)?);

    let rt = tokio::runtime::Runtime::new().wrap_err("Failed to create runtime")?;
    rt.block_on(run(client, args.command))
}

async fn run(client: Arc<Client>, command: Command) -> Result<()> {
    match command {
        Command::List { collection, page, size, query } => {
            let params = query.params().with_page(page).with_size(size);
            print_json(&client.list(&collection, &params).await?)
        },
        Command::FullList { collection, query } => {
            print_json(&client.full_list(&collection, &query.params()).await?)
        },
        Command::One { collection, id, expand, fields } => {
            let records = client.collection::<Record>(&collection);
            let params = ParamsList::new().with_expand(expand).with_fields(fields);
            print_json(&records.one_with_params(&id, &params).await?)
        },
        Command::Create { collection, data } => {
            let body = parse_record(&data)?;
            print_json(&client.create(&collection, &body).await?)
        },
        Command::Update { collection, id, data } => {
            let body = parse_record(&data)?;
            client.update(&collection, &id, &body).await?;
            Ok(())
        },
        Command::Delete { collection, id } => {
            client.delete(&collection, &id).await?;
            Ok(())
        },
        Command::Init => Ok(()),
    }
}

/// Command line options take precedence over the config file
fn merge_args(mut config: PbqConfig, args: &Args) -> PbqConfig {
    if let Some(url) = &args.url {
        config.url = url.clone();
    }
    if args.identity.is_some() {
        config.identity = args.identity.clone();
    }
    if args.password.is_some() {
        config.password = args.password.clone();
    }
    if args.token.is_some() {
        config.token = args.token.clone();
    }
    if args.auth_collection.is_some() {
        config.auth_collection = args.auth_collection.clone();
    }
    config
}

fn parse_record(data: &str) -> Result<Record> {
    serde_json::from_str(data).wrap_err("record data must be a JSON object")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

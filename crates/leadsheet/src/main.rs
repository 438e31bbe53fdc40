mod commands;
mod output;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use leadsheet_core::config::CredentialBundle;
use leadsheet_core::lead::{HotelCategory, LeadPatch, LeadStatus};
use leadsheet_error::{LeadsheetError, Result};
use leadsheet_http::{ClientOptions, LeadSheetClient, TokenPolicy};
use logutil::LogFormat;

#[derive(Parser)]
#[clap(name = "leadsheet")]
struct Arguments {
    /// Path to the credential bundle.
    #[clap(long, env = "LEADSHEET_CONFIG", global = true)]
    config: Option<PathBuf>,
    /// Default log level, `RUST_LOG` takes precedence.
    #[clap(long, default_value = "warn", global = true)]
    log_level: tracing::Level,
    /// Log output format, 'human' or 'json'.
    #[clap(long, default_value_t = LogFormat::HumanReadable, global = true)]
    log_format: LogFormat,
    /// Request timeout in seconds.
    #[clap(long, default_value_t = 30, global = true)]
    timeout: u64,
    /// Reuse access tokens across writes until shortly before they expire.
    #[clap(long, global = true)]
    cache_tokens: bool,
    /// Base url of the spreadsheets api.
    #[clap(long, env = "LEADSHEET_BASE_URL", hide = true, global = true)]
    base_url: Option<String>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all leads.
    List {
        /// Only show leads with this exact status.
        #[clap(long)]
        status: Option<String>,
        /// Print leads as json.
        #[clap(long)]
        json: bool,
    },
    /// Add a new lead.
    Add(AddArgs),
    /// Update fields of an existing lead.
    Update(UpdateArgs),
    /// Print the row number holding a lead.
    Locate { trip_id: String },
    /// Refresh leads periodically and print a summary of each refresh.
    Watch {
        /// Seconds between refreshes.
        #[clap(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,
    },
}

#[derive(Args)]
struct AddArgs {
    #[clap(long)]
    traveller: String,
    /// Generated when omitted.
    #[clap(long)]
    trip_id: Option<String>,
    #[clap(flatten)]
    fields: LeadFields,
}

#[derive(Args)]
struct UpdateArgs {
    trip_id: String,
    #[clap(long)]
    traveller: Option<String>,
    #[clap(flatten)]
    fields: LeadFields,
}

/// Lead fields settable from the command line.
#[derive(Args)]
struct LeadFields {
    /// Creation date, YYYY-MM-DD.
    #[clap(long)]
    date: Option<String>,
    #[clap(long)]
    consultant: Option<String>,
    #[clap(long)]
    status: Option<String>,
    #[clap(long)]
    phone: Option<String>,
    #[clap(long)]
    email: Option<String>,
    /// YYYY-MM-DD.
    #[clap(long)]
    travel_date: Option<String>,
    #[clap(long)]
    travel_state: Option<String>,
    #[clap(long)]
    remarks: Option<String>,
    #[clap(long)]
    nights: Option<u32>,
    #[clap(long)]
    pax: Option<u32>,
    #[clap(long)]
    hotel_category: Option<String>,
    #[clap(long)]
    meal_plan: Option<String>,
    #[clap(long)]
    priority: Option<String>,
    #[clap(long)]
    notes: Option<String>,
}

impl LeadFields {
    fn into_patch(self, trip_id: Option<String>, traveller_name: Option<String>) -> LeadPatch {
        LeadPatch {
            trip_id,
            date: self.date,
            consultant: self.consultant,
            status: self.status.map(LeadStatus::from),
            traveller_name,
            phone: self.phone,
            email: self.email,
            travel_date: self.travel_date,
            travel_state: self.travel_state,
            remarks: self.remarks,
            nights: self.nights,
            pax: self.pax,
            hotel_category: self.hotel_category.map(HotelCategory::from),
            meal_plan: self.meal_plan,
            priority: self.priority,
            notes: self.notes,
        }
    }
}

/// Process exit code for an error.
fn exit_code(err: &LeadsheetError) -> i32 {
    match err {
        LeadsheetError::Protected { .. } => 3,
        LeadsheetError::NotFound { .. } => 4,
        LeadsheetError::ConfigurationMissing(_) => 5,
        _ => 1,
    }
}

fn main() {
    let args = Arguments::parse();
    logutil::configure_global_logger(args.log_level, args.log_format, io::stderr);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("ERROR: Failed to start runtime: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = runtime.block_on(run(args)) {
        eprintln!("ERROR: {err}");
        std::process::exit(exit_code(&err));
    }
}

async fn run(args: Arguments) -> Result<()> {
    let path = args.config.ok_or_else(|| {
        LeadsheetError::ConfigurationMissing(
            "No credential bundle given, use --config or LEADSHEET_CONFIG".to_string(),
        )
    })?;
    let bundle = Arc::new(CredentialBundle::from_path(&path)?);

    let mut options = ClientOptions::default().with_timeout(Duration::from_secs(args.timeout));
    if let Some(base_url) = args.base_url {
        options = options.with_base_url(base_url);
    }
    if args.cache_tokens {
        options = options.with_token_policy(TokenPolicy::Cached);
    }

    let client = LeadSheetClient::with_reqwest(bundle.clone(), options)?;

    let result = match args.command {
        Command::List { status, json } => commands::list(&client, status.as_deref(), json).await,
        Command::Add(add) => {
            let patch = add.fields.into_patch(add.trip_id, Some(add.traveller));
            commands::add(&client, patch).await
        }
        Command::Update(update) => {
            let patch = update.fields.into_patch(None, update.traveller);
            commands::update(&client, &update.trip_id, &patch).await
        }
        Command::Locate { trip_id } => commands::locate(&client, &trip_id).await,
        Command::Watch { interval } => {
            commands::watch(Arc::new(client), Duration::from_secs(interval)).await
        }
    };

    if let Err(err) = &result {
        if err.is_protected() {
            eprintln!("{}", output::protected_hint(&bundle));
        }
    }
    result
}

//! Siteshift - move a managed Mac to its owner's inventory site
//!
//! Usage:
//!   siteshift -d ads.example.org -b DC=ads,DC=example,DC=org -g CN=MacEnrolment,OU=Mac ...
//!   siteshift / mac-042 alice <domain> <base> <group> <mapping> <user> <pw> <api-user> <api-pw>
//!
//! The second form is how a management policy calls the tool: three fixed
//! leading parameters, then parameters 4 through 11.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use siteshift_core::config::{ConfigStore, MappingSource, PartialSettings};
use siteshift_core::directory::LdapDirectory;
use siteshift_core::error::Error;
use siteshift_core::hardware;
use siteshift_core::inventory::JamfClient;
use siteshift_core::types::{RelocationDecision, RelocationReport};
use siteshift_core::workflow::SiteRelocation;

#[derive(Parser)]
#[command(name = "siteshift", version)]
#[command(about = "Move a managed Mac to the inventory site of its owner's directory group", long_about = None)]
struct Cli {
    /// Directory domain or LDAP URL
    #[arg(short = 'd', long, env = "SITESHIFT_AD_DOMAIN")]
    ad_domain: Option<String>,

    /// Search base for directory queries
    #[arg(short = 'b', long, env = "SITESHIFT_LDAP_BASE")]
    ldap_base: Option<String>,

    /// Parent group whose subgroups map to sites
    #[arg(short = 'g', long, env = "SITESHIFT_GROUP")]
    group: Option<String>,

    /// Directory timeout in seconds
    #[arg(short = 't', long, env = "SITESHIFT_TIMEOUT")]
    timeout: Option<u64>,

    /// Group to site mapping, e.g. {"MacEnrolment-Finance": "Finance"}
    #[arg(short = 's', long, env = "SITESHIFT_SITE_LIST")]
    site_list: Option<String>,

    /// Directory bind user
    #[arg(long, env = "SITESHIFT_LDAP_USER")]
    ldap_user: Option<String>,

    /// Directory bind password
    #[arg(long, env = "SITESHIFT_LDAP_PASSWORD", hide_env_values = true)]
    ldap_password: Option<String>,

    /// Inventory server base URL
    #[arg(long, env = "SITESHIFT_API_URL")]
    api_url: Option<String>,

    /// Inventory API user
    #[arg(long, env = "SITESHIFT_API_USER")]
    api_user: Option<String>,

    /// Inventory API password
    #[arg(long, env = "SITESHIFT_API_PASSWORD", hide_env_values = true)]
    api_password: Option<String>,

    /// Config file (default: <config dir>/siteshift/siteshift.toml)
    #[arg(long, env = "SITESHIFT_CONFIG")]
    config: Option<PathBuf>,

    /// Device serial number instead of reading it from the hardware
    #[arg(long, env = "SITESHIFT_SERIAL")]
    serial: Option<String>,

    /// Look everything up but leave the device where it is
    #[arg(long)]
    dry_run: bool,

    /// Compare site names case-insensitively
    #[arg(long, env = "SITESHIFT_IGNORE_SITE_CASE")]
    ignore_site_case: bool,

    /// Output format
    #[arg(short, long, default_value = "table")]
    format: OutputFormat,

    /// Debug logging
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Policy parameters (mount point, computer name, user, then 4..11)
    #[arg(allow_hyphen_values = true)]
    policy_parameters: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable summary
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

impl Cli {
    fn flag_settings(&self) -> PartialSettings {
        PartialSettings {
            directory_domain: self.ad_domain.clone(),
            directory_base: self.ldap_base.clone(),
            group_dn: self.group.clone(),
            site_mapping: self.site_list.clone().map(MappingSource::Literal),
            directory_user: self.ldap_user.clone(),
            directory_password: self.ldap_password.clone(),
            inventory_url: self.api_url.clone(),
            inventory_user: self.api_user.clone(),
            inventory_password: self.api_password.clone(),
            timeout_secs: self.timeout,
            ignore_site_case: self.ignore_site_case.then_some(true),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "siteshift=debug,info"
    } else {
        "siteshift=info,warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", failure_category(&e), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let store = match &cli.config {
        Some(path) => ConfigStore::from_path(path.clone()),
        None => ConfigStore::from_default_location()?,
    };
    let file = store
        .load()
        .with_context(|| format!("Failed to load {}", store.config_path().display()))?;
    debug!(path = %store.config_path().display(), "Config loaded");

    let partial = cli
        .flag_settings()
        .or(PartialSettings::from_policy_parameters(&cli.policy_parameters))
        .or(PartialSettings::from_file(&file));

    let missing = partial.missing();
    if !missing.is_empty() {
        eprintln!("Missing args!");
        eprintln!("  not set: {}", missing.join(", "));
        return Ok(ExitCode::FAILURE);
    }

    let mut settings = partial.resolve().map_err(Error::from)?;
    settings.relocation.dry_run = cli.dry_run;

    let serial = match &cli.serial {
        Some(serial) => serial.clone(),
        None => hardware::serial_number().context("Failed to read hardware serial number")?,
    };
    debug!(serial = %serial, overridden = cli.serial.is_some(), "Device serial");

    let inventory = JamfClient::new(&settings.inventory).map_err(Error::from)?;
    let relocation = SiteRelocation::new(settings.relocation, LdapDirectory::new(), inventory);
    let report = relocation.run(&serial)?;

    match cli.format {
        OutputFormat::Table => print_table(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn failure_category(error: &anyhow::Error) -> &'static str {
    match error.downcast_ref::<Error>() {
        Some(Error::Directory(_)) => "Directory error",
        Some(Error::Inventory(_)) => "Inventory error",
        Some(Error::Config(_)) => "Configuration error",
        None => "Error",
    }
}

fn print_table(report: &RelocationReport) {
    println!("Device: {}", report.serial);
    println!("Owner:  {}", report.owner);

    let Some(group) = &report.group else {
        println!("No group found for user {}, device unchanged", report.owner);
        return;
    };
    println!("Group:  {}", group.name);

    let current = report.current_site.as_deref().unwrap_or("-");
    let target = report
        .target_site
        .as_ref()
        .map(|site| site.name.as_str())
        .unwrap_or("-");

    match report.decision {
        RelocationDecision::AlreadyAtTarget => {
            println!("Device is already in the correct site: {}", target);
        }
        RelocationDecision::RelocationRequired if report.applied => {
            println!("Moved device from {} to {}", current, target);
        }
        RelocationDecision::RelocationRequired => {
            println!("Dry run: would move device from {} to {}", current, target);
        }
        RelocationDecision::NoGroupMatched => {
            println!("No group found for user {}, device unchanged", report.owner);
        }
    }
}

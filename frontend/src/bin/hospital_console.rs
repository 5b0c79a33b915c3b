//! Terminal client for the hospital administration backend.
//!
//! Runs the same session, guard and adapter stack as any other frontend
//! shell: `login` persists the session to the state directory, later
//! invocations rehydrate it, and `open` shows where the guard sends a path.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use frontend::app::{Frontend, RegistrationForm};
use frontend::config::FrontendSettings;
use frontend::domain::Role;
use frontend::domain::drugs::DEFAULT_SEARCH_LIMIT;
use frontend::domain::records::{
    Appointment, Department, Doctor, MedicalRecord, Patient, Resource, ResourceRecord, Schedule,
    User,
};
use frontend::domain::routing::RouteDescriptor;
use ortho_config::OrthoConfig;
use pagination::{DEFAULT_PER_PAGE, PageRequest};
use serde::Serialize;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// `hospital-console` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "hospital-console",
    about = "Log in to the hospital backend, browse records and look up drugs",
    version
)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and store the session.
    Login {
        /// Account name.
        #[arg(long)]
        username: String,
        /// Account password.
        #[arg(long)]
        password: String,
    },
    /// Create an account and log in as it.
    Register {
        /// Desired account name.
        #[arg(long)]
        username: String,
        /// Desired password.
        #[arg(long)]
        password: String,
        /// Contact email.
        #[arg(long)]
        email: String,
        /// Role: admin, doctor or patient.
        #[arg(long, default_value = "patient")]
        role: Role,
        /// Given name.
        #[arg(long)]
        first_name: Option<String>,
        /// Family name.
        #[arg(long)]
        last_name: Option<String>,
    },
    /// Forget the stored session.
    Logout,
    /// Show the current identity.
    Whoami,
    /// Show which view a path renders for the current session.
    Open {
        /// Path such as `/admin/users`.
        path: String,
    },
    /// Show the sidebar for the current session.
    Menu,
    /// List one page of a collection.
    List {
        /// Collection name, e.g. `departments` or `medical-records`.
        resource: Resource,
        /// One-based page number.
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Rows per page.
        #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
        per_page: usize,
        /// Case-insensitive free-text filter.
        #[arg(long)]
        search: Option<String>,
    },
    /// Drug information lookups for doctors and admins.
    #[command(subcommand)]
    Drugs(DrugCommand),
}

#[derive(Debug, Subcommand)]
enum DrugCommand {
    /// Products whose generic or brand name matches.
    Search {
        /// Drug name.
        name: String,
        /// Maximum number of products.
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: u32,
    },
    /// Label for one product code.
    Details {
        /// National product code.
        ndc: String,
    },
    /// Labels mentioning every named drug in their interaction section.
    Interactions {
        /// Drug names.
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Labels listing adverse reactions for a brand.
    Adverse {
        /// Brand name.
        name: String,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let settings = FrontendSettings::load_from_iter([OsString::from("hospital-console")])
        .map_err(|err| eyre!("load HOSPITAL_* settings: {err}"))?;
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(run(args.command, &settings))
}

async fn run(command: Command, settings: &FrontendSettings) -> Result<()> {
    let app = Frontend::start(settings).wrap_err("start frontend")?;
    let mut out = io::stdout().lock();

    match command {
        Command::Login { username, password } => {
            let landing = app.login(&username, &password).await?;
            write_landing(&mut out, &landing)?;
        }
        Command::Register {
            username,
            password,
            email,
            role,
            first_name,
            last_name,
        } => {
            let form = RegistrationForm {
                username: &username,
                password: &password,
                email: &email,
                role,
                first_name: first_name.as_deref(),
                last_name: last_name.as_deref(),
            };
            let landing = app.register(form).await?;
            write_landing(&mut out, &landing)?;
        }
        Command::Logout => {
            let landing = app.logout()?;
            write_landing(&mut out, &landing)?;
        }
        Command::Whoami => match app.identity() {
            Some(identity) => writeln!(
                out,
                "{} ({}, id {})",
                identity.username(),
                identity.role(),
                identity.id()
            )?,
            None => writeln!(out, "not logged in")?,
        },
        Command::Open { path } => {
            let landing = app.navigate(&path)?;
            write_landing(&mut out, &landing)?;
        }
        Command::Menu => {
            let items = app.menu();
            if items.is_empty() {
                return Err(eyre!("not logged in"));
            }
            for item in items {
                writeln!(out, "{:<20} {}", item.label, item.path)?;
            }
        }
        Command::List {
            resource,
            page,
            per_page,
            search,
        } => {
            let request = PageRequest::new(page, per_page).wrap_err("invalid page request")?;
            list(&app, &mut out, resource, request, search.as_deref()).await?;
        }
        Command::Drugs(drug_command) => drugs(&app, &mut out, drug_command).await?,
    }
    Ok(())
}

async fn list(
    app: &Frontend,
    out: &mut impl Write,
    resource: Resource,
    request: PageRequest,
    search: Option<&str>,
) -> Result<()> {
    match resource {
        Resource::Users => write_page::<User>(app, out, request, search).await,
        Resource::Doctors => write_page::<Doctor>(app, out, request, search).await,
        Resource::Patients => write_page::<Patient>(app, out, request, search).await,
        Resource::Appointments => write_page::<Appointment>(app, out, request, search).await,
        Resource::MedicalRecords => write_page::<MedicalRecord>(app, out, request, search).await,
        Resource::Departments => write_page::<Department>(app, out, request, search).await,
        Resource::Schedules => write_page::<Schedule>(app, out, request, search).await,
    }
}

async fn write_page<T: ResourceRecord + Serialize>(
    app: &Frontend,
    out: &mut impl Write,
    request: PageRequest,
    search: Option<&str>,
) -> Result<()> {
    let page = app.list_page::<T>(request, search).await?;
    for row in &page.data {
        writeln!(out, "{}", serde_json::to_string(row)?)?;
    }
    writeln!(out, "{}", page.display_range())?;
    Ok(())
}

async fn drugs(app: &Frontend, out: &mut impl Write, command: DrugCommand) -> Result<()> {
    match command {
        DrugCommand::Search { name, limit } => {
            for product in app.search_drugs(&name, limit).await? {
                writeln!(out, "{:<14} {}", product.product_ndc, product.display_name())?;
            }
        }
        DrugCommand::Details { ndc } => {
            let label = app.drug_details(&ndc).await?;
            writeln!(out, "{}", serde_json::to_string_pretty(&label)?)?;
        }
        DrugCommand::Interactions { names } => {
            write_labels(out, &app.drug_interactions(&names).await?)?;
        }
        DrugCommand::Adverse { name } => {
            write_labels(out, &app.drug_adverse_effects(&name).await?)?;
        }
    }
    Ok(())
}

fn write_labels(out: &mut impl Write, labels: &[frontend::domain::drugs::DrugLabel]) -> Result<()> {
    if labels.is_empty() {
        writeln!(out, "no matching labels")?;
    }
    for label in labels {
        writeln!(out, "{}", serde_json::to_string(label)?)?;
    }
    Ok(())
}

fn write_landing(out: &mut impl Write, landing: &RouteDescriptor) -> Result<()> {
    writeln!(out, "{} -> {:?}", landing.path, landing.view)?;
    Ok(())
}

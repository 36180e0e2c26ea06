//! gram-admin: command-line admin console for the village website.
//!
//! Set GRAM_API_URL (or API_BASE_URL). Sign in once with `gram-admin login`;
//! the token is kept at GRAM_TOKEN_PATH until `logout` or until the backend
//! rejects it.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use gram_api_client::{ApiClient, FileTokenStore, Session};
use gram_cli::{
    confirm_prompt, init_tracing, parse_assignment, parse_query_pair, record_line, Assignment,
};
use gram_console::descriptor::CITIZEN_SERVICE_HEADER;
use gram_console::{
    load_stats, ApplicationDesk, Confirm, ContentKind, DeleteOutcome, FeedbackDesk,
    PipelineOptions, RecordController, SelectedFile, SubmitOutcome, UpdateOutcome,
};
use gram_core::models::{ApplicationStatus, Credentials, FeedbackStatus, StatusFilter};
use gram_core::ConsoleConfig;
use serde::Serialize;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "gram-admin", about = "Gram village website admin console")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in (creates the first admin account on a fresh backend)
    Login {
        username: String,
        /// Read from stdin when omitted
        #[arg(long, env = "GRAM_ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Sign out and forget the stored token
    Logout,
    /// Show the signed-in administrator
    Whoami,
    /// List records of a content type
    List {
        /// announcements, gallery, awards, members, programs, village-details, header
        kind: ContentKind,
        /// Case-insensitive search over the searchable fields
        #[arg(long)]
        search: Option<String>,
        /// all, active or inactive
        #[arg(long, default_value = "all", value_parser = StatusFilter::parse)]
        status: StatusFilter,
        /// Extra list query parameter, KEY=VALUE (repeatable)
        #[arg(long = "query", value_parser = parse_query_pair)]
        query: Vec<(String, String)>,
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one record
    View { kind: ContentKind, id: String },
    /// Create a record
    Create {
        kind: ContentKind,
        /// FIELD=VALUE, or FIELD.en=VALUE / FIELD.mr=VALUE (repeatable)
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<Assignment>,
        /// Image file to compress and attach
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Edit a record
    Edit {
        kind: ContentKind,
        id: String,
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<Assignment>,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Delete a record
    Delete {
        kind: ContentKind,
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Citizen-service header image
    Header {
        #[command(subcommand)]
        sub: HeaderCommands,
    },
    /// Citizen feedback
    Feedback {
        #[command(subcommand)]
        sub: FeedbackCommands,
    },
    /// Certificate applications
    Applications {
        #[command(subcommand)]
        sub: ApplicationCommands,
    },
    /// Admin notifications
    Notifications {
        #[command(subcommand)]
        sub: NotificationCommands,
    },
    /// Item counts across all sections
    Stats,
}

#[derive(Subcommand)]
enum HeaderCommands {
    Show,
    Set {
        image: PathBuf,
    },
    Delete {
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum FeedbackCommands {
    List {
        /// pending, reviewed or resolved
        #[arg(long)]
        status: Option<FeedbackStatus>,
        #[arg(long)]
        search: Option<String>,
    },
    Status {
        id: String,
        status: FeedbackStatus,
        #[arg(long, default_value = "")]
        notes: String,
    },
    Delete {
        id: String,
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ApplicationCommands {
    List {
        /// pending, approved or rejected
        #[arg(long)]
        status: Option<ApplicationStatus>,
        #[arg(long)]
        search: Option<String>,
    },
    Status {
        id: String,
        status: ApplicationStatus,
    },
    Delete {
        id: String,
        #[arg(long, short)]
        yes: bool,
    },
    /// Delete several applications in one request
    BulkDelete {
        #[arg(required = true)]
        ids: Vec<String>,
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum NotificationCommands {
    List,
    Read { id: String },
    ReadAll,
    Delete { id: String },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn confirmer(assume_yes: bool) -> impl Confirm {
    move |prompt: &str| {
        assume_yes || confirm_prompt(&mut io::stdin().lock(), &mut io::stderr(), prompt)
    }
}

fn report_delete(outcome: DeleteOutcome, what: &str) -> anyhow::Result<()> {
    match outcome {
        DeleteOutcome::Deleted => print_json(&serde_json::json!({
            "success": true,
            "message": format!("{} deleted", what),
        })),
        DeleteOutcome::Cancelled => {
            eprintln!("Cancelled");
            Ok(())
        }
        DeleteOutcome::AlreadyInFlight => bail!("A delete for {} is already running", what),
        DeleteOutcome::Failed(message) => bail!(message),
    }
}

fn report_update(outcome: UpdateOutcome) -> anyhow::Result<()> {
    match outcome {
        UpdateOutcome::Updated => print_json(&serde_json::json!({ "success": true })),
        UpdateOutcome::AlreadyInFlight => bail!("An update for this item is already running"),
        UpdateOutcome::Failed(message) => bail!(message),
    }
}

async fn require_session(client: &ApiClient) -> anyhow::Result<()> {
    if client.restore_session().await?.is_none() {
        bail!("Not signed in. Run `gram-admin login <username>` first.");
    }
    Ok(())
}

fn read_password() -> anyhow::Result<String> {
    eprint!("Password: ");
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Open the form, apply field values and the image, then submit while
/// printing progress.
async fn submit_form(
    ctl: &RecordController<ApiClient>,
    edit_id: Option<&str>,
    set: &[Assignment],
    image: Option<PathBuf>,
) -> anyhow::Result<()> {
    match edit_id {
        Some(id) => ctl.open_edit(id).await?,
        None => ctl.open_create().await?,
    }

    for assignment in set {
        match assignment.lang {
            Some(lang) => {
                ctl.set_localized(&assignment.field, lang, &assignment.value)
                    .await?
            }
            None => ctl.set_field(&assignment.field, &assignment.value).await?,
        }
    }

    if let Some(path) = image {
        let file = SelectedFile::from_path(&path)
            .await
            .with_context(|| format!("Read {}", path.display()))?;
        if ctl.select_file(file).await.is_err() {
            bail!(ctl.form_error().await.unwrap_or_default());
        }
    }

    let mut progress = ctl.coordinator().subscribe_progress();
    let printer = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let percent = *progress.borrow_and_update();
            if percent > 0 {
                eprintln!("Uploading... {}%", percent);
            }
        }
    });

    let result = ctl.submit().await;
    printer.abort();

    match result {
        Ok(SubmitOutcome::Submitted) => print_json(&serde_json::json!({
            "success": true,
            "message": format!("{} saved", ctl.descriptor().label),
        })),
        Ok(SubmitOutcome::Ignored) => bail!("Nothing was submitted"),
        Err(e) => bail!(ctl
            .form_error()
            .await
            .unwrap_or_else(|| e.user_message(ctl.descriptor().generic_error))),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ConsoleConfig::from_env().context("Invalid console configuration")?;
    let session = Session::new(Arc::new(FileTokenStore::new(config.token_path.clone())));
    let client = Arc::new(
        ApiClient::from_config(&config, session).context("Failed to create API client")?,
    );
    let options = PipelineOptions::from_config(&config);
    tracing::debug!(
        api = %config.api_base_url,
        environment = %config.environment,
        "Console configured"
    );

    let cli = Cli::parse();

    let controller = |kind: ContentKind| {
        RecordController::new(kind.descriptor(), client.clone(), options)
    };

    match cli.command {
        Commands::Login { username, password } => {
            let password = match password {
                Some(p) => p,
                None => read_password()?,
            };
            let kind = client.sign_in(&Credentials { username, password }).await?;
            print_json(&serde_json::json!({ "success": true, "signIn": format!("{:?}", kind) }))?;
        }
        Commands::Logout => {
            client.sign_out().await;
            print_json(&serde_json::json!({ "success": true }))?;
        }
        Commands::Whoami => match client.restore_session().await? {
            Some(profile) => print_json(&profile)?,
            None => bail!("Not signed in"),
        },
        Commands::List {
            kind,
            search,
            status,
            query,
            json,
        } => {
            require_session(&client).await?;
            let ctl = controller(kind);
            ctl.set_query(query).await;
            ctl.refresh().await?;
            let records = ctl.filtered(search.as_deref().unwrap_or(""), status).await;
            if json {
                print_json(&records)?;
            } else {
                for record in &records {
                    println!("{}", record_line(ctl.descriptor(), record));
                }
                eprintln!("{} {}(s)", records.len(), ctl.descriptor().label);
            }
        }
        Commands::View { kind, id } => {
            require_session(&client).await?;
            let ctl = controller(kind);
            ctl.refresh().await?;
            ctl.open_view(&id).await?;
            match ctl.modal().await {
                gram_console::ModalState::Open {
                    record: Some(record),
                    ..
                } => print_json(&record)?,
                _ => bail!("Record not found: {}", id),
            }
        }
        Commands::Create { kind, set, image } => {
            require_session(&client).await?;
            let ctl = controller(kind);
            submit_form(&ctl, None, &set, image).await?;
        }
        Commands::Edit {
            kind,
            id,
            set,
            image,
        } => {
            require_session(&client).await?;
            let ctl = controller(kind);
            ctl.refresh().await?;
            submit_form(&ctl, Some(&id), &set, image).await?;
        }
        Commands::Delete { kind, id, yes } => {
            require_session(&client).await?;
            let ctl = controller(kind);
            let outcome = ctl.delete(&id, &confirmer(yes)).await;
            report_delete(outcome, &id)?;
        }
        Commands::Header { sub } => {
            require_session(&client).await?;
            let ctl = RecordController::new(&CITIZEN_SERVICE_HEADER, client.clone(), options);
            ctl.refresh().await?;
            match sub {
                HeaderCommands::Show => match ctl.records().await.first() {
                    Some(record) => print_json(record)?,
                    None => eprintln!("No header image set"),
                },
                HeaderCommands::Set { image } => {
                    submit_form(&ctl, Some(""), &[], Some(image)).await?;
                }
                HeaderCommands::Delete { yes } => {
                    let outcome = ctl.delete("", &confirmer(yes)).await;
                    report_delete(outcome, "header image")?;
                }
            }
        }
        Commands::Feedback { sub } => {
            require_session(&client).await?;
            let desk = FeedbackDesk::new(client.clone());
            match sub {
                FeedbackCommands::List { status, search } => {
                    desk.set_filter(status).await;
                    desk.refresh().await?;
                    print_json(&desk.search(search.as_deref().unwrap_or("")).await)?;
                }
                FeedbackCommands::Status { id, status, notes } => {
                    report_update(desk.update_status(&id, status, &notes).await)?;
                }
                FeedbackCommands::Delete { id, yes } => {
                    let outcome = desk.delete(&id, &confirmer(yes)).await;
                    report_delete(outcome, &id)?;
                }
            }
        }
        Commands::Applications { sub } => {
            require_session(&client).await?;
            let desk = ApplicationDesk::new(client.clone());
            match sub {
                ApplicationCommands::List { status, search } => {
                    desk.refresh().await?;
                    print_json(&desk.filtered(search.as_deref().unwrap_or(""), status).await)?;
                }
                ApplicationCommands::Status { id, status } => {
                    report_update(desk.update_status(&id, status).await)?;
                }
                ApplicationCommands::Delete { id, yes } => {
                    let outcome = desk.delete(&id, &confirmer(yes)).await;
                    report_delete(outcome, &id)?;
                }
                ApplicationCommands::BulkDelete { ids, yes } => {
                    let outcome = desk.bulk_delete(&ids, &confirmer(yes)).await;
                    report_delete(outcome, &format!("{} application(s)", ids.len()))?;
                }
            }
        }
        Commands::Notifications { sub } => {
            require_session(&client).await?;
            match sub {
                NotificationCommands::List => print_json(&client.list_notifications().await?)?,
                NotificationCommands::Read { id } => {
                    client.mark_notification_read(&id).await?;
                    print_json(&serde_json::json!({ "success": true }))?;
                }
                NotificationCommands::ReadAll => {
                    client.mark_all_notifications_read().await?;
                    print_json(&serde_json::json!({ "success": true }))?;
                }
                NotificationCommands::Delete { id } => {
                    client.delete_notification(&id).await?;
                    print_json(&serde_json::json!({ "success": true }))?;
                }
            }
        }
        Commands::Stats => {
            require_session(&client).await?;
            print_json(&load_stats(client.as_ref()).await)?;
        }
    }

    Ok(())
}

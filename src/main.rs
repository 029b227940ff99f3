// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use inquire::{Confirm, InquireError, Password, Text};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use siteguard::cli::{parse_command, show_help, InteractiveInput, ShellCommand};
use siteguard::clock::{Clock, SystemClock};
use siteguard::config::{default_data_dir, GuardConfig};
use siteguard::content::archive::{backup_file_name, export_file_name};
use siteguard::content::collections::{
    collections_file_name, item_id, item_status, item_title, CollectionKind, ContentItem,
    FieldType,
};
use siteguard::content::media::mime_from_name;
use siteguard::content::{ContentRepository, MediaDetails};
use siteguard::error::{plural, AttemptError};
use siteguard::security::{
    hash_secret, password_strength, GuardEvent, Session, SessionGuard, DEFAULT_ADMIN_IDENTIFIER,
};
use siteguard::store::{JsonFileStore, MemoryStore};
use siteguard::utils::{format_megabytes, format_wait, mask_sensitive};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// File holding the durable key space inside the data directory.
const DURABLE_STORE_FILE: &str = "local_storage.json";

/// Entries of the activity feed shown by `activity`.
const RECENT_ACTIVITY: usize = 5;

/// Exit codes following sysexits.h conventions
mod exit_codes {
    /// Temporary failure - account locked, try again later
    pub const TEMP_FAIL: i32 = 75;
}

/// Spinner helpers for consistent progress indicators
mod spinner {
    use indicatif::{ProgressBar, ProgressStyle};
    use std::time::Duration;

    pub fn create(message: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .tick_chars(concat!(
                "\u{28FB}\u{28F9}\u{28FC}\u{28F8}\u{28FE}",
                "\u{28F6}\u{28F7}\u{28E7}\u{28CF}\u{28DF} "
            ))
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    }
}

/// siteguard - admin login and content dashboard for the NGO site.
#[derive(Parser)]
#[command(name = "siteguard")]
#[command(version = VERSION)]
#[command(about = "Admin login guard and content dashboard.")]
#[command(long_about = "siteguard - admin login guard and content dashboard\n\n\
    Sign in and edit:    siteguard shell\n\
    Lockout status:      siteguard status\n\
    Security log:        siteguard log --limit 20\n\
    Hash a password:     siteguard hash")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Data directory (defaults to ~/.siteguard)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Verbose mode: debug logging to stderr
    #[arg(short = 'v', long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and open the interactive dashboard
    Shell,

    /// Show failed-attempt and lockout status
    Status,

    /// Show the security log, newest first
    ///
    /// Examples:
    ///   siteguard log
    ///   siteguard log --limit 50 --json
    Log {
        /// Number of entries to show
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
        /// Print raw JSON entries
        #[arg(long)]
        json: bool,
    },

    /// Hash a password and rate its strength
    Hash,
}

/// What the shell loop does after a command.
enum Flow {
    Continue,
    Exit,
}

type DurableGuard<'a> = SessionGuard<&'a JsonFileStore, MemoryStore>;
type DurableContent<'a> = ContentRepository<&'a JsonFileStore>;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };
    let config = GuardConfig::load(&data_dir)?;

    match cli.command {
        Commands::Shell => {
            let runtime =
                tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
            runtime.block_on(run_shell(&data_dir, config))
        }
        Commands::Status => show_status(&data_dir, config),
        Commands::Log { limit, json } => show_log(&data_dir, config, limit, json),
        Commands::Hash => hash_password(),
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "siteguard=debug" } else { "siteguard=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_durable(data_dir: &Path) -> Result<JsonFileStore> {
    let path = data_dir.join(DURABLE_STORE_FILE);
    JsonFileStore::open(&path)
        .with_context(|| format!("Failed to open storage: {}", path.display()))
}

fn local(t: DateTime<Utc>) -> String {
    let local: DateTime<Local> = t.into();
    local.format("%Y-%m-%d %H:%M:%S").to_string()
}

// ============================================================================
// shell
// ============================================================================

async fn run_shell(data_dir: &Path, config: GuardConfig) -> Result<()> {
    let durable = open_durable(data_dir)?;
    let clock = SystemClock;
    let mut guard: DurableGuard<'_> = SessionGuard::new(&durable, MemoryStore::new(), config);
    let content: DurableContent<'_> = ContentRepository::new(&durable);

    println!();
    println!("{}", "  Admin Login".bold());
    println!("{}", "  ───────────".dimmed());
    println!();

    let Some(session) = login(&mut guard, &clock).await? else {
        return Ok(());
    };

    println!();
    println!(
        "{} Signed in as {} (session {})",
        "[✓]".green(),
        session.identifier.bold(),
        mask_sensitive(&session.session_id, 13).dimmed()
    );
    println!("{}", "    Type 'help' for commands.".dimmed());
    println!();

    let mut input = InteractiveInput::new(data_dir)?;
    input.set_pages(content.pages().iter().map(|p| p.path.clone()).collect());

    loop {
        let now = clock.now();
        if !handle_guard_events(&mut guard, now)? {
            break;
        }
        let Some(session) = guard.current_session(now) else {
            break;
        };
        input.set_media_ids(content.media()?.into_iter().map(|m| m.id).collect());

        let remaining = session.remaining(now).num_seconds();
        let line = match input.read_line_with_time("admin>", remaining)? {
            Some(line) => line,
            None => {
                guard.logout(clock.now())?;
                println!("{}", "Logged out.".dimmed());
                break;
            }
        };

        // Timers are due-checked before the command runs
        let now = clock.now();
        if !handle_guard_events(&mut guard, now)? {
            break;
        }
        guard.note_activity(now);

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(usage) => {
                println!("{} {}", "[!]".yellow(), usage);
                continue;
            }
        };

        match execute(command, &mut guard, &content, now) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => break,
            Err(e) => println!("{} {:#}", "[✗]".red(), e),
        }
    }

    Ok(())
}

/// Prompt until a session is issued. `None` when the user gives up or the
/// account is locked.
async fn login(guard: &mut DurableGuard<'_>, clock: &SystemClock) -> Result<Option<Session>> {
    loop {
        let status = guard.attempt_status(clock.now())?;
        if let Some(until) = status.locked_until {
            let wait = until.signed_duration_since(clock.now()).num_seconds().max(0) as u64;
            println!(
                "{} Account temporarily locked due to multiple failed attempts. \
                 Try again in {}.",
                "[✗]".red(),
                format_wait(wait)
            );
            std::process::exit(exit_codes::TEMP_FAIL);
        }
        if let Some(warning) = status.warning() {
            println!("{} {}", "[!]".yellow(), warning);
        }

        let identifier = Text::new("Email:").with_default(DEFAULT_ADMIN_IDENTIFIER).prompt();
        let Some(identifier) = cancellable(identifier)? else {
            return Ok(None);
        };
        let secret = Password::new("Password:").without_confirmation().prompt();
        let Some(secret) = cancellable(secret)? else {
            return Ok(None);
        };
        if identifier.trim().is_empty() || secret.is_empty() {
            println!("{} Please fill in all fields", "[!]".yellow());
            continue;
        }

        let spinner = spinner::create("Signing in...");
        let result = guard.attempt_login_delayed(identifier.trim(), &secret, clock).await;
        spinner.finish_and_clear();

        match result {
            Ok(session) => return Ok(Some(session)),
            Err(e @ AttemptError::InvalidCredentials { .. }) => {
                println!("{} {}", "[✗]".red(), e.user_message());
            }
            Err(e) if e.is_lockout() => {
                println!("{} {}", "[✗]".red(), e.user_message());
                std::process::exit(exit_codes::TEMP_FAIL);
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Report fired timers. Returns `false` once the session has ended.
fn handle_guard_events(guard: &mut DurableGuard<'_>, now: DateTime<Utc>) -> Result<bool> {
    for event in guard.poll(now) {
        match event {
            GuardEvent::ExpiryWarning { expires_at } => {
                println!(
                    "{} Your session expires at {}.",
                    "[!]".yellow(),
                    local(expires_at)
                );
                let extend = Confirm::new("Extend your session?")
                    .with_default(true)
                    .prompt()
                    .unwrap_or(false);
                if extend {
                    if let Some(session) = guard.extend_session(now)? {
                        println!(
                            "{} Session extended until {}",
                            "[✓]".green(),
                            local(session.expires_at)
                        );
                    }
                }
            }
            GuardEvent::SessionExpired => {
                println!("{} Session expired. Please sign in again.", "[!]".yellow());
                return Ok(false);
            }
            GuardEvent::IdleTimeout => {
                println!(
                    "{} Signed out after {} of inactivity.",
                    "[!]".yellow(),
                    plural(guard.config().idle_timeout_secs / 60, "minute")
                );
                return Ok(false);
            }
        }
    }
    Ok(guard.current_session(now).is_some())
}

fn execute(
    command: ShellCommand,
    guard: &mut DurableGuard<'_>,
    content: &DurableContent<'_>,
    now: DateTime<Utc>,
) -> Result<Flow> {
    match command {
        ShellCommand::Help => show_help(),
        ShellCommand::Status => {
            if let Some(session) = guard.current_session(now) {
                println!("  Signed in as      {}", session.identifier.bold());
                println!("  Signed in at      {}", local(session.issued_at));
                println!(
                    "  Expires at        {} ({} left)",
                    local(session.expires_at),
                    session.remaining_formatted(now)
                );
            }
            let stats = content.dashboard_stats()?;
            println!("  Pages             {}", stats.total_pages);
            println!("  Media files       {}", stats.total_media);
            println!("  Edited fields     {}", stats.editable_fields);
            println!("  Collection items  {}", content.collections()?.total());
            println!(
                "  Storage used      {}",
                format_megabytes(content.storage_usage_bytes()?)
            );
            println!(
                "  Last updated      {}",
                stats.last_updated.map(local).unwrap_or_else(|| "never".to_string())
            );
            println!(
                "  Last backup       {}",
                stats.last_backup.map(local).unwrap_or_else(|| "never".to_string())
            );
        }
        ShellCommand::Extend => match guard.extend_session(now)? {
            Some(session) => println!(
                "{} Session extended until {}",
                "[✓]".green(),
                local(session.expires_at)
            ),
            None => return Ok(Flow::Exit),
        },
        ShellCommand::Pages => {
            let stored = content.content()?;
            for page in content.pages() {
                let fields = stored.get(&page.path).map_or(0, |f| f.len());
                println!(
                    "  {:<40} {:<28} {}",
                    page.path.cyan(),
                    page.name,
                    plural(fields as u64, "field").dimmed()
                );
            }
        }
        ShellCommand::Show { page } => {
            let path = resolve_page(content, &page);
            let fields = content.page_content(&path)?;
            if fields.is_empty() {
                println!("{}", "  No stored content for this page".dimmed());
            }
            for (field, value) in fields {
                println!("  {:<24} {}", field.cyan(), value);
            }
        }
        ShellCommand::Set { page, field, value } => {
            let path = resolve_page(content, &page);
            content.set_field(&path, &field, &value, now)?;
            println!("{} Saved {} on {}", "[✓]".green(), field, path);
        }
        ShellCommand::Unset { page, field } => {
            let path = resolve_page(content, &page);
            if content.remove_field(&path, &field, now)? {
                println!("{} Removed {} from {}", "[✓]".green(), field, path);
            } else {
                println!("{} {} has no field {}", "[!]".yellow(), path, field);
            }
        }
        ShellCommand::Media { filter, search } => {
            let items = content.filter_media(filter, &search)?;
            if items.is_empty() {
                println!("{}", "  No media files".dimmed());
            }
            for item in items {
                let title = if item.title.is_empty() { &item.name } else { &item.title };
                println!(
                    "  {:<32} {:<12} {:>10}  {}",
                    item.id.cyan(),
                    item.kind().label(),
                    format!("{} B", item.size),
                    title
                );
            }
        }
        ShellCommand::MediaAdd { file } => {
            let bytes =
                fs::read(&file).with_context(|| format!("Failed to read {}", file.display()))?;
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.display().to_string());
            let item = content.add_media(&name, mime_from_name(&name), &bytes, now)?;
            println!("{} {} uploaded successfully! ({})", "[✓]".green(), name, item.id);
        }
        ShellCommand::MediaRemove { id } => {
            let item = content.find_media(&id)?;
            let confirmed = Confirm::new(&format!("Delete {}?", item.name))
                .with_default(false)
                .prompt()
                .unwrap_or(false);
            if confirmed {
                let removed = content.delete_media(&id, now)?;
                println!("{} Deleted {}", "[✓]".green(), removed.name);
            }
        }
        ShellCommand::MediaEdit { id } => {
            let item = content.find_media(&id)?;
            let tags = item.tags.join(", ");
            let Some(title) = cancellable(Text::new("Title:").with_default(&item.title).prompt())?
            else {
                return Ok(Flow::Continue);
            };
            let description = Text::new("Description:")
                .with_default(&item.description)
                .prompt();
            let Some(description) = cancellable(description)? else {
                return Ok(Flow::Continue);
            };
            let alt_text = Text::new("Alt text:").with_default(&item.alt_text).prompt();
            let Some(alt_text) = cancellable(alt_text)? else {
                return Ok(Flow::Continue);
            };
            let tags = Text::new("Tags:")
                .with_default(&tags)
                .with_help_message("Comma-separated")
                .prompt();
            let Some(tags) = cancellable(tags)? else {
                return Ok(Flow::Continue);
            };

            let details = MediaDetails {
                title,
                description,
                alt_text,
                tags: MediaDetails::parse_tags(&tags),
            };
            let updated = content.update_media_details(&id, details, now)?;
            println!("{} Media details updated for {}", "[✓]".green(), updated.name);
        }
        ShellCommand::Items { collection } => {
            let items = content.items(collection)?;
            if items.is_empty() {
                println!("{}", format!("  No {} yet", collection.label().to_lowercase()).dimmed());
            }
            for item in &items {
                println!(
                    "  {:<24} {:<40} {:<12} {}",
                    item_id(item).unwrap_or("?").cyan(),
                    item_title(item),
                    item_status(item),
                    modified(item).dimmed()
                );
            }
        }
        ShellCommand::Item { collection, id } => {
            let item = content.find_item(collection, &id)?;
            println!("  {} {}", collection.singular().bold(), item_title(&item).bold());
            for field in collection.fields() {
                if let Some(value) = item.get(field.name) {
                    println!("  {:<28} {}", field.label.cyan(), display_value(value));
                }
            }
            println!("  {:<28} {}", "Last modified".dimmed(), modified(&item).dimmed());
        }
        ShellCommand::ItemAdd { collection } => {
            let Some(data) = prompt_item(collection)? else {
                println!("{}", "  Cancelled".dimmed());
                return Ok(Flow::Continue);
            };
            let item = content.save_item(collection, None, data, now)?;
            println!(
                "{} {} created successfully! ({})",
                "[✓]".green(),
                collection.singular(),
                item_id(&item).unwrap_or_default()
            );
        }
        ShellCommand::ItemSet {
            collection,
            id,
            field,
            value,
        } => {
            let Some(def) = collection.field(&field) else {
                let names: Vec<&str> = collection.fields().iter().map(|f| f.name).collect();
                anyhow::bail!(
                    "{} have no field '{}'. Fields: {}",
                    collection.label(),
                    field,
                    names.join(", ")
                );
            };
            if def.readonly {
                anyhow::bail!("'{}' is set automatically", field);
            }
            let value = def
                .parse_input(&value)
                .map_err(|reason| anyhow::anyhow!("'{}' {}", field, reason))?;
            let mut data = ContentItem::new();
            data.insert(field.clone(), value);
            content.save_item(collection, Some(&id), data, now)?;
            println!("{} Saved {} on {}", "[✓]".green(), field, id);
        }
        ShellCommand::ItemRemove { collection, id } => {
            let item = content.find_item(collection, &id)?;
            let confirmed = Confirm::new(&format!(
                "Delete {} '{}'?",
                collection.singular().to_lowercase(),
                item_title(&item)
            ))
            .with_default(false)
            .prompt()
            .unwrap_or(false);
            if confirmed {
                content.delete_item(collection, &id, now)?;
                println!("{} {} deleted", "[✓]".green(), collection.singular());
            }
        }
        ShellCommand::ItemsExport { file } => {
            let path = file.unwrap_or_else(|| PathBuf::from(collections_file_name(now)));
            let export = content.export_collections(now)?;
            write_document(&path, &export)?;
            println!(
                "{} Exported {} to {}",
                "[✓]".green(),
                plural(export.content.total() as u64, "item"),
                path.display()
            );
        }
        ShellCommand::ItemsImport { file } => {
            let document = read_document(&file)?;
            let replaced = content.import_collections(&document, now)?;
            let labels: Vec<&str> = replaced.iter().map(|kind| kind.label()).collect();
            if labels.is_empty() {
                println!("{} The file holds no collections", "[!]".yellow());
            } else {
                println!("{} Replaced {}", "[✓]".green(), labels.join(", "));
            }
        }
        ShellCommand::Activity => {
            let feed = content.recent_activity(RECENT_ACTIVITY)?;
            if feed.is_empty() {
                println!("{}", "  No recent activity".dimmed());
            }
            for entry in feed {
                println!("  {}  {}", local(entry.timestamp).dimmed(), entry.text);
            }
        }
        ShellCommand::Export { file } => {
            let path = file.unwrap_or_else(|| PathBuf::from(export_file_name(now)));
            let export = content.export_content(now)?;
            write_document(&path, &export)?;
            println!("{} Content exported to {}", "[✓]".green(), path.display());
        }
        ShellCommand::Import { file } => {
            let document = read_document(&file)?;
            let pages = content.import_content(&document, now)?;
            println!("{} Imported {}", "[✓]".green(), plural(pages as u64, "page"));
        }
        ShellCommand::Backup { file } => {
            let path = file.unwrap_or_else(|| PathBuf::from(backup_file_name(now)));
            let backup = content.create_backup(now)?;
            write_document(&path, &backup)?;
            println!("{} Backup written to {}", "[✓]".green(), path.display());
        }
        ShellCommand::Restore { file } => {
            let document = read_document(&file)?;
            let backup = content.restore_backup(&document, now)?;
            println!(
                "{} Restored backup from {} ({}, {})",
                "[✓]".green(),
                local(backup.timestamp),
                plural(backup.content_data.len() as u64, "page"),
                plural(backup.media_files.len() as u64, "media file")
            );
        }
        ShellCommand::ClearCache => {
            let confirmed = Confirm::new("Clear all cached data? This action cannot be undone.")
                .with_default(false)
                .prompt()
                .unwrap_or(false);
            if confirmed {
                content.clear_cache(now)?;
                println!("{} Cache cleared", "[✓]".green());
            }
        }
        ShellCommand::Logout => {
            guard.logout(now)?;
            println!("{}", "Logged out.".dimmed());
            return Ok(Flow::Exit);
        }
        ShellCommand::Quit => {
            guard.logout(now)?;
            return Ok(Flow::Exit);
        }
    }
    Ok(Flow::Continue)
}

/// `Ok(None)` when the user cancels the prompt with Esc or Ctrl-C.
fn cancellable<T>(answer: Result<T, InquireError>) -> Result<Option<T>> {
    match answer {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Ask for every editable field of `collection`, re-asking until the input
/// parses. `None` if the user cancels.
fn prompt_item(collection: CollectionKind) -> Result<Option<ContentItem>> {
    let mut data = ContentItem::new();
    for field in collection.fields().iter().filter(|f| !f.readonly) {
        let label = if field.required {
            format!("{} *", field.label)
        } else {
            field.label.to_string()
        };
        let help = match field.kind {
            FieldType::Select => format!("One of: {}", field.options.join(", ")),
            FieldType::Checkbox => "yes or no".to_string(),
            FieldType::Date => "YYYY-MM-DD".to_string(),
            FieldType::KeyValue => "key=value pairs separated by ;".to_string(),
            kind if kind.is_list() => "Separate values with ;".to_string(),
            _ => String::new(),
        };
        loop {
            let mut prompt = Text::new(&label);
            if !help.is_empty() {
                prompt = prompt.with_help_message(&help);
            }
            let Some(input) = cancellable(prompt.prompt())? else {
                return Ok(None);
            };
            match field.parse_input(&input) {
                Ok(value) if value.is_null() && field.required => {
                    println!("{} {} is required", "[!]".yellow(), field.label);
                }
                Ok(value) => {
                    data.insert(field.name.to_string(), value);
                    break;
                }
                Err(reason) => println!("{} {} {}", "[!]".yellow(), field.label, reason),
            }
        }
    }
    Ok(Some(data))
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(values) => values
            .iter()
            .map(|v| v.as_str().map_or_else(|| v.to_string(), str::to_string))
            .collect::<Vec<_>>()
            .join("; "),
        serde_json::Value::Object(pairs) => pairs
            .iter()
            .map(|(k, v)| match v.as_str() {
                Some(text) => format!("{}={}", k, text),
                None => format!("{}={}", k, v),
            })
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

fn modified(item: &ContentItem) -> String {
    item.get("lastModified")
        .and_then(|v| v.as_str())
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|t| local(t.with_timezone(&Utc)))
        .unwrap_or_default()
}

/// Accept a page path or display name.
fn resolve_page(content: &DurableContent<'_>, query: &str) -> String {
    content
        .find_page(query)
        .map(|p| p.path.clone())
        .unwrap_or_else(|| query.to_string())
}

fn write_document<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

// ============================================================================
// status / log / hash
// ============================================================================

fn show_status(data_dir: &Path, config: GuardConfig) -> Result<()> {
    let durable = open_durable(data_dir)?;
    let now = SystemClock.now();
    let mut guard = SessionGuard::new(&durable, MemoryStore::new(), config);
    let status = guard.attempt_status(now)?;

    println!();
    println!("{}", "=== siteguard Status ===".bold());
    println!();
    println!("  Storage           {}", durable.path().display());
    println!("  Failed attempts   {}", status.failed);
    println!("  Remaining         {}", status.remaining);
    match status.locked_until {
        Some(until) => {
            let wait = until.signed_duration_since(now).num_seconds().max(0) as u64;
            println!(
                "  Lockout           {} until {} ({} left)",
                "LOCKED".red().bold(),
                local(until),
                format_wait(wait)
            );
        }
        None => println!("  Lockout           {}", "not locked".green()),
    }
    println!();
    Ok(())
}

fn show_log(data_dir: &Path, config: GuardConfig, limit: usize, json: bool) -> Result<()> {
    let durable = open_durable(data_dir)?;
    let guard = SessionGuard::new(&durable, MemoryStore::new(), config);
    let entries = guard.security_log().recent(guard.durable(), limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("{}", "No security events recorded".dimmed());
        return Ok(());
    }
    for entry in entries {
        let line = entry.to_log_line();
        if entry.event.as_str().contains("fail") || entry.event.as_str().contains("locked") {
            println!("{}", line.yellow());
        } else {
            println!("{}", line);
        }
    }
    Ok(())
}

fn hash_password() -> Result<()> {
    let password = Password::new("Password to hash:").prompt()?;
    let strength = password_strength(&password);

    println!();
    println!("  SHA-256   {}", hash_secret(&password));
    let rating = format!("{}/5", strength.score);
    if strength.is_valid {
        println!("  Strength  {}", rating.green());
    } else {
        println!("  Strength  {}", rating.red());
    }
    for hint in strength.feedback {
        println!("    {} {}", "-".dimmed(), hint);
    }
    println!();
    Ok(())
}

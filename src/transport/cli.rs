//! CLI transport for direct terminal interaction
//!
//! Each handler performs one client operation, prints the outcome and turns
//! an error envelope into an `anyhow` error so the process exits non-zero
//! with the backend's message.

use super::table::{cell, render_item, render_rows};
use crate::chat::{ChatMessage, ChatRole, ChatSession};
use crate::client::{
    Authenticator, BackendClient, Credentials, Envelope, Operation, PermissionQuery,
    ResourceFamily,
};
use crate::config::{Config, OutputFormat, PASSWORD_ENV_VAR, USERNAME_ENV_VAR};
use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::Value;
use std::io::{self, Write};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

/// One CRUD request against a resource family, as typed on the command line
#[derive(Debug, Clone)]
pub enum FamilyAction {
    List,
    Get { id: String },
    Create { fields: Value },
    Update { id: String, fields: Value },
    Delete { id: String },
}

impl FamilyAction {
    pub fn operation(&self) -> Operation {
        match self {
            FamilyAction::List => Operation::List,
            FamilyAction::Get { .. } => Operation::Get,
            FamilyAction::Create { .. } => Operation::Create,
            FamilyAction::Update { .. } => Operation::Update,
            FamilyAction::Delete { .. } => Operation::Delete,
        }
    }
}

/// Run a CRUD action and print its result
pub async fn run_family(
    client: &BackendClient,
    family: ResourceFamily,
    action: FamilyAction,
    format: OutputFormat,
) -> Result<()> {
    let operation = action.operation();
    let handle = client.family(family);

    match action {
        FamilyAction::List => {
            let envelope = expect_success(handle.list().await, operation, family)?;
            print_rows(family.label(), &envelope, format)
        }
        FamilyAction::Get { id } => {
            let envelope = expect_success(handle.get(&id).await, operation, family)?;
            print_item(&envelope.data, format)
        }
        FamilyAction::Create { fields } => {
            let envelope = expect_success(handle.create(&fields).await, operation, family)?;
            match format {
                OutputFormat::Json => print_json(&envelope.data),
                OutputFormat::Table => {
                    let text = match display_name(&fields) {
                        Some(name) => format!("{} {} created", capitalize(family.singular()), name),
                        None => cell(&envelope.data),
                    };
                    println!("{} {}", "✓".green(), text);
                    Ok(())
                }
            }
        }
        FamilyAction::Update { id, fields } => {
            let envelope = expect_success(handle.update(&id, &fields).await, operation, family)?;
            match format {
                OutputFormat::Json => print_json(&envelope.data),
                OutputFormat::Table => {
                    println!(
                        "{} {} {} updated",
                        "✓".green(),
                        capitalize(family.singular()),
                        id
                    );
                    Ok(())
                }
            }
        }
        FamilyAction::Delete { id } => {
            let envelope = expect_success(handle.delete(&id).await, operation, family)?;
            match format {
                OutputFormat::Json => print_json(&envelope.data),
                OutputFormat::Table => {
                    println!(
                        "{} {} {} deleted",
                        "✓".green(),
                        capitalize(family.singular()),
                        id
                    );
                    Ok(())
                }
            }
        }
    }
}

/// List which subjects hold which roles
pub async fn run_role_subjects(client: &BackendClient, format: OutputFormat) -> Result<()> {
    let envelope = client.get_role_subject().await;
    if !envelope.is_success() {
        anyhow::bail!("Error fetching role subjects: {}", envelope.message);
    }
    print_rows("Role Subjects", &envelope, format)
}

/// Check a permission and print the verdict.
///
/// A denial is a normal outcome and does not fail the command.
pub async fn run_test_permission(
    client: &BackendClient,
    query: PermissionQuery,
    format: OutputFormat,
) -> Result<()> {
    let verdict = client
        .check_permission(&query)
        .await
        .map_err(|e| anyhow::anyhow!("Error testing permissions: {}", e))?;

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "user": query.user,
            "resource": query.resource,
            "permission": query.permission,
            "granted": verdict.is_granted(),
            "verdict": verdict.text(),
        })),
        OutputFormat::Table => {
            if verdict.is_granted() {
                println!(
                    "{} User {} has the required {} permission over the {} resource",
                    "✓".green(),
                    query.user,
                    query.permission,
                    query.resource
                );
                println!("{}", verdict.text().green());
            } else {
                println!(
                    "{} User {} does not have the required {} permission over the {} resource",
                    "✗".red(),
                    query.user,
                    query.permission,
                    query.resource
                );
                println!("{}", verdict.text().red());
            }
            Ok(())
        }
    }
}

/// Chat with the router as a directory user.
///
/// With `message`, asks once and exits. Otherwise reads questions from stdin
/// until EOF or `/exit`.
pub async fn run_chat(
    client: &BackendClient,
    user: Option<&str>,
    message: Option<String>,
) -> Result<()> {
    let mut session = ChatSession::start(client, user).await?;

    if let Some(question) = message {
        let reply = session.ask(&question).await;
        println!("{}", reply.content);
        return Ok(());
    }

    println!(
        "{}",
        format!("=== Chatting as {} (/exit to quit) ===", session.username())
            .bold()
            .cyan()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", "you ›".bold());
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question == "/exit" {
            break;
        }

        let reply = session.ask(question).await;
        println!("{}", format_bubble(reply));
    }

    tracing::info!(
        "Chat session for {} ended after {} messages",
        session.username(),
        session.transcript().len()
    );
    Ok(())
}

/// Log in with explicit credentials and print the backend's answer
pub async fn run_login(
    auth: &dyn Authenticator,
    credentials: Credentials,
    format: OutputFormat,
) -> Result<()> {
    let envelope = auth.login(&credentials).await;
    if !envelope.is_success() {
        anyhow::bail!("Login failed: {}", envelope.message);
    }
    if let Some(reason) = envelope.declared_failure() {
        anyhow::bail!("Login failed: {}", reason);
    }

    match format {
        OutputFormat::Json => print_json(&envelope.data),
        OutputFormat::Table => {
            println!("{} Login successful!", "✓".green());
            Ok(())
        }
    }
}

/// Enforce `auth.required` using credentials from the environment
pub async fn ensure_authenticated(config: &Config, auth: &dyn Authenticator) -> Result<()> {
    if !config.auth.required {
        return Ok(());
    }

    let username = std::env::var(USERNAME_ENV_VAR)
        .with_context(|| format!("login required: set {}", USERNAME_ENV_VAR))?;
    let password = std::env::var(PASSWORD_ENV_VAR)
        .with_context(|| format!("login required: set {}", PASSWORD_ENV_VAR))?;

    let envelope = auth.login(&Credentials { username, password }).await;
    if !envelope.is_success() {
        anyhow::bail!("Login failed: {}", envelope.message);
    }
    if let Some(reason) = envelope.declared_failure() {
        anyhow::bail!("Login failed: {}", reason);
    }
    tracing::debug!("login accepted");
    Ok(())
}

/// Show the config file location and effective settings
pub fn run_config(config: &Config, path: &Path, init: bool) -> Result<()> {
    if init {
        if path.exists() {
            println!("Config file already exists: {}", path.display());
        } else {
            Config::default().save_to(path)?;
            println!("{} Wrote {}", "✓".green(), path.display());
        }
    }

    println!("{}", "=== Configuration ===".bold().cyan());
    println!();
    println!("{}: {}", "Config file".bold(), path.display());
    println!(
        "{}:    {}",
        "Backend".bold(),
        config.backend.base_url.as_deref().unwrap_or("(not set)")
    );
    println!(
        "{}:       {}",
        "Auth".bold(),
        if config.auth.required {
            "required"
        } else {
            "not required"
        }
    );
    println!("{}:     {:?}", "Output".bold(), config.output.format);
    Ok(())
}

fn expect_success(
    envelope: Envelope,
    operation: Operation,
    family: ResourceFamily,
) -> Result<Envelope> {
    if envelope.is_success() {
        Ok(envelope)
    } else {
        anyhow::bail!("{}: {}", failure_prefix(operation, family), envelope.message)
    }
}

/// `Error creating role`, `Error fetching resources`, ...
fn failure_prefix(operation: Operation, family: ResourceFamily) -> String {
    match operation {
        Operation::List => format!("Error fetching {}", family.label().to_lowercase()),
        Operation::Get => format!("Error fetching {}", family.singular()),
        Operation::Create => format!("Error creating {}", family.singular()),
        Operation::Update => format!("Error updating {}", family.singular()),
        Operation::Delete => format!("Error deleting {}", family.singular()),
    }
}

fn print_rows(title: &str, envelope: &Envelope, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&envelope.data),
        OutputFormat::Table => {
            println!("{}", format!("=== {} ===", title).bold().cyan());
            println!();
            if envelope.rows().is_empty() {
                println!("No {} found.", title.to_lowercase());
            } else {
                println!("{}", render_rows(envelope.rows()));
            }
            Ok(())
        }
    }
}

fn print_item(item: &Value, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(item),
        OutputFormat::Table => {
            println!("{}", render_item(item));
            Ok(())
        }
    }
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn format_bubble(message: &ChatMessage) -> String {
    let speaker = match message.role {
        ChatRole::User => "you ›".bold(),
        ChatRole::Assistant => "assistant ›".bold().green(),
    };
    format!("{} {}", speaker, message.content)
}

fn display_name(fields: &Value) -> Option<&str> {
    ["name", "username"]
        .iter()
        .find_map(|key| fields.get(*key).and_then(Value::as_str))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

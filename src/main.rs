use anyhow::Result;
use clap::{Parser, Subcommand};
use mcp_console::client::{
    AssociationFields, BackendClient, Credentials, NamedFields, PermissionQuery, ResourceFamily,
    UserFields,
};
use mcp_console::config::{Config, OutputFormat, PASSWORD_ENV_VAR};
use mcp_console::transport;
use mcp_console::transport::cli::FamilyAction;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mcp-console")]
#[command(author, version, about = "MCP Console - admin console and chat for the access-control backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend URL (overrides MCP_CONSOLE_BASE_URL / BASE_URL and the config file)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage users
    Users {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage roles
    Roles {
        #[command(subcommand)]
        action: NamedAction,
    },

    /// Manage permissions
    Permissions {
        #[command(subcommand)]
        action: NamedAction,
    },

    /// Manage resources (served from /servers/ on the backend)
    Resources {
        #[command(subcommand)]
        action: NamedAction,
    },

    /// Observe and create associations
    Associations {
        #[command(subcommand)]
        action: AssociationAction,
    },

    /// Test whether a user has a permission over a resource
    TestPermission {
        #[arg(short, long)]
        user: String,

        #[arg(short, long)]
        resource: String,

        #[arg(short, long)]
        permission: String,
    },

    /// Chat with the router as a directory user
    Chat {
        /// Ask a single question and exit
        message: Option<String>,

        /// Directory user to chat as (default: first user)
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Log in against the backend auth endpoint
    Login {
        #[arg(short, long)]
        username: String,

        /// Password (default: MCP_CONSOLE_PASSWORD)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Show configuration
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// List all users
    List,
    /// Show one user
    Get { id: String },
    /// Create a user
    Create {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Replace a user's fields
    Update {
        id: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Delete a user
    Delete { id: String },
}

/// Actions for families whose records only carry a name
#[derive(Subcommand)]
enum NamedAction {
    /// List all entries
    List,
    /// Show one entry
    Get { id: String },
    /// Create an entry
    Create {
        #[arg(long)]
        name: String,
    },
    /// Rename an entry
    Update {
        id: String,
        #[arg(long)]
        name: String,
    },
    /// Delete an entry
    Delete { id: String },
}

#[derive(Subcommand)]
enum AssociationAction {
    /// List all associations
    List,
    /// Bind a subject to a role over a domain with a permission
    Create {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        role: String,
        #[arg(long)]
        domain: String,
        #[arg(long)]
        permission: String,
    },
    /// List which subjects hold which roles
    RoleSubjects,
}

impl UserAction {
    fn into_family_action(self) -> Result<FamilyAction> {
        Ok(match self {
            UserAction::List => FamilyAction::List,
            UserAction::Get { id } => FamilyAction::Get { id },
            UserAction::Create {
                username,
                email,
                password,
            } => FamilyAction::Create {
                fields: serde_json::to_value(UserFields {
                    username,
                    email,
                    password,
                })?,
            },
            UserAction::Update {
                id,
                username,
                email,
                password,
            } => FamilyAction::Update {
                id,
                fields: serde_json::to_value(UserFields {
                    username,
                    email,
                    password,
                })?,
            },
            UserAction::Delete { id } => FamilyAction::Delete { id },
        })
    }
}

impl NamedAction {
    fn into_family_action(self) -> Result<FamilyAction> {
        Ok(match self {
            NamedAction::List => FamilyAction::List,
            NamedAction::Get { id } => FamilyAction::Get { id },
            NamedAction::Create { name } => FamilyAction::Create {
                fields: serde_json::to_value(NamedFields::new(name))?,
            },
            NamedAction::Update { id, name } => FamilyAction::Update {
                id,
                fields: serde_json::to_value(NamedFields::new(name))?,
            },
            NamedAction::Delete { id } => FamilyAction::Delete { id },
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "mcp_console=debug"
    } else {
        "mcp_console=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = Config::config_path()?;
    let mut config = Config::load_from(&config_path)?;
    config.apply_env();
    let format = cli.format.unwrap_or(config.output.format);

    let command = match cli.command {
        Commands::Config { init } => {
            return transport::cli::run_config(&config, &config_path, init);
        }
        command => command,
    };

    let base_url = config.base_url(cli.base_url.as_deref())?;
    tracing::debug!("Using backend at {}", base_url);
    let client = BackendClient::new(base_url)?;

    if !matches!(command, Commands::Login { .. }) {
        transport::cli::ensure_authenticated(&config, &client).await?;
    }

    match command {
        Commands::Users { action } => {
            transport::cli::run_family(
                &client,
                ResourceFamily::Users,
                action.into_family_action()?,
                format,
            )
            .await?;
        }
        Commands::Roles { action } => {
            transport::cli::run_family(
                &client,
                ResourceFamily::Roles,
                action.into_family_action()?,
                format,
            )
            .await?;
        }
        Commands::Permissions { action } => {
            transport::cli::run_family(
                &client,
                ResourceFamily::Permissions,
                action.into_family_action()?,
                format,
            )
            .await?;
        }
        Commands::Resources { action } => {
            transport::cli::run_family(
                &client,
                ResourceFamily::Resources,
                action.into_family_action()?,
                format,
            )
            .await?;
        }
        Commands::Associations { action } => match action {
            AssociationAction::List => {
                transport::cli::run_family(
                    &client,
                    ResourceFamily::Associations,
                    FamilyAction::List,
                    format,
                )
                .await?;
            }
            AssociationAction::Create {
                subject,
                role,
                domain,
                permission,
            } => {
                let fields = serde_json::to_value(AssociationFields {
                    subject,
                    role,
                    domain,
                    permission,
                })?;
                transport::cli::run_family(
                    &client,
                    ResourceFamily::Associations,
                    FamilyAction::Create { fields },
                    format,
                )
                .await?;
            }
            AssociationAction::RoleSubjects => {
                transport::cli::run_role_subjects(&client, format).await?;
            }
        },
        Commands::TestPermission {
            user,
            resource,
            permission,
        } => {
            let query = PermissionQuery {
                user,
                resource,
                permission,
            };
            transport::cli::run_test_permission(&client, query, format).await?;
        }
        Commands::Chat { message, user } => {
            transport::cli::run_chat(&client, user.as_deref(), message).await?;
        }
        Commands::Login { username, password } => {
            let password = match password {
                Some(password) => password,
                None => std::env::var(PASSWORD_ENV_VAR)
                    .map_err(|_| anyhow::anyhow!("pass --password or set {}", PASSWORD_ENV_VAR))?,
            };
            let credentials = Credentials { username, password };
            transport::cli::run_login(&client, credentials, format).await?;
        }
        // Answered before connecting
        Commands::Config { .. } => {}
    }

    Ok(())
}

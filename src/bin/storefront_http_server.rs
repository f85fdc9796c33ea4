use clap::{Parser, Subcommand};
use log::info;
use storefront_api::loader::load_fixture_from_file;
use storefront_api::models::User;
use storefront_api::session::credentials::create_user;
use storefront_api::{load_server_config, Storefront, StorefrontHttpServer};

/// Command line options for the storefront server binary.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Path to the server configuration file
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Run the HTTP server (the default)
    Serve {
        /// Port for the HTTP server
        #[arg(long)]
        port: Option<u16>,
    },
    /// Create a user account
    CreateUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "")]
        email: String,
        /// Grant staff privileges
        #[arg(long)]
        staff: bool,
    },
    /// Import catalogue data from a JSON fixture
    LoadFixture {
        /// Path to the fixture file
        path: String,
    },
}

/// Main entry point for the storefront HTTP server.
///
/// # Environment Variables
///
/// * `SERVER_CONFIG` - Path to the server configuration file (default:
///   config/server_config.json)
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Serve { port: None });
    let port = match &command {
        Commands::Serve { port } => *port,
        _ => None,
    };

    let config = load_server_config(cli.config.as_deref(), port)?;
    storefront_api::logging::init(&config.log_level).ok();
    info!("Config loaded successfully");

    let storefront = Storefront::new(config)?;

    match command {
        Commands::Serve { .. } => {
            info!("Starting storefront HTTP server...");
            StorefrontHttpServer::new(storefront).run().await?;
        }
        Commands::CreateUser {
            username,
            password,
            email,
            staff,
        } => {
            let mut user = User::new(&username);
            user.email = email;
            user.is_staff = staff;
            let user = create_user(&storefront.store, user, &password)?;
            info!("Created user {} with id {}", user.username, user.id);
        }
        Commands::LoadFixture { path } => {
            let report = load_fixture_from_file(&path, &storefront.store)?;
            info!("Fixture {} loaded: {:?}", path, report);
        }
    }

    Ok(())
}

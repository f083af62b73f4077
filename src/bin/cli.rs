use clap::{Parser, Subcommand};
use quizgame::{
    config::AppConfig,
    db,
    repositories::{SqliteSessionRepository, SqliteUserRepository},
    services::{create_email_service, AuthService, CreateUserRequest, UserService},
};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "quizgame-cli")]
#[command(about = "CLI tool for managing quiz game accounts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User management commands
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Login session maintenance
    Sessions {
        #[command(subcommand)]
        command: SessionCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create an already verified user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Username used to log in
        #[arg(short, long)]
        username: String,

        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// List all users
    List {
        /// Maximum number of users to display
        #[arg(short, long, default_value_t = 100)]
        limit: i64,

        /// Offset for pagination
        #[arg(short = 'o', long, default_value_t = 0)]
        offset: i64,
    },

    /// Delete a user
    Delete {
        /// Email address of the user to delete
        #[arg(short, long)]
        email: String,
    },

    /// Mark a pending signup as verified without its code
    Verify {
        /// Email address of the user to verify
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum SessionCommands {
    /// Delete expired and logged-out sessions
    Cleanup,
}

fn get_password(prompt: &str) -> Result<String, Box<dyn std::error::Error>> {
    use std::io::{self, Write};
    print!("{}: ", prompt);
    io::stdout().flush()?;

    Ok(rpassword::read_password()?)
}

fn fail(message: String) -> ! {
    eprintln!("❌ {}", message);
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;

    // Connect to database
    let pool = db::create_pool(&config.database_url).await?;

    // Run migrations
    db::run_migrations(&pool).await?;

    // Initialize services
    let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
    let session_repository = Arc::new(SqliteSessionRepository::new(pool.clone()));
    let user_service = UserService::new(user_repository.clone(), create_email_service());
    let auth_service = AuthService::new(user_repository, session_repository);

    // Parse CLI arguments
    let cli = Cli::parse();

    match cli.command {
        Commands::User { command } => match command {
            UserCommands::Create {
                email,
                username,
                password,
            } => {
                let password = match password {
                    Some(pw) => pw,
                    None => {
                        let password = get_password("Password")?;
                        if password != get_password("Confirm password")? {
                            fail("Passwords do not match".to_string());
                        }
                        password
                    }
                };

                let request = CreateUserRequest {
                    email,
                    username,
                    password,
                    is_verified: true,
                };

                match user_service.create_user(request).await {
                    Ok(user) => {
                        println!("✅ User created successfully!");
                        println!("  ID: {}", user.id);
                        println!("  Email: {}", user.email);
                        println!("  Username: {}", user.username);
                    }
                    Err(err) => fail(format!("Failed to create user: {}", err)),
                }
            }

            UserCommands::List { limit, offset } => {
                match user_service.list_users(Some(limit), Some(offset)).await {
                    Ok(users) if users.is_empty() => println!("No users found."),
                    Ok(users) => {
                        println!(
                            "{:<5} {:<36} {:<20} {:<10} {:<20}",
                            "ID", "Email", "Username", "Verified", "Created"
                        );
                        println!("{}", "-".repeat(95));
                        for user in users {
                            println!(
                                "{:<5} {:<36} {:<20} {:<10} {:<20}",
                                user.id,
                                user.email,
                                user.username,
                                if user.is_verified { "Yes" } else { "No" },
                                user.created_at.format("%Y-%m-%d %H:%M:%S")
                            );
                        }
                    }
                    Err(err) => fail(format!("Failed to list users: {}", err)),
                }
            }

            UserCommands::Delete { email } => match user_service.find_user_by_email(&email).await {
                Ok(Some(user)) => match user_service.delete_user(user.id).await {
                    Ok(()) => println!("✅ User '{}' deleted successfully!", email),
                    Err(err) => fail(format!("Failed to delete user: {}", err)),
                },
                Ok(None) => fail(format!("User '{}' not found", email)),
                Err(err) => fail(format!("Failed to find user: {}", err)),
            },

            UserCommands::Verify { email } => match user_service.find_user_by_email(&email).await {
                Ok(Some(user)) if user.is_verified => {
                    println!("ℹ️  User '{}' is already verified", email);
                }
                Ok(Some(user)) => match user_service.verify_user_email(user.id).await {
                    Ok(()) => println!("✅ User '{}' email verified successfully!", email),
                    Err(err) => fail(format!("Failed to verify user: {}", err)),
                },
                Ok(None) => fail(format!("User '{}' not found", email)),
                Err(err) => fail(format!("Failed to find user: {}", err)),
            },
        },

        Commands::Sessions { command } => match command {
            SessionCommands::Cleanup => match auth_service.cleanup_expired_sessions().await {
                Ok(removed) => println!("✅ Removed {} expired session(s)", removed),
                Err(err) => fail(format!("Failed to clean up sessions: {}", err)),
            },
        },
    }

    Ok(())
}

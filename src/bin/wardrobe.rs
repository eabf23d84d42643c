use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use prettytable::{Cell, Row, Table};
use std::fs;
use std::path::Path;

use wardrobe_service::auth;
use wardrobe_service::config::StoragePaths;
use wardrobe_service::error::AppError;
use wardrobe_service::models::Category;
use wardrobe_service::outfit;
use wardrobe_service::storage::ItemStorage;
use wardrobe_service::uploads::ImageStore;
use wardrobe_service::user_models::{RegisterForm, UserIdentity};
use wardrobe_service::user_storage::UserStorage;

#[derive(Parser)]
#[command(name = "wardrobe")]
#[command(about = "Manage your wardrobe from the command line", long_about = None)]
struct Cli {
    #[command(flatten)]
    storage: StoragePaths,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Create a new user account")]
    Signup {
        #[arg(short, long, help = "Username")]
        username: String,

        #[arg(short, long, help = "Email address")]
        email: String,

        #[arg(short, long, help = "Password")]
        password: String,
    },

    #[command(about = "Log in to your account")]
    Login {
        #[arg(short, long, help = "Username")]
        username: String,

        #[arg(short, long, help = "Password")]
        password: String,
    },

    #[command(about = "Log out of your account")]
    Logout,

    #[command(about = "Show current user")]
    Whoami,

    #[command(about = "Add a clothing item from an image file")]
    Add {
        #[arg(short, long, help = "Path to the image")]
        image: String,

        #[arg(short, long, help = "Category: top, bottom, shoes (other values are stored but never worn)")]
        category: String,
    },

    #[command(about = "List your items")]
    List {
        #[arg(short, long, help = "Only show this category")]
        category: Option<String>,
    },

    #[command(about = "Remove one of your items")]
    Remove {
        #[arg(long, help = "Item ID")]
        id: String,
    },

    #[command(about = "Pick a random outfit")]
    Outfit,
}

/// Identity remembered between CLI invocations, stored next to the data files.
struct LocalSession;

impl LocalSession {
    fn save(path: &Path, identity: &UserIdentity) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(identity)?;
        fs::write(path, json)?;
        Ok(())
    }

    fn load(path: &Path) -> Option<UserIdentity> {
        let data = fs::read_to_string(path).ok()?;
        serde_json::from_str(&data).ok()
    }

    fn clear(path: &Path) -> Result<()> {
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

struct Wardrobe {
    paths: StoragePaths,
    users: UserStorage,
    items: ItemStorage,
    images: ImageStore,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run_command(cli.storage, cli.command).await {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_command(paths: StoragePaths, command: Commands) -> Result<()> {
    let ctx = Wardrobe {
        users: UserStorage::new(paths.users_file())?,
        items: ItemStorage::new(paths.items_file())?,
        images: ImageStore::new(&paths.upload_dir),
        paths,
    };

    match command {
        Commands::Signup { username, email, password } => {
            signup(&ctx, username, email, password).await?;
        }
        Commands::Login { username, password } => {
            login(&ctx, username, password).await?;
        }
        Commands::Logout => {
            LocalSession::clear(&ctx.paths.cli_session_file())?;
            println!("✅ Logged out successfully!");
        }
        Commands::Whoami => {
            whoami(&ctx);
        }
        Commands::Add { image, category } => {
            let session = require_login(&ctx).await?;
            add_item(&ctx, &session, image, category).await?;
        }
        Commands::List { category } => {
            let session = require_login(&ctx).await?;
            list_items(&ctx, &session, category).await;
        }
        Commands::Remove { id } => {
            let session = require_login(&ctx).await?;
            remove_item(&ctx, &session, id).await?;
        }
        Commands::Outfit => {
            let session = require_login(&ctx).await?;
            random_outfit(&ctx, &session).await?;
        }
    }

    Ok(())
}

async fn signup(ctx: &Wardrobe, username: String, email: String, password: String) -> Result<()> {
    let form = RegisterForm { username, email, password };
    let user = auth::register(&ctx.users, form, bcrypt::DEFAULT_COST)
        .await
        .map_err(into_anyhow)?;

    println!("✅ Account created successfully!");
    println!("👤 Username: {}", user.username);
    println!("🆔 User ID: {}", user.id);
    println!("\n💡 You can now log in using: wardrobe login -u {} -p <password>", user.username);

    Ok(())
}

async fn login(ctx: &Wardrobe, username: String, password: String) -> Result<()> {
    let identity = auth::authenticate(&ctx.users, &username, &password, bcrypt::DEFAULT_COST)
        .await
        .map_err(into_anyhow)?;

    LocalSession::save(&ctx.paths.cli_session_file(), &identity)?;

    println!("✅ Login successful!");
    println!("👤 Welcome back, {}!", identity.username);

    Ok(())
}

fn whoami(ctx: &Wardrobe) {
    if let Some(session) = LocalSession::load(&ctx.paths.cli_session_file()) {
        println!("👤 Logged in as: {}", session.username);
        println!("🆔 User ID: {}", session.user_id);
    } else {
        println!("❌ Not logged in");
        println!("💡 Use 'wardrobe login -u <username> -p <password>' to log in");
    }
}

async fn add_item(ctx: &Wardrobe, session: &UserIdentity, image: String, category: String) -> Result<()> {
    let path = Path::new(&image);
    if !path.is_file() {
        bail!("File not found: {}", image);
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    if file_name.is_empty() {
        bail!("No file selected.");
    }

    let bytes = fs::read(path).context("Failed to read image")?;
    let stored_name = ctx.images.save(file_name, &bytes)?;
    let item = ctx
        .items
        .create_item(session, &ctx.images, stored_name, category)
        .await?;

    println!("✅ Item added!");
    println!("🆔 Item ID: {}", item.id);
    println!("🏷️  Category: {}", item.category);
    if !Category::ALL.iter().any(|c| c.as_str() == item.category) {
        println!("⚠️  '{}' is not one of top, bottom, shoes; this item will never appear in an outfit", item.category);
    }

    Ok(())
}

async fn list_items(ctx: &Wardrobe, session: &UserIdentity, category: Option<String>) {
    let items = match &category {
        Some(category) => ctx.items.list_by_owner_and_category(session, category).await,
        None => ctx.items.list_by_owner(session).await,
    };

    if items.is_empty() {
        println!("📭 No items found.");
        println!("💡 Use 'wardrobe add -i <image> -c <category>' to add one");
        return;
    }

    println!("\n👕 Your items ({})\n", items.len());

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("ID"),
        Cell::new("Category"),
        Cell::new("Image"),
        Cell::new("Added"),
    ]));

    for item in items {
        table.add_row(Row::new(vec![
            Cell::new(&item.id),
            Cell::new(&item.category),
            Cell::new(&ctx.images.dir().join(&item.image_path).display().to_string()),
            Cell::new(&item.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
        ]));
    }

    table.printstd();
    println!();
}

async fn remove_item(ctx: &Wardrobe, session: &UserIdentity, id: String) -> Result<()> {
    // Unknown ids and other people's items look the same from here.
    match ctx.items.delete_item(session, &ctx.images, &id).await? {
        Some(item) => println!("✅ Removed {} item {}", item.category, item.id),
        None => println!("ℹ️  Nothing to remove for ID {}", id),
    }
    Ok(())
}

async fn random_outfit(ctx: &Wardrobe, session: &UserIdentity) -> Result<()> {
    match outfit::random_outfit(&ctx.items, session).await {
        Ok(outfit) => {
            println!("🎲 Today's outfit:\n");
            for item in [&outfit.top, &outfit.bottom, &outfit.shoes] {
                println!(
                    "   {:<7} {}",
                    item.category,
                    ctx.images.dir().join(&item.image_path).display()
                );
            }
            println!();
            Ok(())
        }
        Err(e @ AppError::InsufficientItems { .. }) => {
            println!("🤷 {}", e);
            Ok(())
        }
        Err(e) => Err(into_anyhow(e)),
    }
}

async fn require_login(ctx: &Wardrobe) -> Result<UserIdentity> {
    let session = LocalSession::load(&ctx.paths.cli_session_file())
        .ok_or_else(|| anyhow::anyhow!("You must be logged in. Use: wardrobe login -u <username> -p <password>"))?;

    // The data directory may have been swapped out since login.
    if ctx.users.get_user_by_id(&session.user_id).await.is_none() {
        LocalSession::clear(&ctx.paths.cli_session_file())?;
        bail!("Your session refers to an unknown account. Please log in again.");
    }

    Ok(session)
}

fn into_anyhow(err: AppError) -> anyhow::Error {
    match err {
        AppError::Internal(e) => e,
        other => anyhow::anyhow!(other.to_string()),
    }
}

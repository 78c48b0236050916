//! Folio command-line client.

mod cli;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use folio_application::{AUTH_REQUIRED, LoadOutcome, SessionManager};
use folio_domain::{
    Book, CatalogState, LoginCredentials, PasswordChange, ProfileUpdate, RegisterCredentials, User,
};
use folio_infrastructure::{FolioClient, load_config};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{BooksCommand, Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).context("loading configuration")?;
    tracing::debug!(base_url = %config.api_base_url, "configuration loaded");
    let folio = FolioClient::connect(&config).context("starting client")?;

    match cli.command {
        Command::Health => health(&folio).await,
        Command::Login { email, password } => {
            let user = folio
                .session()
                .login(&LoginCredentials::new(email, password))
                .await
                .map_err(|e| session_error(folio.session(), &e))?;
            println!("Signed in as {}", describe(&user));
            Ok(())
        }
        Command::Register {
            name,
            email,
            password,
            confirm_password,
            role,
        } => {
            let credentials = RegisterCredentials {
                name,
                email,
                password,
                confirm_password,
                role: role.map(Into::into),
            };
            let user = folio
                .session()
                .register(&credentials)
                .await
                .map_err(|e| session_error(folio.session(), &e))?;
            println!("Registered and signed in as {}", describe(&user));
            Ok(())
        }
        Command::Logout => {
            folio.session().logout();
            println!("Signed out");
            Ok(())
        }
        Command::Whoami => whoami(&folio).await,
        Command::UpdateProfile { name, email } => {
            let user = folio
                .session()
                .update_profile(&ProfileUpdate { name, email })
                .await
                .map_err(|e| session_error(folio.session(), &e))?;
            println!("Profile updated: {}", describe(&user));
            Ok(())
        }
        Command::ChangePassword {
            current_password,
            new_password,
        } => {
            let change = PasswordChange {
                current_password,
                new_password,
            };
            folio
                .session()
                .change_password(&change)
                .await
                .map_err(|e| session_error(folio.session(), &e))?;
            println!("Password changed");
            Ok(())
        }
        Command::Books(command) => books(&folio, command).await,
    }
}

async fn health(folio: &FolioClient) -> Result<()> {
    let status = folio
        .health()
        .await
        .map_err(|e| anyhow!(e.user_message("Health check failed")))?;
    println!("status: {}  database: {}", status.status, status.database);
    if !status.is_healthy() {
        bail!("backend is not healthy");
    }
    Ok(())
}

async fn whoami(folio: &FolioClient) -> Result<()> {
    if !folio.session().snapshot().is_authenticated {
        println!("Not signed in");
        return Ok(());
    }
    let user = folio
        .session()
        .refresh_profile()
        .await
        .map_err(|e| session_error(folio.session(), &e))?;
    println!("{}", describe(&user));
    Ok(())
}

async fn books(folio: &FolioClient, command: BooksCommand) -> Result<()> {
    let catalog = folio.catalog();
    match command {
        BooksCommand::List(args) => {
            catalog.set_filters(&args.to_patch());
            match catalog.mount().await {
                Some(LoadOutcome::Applied) => {
                    print_page(&catalog.snapshot());
                    Ok(())
                }
                None | Some(LoadOutcome::Unauthenticated) => bail!(AUTH_REQUIRED),
                Some(_) => Err(catalog_error(&catalog.snapshot(), "Failed to load books")),
            }
        }
        BooksCommand::Show { id } => {
            let book = catalog
                .fetch(&id)
                .await
                .map_err(|e| anyhow!(e.user_message("Failed to load book")))?;
            print_book(&book);
            if let Some(description) = &book.description {
                println!("\n{description}");
            }
            Ok(())
        }
        BooksCommand::Add(args) => {
            require_catalog_manager(folio.session())?;
            catalog.mount().await;
            if !catalog.create(&args.into_draft()).await {
                return Err(catalog_error(&catalog.snapshot(), "Failed to create book"));
            }
            println!("Book created");
            print_page(&catalog.snapshot());
            Ok(())
        }
        BooksCommand::Edit { id, fields } => {
            require_catalog_manager(folio.session())?;
            catalog.mount().await;
            if !catalog.update(&id, &fields.into_patch()).await {
                return Err(catalog_error(&catalog.snapshot(), "Failed to update book"));
            }
            println!("Book {id} updated");
            Ok(())
        }
        BooksCommand::Delete { id } => {
            require_catalog_manager(folio.session())?;
            catalog.mount().await;
            if !catalog.delete(&id).await {
                return Err(catalog_error(&catalog.snapshot(), "Failed to delete book"));
            }
            println!("Book {id} deleted");
            Ok(())
        }
    }
}

/// Catalog changes need a signed-in merchant or admin.
fn require_catalog_manager(session: &SessionManager) -> Result<()> {
    let state = session.snapshot();
    if !state.is_authenticated {
        bail!(AUTH_REQUIRED);
    }
    match state.user {
        Some(user) if user.can_manage_catalog() => Ok(()),
        Some(user) => bail!("the {} role cannot change the catalog", user.role),
        None => bail!(AUTH_REQUIRED),
    }
}

fn session_error(session: &SessionManager, error: &folio_application::ApiError) -> anyhow::Error {
    let message = session
        .snapshot()
        .error
        .unwrap_or_else(|| error.to_string());
    anyhow!(message)
}

fn catalog_error(state: &CatalogState, fallback: &str) -> anyhow::Error {
    anyhow!(state.error.clone().unwrap_or_else(|| fallback.to_string()))
}

fn describe(user: &User) -> String {
    format!("{} <{}> ({})", user.name, user.email, user.role)
}

fn print_book(book: &Book) {
    let availability = if book.available { "available" } else { "unavailable" };
    let price = book
        .price
        .map_or_else(String::new, |price| format!("  ${price:.2}"));
    println!(
        "{}  {} by {} ({})  [{availability}]{price}",
        book.id, book.title, book.author, book.published_year
    );
}

fn print_page(state: &CatalogState) {
    if state.items.is_empty() {
        println!("No books found");
    }
    for book in &state.items {
        print_book(book);
    }
    let pagination = &state.pagination;
    println!(
        "page {} of {}  ({} books)",
        pagination.page,
        pagination.pages.max(1),
        pagination.total
    );
}

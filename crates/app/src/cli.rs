//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use folio_domain::{BookDraft, BookPatch, FiltersPatch, SortField, SortOrder, UserRole};

/// Folio bookstore client.
#[derive(Debug, Parser)]
#[command(name = "folio", version, about)]
pub struct Cli {
    /// Config file (TOML). Defaults to the platform config dir.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check backend and database status.
    Health,

    /// Sign in and store the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Create an account and sign in.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
        #[arg(long, value_enum)]
        role: Option<RoleArg>,
    },

    /// Forget the stored session.
    Logout,

    /// Show the signed-in user.
    Whoami,

    /// Change the signed-in user's name and email.
    UpdateProfile {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },

    /// Change the signed-in user's password.
    ChangePassword {
        #[arg(long)]
        current_password: String,
        #[arg(long)]
        new_password: String,
    },

    /// Browse and manage the catalog.
    #[command(subcommand)]
    Books(BooksCommand),
}

#[derive(Debug, Subcommand)]
pub enum BooksCommand {
    /// List one page of books.
    List(ListArgs),

    /// Show a single book.
    Show { id: String },

    /// Add a book.
    Add(AddArgs),

    /// Change fields of a book.
    Edit {
        id: String,
        #[command(flatten)]
        fields: EditArgs,
    },

    /// Delete a book.
    Delete { id: String },
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub limit: Option<u32>,
    #[arg(long)]
    pub search: Option<String>,
    /// createdAt, title, author, publishedYear or price.
    #[arg(long)]
    pub sort_by: Option<SortField>,
    /// asc or desc.
    #[arg(long)]
    pub sort_order: Option<SortOrder>,
    #[arg(long)]
    pub available: Option<bool>,
}

impl ListArgs {
    pub fn to_patch(&self) -> FiltersPatch {
        FiltersPatch {
            page: self.page,
            limit: self.limit,
            search: self.search.clone(),
            sort_by: self.sort_by,
            sort_order: self.sort_order,
            available: self.available.map(Some),
        }
    }
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub author: String,
    #[arg(long)]
    pub isbn: String,
    #[arg(long)]
    pub year: i32,
    #[arg(long)]
    pub genre: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub price: Option<f64>,
    #[arg(long)]
    pub stock: Option<u32>,
}

impl AddArgs {
    pub fn into_draft(self) -> BookDraft {
        BookDraft {
            genre: self.genre,
            description: self.description,
            price: self.price,
            stock: self.stock,
            ..BookDraft::new(self.title, self.author, self.isbn, self.year)
        }
    }
}

#[derive(Debug, Args)]
pub struct EditArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub author: Option<String>,
    #[arg(long)]
    pub isbn: Option<String>,
    #[arg(long)]
    pub year: Option<i32>,
    #[arg(long)]
    pub available: Option<bool>,
    #[arg(long)]
    pub genre: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub price: Option<f64>,
    #[arg(long)]
    pub stock: Option<u32>,
}

impl EditArgs {
    pub fn into_patch(self) -> BookPatch {
        BookPatch {
            title: self.title,
            author: self.author,
            isbn: self.isbn,
            published_year: self.year,
            available: self.available,
            genre: self.genre,
            description: self.description,
            price: self.price,
            stock: self.stock,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoleArg {
    Client,
    Merchant,
    Admin,
}

impl From<RoleArg> for UserRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Client => Self::Client,
            RoleArg::Merchant => Self::Merchant,
            RoleArg::Admin => Self::Admin,
        }
    }
}

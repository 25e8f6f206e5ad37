//! Merch CLI - database migrations and catalog management.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! merch-cli migrate
//!
//! # Manage the catalog
//! merch-cli catalog add-category --name "T-Shirts" --slug t-shirts
//! merch-cli catalog add-product --category t-shirts --name "Logo Tee" --price 799 --stock 40
//! merch-cli catalog list --category t-shirts
//! merch-cli catalog set-active --id 3 --active false
//! merch-cli catalog remove-category --slug t-shirts
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "merch-cli")]
#[command(author, version, about = "Merch CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations (schema and session table)
    Migrate,
    /// Manage categories and products
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Create a category
    AddCategory {
        /// Display name
        #[arg(long)]
        name: String,

        /// URL slug (letters, digits, `-`, `_`)
        #[arg(long)]
        slug: String,
    },
    /// Create a product in an existing category
    AddProduct {
        /// Slug of the category
        #[arg(long)]
        category: String,

        #[arg(long)]
        name: String,

        /// Price in rupees
        #[arg(long)]
        price: f64,

        #[arg(long, default_value_t = 0)]
        stock: u32,

        #[arg(long, default_value = "")]
        description: String,

        /// Image path under the media root
        #[arg(long)]
        image: Option<String>,

        /// Create the product hidden
        #[arg(long)]
        inactive: bool,
    },
    /// List products, newest first
    List {
        /// Only this category
        #[arg(long)]
        category: Option<String>,

        /// Include inactive products
        #[arg(long)]
        all: bool,
    },
    /// Show or hide a product
    SetActive {
        /// Product ID
        #[arg(long)]
        id: i64,

        #[arg(long, action = clap::ArgAction::Set)]
        active: bool,
    },
    /// Delete a category and all of its products
    RemoveCategory {
        #[arg(long)]
        slug: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Catalog { action } => {
            let pool = commands::connect().await?;
            match action {
                CatalogAction::AddCategory { name, slug } => {
                    commands::catalog::add_category(&pool, &name, &slug).await?;
                }
                CatalogAction::AddProduct {
                    category,
                    name,
                    price,
                    stock,
                    description,
                    image,
                    inactive,
                } => {
                    let product = commands::catalog::ProductArgs {
                        category,
                        name,
                        price,
                        stock,
                        description,
                        image,
                        is_active: !inactive,
                    };
                    commands::catalog::add_product(&pool, &product).await?;
                }
                CatalogAction::List { category, all } => {
                    commands::catalog::list(&pool, category.as_deref(), !all).await?;
                }
                CatalogAction::SetActive { id, active } => {
                    commands::catalog::set_active(&pool, id, active).await?;
                }
                CatalogAction::RemoveCategory { slug } => {
                    commands::catalog::remove_category(&pool, &slug).await?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_product() {
        let cli = Cli::try_parse_from([
            "merch-cli",
            "catalog",
            "add-product",
            "--category",
            "mugs",
            "--name",
            "Logo Mug",
            "--price",
            "349.5",
            "--inactive",
        ]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Catalog {
                action: CatalogAction::AddProduct {
                    stock: 0,
                    inactive: true,
                    ..
                }
            })
        ));
    }

    #[test]
    fn test_parse_set_active_requires_value() {
        assert!(
            Cli::try_parse_from(["merch-cli", "catalog", "set-active", "--id", "3"]).is_err()
        );
        assert!(
            Cli::try_parse_from([
                "merch-cli",
                "catalog",
                "set-active",
                "--id",
                "3",
                "--active",
                "false"
            ])
            .is_ok()
        );
    }
}

//! Catalog management commands.
//!
//! The storefront pages do not edit the catalog; categories and products
//! are maintained from here.

use sqlx::PgPool;

use merch_core::{Price, ProductId, Slug};
use merch_storefront::db::{CatalogRepository, RepositoryError};
use merch_storefront::models::NewProduct;

use super::CliError;

/// Arguments for `catalog add-product`.
#[derive(Debug, Clone)]
pub struct ProductArgs {
    pub category: String,
    pub name: String,
    pub price: f64,
    pub stock: u32,
    pub description: String,
    pub image: Option<String>,
    pub is_active: bool,
}

/// Create a category.
pub async fn add_category(pool: &PgPool, name: &str, slug: &str) -> Result<(), CliError> {
    let slug = Slug::parse(slug)?;
    let category = CatalogRepository::new(pool)
        .create_category(name.trim(), &slug)
        .await?;

    tracing::info!(
        "Category created! ID: {}, Name: {}, Slug: {}",
        category.id,
        category.name,
        category.slug
    );
    Ok(())
}

/// Create a product in the category with the given slug.
pub async fn add_product(pool: &PgPool, args: &ProductArgs) -> Result<(), CliError> {
    let repo = CatalogRepository::new(pool);
    let slug = Slug::parse(&args.category)?;
    let category = repo
        .get_category(&slug)
        .await?
        .ok_or_else(|| CliError::CategoryNotFound(args.category.clone()))?;

    let product = repo
        .create_product(&NewProduct {
            category_id: category.id,
            name: args.name.trim().to_owned(),
            description: args.description.clone(),
            image: args.image.clone(),
            price: Price::new(args.price)?,
            stock: args.stock,
            is_active: args.is_active,
        })
        .await?;

    tracing::info!(
        "Product created! ID: {}, Name: {}, Price: {}, Category: {}",
        product.id,
        product.name,
        product.price,
        category.slug
    );
    Ok(())
}

/// Print products, optionally limited to one category.
pub async fn list(
    pool: &PgPool,
    category: Option<&str>,
    active_only: bool,
) -> Result<(), CliError> {
    let category = category.map(Slug::parse).transpose()?;
    let repo = CatalogRepository::new(pool);

    if let Some(slug) = &category {
        if repo.get_category(slug).await?.is_none() {
            return Err(CliError::CategoryNotFound(slug.to_string()));
        }
    }

    let categories = repo.list_categories().await?;
    let products = repo.list_products(category.as_ref(), active_only).await?;

    #[allow(clippy::print_stdout)]
    {
        for product in &products {
            let category = categories
                .iter()
                .find(|c| c.id == product.category_id)
                .map_or("?", |c| c.slug.as_str());
            println!(
                "{:>6}  {:<40}  {:>12}  stock {:>5}  {:<20}{}",
                product.id,
                product.name,
                product.price,
                product.stock,
                category,
                if product.is_active { "" } else { "  (inactive)" }
            );
        }
        println!("{} product(s)", products.len());
    }
    Ok(())
}

/// Show or hide a product.
pub async fn set_active(pool: &PgPool, id: i64, is_active: bool) -> Result<(), CliError> {
    CatalogRepository::new(pool)
        .set_product_active(ProductId::new(id), is_active)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => CliError::ProductNotFound(id),
            other => other.into(),
        })?;

    let state = if is_active { "active" } else { "inactive" };
    tracing::info!("Product {} is now {}", id, state);
    Ok(())
}

/// Delete a category together with its products.
pub async fn remove_category(pool: &PgPool, slug: &str) -> Result<(), CliError> {
    let slug = Slug::parse(slug)?;
    CatalogRepository::new(pool)
        .delete_category(&slug)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => CliError::CategoryNotFound(slug.to_string()),
            other => other.into(),
        })?;

    tracing::info!("Category {} and its products removed", slug);
    Ok(())
}

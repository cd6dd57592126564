//! Product commands.

use clap::Subcommand;
use rust_decimal::Decimal;
use salesdesk_client::DefaultAppState;
use salesdesk_core::{Capability, NewProduct, ProductFilter, ProductId, ProductUpdate};

use super::{CliError, PageArgs, require};
use crate::output;

#[derive(Debug, Subcommand)]
pub enum ProductAction {
    /// List products
    List {
        /// Name contains
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        min_price: Option<Decimal>,
        #[arg(long)]
        max_price: Option<Decimal>,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Show one product
    Get { id: ProductId },
    /// Add a product
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        price: Decimal,
        #[arg(long, default_value_t = 0)]
        stock: i64,
    },
    /// Change a product; only fields that differ are sent
    Update {
        id: ProductId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        price: Option<Decimal>,
        #[arg(long)]
        stock: Option<i64>,
    },
    /// Delete a product
    Delete { id: ProductId },
}

pub async fn run(state: &DefaultAppState, action: ProductAction) -> Result<(), CliError> {
    let products = state.products();
    match action {
        ProductAction::List {
            name,
            min_price,
            max_price,
            page,
        } => {
            require(state, Capability::ViewProducts).await?;
            let filter = ProductFilter {
                name,
                min_price,
                max_price,
            };
            let result = products.list(&filter, &page.into()).await?;
            output::page(&result, "No products found", output::product_row)?;
        }
        ProductAction::Get { id } => {
            require(state, Capability::ViewProducts).await?;
            let product = products.get(id).await?;
            output::line(output::product_row(&product))?;
            if let Some(description) = &product.description {
                output::line(format!("        {description}"))?;
            }
        }
        ProductAction::Create {
            name,
            description,
            price,
            stock,
        } => {
            require(state, Capability::CreateProducts).await?;
            let product = products
                .create(&NewProduct {
                    name,
                    description,
                    price,
                    stock,
                })
                .await?;
            output::line(format!("Created product {}", product.id))?;
        }
        ProductAction::Update {
            id,
            name,
            description,
            price,
            stock,
        } => {
            require(state, Capability::EditProducts).await?;
            let current = products.get(id).await?;
            let update = ProductUpdate {
                name,
                description,
                price,
                stock,
            };
            let updated = products.update(&current, &update).await?;
            if updated == current {
                output::line("Nothing to change")?;
            } else {
                output::line(output::product_row(&updated))?;
            }
        }
        ProductAction::Delete { id } => {
            require(state, Capability::DeleteProducts).await?;
            products.delete(id).await?;
            output::line(format!("Deleted product {id}"))?;
        }
    }
    Ok(())
}

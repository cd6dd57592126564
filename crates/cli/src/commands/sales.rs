//! Sale commands.

use chrono::{DateTime, NaiveDate, Utc};
use clap::Subcommand;
use salesdesk_client::DefaultAppState;
use salesdesk_core::{Capability, NewSale, ProductId, SaleFilter, SaleId, SaleUpdate, UserId};

use super::{CliError, PageArgs, require};
use crate::output;

#[derive(Debug, Subcommand)]
pub enum SaleAction {
    /// List sales
    List {
        #[arg(long)]
        user_id: Option<UserId>,
        #[arg(long)]
        product_id: Option<ProductId>,
        #[arg(long)]
        min_qty: Option<i64>,
        #[arg(long)]
        max_qty: Option<i64>,
        /// Earliest sale date (YYYY-MM-DD)
        #[arg(long)]
        min_date: Option<NaiveDate>,
        /// Latest sale date (YYYY-MM-DD)
        #[arg(long)]
        max_date: Option<NaiveDate>,
        /// Only today's sales (overrides the date range)
        #[arg(long)]
        today: bool,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Show one sale with the choices available for editing it
    Get { id: SaleId },
    /// Record a sale
    Create {
        #[arg(long)]
        product_id: ProductId,
        #[arg(long)]
        quantity: i64,
        /// Seller, when recording on someone else's behalf
        #[arg(long)]
        user_id: Option<UserId>,
        /// RFC 3339 timestamp; defaults to now on the server
        #[arg(long)]
        sale_date: Option<DateTime<Utc>>,
    },
    /// Change a sale; only fields that differ are sent
    Update {
        id: SaleId,
        #[arg(long)]
        user_id: Option<UserId>,
        #[arg(long)]
        product_id: Option<ProductId>,
        #[arg(long)]
        quantity: Option<i64>,
        #[arg(long)]
        sale_date: Option<DateTime<Utc>>,
    },
    /// Delete a sale
    Delete { id: SaleId },
    /// List the users and products a sale can reference
    Options,
}

pub async fn run(state: &DefaultAppState, action: SaleAction) -> Result<(), CliError> {
    let sales = state.sales();
    match action {
        SaleAction::List {
            user_id,
            product_id,
            min_qty,
            max_qty,
            min_date,
            max_date,
            today,
            page,
        } => {
            require(state, Capability::ViewSales).await?;
            let mut filter = SaleFilter {
                user_id,
                product_id,
                min_qty,
                max_qty,
                min_date,
                max_date,
            };
            if today {
                let day = SaleFilter::on_day(Utc::now());
                filter.min_date = day.min_date;
                filter.max_date = day.max_date;
            }
            if let (Some(min), Some(max)) = (filter.min_qty, filter.max_qty)
                && min > max
            {
                return Err(CliError::InvalidArgument(format!(
                    "--min-qty ({min}) is greater than --max-qty ({max})"
                )));
            }
            let result = sales.list(&filter, &page.into()).await?;
            output::page(&result, "No sales found", output::sale_row)?;
        }
        SaleAction::Get { id } => {
            require(state, Capability::ViewSales).await?;
            let context = sales.edit_context(id).await?;
            output::line(output::sale_row(&context.sale))?;
            output::line(format!(
                "{} users and {} products available for editing",
                context.options.users.len(),
                context.options.products.len()
            ))?;
        }
        SaleAction::Create {
            product_id,
            quantity,
            user_id,
            sale_date,
        } => {
            require(state, Capability::CreateSales).await?;
            let sale = sales
                .create(&NewSale {
                    product_id,
                    quantity,
                    user_id,
                    sale_date,
                })
                .await?;
            output::line(format!(
                "Recorded sale {} (total {})",
                sale.id, sale.total_price
            ))?;
        }
        SaleAction::Update {
            id,
            user_id,
            product_id,
            quantity,
            sale_date,
        } => {
            require(state, Capability::EditSales).await?;
            let current = sales.get(id).await?;
            let update = SaleUpdate {
                user_id,
                product_id,
                quantity,
                sale_date,
            };
            let updated = sales.update(&current, &update).await?;
            if updated == current {
                output::line("Nothing to change")?;
            } else {
                output::line(output::sale_row(&updated))?;
            }
        }
        SaleAction::Delete { id } => {
            require(state, Capability::DeleteSales).await?;
            sales.delete(id).await?;
            output::line(format!("Deleted sale {id}"))?;
        }
        SaleAction::Options => {
            require(state, Capability::CreateSales).await?;
            let options = sales.form_options().await;
            output::line("Users:")?;
            for user in &options.users {
                output::line(output::user_row(user))?;
            }
            output::line("Products:")?;
            for product in &options.products {
                output::line(output::product_row(product))?;
            }
        }
    }
    Ok(())
}

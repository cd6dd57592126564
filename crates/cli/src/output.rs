//! Plain-text rendering to stdout. Logs go to stderr.

use std::io::{self, Write};

use salesdesk_core::{ChatReply, Metadata, Page, Product, Sale, User};

/// Write one line to stdout.
pub fn line(text: impl AsRef<str>) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{}", text.as_ref())
}

#[must_use]
pub fn product_row(product: &Product) -> String {
    format!(
        "{:>6}  {:<32}  {:>10}  {:>6}",
        product.id,
        truncate(&product.name, 32),
        product.price,
        product.stock
    )
}

#[must_use]
pub fn sale_row(sale: &Sale) -> String {
    format!(
        "{:>6}  {}  user {:>5}  product {:>5}  qty {:>4}  total {:>10}",
        sale.id,
        sale.sale_date.format("%Y-%m-%d %H:%M"),
        sale.user_id,
        sale.product_id,
        sale.quantity,
        sale.total_price
    )
}

#[must_use]
pub fn user_row(user: &User) -> String {
    format!(
        "{:>6}  {:<24}  {:<32}  {:<8}  {}",
        user.id,
        truncate(&user.full_name(), 24),
        truncate(&user.email, 32),
        user.role,
        if user.is_active { "active" } else { "inactive" }
    )
}

/// "Page 2 of 5 (83 records)", degrading when the server omitted counts.
#[must_use]
pub fn page_footer(metadata: &Metadata) -> String {
    let mut footer = match (metadata.current_page(), metadata.total_pages()) {
        (Some(current), Some(total)) => format!("Page {current} of {total}"),
        (Some(current), None) => format!("Page {current}"),
        _ => String::new(),
    };
    if let Some(records) = metadata.total_records() {
        if footer.is_empty() {
            footer = format!("{records} records");
        } else {
            footer.push_str(&format!(" ({records} records)"));
        }
    }

    if let Some(current) = metadata.current_page() {
        let mut hints = Vec::new();
        if metadata.has_previous() {
            hints.push(format!("--page {} for previous", current - 1));
        }
        if metadata.has_next() {
            hints.push(format!("--page {} for next", current + 1));
        }
        if !hints.is_empty() {
            footer.push_str("; ");
            footer.push_str(&hints.join(", "));
        }
    }
    footer
}

/// Print a page of rows followed by the footer.
pub fn page<T>(page: &Page<T>, empty: &str, row: impl Fn(&T) -> String) -> io::Result<()> {
    if page.is_empty() {
        line(empty)?;
    }
    for item in &page.items {
        line(row(item))?;
    }
    let footer = page_footer(&page.metadata);
    if !footer.is_empty() {
        line(footer)?;
    }
    Ok(())
}

pub fn chat_reply(reply: &ChatReply) -> io::Result<()> {
    line(&reply.response)?;
    if let Some(data) = &reply.data {
        line(serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string()))?;
    }
    Ok(())
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_owned()
    } else {
        let kept: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

//! Create a random 1secmail address and wait up to two minutes for a message.
//!
//! Run with `RUST_LOG=onesecmail_client=debug` to see every request.

use onesecmail_client::{Client, WaitOptions};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = Client::new()?;
    println!("Available domains: {:?}", client.get_domains().await?);

    let mailbox = client.get_mailbox(None, None).await?;
    println!("Send an email to: {mailbox}");

    let mail = client
        .wait_mail_until(
            &mailbox,
            |_| true,
            WaitOptions::new().delay(Duration::from_secs(5)),
            tokio::time::sleep(Duration::from_secs(120)),
        )
        .await?;

    println!("From: {}", mail.from);
    println!("Subject: {}", mail.subject);
    println!("Date: {}", mail.date);
    println!("{}", mail.text_body);

    for attachment in &mail.attachments {
        let bytes = attachment.fetch_content(&client).await?;
        println!(
            "Attachment {} ({}): {} bytes",
            attachment.filename,
            attachment.content_type,
            bytes.len()
        );
    }

    Ok(())
}

//! Basic usage example for objstore
//!
//! Reads credentials from `OBJSTORE_*` environment variables (or `.env`).
//!
//! Run with:
//! ```
//! RUST_LOG=objstore=debug cargo run --example basic_usage
//! ```

use objstore::api::{
    ListContentsOptions, ObjectOptions, SignedUrlOptions, SignedUrlRequest, UploadOptions,
    Visibility,
};
use objstore::StorageClient;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let client = StorageClient::from_env()?;

    println!("objstore - Basic Usage Example");
    println!("==============================\n");

    // Example 1: Upload from memory
    println!("1. Uploading object...");
    let response = client
        .files()
        .upload(
            "Hello, objstore!",
            &UploadOptions::new("test/example.txt")
                .with_content_type("text/plain")
                .with_visibility(Visibility::Private),
        )
        .await?;
    println!("   {} {}\n", response.status(), response.text());

    // Example 2: List contents
    println!("2. Listing objects with prefix 'test/'...");
    let listing = client
        .bucket()
        .list_contents(&ListContentsOptions::new().with_prefix("test/").with_limit(10))
        .await?;
    println!("   {}\n", listing.text());

    // Example 3: Pre-signed upload URL, no request made
    println!("3. Generating a pre-signed upload URL...");
    let url = client.presign_url(
        &SignedUrlRequest::upload("test/from-browser.txt", Visibility::Public),
        None,
    )?;
    println!("   {}\n", url);

    // Example 4: Download link, answered by the server
    println!("4. Requesting a download link...");
    let download = client
        .generate_signed_url_for(
            "download",
            &SignedUrlOptions::new()
                .with_key("test/example.txt")
                .with_expires_in(600),
        )
        .await?;
    if let Some(response) = download.response() {
        println!("   {}\n", response.text());
    }

    // Example 5: Purge cached copies, then delete
    println!("5. Purging and deleting...");
    let options = ObjectOptions::new("test/example.txt");
    client.files().purge(&options).await?;
    client.files().delete(&options).await?;
    println!("   Done\n");

    // Example 6: Error handling
    println!("6. Deleting a missing object...");
    match client.files().delete(&ObjectOptions::new("test/missing.txt")).await {
        Ok(_) => println!("   Unexpectedly succeeded"),
        Err(e) => println!("   Error: {} (status {:?})", e, e.status()),
    }

    println!("\nAll examples completed!");
    Ok(())
}

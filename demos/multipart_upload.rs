//! Multipart upload of a local file
//!
//! Run with:
//! ```
//! cargo run --example multipart_upload -- ./big.iso isos/big.iso
//! ```

use anyhow::Context;
use objstore::api::{
    CancelMultipartOptions, CompleteMultipartOptions, StartMultipartOptions,
    StartMultipartUploadResponse, UploadPartOptions, UploadPartResponse,
};
use objstore::StorageClient;
use tracing_subscriber::EnvFilter;

const PART_SIZE: usize = 8 * 1024 * 1024;

/// Number of parts for `len` bytes; a multipart upload needs at least one
fn part_count(len: usize) -> anyhow::Result<u32> {
    anyhow::ensure!(len > 0, "refusing to upload an empty file in parts");
    Ok(len.div_ceil(PART_SIZE) as u32)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let source = args.next().context("usage: multipart_upload <file> <key>")?;
    let key = args.next().context("usage: multipart_upload <file> <key>")?;

    let client = StorageClient::from_env()?;
    let data = tokio::fs::read(&source)
        .await
        .with_context(|| format!("Failed to read {}", source))?;
    let total_parts = part_count(data.len())?;
    let chunks: Vec<&[u8]> = data.chunks(PART_SIZE).collect();

    println!("Uploading {} ({} bytes) in {} parts", source, data.len(), total_parts);

    let started: StartMultipartUploadResponse = client
        .files()
        .start_multipart_upload(&StartMultipartOptions::new(&key, total_parts))
        .await?
        .json()?;
    println!("Upload ID: {}", started.upload_id);

    let mut parts = Vec::with_capacity(chunks.len());
    for (index, chunk) in chunks.iter().enumerate() {
        let part_number = index as u32 + 1;
        let options = UploadPartOptions::new(&started.upload_id, part_number, &key, total_parts);

        let result = client.files().upload_part(chunk.to_vec(), &options).await;
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                eprintln!("Part {} failed: {}, cancelling", part_number, e);
                client
                    .files()
                    .cancel_multipart_upload(&CancelMultipartOptions::new(&started.upload_id, &key))
                    .await?;
                return Err(e.into());
            }
        };

        let part = response.json::<UploadPartResponse>()?.into_part(part_number);
        println!("  part {}/{} -> {}", part_number, total_parts, part.etag);
        parts.push(part);
    }

    let response = client
        .files()
        .complete_multipart_upload(&CompleteMultipartOptions::new(&started.upload_id, &key, parts))
        .await?;
    println!("Completed: {}", response.text());

    Ok(())
}

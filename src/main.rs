/*
 * Responsibility
 * - tokio runtime entry
 * - app::run() call (no logic lives here)
 */
use anyhow::Result;

use casting_agency_api::app;

#[tokio::main]
async fn main() -> Result<()> {
    app::run().await
}

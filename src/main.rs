use dotenvy::dotenv;
use serde_json::json;
use sheet_portal::{
    config::{database::get_database_url, portal::load_default_config},
    core::schema::ensure_schema,
    errors::Result,
    ipc::{self, AppState},
    sheet::Workbook,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing; stdout carries responses, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load portal settings
    let config = load_default_config()
        .inspect_err(|e| error!("Failed to load portal configuration: {}", e))?;

    // 4. Open the workbook and make sure the main tabs are in shape
    let workbook = Workbook::open(&config.workbook, &get_database_url())
        .await
        .inspect_err(|e| error!("Failed to open workbook: {}", e))?;
    for (title, status) in ensure_schema(&workbook, &config).await? {
        info!("Sheet '{}': {:?}", title, status);
    }

    // 5. Serve requests, one JSON object per line
    let mut state = AppState::new(workbook, config);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    info!("Ready for requests");

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let resp = match serde_json::from_str::<ipc::Request>(&line) {
            Ok(req) => ipc::handle_request(&mut state, req).await,
            Err(e) => {
                // No id to reply to
                warn!("Unreadable request line: {}", e);
                json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() },
                })
            }
        };

        let mut out = serde_json::to_string(&resp)?;
        out.push('\n');
        stdout.write_all(out.as_bytes()).await?;
        stdout.flush().await?;
    }

    info!("Input closed, shutting down");
    Ok(())
}

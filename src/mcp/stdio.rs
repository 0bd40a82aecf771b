//! Newline-delimited JSON-RPC over stdin/stdout.
//!
//! Messages are handled strictly one at a time: the next line is not read
//! until the previous response has been written and flushed. Lines are read
//! as raw bytes, so invalid UTF-8 is just another parse error.

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use super::server::{PARSE_ERROR, handle_message, json_rpc_error};
use crate::state::AppState;

pub async fn serve_stdio(state: AppState) -> std::io::Result<()> {
    serve(&state, tokio::io::stdin(), tokio::io::stdout()).await
}

/// Run the request loop until `reader` reaches EOF.
pub async fn serve<R, W>(state: &AppState, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    tracing::info!("MCP server listening on stdio");

    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = buf.trim_ascii();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_slice::<Value>(line) {
            Ok(message) => handle_message(state, &message).await,
            Err(e) => {
                tracing::warn!("MCP: unparseable message: {}", e);
                Some(json_rpc_error(Value::Null, PARSE_ERROR, &format!("Parse error: {e}")))
            }
        };

        if let Some(response) = response {
            let mut bytes = serde_json::to_vec(&response)?;
            bytes.push(b'\n');
            writer.write_all(&bytes).await?;
            writer.flush().await?;
        }
    }

    tracing::info!("stdin closed, MCP server stopping");
    Ok(())
}

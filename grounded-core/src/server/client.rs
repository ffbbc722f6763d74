use super::transport::{self, Result, TransportError};
use super::types::{Request, Response};
use tokio::io::BufReader;
use tokio::net::UnixStream;

/// Sends one request to a running server and waits for its response.
pub async fn send_request(socket_path: &str, request: &Request) -> Result<Response> {
    let stream = UnixStream::connect(socket_path).await?;
    let (reader, mut writer) = stream.into_split();

    transport::write_line(&mut writer, request).await?;

    let mut reader = BufReader::new(reader);
    let line = transport::read_line(&mut reader)
        .await?
        .ok_or(TransportError::Closed)?;
    Ok(serde_json::from_str(line.trim())?)
}

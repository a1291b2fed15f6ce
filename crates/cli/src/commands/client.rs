use std::os::unix::net::UnixStream;
use std::path::Path;

use anyhow::{Context, Result};
use explite_protocol::codec::{read_message, write_message};
use explite_protocol::{DaemonReply, DaemonRequest};
use log::debug;

/// One request/response round trip over a fresh connection.
pub fn send(socket_path: &Path, request: &DaemonRequest) -> Result<DaemonReply> {
    let mut stream = UnixStream::connect(socket_path).with_context(|| {
        format!(
            "failed to connect to explite daemon at {}",
            socket_path.display()
        )
    })?;

    debug!("sending {request:?}");
    write_message(&mut stream, request)?;
    read_message(&mut stream).context("failed to read daemon reply")
}

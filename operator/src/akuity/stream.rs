use super::{ManifestStream, RemoteError};

/// Drains both channels of a manifest download into one text.
///
/// The first server error wins and the partial text is dropped. Text is
/// returned only once both channels are closed.
pub async fn collect_manifests(stream: ManifestStream) -> Result<String, RemoteError> {
    let ManifestStream {
        mut data,
        mut errors,
    } = stream;
    let mut buf: Vec<u8> = Vec::new();
    let mut data_open = true;
    let mut errors_open = true;

    while data_open || errors_open {
        tokio::select! {
            chunk = data.recv(), if data_open => match chunk {
                Some(chunk) => buf.extend_from_slice(&chunk),
                None => data_open = false,
            },
            err = errors.recv(), if errors_open => match err {
                Some(err) => return Err(err),
                None => errors_open = false,
            },
        }
    }

    String::from_utf8(buf)
        .map_err(|e| RemoteError::Transport(format!("cluster manifests are not UTF-8: {e}")))
}

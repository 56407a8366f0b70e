use archviz_types::RemoteError;

pub(crate) fn transport_error(e: reqwest::Error) -> RemoteError {
    if e.is_timeout() {
        RemoteError::Timeout(e.to_string())
    } else {
        RemoteError::Transport(e.to_string())
    }
}

/// Read the body and turn a non-2xx status into `RemoteError::Status`.
pub(crate) async fn success_text(res: reqwest::Response) -> Result<String, RemoteError> {
    let status = res.status();
    let body = res.text().await.map_err(transport_error)?;
    if !status.is_success() {
        return Err(RemoteError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

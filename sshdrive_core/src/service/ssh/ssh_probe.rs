use std::net::TcpStream;
use std::path::Path;
use std::time::Duration;

use log::{error, info, warn};
use ssh2::Session;

use crate::model::{AuthType, ConnectionProfile};
use crate::service::ServiceError;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Opens an SSH session to `connection` and authenticates, then drops it.
///
/// Blocking; callers run it on a blocking thread.
pub fn probe(connection: &ConnectionProfile, password: Option<&str>) -> Result<bool, ServiceError> {
    let addr = format!("{}:{}", connection.host, connection.port);
    info!("Probing SSH server at {}", addr);

    let tcp = TcpStream::connect(&addr).map_err(|e| {
        error!("TCP connect error: {}", e);
        ServiceError::Unavailable(format!("cannot reach {addr}: {e}"))
    })?;
    if let Err(e) = tcp
        .set_read_timeout(Some(PROBE_TIMEOUT))
        .and_then(|_| tcp.set_write_timeout(Some(PROBE_TIMEOUT)))
    {
        warn!("Cannot set timeouts on {}, probe may block: {}", addr, e);
    }

    let mut session = Session::new()
        .map_err(|e| ServiceError::Unavailable(format!("failed to create SSH session: {e}")))?;
    session.set_tcp_stream(tcp);
    session.handshake().map_err(|e| {
        error!("Handshake error: {}", e);
        ServiceError::Unavailable(format!("handshake with {addr} failed: {e}"))
    })?;

    let auth = match connection.auth_type {
        AuthType::Password => {
            session.userauth_password(&connection.username, password.unwrap_or_default())
        }
        AuthType::Key => {
            let key_path = connection
                .key_path
                .as_deref()
                .ok_or_else(|| ServiceError::Rejected("key authentication without key path".into()))?;
            session.userauth_pubkey_file(&connection.username, None, Path::new(key_path), password)
        }
    };
    if let Err(e) = auth {
        error!("Authentication error: {}", e);
        return Err(ServiceError::Rejected(format!(
            "authentication as {} failed: {e}",
            connection.username
        )));
    }

    Ok(session.authenticated())
}

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use aegis_core::constants::{KEY_SERVICE_REQUEST, KEY_SERVICE_RETRY_SECS, PUBLIC_KEY_LEN};
use aegis_core::error::AccessError;
use aegis_core::types::PublicKey;
use tracing::debug;

/// Source of the submitting subject's public key.
///
/// `add_policy` blocks on this; implementations own their transport timeouts.
pub trait SubmitterKeys: Send + Sync {
    fn fetch_public_key(&self) -> Result<PublicKey, AccessError>;
}

/// Fixed key source for tests and deployments with a pre-shared subject key.
pub struct StaticKeys {
    key: PublicKey,
}

impl StaticKeys {
    pub fn new(key: PublicKey) -> Self {
        Self { key }
    }
}

impl SubmitterKeys for StaticKeys {
    fn fetch_public_key(&self) -> Result<PublicKey, AccessError> {
        Ok(self.key)
    }
}

/// Blocking TCP client for the subject-pubkey service.
///
/// The wire request is the literal `get_private_key`; the response is the
/// subject's *public* key. The literal is historical and must not change.
pub struct TcpKeyService {
    addr: String,
    attempt_timeout: Duration,
}

impl TcpKeyService {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            addr: format!("{host}:{port}"),
            attempt_timeout: Duration::from_secs(1),
        }
    }

    fn attempt(&self) -> std::io::Result<PublicKey> {
        let addr: SocketAddr = self
            .addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| std::io::Error::other("no address resolved"))?;
        let mut stream = TcpStream::connect_timeout(&addr, self.attempt_timeout)?;
        stream.set_read_timeout(Some(self.attempt_timeout))?;
        stream.set_write_timeout(Some(self.attempt_timeout))?;

        stream.write_all(KEY_SERVICE_REQUEST)?;
        let mut buf = [0u8; PUBLIC_KEY_LEN];
        stream.read_exact(&mut buf)?;
        Ok(PublicKey::from_bytes(buf))
    }
}

impl SubmitterKeys for TcpKeyService {
    /// Retry once per second up to the 10-second budget, then give up with
    /// `NoSubmitterKey`.
    fn fetch_public_key(&self) -> Result<PublicKey, AccessError> {
        for attempt in 0..KEY_SERVICE_RETRY_SECS {
            match self.attempt() {
                Ok(pk) => return Ok(pk),
                Err(e) => {
                    debug!(addr = %self.addr, attempt, error = %e, "pubkey service attempt failed");
                    if attempt + 1 < KEY_SERVICE_RETRY_SECS {
                        std::thread::sleep(Duration::from_secs(1));
                    }
                }
            }
        }
        Err(AccessError::NoSubmitterKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    /// Serve one pubkey request on a loopback listener, checking the wire
    /// literal, then exit.
    fn spawn_key_server(key: PublicKey) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut req = vec![0u8; KEY_SERVICE_REQUEST.len()];
            stream.read_exact(&mut req).unwrap();
            assert_eq!(req, KEY_SERVICE_REQUEST);
            stream.write_all(key.as_bytes()).unwrap();
        });
        addr
    }

    #[test]
    fn fetches_key_over_tcp() {
        let key = PublicKey::from_bytes([9u8; PUBLIC_KEY_LEN]);
        let addr = spawn_key_server(key);
        let svc = TcpKeyService::new("127.0.0.1", addr.port());
        assert_eq!(svc.fetch_public_key().unwrap(), key);
    }

    #[test]
    fn static_keys_return_configured_key() {
        let key = PublicKey::from_bytes([3u8; PUBLIC_KEY_LEN]);
        assert_eq!(StaticKeys::new(key).fetch_public_key().unwrap(), key);
    }
}

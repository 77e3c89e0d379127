//! Async block-store client.
//!
//! `BlockStore` is the async-trait seam the repair executor and placement
//! writer code against; `TcpBlockStore` is the production implementation,
//! grounded on `MemcachedClient::get_or_create_client`'s per-endpoint
//! connection cache (keyed `"ip:port"`, one connection reused across calls)
//! but speaking the framing in [`protocol`] instead of wire memcached.
//! `InMemoryBlockStore` exists for tests and the benchmark driver, where
//! standing up real servers per rack isn't worth the ceremony.

pub mod protocol;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::error::{GridError, GridResult};

/// Async key/value block store reached at a `(server_ip, port)` endpoint.
#[async_trait]
pub trait BlockStore: Send + Sync {
    async fn set(&self, server_ip: &str, port: u16, key: &str, value: &[u8]) -> GridResult<()>;
    async fn get(&self, server_ip: &str, port: u16, key: &str) -> GridResult<Option<Vec<u8>>>;
}

/// TCP-backed `BlockStore` speaking the textual protocol in
/// [`protocol`]. Caches one connection per `"ip:port"` endpoint the way the
/// original client cached one `memcached_st*` per endpoint.
pub struct TcpBlockStore {
    connections: Mutex<HashMap<String, Arc<Mutex<TcpStream>>>>,
}

impl TcpBlockStore {
    pub fn new() -> Self {
        TcpBlockStore { connections: Mutex::new(HashMap::new()) }
    }

    async fn connection_for(&self, server_ip: &str, port: u16) -> GridResult<Arc<Mutex<TcpStream>>> {
        let endpoint = format!("{server_ip}:{port}");
        let mut conns = self.connections.lock().await;
        if let Some(existing) = conns.get(&endpoint) {
            return Ok(Arc::clone(existing));
        }
        let stream = TcpStream::connect(&endpoint)
            .await
            .map_err(|e| GridError::Store(format!("connect {endpoint}: {e}")))?;
        let arc = Arc::new(Mutex::new(stream));
        conns.insert(endpoint, Arc::clone(&arc));
        Ok(arc)
    }
}

impl Default for TcpBlockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlockStore for TcpBlockStore {
    async fn set(&self, server_ip: &str, port: u16, key: &str, value: &[u8]) -> GridResult<()> {
        let conn = self.connection_for(server_ip, port).await?;
        let mut stream = conn.lock().await;
        let req = protocol::encode_set(key, value);
        stream
            .write_all(&req)
            .await
            .map_err(|e| GridError::Store(format!("write SET {key}: {e}")))?;

        let mut reader = BufReader::new(&mut *stream);
        let mut line = String::new();
        read_line(&mut reader, &mut line).await?;
        if line.trim() != "STORED" {
            return Err(GridError::Store(format!("SET {key} failed: {}", line.trim())));
        }
        Ok(())
    }

    async fn get(&self, server_ip: &str, port: u16, key: &str) -> GridResult<Option<Vec<u8>>> {
        let conn = self.connection_for(server_ip, port).await?;
        let mut stream = conn.lock().await;
        let req = protocol::encode_get(key);
        stream
            .write_all(&req)
            .await
            .map_err(|e| GridError::Store(format!("write GET {key}: {e}")))?;

        let mut reader = BufReader::new(&mut *stream);
        let mut line = String::new();
        read_line(&mut reader, &mut line).await?;
        let len = match protocol::parse_value_header(line.trim())? {
            Some(len) => len,
            None => return Ok(None),
        };
        let mut body = vec![0u8; len];
        reader
            .read_exact(&mut body)
            .await
            .map_err(|e| GridError::Store(format!("read GET {key} body: {e}")))?;
        // consume the trailing \r\n
        let mut trailer = [0u8; 2];
        let _ = reader.read_exact(&mut trailer).await;
        Ok(Some(body))
    }
}

async fn read_line<R: tokio::io::AsyncBufRead + Unpin>(
    reader: &mut R,
    line: &mut String,
) -> GridResult<()> {
    use tokio::io::AsyncBufReadExt;
    reader
        .read_line(line)
        .await
        .map_err(|e| GridError::Store(format!("read line: {e}")))?;
    Ok(())
}

/// In-process `BlockStore` for tests and the benchmark driver: a plain
/// `HashMap` keyed by `(endpoint, key)`, no networking at all.
#[derive(Default)]
pub struct InMemoryBlockStore {
    data: Mutex<HashMap<(String, String), Vec<u8>>>,
}

impl InMemoryBlockStore {
    pub fn new() -> Self {
        InMemoryBlockStore { data: Mutex::new(HashMap::new()) }
    }
}

#[async_trait]
impl BlockStore for InMemoryBlockStore {
    async fn set(&self, server_ip: &str, port: u16, key: &str, value: &[u8]) -> GridResult<()> {
        let endpoint = format!("{server_ip}:{port}");
        let mut data = self.data.lock().await;
        data.insert((endpoint, key.to_string()), value.to_vec());
        Ok(())
    }

    async fn get(&self, server_ip: &str, port: u16, key: &str) -> GridResult<Option<Vec<u8>>> {
        let endpoint = format!("{server_ip}:{port}");
        let data = self.data.lock().await;
        Ok(data.get(&(endpoint, key.to_string())).cloned())
    }
}

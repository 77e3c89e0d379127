//! Textual request/response framing for the block-store wire protocol.
//!
//! Modeled on the `libmemcached` ASCII protocol the original
//! `MemcachedClient` spoke (`memcached_set`/`memcached_get` against a
//! `server_ip:port` endpoint, keyed by `"block_<id>"`), reduced to the
//! handful of verbs this crate actually needs. A request is one line
//! terminated by `\r\n`; `SET` carries a length-prefixed binary body on the
//! following line so block payloads can contain arbitrary bytes.

use crate::error::{GridError, GridResult};

/// Format the store key for a block id, matching the original's
/// `"block_" + std::to_string(block_id)`.
pub fn block_key(block_id: usize) -> String {
    format!("block_{block_id}")
}

/// `SET <key> <len>\r\n<len bytes>\r\n`
pub fn encode_set(key: &str, value: &[u8]) -> Vec<u8> {
    let mut buf = format!("SET {} {}\r\n", key, value.len()).into_bytes();
    buf.extend_from_slice(value);
    buf.extend_from_slice(b"\r\n");
    buf
}

/// `GET <key>\r\n`
pub fn encode_get(key: &str) -> Vec<u8> {
    format!("GET {key}\r\n").into_bytes()
}

/// A parsed request line plus, for `SET`, its expected body length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Set { key: String, len: usize },
    Get { key: String },
}

/// Parse one request line (without its trailing `\r\n`).
pub fn parse_request_line(line: &str) -> GridResult<Request> {
    let mut parts = line.split_whitespace();
    match parts.next() {
        Some("SET") => {
            let key = parts
                .next()
                .ok_or(GridError::Store("SET: missing key".into()))?
                .to_string();
            let len: usize = parts
                .next()
                .ok_or(GridError::Store("SET: missing length".into()))?
                .parse()
                .map_err(|_| GridError::Store("SET: invalid length".into()))?;
            Ok(Request::Set { key, len })
        }
        Some("GET") => {
            let key = parts
                .next()
                .ok_or(GridError::Store("GET: missing key".into()))?
                .to_string();
            Ok(Request::Get { key })
        }
        Some(other) => Err(GridError::Store(format!("unknown verb: {other}"))),
        None => Err(GridError::Store("empty request line".into())),
    }
}

/// Parse a `VALUE <len>\r\n` response header line. Returns `None` for
/// `NOT_FOUND`.
pub fn parse_value_header(line: &str) -> GridResult<Option<usize>> {
    if line.trim() == "NOT_FOUND" {
        return Ok(None);
    }
    let mut parts = line.split_whitespace();
    match parts.next() {
        Some("VALUE") => {
            let len: usize = parts
                .next()
                .ok_or(GridError::Store("VALUE: missing length".into()))?
                .parse()
                .map_err(|_| GridError::Store("VALUE: invalid length".into()))?;
            Ok(Some(len))
        }
        _ => Err(GridError::Store(format!("unexpected response: {line}"))),
    }
}

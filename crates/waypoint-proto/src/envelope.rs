//! Binary envelope codec (panic-free).
//!
//! Parsing rules:
//! - Never index (`buf[0]`) — always use `Buf` and `remaining()` checks.
//! - Never `unwrap()` / `expect()` / `panic!()` in production paths.
//!
//! A request envelope carries the ordered logical requests, the caller's
//! position, exactly one auth section, and exactly one signature payload. A
//! response envelope mirrors the request order in its payload sequence.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Result, RpcError};
use crate::request::RequestType;

/// Envelope wire version.
pub const ENVELOPE_VERSION: u8 = 1;

/// Response flag: new API endpoint string is present.
pub const RESP_FLAG_ENDPOINT: u8 = 0x01;
/// Response flag: refreshed auth ticket is present.
pub const RESP_FLAG_TICKET: u8 = 0x02;

/// Auth section tag: long-lived bearer token.
const AUTH_TAG_TOKEN: u8 = 1;
/// Auth section tag: short-lived server-issued ticket.
const AUTH_TAG_TICKET: u8 = 2;

/// Server-issued short-lived credential, as carried on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketBlob {
    /// Opaque ticket bytes.
    pub data: Bytes,
    /// Expiry, unix epoch milliseconds.
    pub expires_ms: i64,
}

/// Auth section: exactly one of token or ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthSection {
    /// Long-lived bearer token bytes.
    Token(Bytes),
    /// Previously issued ticket.
    Ticket(TicketBlob),
}

/// One logical request: a type tag plus an optional opaque body.
#[derive(Debug, Clone)]
pub struct LogicalRequest {
    pub request_type: RequestType,
    /// Serialized message body; `None` for parameterless request types.
    pub body: Option<Bytes>,
}

impl LogicalRequest {
    pub fn new(request_type: RequestType, body: Bytes) -> Self {
        Self {
            request_type,
            body: Some(body),
        }
    }

    pub fn bare(request_type: RequestType) -> Self {
        Self {
            request_type,
            body: None,
        }
    }
}

/// Caller position attached to every envelope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub accuracy: f64,
}

/// Outbound signed container.
#[derive(Debug, Clone)]
pub struct RequestEnvelope {
    pub request_id: u64,
    pub position: Position,
    pub auth: AuthSection,
    pub requests: Vec<LogicalRequest>,
    /// The sole platform-level payload: the signature over the envelope.
    pub signature: Bytes,
}

/// Server status code on a response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// Success.
    Ok,
    /// Success, and the server announced a new API endpoint.
    OkWithEndpoint,
    /// The call must be re-issued against the announced endpoint.
    Redirect,
    /// The auth token/ticket was rejected.
    InvalidAuthToken,
    /// Status this client does not know.
    Unknown(u8),
}

impl StatusCode {
    pub fn as_u8(self) -> u8 {
        match self {
            StatusCode::Ok => 1,
            StatusCode::OkWithEndpoint => 2,
            StatusCode::Redirect => 53,
            StatusCode::InvalidAuthToken => 102,
            StatusCode::Unknown(code) => code,
        }
    }

    pub fn from_u8(code: u8) -> Self {
        match code {
            1 => StatusCode::Ok,
            2 => StatusCode::OkWithEndpoint,
            53 => StatusCode::Redirect,
            102 => StatusCode::InvalidAuthToken,
            other => StatusCode::Unknown(other),
        }
    }
}

/// Inbound container. Payload order mirrors the originating request order.
#[derive(Debug, Clone)]
pub struct ResponseEnvelope {
    pub status: StatusCode,
    pub request_id: u64,
    /// New API endpoint, present on migration/redirect statuses.
    pub api_endpoint: Option<String>,
    /// Refreshed ticket superseding the session's current credential.
    pub ticket: Option<TicketBlob>,
    pub payloads: Vec<Bytes>,
}

fn put_blob(buf: &mut BytesMut, data: &[u8]) {
    buf.put_u32_le(data.len() as u32);
    buf.put_slice(data);
}

fn get_blob(buf: &mut Bytes, what: &str) -> Result<Bytes> {
    if buf.remaining() < 4 {
        return Err(RpcError::Protocol(format!("{what}: missing length")));
    }
    let len = buf.get_u32_le() as usize;
    if buf.remaining() < len {
        return Err(RpcError::Protocol(format!(
            "{what}: truncated ({} of {len} bytes)",
            buf.remaining()
        )));
    }
    Ok(buf.copy_to_bytes(len))
}

/// Encode a request envelope to wire bytes.
pub fn encode_request_envelope(env: &RequestEnvelope) -> Bytes {
    let mut buf = BytesMut::with_capacity(128);
    buf.put_u8(ENVELOPE_VERSION);
    buf.put_u64_le(env.request_id);

    buf.put_f64_le(env.position.latitude);
    buf.put_f64_le(env.position.longitude);
    buf.put_f64_le(env.position.altitude);
    buf.put_f64_le(env.position.accuracy);

    match &env.auth {
        AuthSection::Token(token) => {
            buf.put_u8(AUTH_TAG_TOKEN);
            put_blob(&mut buf, token);
        }
        AuthSection::Ticket(ticket) => {
            buf.put_u8(AUTH_TAG_TICKET);
            put_blob(&mut buf, &ticket.data);
            buf.put_i64_le(ticket.expires_ms);
        }
    }

    buf.put_u16_le(env.requests.len() as u16);
    for req in &env.requests {
        buf.put_u16_le(req.request_type.as_u16());
        match &req.body {
            Some(body) => put_blob(&mut buf, body),
            None => buf.put_u32_le(0),
        }
    }

    put_blob(&mut buf, &env.signature);
    buf.freeze()
}

/// Decode a request envelope from wire bytes.
pub fn decode_request_envelope(mut buf: Bytes) -> Result<RequestEnvelope> {
    // Minimum fixed prefix: version, request_id, 4 position doubles, auth tag
    if buf.remaining() < 1 + 8 + 32 + 1 {
        return Err(RpcError::Protocol("request envelope too short".into()));
    }

    let v = buf.get_u8();
    if v != ENVELOPE_VERSION {
        return Err(RpcError::Protocol(format!(
            "unsupported envelope version {v}"
        )));
    }

    let request_id = buf.get_u64_le();
    let position = Position {
        latitude: buf.get_f64_le(),
        longitude: buf.get_f64_le(),
        altitude: buf.get_f64_le(),
        accuracy: buf.get_f64_le(),
    };

    let auth = match buf.get_u8() {
        AUTH_TAG_TOKEN => AuthSection::Token(get_blob(&mut buf, "auth token")?),
        AUTH_TAG_TICKET => {
            let data = get_blob(&mut buf, "auth ticket")?;
            if buf.remaining() < 8 {
                return Err(RpcError::Protocol("auth ticket: missing expiry".into()));
            }
            AuthSection::Ticket(TicketBlob {
                data,
                expires_ms: buf.get_i64_le(),
            })
        }
        tag => {
            return Err(RpcError::Protocol(format!("unknown auth tag {tag}")));
        }
    };

    if buf.remaining() < 2 {
        return Err(RpcError::Protocol("missing request count".into()));
    }
    let count = buf.get_u16_le() as usize;
    let mut requests = Vec::with_capacity(count);
    for _ in 0..count {
        if buf.remaining() < 2 {
            return Err(RpcError::Protocol("truncated request list".into()));
        }
        let request_type = RequestType::from_u16(buf.get_u16_le());
        let body = get_blob(&mut buf, "request body")?;
        requests.push(LogicalRequest {
            request_type,
            body: if body.is_empty() { None } else { Some(body) },
        });
    }

    let signature = get_blob(&mut buf, "signature")?;
    Ok(RequestEnvelope {
        request_id,
        position,
        auth,
        requests,
        signature,
    })
}

/// Encode a response envelope to wire bytes.
pub fn encode_response_envelope(env: &ResponseEnvelope) -> Bytes {
    let mut buf = BytesMut::with_capacity(64);
    buf.put_u8(ENVELOPE_VERSION);
    buf.put_u8(env.status.as_u8());
    buf.put_u64_le(env.request_id);

    let mut flags = 0u8;
    if env.api_endpoint.is_some() {
        flags |= RESP_FLAG_ENDPOINT;
    }
    if env.ticket.is_some() {
        flags |= RESP_FLAG_TICKET;
    }
    buf.put_u8(flags);

    if let Some(endpoint) = &env.api_endpoint {
        put_blob(&mut buf, endpoint.as_bytes());
    }
    if let Some(ticket) = &env.ticket {
        put_blob(&mut buf, &ticket.data);
        buf.put_i64_le(ticket.expires_ms);
    }

    buf.put_u16_le(env.payloads.len() as u16);
    for p in &env.payloads {
        put_blob(&mut buf, p);
    }
    buf.freeze()
}

/// Decode a response envelope from wire bytes.
pub fn decode_response_envelope(mut buf: Bytes) -> Result<ResponseEnvelope> {
    // Minimum header: version, status, request_id, flags
    if buf.remaining() < 1 + 1 + 8 + 1 {
        return Err(RpcError::Protocol("response envelope too short".into()));
    }

    let v = buf.get_u8();
    if v != ENVELOPE_VERSION {
        return Err(RpcError::Protocol(format!(
            "unsupported envelope version {v}"
        )));
    }

    let status = StatusCode::from_u8(buf.get_u8());
    let request_id = buf.get_u64_le();
    let flags = buf.get_u8();

    let api_endpoint = if (flags & RESP_FLAG_ENDPOINT) != 0 {
        let raw = get_blob(&mut buf, "api endpoint")?;
        let s = std::str::from_utf8(&raw)
            .map_err(|_| RpcError::Protocol("api endpoint not utf-8".into()))?;
        Some(s.to_string())
    } else {
        None
    };

    let ticket = if (flags & RESP_FLAG_TICKET) != 0 {
        let data = get_blob(&mut buf, "response ticket")?;
        if buf.remaining() < 8 {
            return Err(RpcError::Protocol("response ticket: missing expiry".into()));
        }
        Some(TicketBlob {
            data,
            expires_ms: buf.get_i64_le(),
        })
    } else {
        None
    };

    if buf.remaining() < 2 {
        return Err(RpcError::Protocol("missing payload count".into()));
    }
    let count = buf.get_u16_le() as usize;
    let mut payloads = Vec::with_capacity(count);
    for _ in 0..count {
        payloads.push(get_blob(&mut buf, "response payload")?);
    }

    Ok(ResponseEnvelope {
        status,
        request_id,
        api_endpoint,
        ticket,
        payloads,
    })
}

//! Derivation of the rate-limit [`ClientKey`] for an inbound request.
//!
//! Precedence:
//!
//! 1. The `X-Client-Id` header, verbatim. A present but empty header is an
//!    empty key; it does not fall back to the address.
//! 2. The peer IP. When the peer is a trusted proxy, `X-Forwarded-For` is
//!    walked right to left and the first untrusted hop is used instead.
//! 3. `"unknown"`.

use std::net::IpAddr;

use axum::http::HeaderMap;
use pipeline::ClientKey;

pub const CLIENT_ID_HEADER: &str = "x-client-id";
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

pub fn client_key(headers: &HeaderMap, peer: Option<IpAddr>, trusted: &[IpAddr]) -> ClientKey {
    if let Some(value) = headers.get(CLIENT_ID_HEADER) {
        return ClientKey::new(String::from_utf8_lossy(value.as_bytes()));
    }
    match peer {
        Some(peer) => ClientKey::new(originating_address(headers, peer, trusted).to_string()),
        None => ClientKey::unknown(),
    }
}

fn originating_address(headers: &HeaderMap, peer: IpAddr, trusted: &[IpAddr]) -> IpAddr {
    if !trusted.contains(&peer) {
        return peer;
    }

    let hops: Vec<&str> = headers
        .get_all(FORWARDED_FOR_HEADER)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .collect();

    let mut client = peer;
    for hop in hops.into_iter().rev() {
        let Ok(address) = hop.parse::<IpAddr>() else {
            break;
        };
        client = address;
        if !trusted.contains(&address) {
            break;
        }
    }
    client
}

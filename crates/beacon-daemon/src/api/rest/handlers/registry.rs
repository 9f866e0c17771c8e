//! Registration and discovery handlers
//!
//! The instance address is always taken from the transport-level peer
//! address, never from a request field, so a service cannot register an
//! address it does not own. Name, version and port come from the path.

use crate::api::rest::state::AppState;
use crate::error::ApiResult;
use axum::{
    extract::{ConnectInfo, Path, State},
    Json,
};
use beacon_registry::ServiceInstance;
use serde::Serialize;
use std::net::{IpAddr, SocketAddr};

/// Response carrying a composite instance key
#[derive(Debug, Serialize)]
pub struct KeyResponse {
    pub result: String,
}

/// Register an instance or record a heartbeat
///
/// `PUT /register/:name/:version/:port`
pub async fn register_service(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Path((name, version, port)): Path<(String, String, u16)>,
) -> Json<KeyResponse> {
    let address = directory_address(peer.ip());
    let key = state.registry.register(&name, &version, &address, port);

    Json(KeyResponse {
        result: key.to_string(),
    })
}

/// Remove an instance
///
/// `DELETE /delete/:name/:version/:port`; responds with the computed
/// key whether or not the instance was ever registered.
pub async fn unregister_service(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Path((name, version, port)): Path<(String, String, u16)>,
) -> Json<KeyResponse> {
    let address = directory_address(peer.ip());
    let key = state.registry.unregister(&name, &version, &address, port);

    Json(KeyResponse {
        result: key.to_string(),
    })
}

/// Locate an instance matching a name and version range
///
/// `GET /find/:name/:range`
pub async fn find_service(
    State(state): State<AppState>,
    Path((name, range)): Path<(String, String)>,
) -> ApiResult<Json<ServiceInstance>> {
    let instance = state.registry.find(&name, &range)?;
    Ok(Json(instance))
}

/// Render a peer IP the way the directory stores addresses: IPv6 forms
/// bracketed, IPv4 as-is.
fn directory_address(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => format!("[{}]", v6),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn ipv4_address_is_unchanged() {
        assert_eq!(
            directory_address(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))),
            "10.0.0.1"
        );
    }

    #[test]
    fn ipv6_address_is_bracketed() {
        assert_eq!(
            directory_address(IpAddr::V6(Ipv6Addr::LOCALHOST)),
            "[::1]"
        );
    }
}

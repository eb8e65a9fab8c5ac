//! `[serve]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};

/// `[serve]` section in folio.toml.
///
/// Where `folio serve` listens. Collection directories get reader pages,
/// a collection requested without its trailing slash is redirected, and
/// every other path is a static file under `[site] root`.
///
/// ```toml
/// [serve]
/// interface = "::1"
/// port = 8080
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ServeConfig {
    /// IP address to bind, `127.0.0.1` unless set.
    #[serde(default = "defaults::serve::interface")]
    #[educe(Default = defaults::serve::interface())]
    pub interface: String,

    /// First port tried. A taken port moves the server to the next free one.
    #[serde(default = "defaults::serve::port")]
    #[educe(Default = defaults::serve::port())]
    pub port: u16,
}

impl ServeConfig {
    /// The interface as an address, `None` for hostnames and typos.
    pub fn ip(&self) -> Option<IpAddr> {
        self.interface.parse().ok()
    }

    /// Address of the first bind attempt.
    pub fn addr(&self) -> Option<SocketAddr> {
        self.ip().map(|ip| SocketAddr::new(ip, self.port))
    }
}

// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort system information for `GET /api/info`.
//!
//! Purely descriptive: every lookup degrades to a placeholder instead of
//! failing the request.

use std::path::PathBuf;
use std::time::Duration;

use warden_core::SystemInfo;

const PLACEHOLDER: &str = "unknown";

/// Gathers the descriptive fields of the info endpoint.
#[derive(Debug, Clone)]
pub struct SystemInfoSource {
    domain_file: PathBuf,
    service: String,
    port: u16,
    public_ip_url: String,
    http: reqwest::Client,
}

impl SystemInfoSource {
    pub fn new(domain_file: impl Into<PathBuf>, service: impl Into<String>, port: u16) -> Self {
        Self {
            domain_file: domain_file.into(),
            service: service.into(),
            port,
            public_ip_url: "https://ifconfig.me/ip".to_string(),
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Overrides the public-address lookup endpoint (tests).
    pub fn with_public_ip_url(mut self, url: impl Into<String>) -> Self {
        self.public_ip_url = url.into();
        self
    }

    pub async fn gather(&self) -> SystemInfo {
        SystemInfo {
            domain: self.domain(),
            public_ip: self.public_ip().await,
            private_ip: private_ip(),
            port: self.port.to_string(),
            service: self.service.clone(),
        }
    }

    fn domain(&self) -> String {
        match std::fs::read_to_string(&self.domain_file) {
            Ok(raw) if !raw.trim().is_empty() => raw.trim().to_string(),
            _ => "not set".to_string(),
        }
    }

    async fn public_ip(&self) -> String {
        let result = async {
            self.http
                .get(&self.public_ip_url)
                .send()
                .await?
                .text()
                .await
        }
        .await;

        match result {
            Ok(body) if !body.trim().is_empty() => body.trim().to_string(),
            _ => PLACEHOLDER.to_string(),
        }
    }
}

/// The address a datagram socket to a public resolver would source from.
/// No packets are sent; failure yields the placeholder.
fn private_ip() -> String {
    std::net::UdpSocket::bind("0.0.0.0:0")
        .and_then(|sock| {
            sock.connect("8.8.8.8:80")?;
            sock.local_addr()
        })
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|_| PLACEHOLDER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn gathers_fields_with_mocked_public_ip() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("203.0.113.7\n"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let domain_file = dir.path().join("domain");
        std::fs::write(&domain_file, "vpn.example.net\n").unwrap();

        let source = SystemInfoSource::new(&domain_file, "vpnd", 5667)
            .with_public_ip_url(server.uri());
        let info = source.gather().await;

        assert_eq!(info.domain, "vpn.example.net");
        assert_eq!(info.public_ip, "203.0.113.7");
        assert_eq!(info.port, "5667");
        assert_eq!(info.service, "vpnd");
    }

    #[tokio::test]
    async fn lookup_failure_yields_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        let source = SystemInfoSource::new(dir.path().join("domain"), "vpnd", 5667)
            .with_public_ip_url("http://127.0.0.1:1/ip");
        let info = source.gather().await;

        assert_eq!(info.domain, "not set");
        assert_eq!(info.public_ip, PLACEHOLDER);
    }
}

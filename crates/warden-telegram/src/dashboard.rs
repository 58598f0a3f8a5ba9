// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dashboard text rendering and the best-effort geo lookup behind it.

use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use warden_core::DATE_FORMAT;

const PLACEHOLDER: &str = "unknown";

/// City and provider of the server's public address.
#[derive(Debug, Clone, Deserialize)]
pub struct GeoInfo {
    #[serde(default = "placeholder")]
    pub city: String,
    #[serde(default = "placeholder")]
    pub isp: String,
}

fn placeholder() -> String {
    PLACEHOLDER.to_string()
}

impl Default for GeoInfo {
    fn default() -> Self {
        Self {
            city: placeholder(),
            isp: placeholder(),
        }
    }
}

/// Geo lookup client. Purely cosmetic; every failure degrades to
/// placeholder fields.
#[derive(Debug, Clone)]
pub struct GeoLookup {
    url: String,
    http: reqwest::Client,
}

impl Default for GeoLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl GeoLookup {
    pub fn new() -> Self {
        Self {
            url: "http://ip-api.com/json/".to_string(),
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Overrides the lookup endpoint (tests).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub async fn lookup(&self) -> GeoInfo {
        let result = async { self.http.get(&self.url).send().await?.json::<GeoInfo>().await }.await;
        result.unwrap_or_default()
    }
}

/// Formats elapsed bot runtime the way the dashboard shows it.
pub fn format_uptime(elapsed: Duration) -> String {
    let minutes = elapsed.as_secs() / 60;
    let hours = minutes / 60;
    if hours >= 24 {
        format!("{} days {} hours", hours / 24, hours % 24)
    } else {
        format!("{} hours {} minutes", hours, minutes % 60)
    }
}

/// Countdown line for the infrastructure expiry date.
pub fn vps_countdown(date: Option<&str>, today: NaiveDate) -> String {
    let Some(raw) = date else {
        return "⚠️ not set".to_string();
    };
    let Ok(expiry) = NaiveDate::parse_from_str(raw, DATE_FORMAT) else {
        return "⚠️ not set".to_string();
    };

    let days_left = (expiry - today).num_days();
    if days_left < 0 {
        "🛑 EXPIRED".to_string()
    } else if days_left == 0 {
        "⚠️ expires today".to_string()
    } else {
        format!("⚠️ {days_left} days left")
    }
}

/// The dashboard caption itself.
pub fn render(
    domain: &str,
    geo: &GeoInfo,
    total_accounts: usize,
    notif_group: Option<i64>,
    uptime: &str,
    vps: &str,
) -> String {
    let notif = match notif_group {
        Some(id) if id != 0 => format!("✅ on (`{id}`)"),
        _ => "❌ off".to_string(),
    };

    format!(
        "✨ *VPN WARDEN CONTROL PANEL*\n\n\
         • 🖥️ *Server*\n\
         • 🌐 Domain: `{domain}`\n\
         • 📍 Location: `{}`\n\
         • 📡 ISP: `{}`\n\
         • 👤 Accounts: `{total_accounts}`\n\
         • 🔔 Notifications: {notif}\n\n\
         • ⏳ *Bot*\n\
         • 🕒 Uptime: {uptime}\n\
         • ⚠️ VPS expiry: {vps}",
        geo.city, geo.isp
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn uptime_switches_to_days_after_a_day() {
        assert_eq!(format_uptime(Duration::from_secs(95 * 60)), "1 hours 35 minutes");
        assert_eq!(
            format_uptime(Duration::from_secs(26 * 3600)),
            "1 days 2 hours"
        );
    }

    #[test]
    fn countdown_covers_all_phases() {
        let today = day(2026, 8, 29);
        assert_eq!(vps_countdown(None, today), "⚠️ not set");
        assert_eq!(vps_countdown(Some("nonsense"), today), "⚠️ not set");
        assert_eq!(vps_countdown(Some("2026-08-28"), today), "🛑 EXPIRED");
        assert_eq!(vps_countdown(Some("2026-08-29"), today), "⚠️ expires today");
        assert_eq!(vps_countdown(Some("2026-09-03"), today), "⚠️ 5 days left");
    }

    #[test]
    fn render_reflects_notification_group() {
        let geo = GeoInfo::default();
        let on = render("vpn.example.net", &geo, 3, Some(-100), "1 hours 0 minutes", "⚠️ not set");
        assert!(on.contains("✅ on (`-100`)"));
        assert!(on.contains("`vpn.example.net`"));
        assert!(on.contains("`3`"));

        let off = render("vpn.example.net", &geo, 3, None, "1 hours 0 minutes", "⚠️ not set");
        assert!(off.contains("❌ off"));
    }

    #[tokio::test]
    async fn lookup_decodes_city_and_isp() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "city": "Frankfurt",
                "isp": "Example Carrier",
                "country": "DE"
            })))
            .mount(&server)
            .await;

        let geo = GeoLookup::new().with_url(server.uri()).lookup().await;
        assert_eq!(geo.city, "Frankfurt");
        assert_eq!(geo.isp, "Example Carrier");
    }

    #[tokio::test]
    async fn lookup_failure_yields_placeholders() {
        let geo = GeoLookup::new()
            .with_url("http://127.0.0.1:1/json")
            .lookup()
            .await;
        assert_eq!(geo.city, PLACEHOLDER);
        assert_eq!(geo.isp, PLACEHOLDER);
    }
}

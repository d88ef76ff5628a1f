//! `NetworkManager` source: reads Wi-Fi state through the `nmcli` CLI.
//!
//! Uses terse output (`-t`), where fields are colon-separated and literal
//! colons and backslashes inside values are escaped with a backslash.

use std::process::Command;

use log::debug;

use crate::model::NearbyNetwork;

use super::{NetworkInfoProvider, ProviderError, Result};

/// Network provider backed by `nmcli dev wifi list`.
#[derive(Debug, Clone, Default)]
pub struct Nmcli {
    /// Restrict queries to one wireless interface (e.g. `wlan0`).
    interface: Option<String>,
}

/// One row of `nmcli -t -f ACTIVE,SSID,SIGNAL dev wifi list`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct WifiRow {
    active: bool,
    ssid: String,
    signal: Option<i32>,
}

impl Nmcli {
    pub fn new(interface: Option<String>) -> Self {
        Self { interface }
    }

    fn wifi_rows(&self, rescan: &str) -> Result<Vec<WifiRow>> {
        let mut args = vec![
            "-t",
            "-f",
            "ACTIVE,SSID,SIGNAL",
            "dev",
            "wifi",
            "list",
            "--rescan",
            rescan,
        ];
        if let Some(iface) = &self.interface {
            args.extend(["ifname", iface.as_str()]);
        }
        let stdout = nmcli(&args)?;
        Ok(stdout.lines().filter_map(parse_row).collect())
    }

    fn active_row(&self) -> Result<WifiRow> {
        self.wifi_rows("no")?
            .into_iter()
            .find(|r| r.active)
            .ok_or_else(|| ProviderError::Unavailable("no active Wi-Fi connection".into()))
    }
}

impl NetworkInfoProvider for Nmcli {
    fn current_network_identifier(&mut self) -> Result<String> {
        let row = self.active_row()?;
        if row.ssid.is_empty() {
            return Err(ProviderError::Unavailable(
                "active network has a hidden SSID".into(),
            ));
        }
        Ok(row.ssid)
    }

    fn current_signal_level(&mut self) -> Result<i32> {
        self.active_row()?.signal.ok_or_else(|| {
            ProviderError::Unavailable("active network reports no signal level".into())
        })
    }

    fn list_nearby_networks(&mut self) -> Result<Vec<NearbyNetwork>> {
        Ok(visible_networks(self.wifi_rows("auto")?))
    }
}

/// Scan rows worth listing: hidden SSIDs and rows without a signal are dropped.
fn visible_networks(rows: Vec<WifiRow>) -> Vec<NearbyNetwork> {
    rows.into_iter()
        .filter(|r| !r.ssid.is_empty())
        .filter_map(|r| {
            Some(NearbyNetwork {
                identifier: r.ssid,
                level: r.signal?,
            })
        })
        .collect()
}

/// Run `nmcli` and return its stdout.
fn nmcli(args: &[&str]) -> Result<String> {
    debug!("nmcli {}", args.join(" "));
    let output = Command::new("nmcli")
        .args(args)
        .output()
        .map_err(|e| ProviderError::Unavailable(format!("failed to run nmcli: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ProviderError::Unavailable(format!(
            "nmcli failed: {}",
            stderr.trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn parse_row(line: &str) -> Option<WifiRow> {
    let fields = split_terse(line);
    let [active, ssid, signal] = fields.as_slice() else {
        return None;
    };
    Some(WifiRow {
        active: active == "yes",
        ssid: ssid.clone(),
        signal: signal.parse().ok(),
    })
}

/// Split a terse `nmcli` line on unescaped colons, unescaping `\:` and `\\`.
fn split_terse(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            ':' => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

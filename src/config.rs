use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::model::DatasetKind;

// ---------------------------------------------------------------------------
// Dataset source paths
// ---------------------------------------------------------------------------

/// File locations of the three dataset sources. Read from `datadeck.json`
/// next to the working directory when present, otherwise the defaults below
/// (which match what `generate_sample` writes).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    pub trading: PathBuf,
    pub sales: PathBuf,
    pub robot: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        DataPaths {
            trading: PathBuf::from("data/btcusd_1m.csv"),
            sales: PathBuf::from("data/vgsales.csv"),
            robot: PathBuf::from("data/robot_log.xlsx"),
        }
    }
}

impl DataPaths {
    pub fn into_catalog_paths(self) -> BTreeMap<DatasetKind, PathBuf> {
        let mut paths = BTreeMap::new();
        paths.insert(DatasetKind::Trading, self.trading);
        paths.insert(DatasetKind::Sales, self.sales);
        paths.insert(DatasetKind::Robot, self.robot);
        paths
    }
}

/// Load `datadeck.json` if present; fall back to defaults on any problem.
pub fn load_data_paths() -> DataPaths {
    match std::fs::read_to_string("datadeck.json") {
        Ok(text) => match serde_json::from_str(&text) {
            Ok(paths) => paths,
            Err(e) => {
                log::warn!("ignoring malformed datadeck.json: {e}");
                DataPaths::default()
            }
        },
        Err(_) => DataPaths::default(),
    }
}

// ---------------------------------------------------------------------------
// SMTP configuration – environment only, never source literals
// ---------------------------------------------------------------------------

/// Outgoing-mail settings, sourced exclusively from the environment.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

impl MailConfig {
    /// Read `DATADECK_SMTP_{HOST,PORT,USER,PASSWORD,FROM}`. `PORT` defaults
    /// to 587 (STARTTLS) and `FROM` to the username.
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("DATADECK_SMTP_HOST").context("DATADECK_SMTP_HOST is not set")?;
        let port = match std::env::var("DATADECK_SMTP_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("DATADECK_SMTP_PORT '{raw}' is not a port number"))?,
            Err(_) => 587,
        };
        let username =
            std::env::var("DATADECK_SMTP_USER").context("DATADECK_SMTP_USER is not set")?;
        let password =
            std::env::var("DATADECK_SMTP_PASSWORD").context("DATADECK_SMTP_PASSWORD is not set")?;
        let from = std::env::var("DATADECK_SMTP_FROM").unwrap_or_else(|_| username.clone());

        Ok(MailConfig {
            host,
            port,
            username,
            password,
            from,
        })
    }
}

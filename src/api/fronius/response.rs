use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Local};
use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};

use crate::prelude::*;

/// Common envelope of the Solar API responses.
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Response<B> {
    pub head: Head,
    pub body: B,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Head {
    pub status: Status,
    pub timestamp: DateTime<Local>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Status {
    /// Non-zero when the request failed.
    pub code: i32,

    #[serde(default)]
    pub reason: String,
}

impl<B> Response<B> {
    pub fn check(self) -> Result<Self> {
        let status = &self.head.status;
        if status.code == 0 {
            Ok(self)
        } else if status.reason.is_empty() {
            bail!("Solar API error {}", status.code)
        } else {
            bail!(r#"Solar API error {} ("{}")"#, status.code, status.reason)
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RealtimeBody {
    pub data: RealtimeData,
}

#[derive(Deserialize)]
pub struct RealtimeData {
    /// Missing when the inverter sleeps.
    #[serde(rename = "PAC")]
    pub ac_power: Option<SystemChannel>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SystemChannel {
    /// Keyed by the inverter number.
    #[serde(default)]
    pub values: HashMap<String, Option<f64>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ArchiveBody {
    /// Keyed by the device, for example `inverter/1`.
    #[serde(default)]
    pub data: HashMap<String, ArchiveDevice>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ArchiveDevice {
    #[serde(default)]
    pub data: HashMap<String, ArchiveChannel>,
}

#[serde_as]
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ArchiveChannel {
    /// Keyed by seconds since the local midnight.
    #[serde_as(as = "BTreeMap<DisplayFromStr, _>")]
    #[serde(default)]
    pub values: BTreeMap<u32, f64>,
}

impl ArchiveChannel {
    /// Latest pair of values recorded at the same moment in both channels.
    pub fn latest_with(&self, other: &Self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .rev()
            .find_map(|(seconds, value)| Some((*value, *other.values.get(seconds)?)))
    }
}

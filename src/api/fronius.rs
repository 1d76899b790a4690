//! [Fronius Solar API](https://www.fronius.com/en/solar-energy/installers-partners/technical-data/all-products/system-monitoring/open-interfaces/fronius-solar-api-json-) client.

mod response;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use self::response::{ArchiveBody, RealtimeBody, Response};
use crate::{
    api::{ReadingSource, client},
    core::reading::{Reading, StringReading},
    prelude::*,
    quantity::{
        electric::{Amperes, Volts},
        power::Watts,
    },
    settings::InverterSettings,
};

pub struct Api {
    client: Client,
    base_url: Url,

    /// Number of PV strings to ask the archive for.
    n_strings: usize,
}

impl Api {
    pub fn try_new(settings: &InverterSettings, n_strings: usize) -> Result<Self> {
        Ok(Self {
            client: client::try_new(settings.timeout)?,
            base_url: settings.url.clone(),
            n_strings,
        })
    }

    #[instrument(skip_all, level = Level::DEBUG, fields(path = path))]
    async fn call<B: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Response<B>> {
        let mut url = self.base_url.join(path).with_context(|| format!("invalid URL for `{path}`"))?;
        url.query_pairs_mut().extend_pairs(query);
        self.client
            .get(url)
            .send()
            .await
            .with_context(|| format!("failed to call `{path}`"))?
            .error_for_status()
            .with_context(|| format!("`{path}` failed"))?
            .json::<Response<B>>()
            .await
            .with_context(|| format!("failed to deserialize `{path}` response"))?
            .check()
    }

    #[instrument(skip_all, level = Level::DEBUG, fields(on = %on))]
    async fn get_strings(&self, on: NaiveDate) -> Result<Vec<StringReading>> {
        let on = on.format("%Y-%m-%d").to_string();
        let mut query = vec![
            ("Scope", "System".to_owned()),
            ("StartDate", on.clone()),
            ("EndDate", on),
        ];
        for id in 1..=self.n_strings {
            query.push(("Channel", format!("Current_DC_String_{id}")));
            query.push(("Channel", format!("Voltage_DC_String_{id}")));
        }
        let response: Response<ArchiveBody> =
            self.call("solar_api/v1/GetArchiveData.cgi", &query).await?;
        Ok(latest_strings(&response.body, self.n_strings))
    }
}

#[async_trait]
impl ReadingSource for Api {
    #[instrument(skip_all, fields(url = %self.base_url))]
    async fn fetch(&self) -> Result<Reading> {
        info!("Fetching…");
        let response: Response<RealtimeBody> = self
            .call("solar_api/v1/GetInverterRealtimeData.cgi", &[("Scope", "System".to_owned())])
            .await
            .context("failed to fetch the real-time data")?;
        let timestamp = response.head.timestamp;
        let power = ac_power(&response.body);
        info!(%timestamp, %power, "Fetched");

        let strings = if self.n_strings == 0 {
            Vec::new()
        } else {
            match self.get_strings(timestamp.date_naive()).await {
                Ok(strings) => strings,
                Err(error) => {
                    warn!("Failed to fetch the string values, continuing without them: {error:#}");
                    Vec::new()
                }
            }
        };

        Ok(Reading::builder().timestamp(timestamp).power(power).strings(strings).build())
    }
}

/// Total AC output, zero when the inverter does not report it.
fn ac_power(body: &RealtimeBody) -> Watts {
    body.data
        .ac_power
        .as_ref()
        .and_then(|channel| channel.values.get("1").copied().flatten())
        .map_or_else(Watts::zero, Watts)
}

fn latest_strings(body: &ArchiveBody, n_strings: usize) -> Vec<StringReading> {
    let Some(device) = body.data.get("inverter/1") else {
        return Vec::new();
    };
    (1..=n_strings)
        .filter_map(|id| {
            let currents = device.data.get(&format!("Current_DC_String_{id}"))?;
            let voltages = device.data.get(&format!("Voltage_DC_String_{id}"))?;
            let (current, voltage) = currents.latest_with(voltages)?;
            Some(
                StringReading::builder()
                    .id(id)
                    .current(Amperes(current))
                    .voltage(Volts(voltage))
                    .build(),
            )
        })
        .collect()
}

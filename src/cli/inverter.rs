use clap::Parser;
use reqwest::Url;

use crate::settings::InverterSettings;

#[derive(Parser)]
pub struct InverterArgs {
    /// Base URL of the inverter's Solar API.
    #[clap(long = "inverter-url", env = "INVERTER_URL", default_value = "http://192.168.1.123")]
    url: Url,

    /// Give up on the inverter after this long.
    #[clap(long = "fetch-timeout", env = "FETCH_TIMEOUT", default_value = "10s")]
    timeout: humantime::Duration,
}

impl From<InverterArgs> for InverterSettings {
    fn from(args: InverterArgs) -> Self {
        Self { url: args.url, timeout: args.timeout.into() }
    }
}

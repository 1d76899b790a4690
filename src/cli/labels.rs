use clap::Parser;

use crate::{prelude::*, quantity::cost::KilowattHourRate, settings::Labels};

#[derive(Parser)]
pub struct LabelArgs {
    /// System name shown on the charts.
    #[clap(long, env = "LOCATION", default_value = "My House")]
    location: String,

    /// PV string names, starting from string #1.
    #[clap(
        long = "string-names",
        env = "STRING_NAMES",
        value_delimiter = ',',
        num_args = 1..,
        default_value = "East Panels,South Panels",
    )]
    strings: Vec<String>,

    #[clap(long, env = "CURRENCY", default_value = "£")]
    currency: String,

    /// What a kilowatt-hour is worth, saved or earned.
    #[clap(long = "value-per-kwh", env = "VALUE_PER_KWH", default_value = "0.1872")]
    value_per_kwh: KilowattHourRate,

    /// For example, `Saved` or `Earned`.
    #[clap(long = "value-label", env = "VALUE_LABEL", default_value = "Saved")]
    value_label: String,
}

impl TryFrom<LabelArgs> for Labels {
    type Error = Error;

    fn try_from(args: LabelArgs) -> Result<Self> {
        let strings: Vec<String> = args
            .strings
            .into_iter()
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty())
            .collect();
        ensure!(!strings.is_empty(), "at least one string name is required");
        ensure!(
            args.value_per_kwh.is_non_negative_finite(),
            "value per kilowatt-hour must be a non-negative number",
        );
        Ok(Self {
            location: args.location,
            strings,
            currency: args.currency,
            value_per_kwh: args.value_per_kwh,
            value_label: args.value_label,
        })
    }
}

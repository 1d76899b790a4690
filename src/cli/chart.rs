use clap::Parser;

use crate::{prelude::*, quantity::power::Watts, settings::ChartScale};

#[derive(Parser)]
pub struct ChartArgs {
    #[clap(long = "chart-max-watts", env = "CHART_MAX_WATTS", default_value = "5250")]
    max: Watts,

    /// Distance between the horizontal grid lines.
    #[clap(long = "chart-step-watts", env = "CHART_STEP_WATTS", default_value = "250")]
    step: Watts,
}

impl TryFrom<ChartArgs> for ChartScale {
    type Error = Error;

    fn try_from(args: ChartArgs) -> Result<Self> {
        ensure!(args.max > Watts::zero(), "chart maximum must be positive");
        ensure!(args.step > Watts::zero(), "chart step must be positive");
        Ok(Self { min: Watts::zero(), max: args.max, step: args.step })
    }
}

mod chart;

pub use self::chart::{ChartKind, render_chart};

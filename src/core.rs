pub mod aggregator;
pub mod integrator;
pub mod mode;
pub mod reading;
pub mod series;
pub mod sun;
pub mod totals;

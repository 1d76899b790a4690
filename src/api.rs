mod client;
mod fronius;
mod reading_source;

pub use self::{fronius::Api as Fronius, reading_source::ReadingSource};

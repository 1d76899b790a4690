use async_trait::async_trait;

use crate::{core::reading::Reading, prelude::*};

/// Something that takes one snapshot of the inverter per call.
#[async_trait]
pub trait ReadingSource: Sync {
    async fn fetch(&self) -> Result<Reading>;
}

//! Plant lookups: listPlants and getPlantDetails

use async_trait::async_trait;
use mayaguide_content::ContentStore;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::{id_schema, no_args_schema, IdArgs, ToolTrait};
use crate::Result;

/// Every plant as an `{id, name}` pair
pub struct ListPlantsTool {
    store: Arc<dyn ContentStore>,
}

impl ListPlantsTool {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ToolTrait for ListPlantsTool {
    fn name(&self) -> &str {
        "listPlants"
    }

    fn description(&self) -> &str {
        "List all available medicinal plants."
    }

    fn parameters(&self) -> Value {
        no_args_schema()
    }

    async fn execute(&self, _args: Value) -> Result<String> {
        let plants = self.store.list_plants().await?;
        debug!("listPlants returned {} plants", plants.len());
        Ok(serde_json::to_string(&plants)?)
    }
}

/// One plant's names, scientific name and description
pub struct GetPlantDetailsTool {
    store: Arc<dyn ContentStore>,
}

impl GetPlantDetailsTool {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ToolTrait for GetPlantDetailsTool {
    fn name(&self) -> &str {
        "getPlantDetails"
    }

    fn description(&self) -> &str {
        "Get detailed information for a specific plant by its ID."
    }

    fn parameters(&self) -> Value {
        id_schema("The plant ID, as returned by listPlants")
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let IdArgs { id } = IdArgs::parse(self.name(), args)?;
        debug!("getPlantDetails id={}", id);
        let plant = self.store.get_plant(&id).await?;
        Ok(serde_json::to_string(&plant)?)
    }
}

//! Metadata information regarding the database and the registered query descriptors.

pub mod database;
pub mod descriptors;

// re-export without modules
pub use database::*;
pub use descriptors::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Metadata information.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct Metadata {
    #[serde(default)]
    pub entities: EntitiesInfo,
    #[serde(default)]
    pub projections: ProjectionsInfo,
    #[serde(default)]
    pub descriptors: DescriptorsInfo,
}

impl Metadata {
    pub fn empty() -> Self {
        Metadata {
            entities: EntitiesInfo::empty(),
            projections: ProjectionsInfo::empty(),
            descriptors: DescriptorsInfo::empty(),
        }
    }
}

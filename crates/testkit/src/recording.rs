//! A block builder that remembers what it was asked to build.

use anyhow::{bail, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use terablock_world::{Block, BlockBuildRequest, BlockBuilder};
use tracing::trace;

/// One request seen by a [`RecordingBuilder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildRecord {
    /// URI of the requested block.
    pub uri: String,
    /// Family the block belongs to.
    pub family: String,
    /// Requested section.
    pub section: Option<String>,
    /// Yaw in degrees.
    pub yaw: u16,
    /// Pitch in degrees.
    pub pitch: u16,
    /// Roll in degrees.
    pub roll: u16,
}

impl From<&BlockBuildRequest<'_>> for BuildRecord {
    fn from(request: &BlockBuildRequest<'_>) -> Self {
        Self {
            uri: request.uri.to_string(),
            family: request.family.to_string(),
            section: request.section.map(str::to_string),
            yaw: request.rotation.yaw.degrees(),
            pitch: request.rotation.pitch.degrees(),
            roll: request.rotation.roll.degrees(),
        }
    }
}

/// Builds plain blocks and records every request, failing on chosen
/// sections.
#[derive(Debug, Default, Clone)]
pub struct RecordingBuilder {
    records: Vec<BuildRecord>,
    failing_sections: BTreeSet<String>,
}

impl RecordingBuilder {
    /// Builder that never fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every request for `section`.
    pub fn fail_on(mut self, section: impl Into<String>) -> Self {
        self.failing_sections.insert(section.into());
        self
    }

    /// Requests seen so far, failed ones included.
    pub fn records(&self) -> &[BuildRecord] {
        &self.records
    }

    /// Forget recorded requests.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl BlockBuilder for RecordingBuilder {
    fn construct_block(&mut self, request: BlockBuildRequest<'_>) -> Result<Block> {
        let record = BuildRecord::from(&request);
        trace!(uri = %record.uri, section = ?record.section, "build request");
        self.records.push(record);
        if let Some(section) = request.section {
            if self.failing_sections.contains(section) {
                bail!("section `{section}` is configured to fail");
            }
        }
        Ok(request.to_block())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terablock_core::{BlockUri, Rotation, Yaw};
    use terablock_world::BlockFamilyDefinition;

    #[test]
    fn records_and_fails_on_request() {
        let family = BlockUri::parse("engine:torch").unwrap();
        let uri = family.with_identifier("LEFT").unwrap();
        let definition = BlockFamilyDefinition::new(family.clone(), "attachedToSurface");
        let mut builder = RecordingBuilder::new().fail_on("top");

        let request = BlockBuildRequest {
            definition: &definition,
            section: Some("sides"),
            shape: None,
            rotation: Rotation::from_yaw(Yaw::Clockwise90),
            uri: &uri,
            family: &family,
        };
        let block = builder.construct_block(request).unwrap();
        assert_eq!(block.uri(), &uri);

        let failing = BlockBuildRequest {
            section: Some("top"),
            ..request
        };
        assert!(builder.construct_block(failing).is_err());

        let records = builder.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].uri, "engine:torch.LEFT");
        assert_eq!(records[0].yaw, 90);
        assert_eq!(records[1].section.as_deref(), Some("top"));
    }
}

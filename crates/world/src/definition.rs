//! Family definitions as loaded from content packs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use terablock_core::{BlockUri, Rotation, Side, SideFlags};

/// Which rotations a multi-connect registration is repeated over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationSet {
    /// Register the sides as given.
    #[default]
    None,
    /// The four yaw rotations.
    Horizontal,
    /// All 24 orientations.
    All,
}

impl RotationSet {
    /// The rotations in registration order.
    pub fn rotations(self) -> Vec<Rotation> {
        match self {
            RotationSet::None => vec![Rotation::NONE],
            RotationSet::Horizontal => Rotation::horizontal().to_vec(),
            RotationSet::All => Rotation::all(),
        }
    }
}

/// One `register_block` call of a multi-connect family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRegistration {
    /// Definition section the variants are built from.
    pub section: String,
    /// Connected sides of the unrotated variant.
    #[serde(default)]
    pub sides: Vec<Side>,
    /// Rotations to repeat the registration over.
    #[serde(default)]
    pub rotations: RotationSet,
}

impl ConnectionRegistration {
    /// Mask of the unrotated sides.
    pub fn mask(&self) -> SideFlags {
        SideFlags::from_sides(self.sides.iter().copied())
    }
}

/// Declarative description of a block family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockFamilyDefinition {
    /// Family URI (no identifier).
    pub uri: BlockUri,
    /// Family type id, resolved through the family library.
    pub family: String,
    /// Human-readable name for the family's blocks.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Free-form categories (stored lower-case).
    #[serde(default)]
    pub categories: BTreeSet<String>,
    /// Sections present in the source definition (`top`, `sides`, ...).
    #[serde(default)]
    pub sections: BTreeSet<String>,
    /// Shape to build the family with, for shape-capable families.
    #[serde(default)]
    pub shape: Option<String>,
    /// Sides a multi-connect family evaluates its neighbours on.
    #[serde(default)]
    pub connection_sides: Vec<Side>,
    /// Connected sides of a multi-connect family's archetype.
    #[serde(default)]
    pub archetype: Vec<Side>,
    /// Variant registrations of a multi-connect family.
    #[serde(default)]
    pub registrations: Vec<ConnectionRegistration>,
}

impl BlockFamilyDefinition {
    /// Minimal definition of the given family type.
    pub fn new(uri: BlockUri, family: impl Into<String>) -> Self {
        Self {
            uri,
            family: family.into(),
            display_name: None,
            categories: BTreeSet::new(),
            sections: BTreeSet::new(),
            shape: None,
            connection_sides: Vec::new(),
            archetype: Vec::new(),
            registrations: Vec::new(),
        }
    }

    /// Add sections.
    pub fn with_sections<I, S>(mut self, sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sections.extend(sections.into_iter().map(Into::into));
        self
    }

    /// Add categories.
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories.extend(
            categories
                .into_iter()
                .map(|c| c.into().to_ascii_lowercase()),
        );
        self
    }

    /// Set the shape.
    pub fn with_shape(mut self, shape: impl Into<String>) -> Self {
        self.shape = Some(shape.into());
        self
    }

    /// Set the multi-connect sides and archetype.
    pub fn with_connections(mut self, sides: &[Side], archetype: &[Side]) -> Self {
        self.connection_sides = sides.to_vec();
        self.archetype = archetype.to_vec();
        self
    }

    /// Append a multi-connect registration.
    pub fn with_registration(
        mut self,
        section: impl Into<String>,
        sides: &[Side],
        rotations: RotationSet,
    ) -> Self {
        self.registrations.push(ConnectionRegistration {
            section: section.into(),
            sides: sides.to_vec(),
            rotations,
        });
        self
    }

    /// Whether the definition declares `section`.
    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains(section)
    }

    /// Mask of [`BlockFamilyDefinition::connection_sides`].
    pub fn connection_mask(&self) -> SideFlags {
        SideFlags::from_sides(self.connection_sides.iter().copied())
    }

    /// Mask of [`BlockFamilyDefinition::archetype`].
    pub fn archetype_mask(&self) -> SideFlags {
        SideFlags::from_sides(self.archetype.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_json() {
        let json = r#"{
            "uri": "engine:fence",
            "family": "multiConnect",
            "connectionSides": ["left", "right", "front", "back"],
            "archetype": [],
            "registrations": [
                { "section": "post" },
                { "section": "end", "sides": ["front"], "rotations": "horizontal" }
            ]
        }"#;
        let def: BlockFamilyDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.uri.to_string(), "engine:fence");
        assert_eq!(def.connection_mask(), SideFlags::HORIZONTAL);
        assert_eq!(def.archetype_mask(), SideFlags::empty());
        assert_eq!(def.registrations.len(), 2);
        assert_eq!(def.registrations[0].rotations, RotationSet::None);
        assert_eq!(def.registrations[1].mask(), SideFlags::FRONT);
        assert_eq!(def.registrations[1].rotations.rotations().len(), 4);
    }

    #[test]
    fn builder_helpers() {
        let uri = BlockUri::parse("engine:torch").unwrap();
        let def = BlockFamilyDefinition::new(uri, "attachedToSurface")
            .with_sections(["top", "sides"])
            .with_categories(["Light"]);
        assert!(def.has_section("top"));
        assert!(!def.has_section("bottom"));
        assert!(def.categories.contains("light"));
    }

    #[test]
    fn rotation_sets() {
        assert_eq!(RotationSet::None.rotations(), vec![Rotation::NONE]);
        assert_eq!(RotationSet::All.rotations().len(), 24);
    }
}

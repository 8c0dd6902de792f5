//! Registry of family types, keyed by the type id used in definitions.

use crate::attached_to_surface::AttachedToSurfaceFamily;
use crate::block::BlockBuilder;
use crate::ceiling_supporting::CeilingSupportingHorizontalFamily;
use crate::connectivity::ConnectionCondition;
use crate::definition::BlockFamilyDefinition;
use crate::family::{BlockFamily, FamilyError};
use crate::horizontal::HorizontalFamily;
use crate::multi_connect::MultiConnectFamily;
use crate::symmetric::SymmetricFamily;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

/// Type id of [`SymmetricFamily`].
pub const SYMMETRIC: &str = "symmetric";
/// Type id of [`HorizontalFamily`].
pub const HORIZONTAL: &str = "horizontal";
/// Type id of [`AttachedToSurfaceFamily`].
pub const ATTACHED_TO_SURFACE: &str = "attachedToSurface";
/// Type id of [`CeilingSupportingHorizontalFamily`].
pub const CEILING_SUPPORTING_HORIZONTAL: &str = "ceilingSupportingHorizontal";
/// Conventional type id of [`MultiConnectFamily`].
pub const MULTI_CONNECT: &str = "multiConnect";

/// Outcome of building one family.
pub type FamilyResult = Result<Box<dyn BlockFamily>, FamilyError>;

/// Builds a family from its definition.
pub type FamilyFactory =
    Box<dyn Fn(&BlockFamilyDefinition, &mut dyn BlockBuilder) -> FamilyResult + Send + Sync>;

/// Maps family type ids to factories.
#[derive(Default)]
pub struct BlockFamilyLibrary {
    factories: BTreeMap<String, FamilyFactory>,
}

impl BlockFamilyLibrary {
    /// Library with no family types.
    pub fn new() -> Self {
        Self::default()
    }

    /// Library with the orientation families registered.
    ///
    /// Multi-connect families need a neighbour condition and are added with
    /// [`BlockFamilyLibrary::register_multi_connect`].
    pub fn with_defaults() -> Self {
        let mut library = Self::new();
        library.register(SYMMETRIC, |def, builder| {
            Ok(Box::new(SymmetricFamily::new(def, builder)?))
        });
        library.register(HORIZONTAL, |def, builder| {
            Ok(Box::new(HorizontalFamily::new(def, builder)?))
        });
        library.register(ATTACHED_TO_SURFACE, |def, builder| {
            Ok(Box::new(AttachedToSurfaceFamily::new(def, builder)?))
        });
        library.register(CEILING_SUPPORTING_HORIZONTAL, |def, builder| {
            Ok(Box::new(CeilingSupportingHorizontalFamily::new(def, builder)?))
        });
        library
    }

    /// Register `factory` under `id`, replacing any previous one.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn(&BlockFamilyDefinition, &mut dyn BlockBuilder) -> FamilyResult
            + Send
            + Sync
            + 'static,
    {
        let id = id.into();
        if self.factories.insert(id.clone(), Box::new(factory)).is_some() {
            debug!(family_type = %id, "replaced block family factory");
        }
    }

    /// Register multi-connect families under `id`, all sharing `condition`.
    pub fn register_multi_connect(
        &mut self,
        id: impl Into<String>,
        condition: Arc<dyn ConnectionCondition>,
    ) {
        self.register(id, move |def, builder| {
            Ok(Box::new(MultiConnectFamily::from_definition(
                def,
                builder,
                Arc::clone(&condition),
            )?))
        });
    }

    /// Remove the factory registered under `id`.
    pub fn unregister(&mut self, id: &str) -> bool {
        self.factories.remove(id).is_some()
    }

    /// Whether a factory is registered under `id`.
    pub fn is_registered(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Registered type ids, sorted.
    pub fn family_types(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build the family `definition` describes.
    pub fn try_create_family(
        &self,
        definition: &BlockFamilyDefinition,
        builder: &mut dyn BlockBuilder,
    ) -> Result<Box<dyn BlockFamily>, FamilyError> {
        let factory = self
            .factories
            .get(&definition.family)
            .ok_or_else(|| FamilyError::UnknownFamilyType(definition.family.clone()))?;
        factory(definition, builder)
    }

    /// Build the family `definition` describes, logging and discarding any
    /// error.
    pub fn create_family(
        &self,
        definition: &BlockFamilyDefinition,
        builder: &mut dyn BlockBuilder,
    ) -> Option<Box<dyn BlockFamily>> {
        match self.try_create_family(definition, builder) {
            Ok(family) => Some(family),
            Err(err) => {
                error!(
                    family = %definition.uri,
                    family_type = %definition.family,
                    error = %err,
                    "failed to create block family"
                );
                None
            }
        }
    }
}

impl fmt::Debug for BlockFamilyLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockFamilyLibrary")
            .field("family_types", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::DefaultBlockBuilder;
    use crate::connectivity::NeverConnects;
    use crate::definition::RotationSet;
    use terablock_core::{BlockUri, Side};

    fn def(uri: &str, family: &str) -> BlockFamilyDefinition {
        BlockFamilyDefinition::new(BlockUri::parse(uri).unwrap(), family)
    }

    #[test]
    fn defaults_cover_orientation_families() {
        let library = BlockFamilyLibrary::with_defaults();
        let types: Vec<&str> = library.family_types().collect();
        assert_eq!(
            types,
            vec![ATTACHED_TO_SURFACE, CEILING_SUPPORTING_HORIZONTAL, HORIZONTAL, SYMMETRIC]
        );
        assert!(!library.is_registered(MULTI_CONNECT));

        let family = library
            .create_family(&def("engine:chest", HORIZONTAL), &mut DefaultBlockBuilder)
            .unwrap();
        assert_eq!(family.blocks().len(), 4);
    }

    #[test]
    fn unknown_type_is_an_error() {
        let library = BlockFamilyLibrary::with_defaults();
        let err = library
            .try_create_family(&def("engine:pipe", MULTI_CONNECT), &mut DefaultBlockBuilder)
            .err()
            .unwrap();
        assert!(matches!(err, FamilyError::UnknownFamilyType(ref id) if id == MULTI_CONNECT));
        assert!(library
            .create_family(&def("engine:pipe", MULTI_CONNECT), &mut DefaultBlockBuilder)
            .is_none());
    }

    #[test]
    fn multi_connect_registration() {
        let mut library = BlockFamilyLibrary::with_defaults();
        library.register_multi_connect(MULTI_CONNECT, Arc::new(NeverConnects));
        let fence = def("engine:fence", MULTI_CONNECT)
            .with_connections(&Side::HORIZONTAL, &[])
            .with_registration("post", &[], RotationSet::None);
        let family = library.create_family(&fence, &mut DefaultBlockBuilder).unwrap();
        assert_eq!(family.archetype_block().identifier(), Some("0"));
    }

    #[test]
    fn construction_errors_are_swallowed_by_create() {
        let library = BlockFamilyLibrary::with_defaults();
        let torch = def("engine:torch", ATTACHED_TO_SURFACE).with_sections(["bottom"]);
        assert!(library.create_family(&torch, &mut DefaultBlockBuilder).is_none());
        assert!(matches!(
            library.try_create_family(&torch, &mut DefaultBlockBuilder),
            Err(FamilyError::MissingSection { .. })
        ));
    }

    #[test]
    fn unregister_removes_factory() {
        let mut library = BlockFamilyLibrary::with_defaults();
        assert!(library.unregister(SYMMETRIC));
        assert!(!library.unregister(SYMMETRIC));
        assert!(!library.is_registered(SYMMETRIC));
    }
}

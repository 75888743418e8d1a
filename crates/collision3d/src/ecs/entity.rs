//! Entity implementation

use slotmap::{Key, KeyData};

slotmap::new_key_type! {
    /// Generational arena key behind an [`Entity`]
    pub struct EntityKey;
}

/// Entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    key: EntityKey,
}

impl Entity {
    /// Wrap an arena key
    pub(super) fn new(key: EntityKey) -> Self {
        Self { key }
    }

    /// Arena key for component storage lookups
    pub(super) fn key(self) -> EntityKey {
        self.key
    }

    /// Stable numeric id, unique among live and removed entities of a world
    pub fn id(&self) -> u64 {
        self.key.data().as_ffi()
    }

    /// Rebuild an entity from [`Entity::id`]
    pub fn from_id(id: u64) -> Self {
        Self {
            key: KeyData::from_ffi(id).into(),
        }
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.id())
    }
}

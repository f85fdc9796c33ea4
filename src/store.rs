use crate::error::{StorefrontError, StorefrontResult};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

/// Primary key of a persisted entity.
///
/// Numeric keys are stored big-endian so a tree scan yields ascending ids.
pub trait EntityKey: Clone + PartialEq + Display + FromStr + Send + Sync + 'static {
    fn to_key(&self) -> Vec<u8>;
}

impl EntityKey for u64 {
    fn to_key(&self) -> Vec<u8> {
        self.to_be_bytes().to_vec()
    }
}

impl EntityKey for String {
    fn to_key(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

/// A record kept in its own sled tree, serialized as JSON.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    type Id: EntityKey;
    /// Name of the sled tree holding this entity
    const TREE: &'static str;
    /// Human readable name used in error messages and logs
    const KIND: &'static str;

    fn id(&self) -> Self::Id;
    fn set_id(&mut self, id: Self::Id);
}

/// Implements [`Entity`] for a struct with a numeric `id` field.
macro_rules! numeric_entity {
    ($ty:ty, $tree:literal, $kind:literal) => {
        impl $crate::store::Entity for $ty {
            type Id = u64;
            const TREE: &'static str = $tree;
            const KIND: &'static str = $kind;

            fn id(&self) -> u64 {
                self.id
            }

            fn set_id(&mut self, id: u64) {
                self.id = id;
            }
        }
    };
}
pub(crate) use numeric_entity;

/// sled-backed entity store. Cloning is cheap and shares the database.
#[derive(Clone)]
pub struct Store {
    db: sled::Db,
}

impl Store {
    pub fn open<P: AsRef<Path>>(path: P) -> StorefrontResult<Self> {
        let db = sled::open(path)?;
        Ok(Store { db })
    }

    /// A store that is deleted when dropped.
    pub fn temporary() -> StorefrontResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Store { db })
    }

    fn tree<E: Entity>(&self) -> StorefrontResult<sled::Tree> {
        Ok(self.db.open_tree(E::TREE)?)
    }

    pub fn get<E: Entity>(&self, id: &E::Id) -> StorefrontResult<Option<E>> {
        match self.tree::<E>()?.get(id.to_key())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Like [`Store::get`] but a miss is [`StorefrontError::NotFound`].
    pub fn fetch<E: Entity>(&self, id: &E::Id) -> StorefrontResult<E> {
        self.get(id)?
            .ok_or_else(|| StorefrontError::not_found(E::KIND, id))
    }

    pub fn all<E: Entity>(&self) -> StorefrontResult<Vec<E>> {
        self.filter(|_: &E| true)
    }

    pub fn filter<E: Entity, F>(&self, predicate: F) -> StorefrontResult<Vec<E>>
    where
        F: Fn(&E) -> bool,
    {
        let mut items = Vec::new();
        for entry in self.tree::<E>()?.iter() {
            let (_, bytes) = entry?;
            let item: E = serde_json::from_slice(&bytes)?;
            if predicate(&item) {
                items.push(item);
            }
        }
        Ok(items)
    }

    /// Insert or overwrite an entity under its current id.
    pub fn save<E: Entity>(&self, entity: &E) -> StorefrontResult<()> {
        let bytes = serde_json::to_vec(entity)?;
        self.tree::<E>()?.insert(entity.id().to_key(), bytes)?;
        self.db.flush()?;
        Ok(())
    }

    /// Assign a fresh id to a numerically keyed entity and persist it.
    pub fn create<E: Entity<Id = u64>>(&self, mut entity: E) -> StorefrontResult<E> {
        entity.set_id(self.next_id()?);
        self.save(&entity)?;
        Ok(entity)
    }

    /// Returns whether an entity was actually removed.
    pub fn remove<E: Entity>(&self, id: &E::Id) -> StorefrontResult<bool> {
        let removed = self.tree::<E>()?.remove(id.to_key())?.is_some();
        self.db.flush()?;
        Ok(removed)
    }

    /// Monotonic ids shared by every tree, starting at 1.
    pub fn next_id(&self) -> StorefrontResult<u64> {
        Ok(self.db.generate_id()? + 1)
    }
}

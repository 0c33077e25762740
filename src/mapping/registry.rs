//! # Type Registry
//!
//! Maps a Rust type to the converter used for it by the mapping engine.
//!
//! One process-wide registry exists for the life of the process
//! ([`TypeRegistry::global`]); independent instances can be created with
//! [`TypeRegistry::new`] and share nothing with the global one or with each other.
//!
//! ## Thread Safety
//! All operations take `&self` and synchronize internally, so a registry can be
//! shared through an `Arc` and mutated from several threads. A panic while the
//! lock is held never poisons later calls.

use crate::core::tag::Tag;
use crate::error::Result;
use crate::mapping::context::MappingContext;
use once_cell::sync::Lazy;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Converts values of one type to and from tags.
///
/// Converters registered for a type take priority over every built-in rule.
pub trait TagConverter<T>: Send + Sync {
    fn to_tag(&self, value: &T, ctx: &MappingContext<'_>) -> Result<Tag>;

    fn from_tag(&self, tag: &Tag, ctx: &MappingContext<'_>) -> Result<T>;
}

struct Registration {
    type_name: &'static str,
    // Always an `Arc<dyn TagConverter<T>>` for the keyed type
    converter: Box<dyn Any + Send + Sync>,
}

/// Thread-safe map from type identity to converter
pub struct TypeRegistry {
    handlers: RwLock<HashMap<TypeId, Registration>>,
}

static GLOBAL: Lazy<Arc<TypeRegistry>> = Lazy::new(|| Arc::new(TypeRegistry::new()));

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// An empty registry, unrelated to the global one
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// The process-wide default registry
    pub fn global() -> Arc<TypeRegistry> {
        Arc::clone(&GLOBAL)
    }

    /// Register `converter` for `T`, returning true if it replaced another
    pub fn register<T, C>(&self, converter: C) -> bool
    where
        T: 'static,
        C: TagConverter<T> + 'static,
    {
        self.register_arc::<T>(Arc::new(converter))
    }

    /// Register a shared converter for `T`, returning true if it replaced another
    pub fn register_arc<T: 'static>(&self, converter: Arc<dyn TagConverter<T>>) -> bool {
        let registration = Registration {
            type_name: type_name::<T>(),
            converter: Box::new(converter),
        };
        let replaced = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(TypeId::of::<T>(), registration)
            .is_some();
        debug!(type_name = type_name::<T>(), replaced, "Converter registered");
        replaced
    }

    /// Remove the converter for `T`
    pub fn unregister<T: 'static>(&self) -> bool {
        self.unregister_type(TypeId::of::<T>())
    }

    /// Remove the converter for a type id
    pub fn unregister_type(&self, type_id: TypeId) -> bool {
        let removed = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&type_id);
        if let Some(registration) = &removed {
            debug!(type_name = registration.type_name, "Converter unregistered");
        }
        removed.is_some()
    }

    /// The converter registered for `T`, if any
    pub fn get<T: 'static>(&self) -> Option<Arc<dyn TagConverter<T>>> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<T>())
            .and_then(|registration| {
                registration
                    .converter
                    .downcast_ref::<Arc<dyn TagConverter<T>>>()
                    .cloned()
            })
    }

    pub fn has<T: 'static>(&self) -> bool {
        self.has_type(TypeId::of::<T>())
    }

    pub fn has_type(&self, type_id: TypeId) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&type_id)
    }

    /// Remove every converter
    pub fn clear(&self) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of registered converters
    pub fn count(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Names of the registered types, sorted
    pub fn registered_type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|registration| registration.type_name)
            .collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.registered_type_names())
            .finish()
    }
}

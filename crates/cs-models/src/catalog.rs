//! Catalog-based model loader.

use std::collections::HashMap;

use cs_backend::{BackendError, BackendResult, ModelDescriptor, ModelInstance, ModelLoader};

type ModelFactory = Box<dyn Fn(&ModelDescriptor) -> BackendResult<Box<dyn ModelInstance>>>;

/// Loader that maps descriptor URIs to registered factories.
///
/// Plays the role of a backend's model manager: the master hands it a
/// descriptor, the catalog hands back an uninitialized instance. Factories
/// capture their own model parameters at registration time.
#[derive(Default)]
pub struct ModelCatalog {
    factories: HashMap<String, ModelFactory>,
}

impl ModelCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for a URI; replaces any previous registration.
    pub fn register<F>(&mut self, uri: impl Into<String>, factory: F)
    where
        F: Fn(&ModelDescriptor) -> BackendResult<Box<dyn ModelInstance>> + 'static,
    {
        self.factories.insert(uri.into(), Box::new(factory));
    }

    /// Number of registered factories.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether the catalog has no factories.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl ModelLoader for ModelCatalog {
    fn load(&self, descriptor: &ModelDescriptor) -> BackendResult<Box<dyn ModelInstance>> {
        match self.factories.get(&descriptor.uri) {
            Some(factory) => factory(descriptor),
            None => Err(BackendError::Load {
                uri: descriptor.uri.clone(),
                name: descriptor.name.clone(),
                reason: "no factory registered for this URI".to_string(),
            }),
        }
    }
}

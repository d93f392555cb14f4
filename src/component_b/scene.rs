//! scene.rs
//! Host scene-graph access, reduced to what the actuator writer needs.
//!
//! The host supplies a [`Stage`] at construction; [`InMemoryStage`] stands in for it
//! in tests and in the demo host.

use std::collections::HashMap;

use crate::error::SceneError;

/// Typed attribute payloads written by the behavior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttrValue {
    Float(f64),
    Vec3f([f32; 3]),
    Vec3d([f64; 3]),
}

/// Path-addressed prims carrying named attributes.
pub trait Stage {
    /// Whether a prim exists at `path`.
    fn resolve(&self, path: &str) -> bool;

    /// Set (or author) attribute `name` on the prim at `path`.
    fn set_attribute(&mut self, path: &str, name: &str, value: AttrValue) -> Result<(), SceneError>;
}

impl<S: Stage + ?Sized> Stage for &mut S {
    fn resolve(&self, path: &str) -> bool {
        (**self).resolve(path)
    }

    fn set_attribute(&mut self, path: &str, name: &str, value: AttrValue) -> Result<(), SceneError> {
        (**self).set_attribute(path, name, value)
    }
}

/// HashMap-backed stage. Prims must be declared before they can be written.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStage {
    prims: HashMap<String, HashMap<String, AttrValue>>,
    writes: u64,
}

impl InMemoryStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prims<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let mut stage = Self::new();
        for path in paths {
            stage.define_prim(path);
        }
        stage
    }

    pub fn define_prim(&mut self, path: impl Into<String>) {
        self.prims.entry(path.into()).or_default();
    }

    pub fn remove_prim(&mut self, path: &str) {
        self.prims.remove(path);
    }

    pub fn attribute(&self, path: &str, name: &str) -> Option<AttrValue> {
        self.prims.get(path)?.get(name).copied()
    }

    /// Successful writes since creation.
    pub fn write_count(&self) -> u64 {
        self.writes
    }
}

impl Stage for InMemoryStage {
    fn resolve(&self, path: &str) -> bool {
        self.prims.contains_key(path)
    }

    fn set_attribute(&mut self, path: &str, name: &str, value: AttrValue) -> Result<(), SceneError> {
        let prim = self
            .prims
            .get_mut(path)
            .ok_or_else(|| SceneError::MissingPrim(path.to_string()))?;
        prim.insert(name.to_string(), value);
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_to_declared_prim() {
        let mut stage = InMemoryStage::with_prims(["/A"]);
        stage.set_attribute("/A", "x", AttrValue::Float(1.5)).unwrap();
        assert_eq!(stage.attribute("/A", "x"), Some(AttrValue::Float(1.5)));
        assert_eq!(stage.write_count(), 1);
    }

    #[test]
    fn unknown_prim_is_an_error() {
        let mut stage = InMemoryStage::new();
        assert_eq!(
            stage.set_attribute("/Nope", "x", AttrValue::Float(0.0)),
            Err(SceneError::MissingPrim("/Nope".into()))
        );
        assert!(!stage.resolve("/Nope"));
    }

    #[test]
    fn mutable_reference_is_a_stage() {
        fn zero_rotation<S: Stage>(mut stage: S) {
            stage.set_attribute("/A", "y", AttrValue::Vec3d([0.0; 3])).unwrap();
        }

        let mut stage = InMemoryStage::with_prims(["/A"]);
        zero_rotation(&mut stage);
        assert!(stage.attribute("/A", "y").is_some());
    }
}

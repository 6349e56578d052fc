//! Component type registry
//!
//! Maps the type names stored in scene documents to constructors.

use super::component::{Component, ComponentLoadContext, ComponentType};
use super::SceneError;
use std::collections::BTreeMap;
use std::fmt;

type Constructor = fn(&serde_json::Value, &ComponentLoadContext<'_>) -> Result<Box<dyn Component>, SceneError>;

fn construct<T: ComponentType>(
    value: &serde_json::Value,
    ctx: &ComponentLoadContext<'_>,
) -> Result<Box<dyn Component>, SceneError> {
    Ok(Box::new(T::from_value(value, ctx)?))
}

/// Type name -> constructor table used when loading scenes
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    constructors: BTreeMap<&'static str, Constructor>,
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.constructors.keys()).finish()
    }
}

impl ComponentRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in component
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        crate::components::register_builtin(&mut registry);
        registry
    }

    /// Register `T` under [`ComponentType::TYPE_NAME`]; re-registering replaces
    pub fn register<T: ComponentType>(&mut self) -> &mut Self {
        self.constructors.insert(T::TYPE_NAME, construct::<T>);
        self
    }

    /// Build a component from its document payload
    pub fn create(
        &self,
        type_name: &str,
        payload: &serde_json::Value,
        ctx: &ComponentLoadContext<'_>,
    ) -> Result<Box<dyn Component>, SceneError> {
        let constructor = self
            .constructors
            .get(type_name)
            .ok_or_else(|| SceneError::UnknownComponentType(type_name.to_string()))?;
        constructor(payload, ctx)
    }

    /// True if `type_name` is registered
    pub fn contains(&self, type_name: &str) -> bool {
        self.constructors.contains_key(type_name)
    }

    /// Registered names in sorted order
    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.constructors.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ResourceManager;

    #[derive(Debug, PartialEq)]
    struct Counter(u64);

    impl Component for Counter {
        fn type_name(&self) -> &'static str {
            Self::TYPE_NAME
        }

        fn to_value(&self) -> Result<serde_json::Value, SceneError> {
            Ok(serde_json::json!(self.0))
        }
    }

    impl ComponentType for Counter {
        const TYPE_NAME: &'static str = "Counter";

        fn from_value(value: &serde_json::Value, _ctx: &ComponentLoadContext<'_>) -> Result<Self, SceneError> {
            value.as_u64().map(Self).ok_or_else(|| SceneError::InvalidComponent {
                component: Self::TYPE_NAME.to_string(),
                reason: "expected an integer".to_string(),
            })
        }
    }

    #[test]
    fn test_create_registered_type() {
        let mut registry = ComponentRegistry::new();
        registry.register::<Counter>();
        let resources = ResourceManager::default();
        let ctx = ComponentLoadContext::new(&resources);

        let component = registry.create("Counter", &serde_json::json!(4), &ctx).unwrap();
        assert_eq!(component.type_name(), "Counter");
        assert_eq!((*component).as_any().downcast_ref::<Counter>(), Some(&Counter(4)));
    }

    #[test]
    fn test_unknown_type_fails() {
        let registry = ComponentRegistry::new();
        let resources = ResourceManager::default();
        let ctx = ComponentLoadContext::new(&resources);
        assert!(matches!(
            registry.create("Nope", &serde_json::Value::Null, &ctx),
            Err(SceneError::UnknownComponentType(name)) if name == "Nope"
        ));
    }

    #[test]
    fn test_builtin_names() {
        let registry = ComponentRegistry::with_builtin();
        for name in ["Camera", "RenderComponent", "CharacterMovement", "EnemyPatrol", "RigidBody", "TriggerVolume"] {
            assert!(registry.contains(name), "{name} missing");
        }
    }
}

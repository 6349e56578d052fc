//! Game objects: named, positioned owners of components
//!
//! A game object's transform is local to its parent. World transforms are
//! composed by the owning [`Scene`](super::Scene), which knows the parent
//! chain; the object itself only caches its local TRS matrix, rebuilt
//! whenever a setter changes position, rotation or scale.

use super::component::{Component, ComponentState};
use super::SceneError;
use crate::foundation::math::{compose_trs, Mat4, Vec3};
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use std::any::TypeId;
use std::fmt;

new_key_type! {
    /// Runtime handle to a game object inside one scene
    pub struct GameObjectId;
}

/// Persistent game object identifier written to scene documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectGuid(u64);

impl ObjectGuid {
    /// Wrap a raw guid
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object#{}", self.0)
    }
}

/// One attached component plus its per-attachment state
pub(crate) struct ComponentSlot {
    type_id: TypeId,
    type_name: &'static str,
    pub(crate) enabled: bool,
    pub(crate) state: ComponentState,
    /// `None` only while the component's own hook is running
    component: Option<Box<dyn Component>>,
}

impl fmt::Debug for ComponentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentSlot")
            .field("type_name", &self.type_name)
            .field("enabled", &self.enabled)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// A positioned entity owning an ordered set of components
#[derive(Debug)]
pub struct GameObject {
    name: String,
    guid: ObjectGuid,
    position: Vec3,
    rotation: Vec3,
    scale: Vec3,
    local: Mat4,
    parent: Option<GameObjectId>,
    components: Vec<ComponentSlot>,
}

impl GameObject {
    pub(crate) fn new(name: impl Into<String>, guid: ObjectGuid) -> Self {
        Self {
            name: name.into(),
            guid,
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::repeat(1.0),
            local: Mat4::identity(),
            parent: None,
            components: Vec::new(),
        }
    }

    /// Display name (not unique)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the object
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Persistent identifier
    pub fn guid(&self) -> ObjectGuid {
        self.guid
    }

    /// Local position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Local rotation as Euler angles in degrees
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Local scale
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Set local position
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.rebuild_local();
    }

    /// Set local rotation (Euler degrees, applied X then Y then Z)
    pub fn set_rotation(&mut self, degrees: Vec3) {
        self.rotation = degrees;
        self.rebuild_local();
    }

    /// Set local scale
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.rebuild_local();
    }

    /// Local translation * rotation * scale
    pub fn local_transform(&self) -> &Mat4 {
        &self.local
    }

    /// Parent object, if any
    pub fn parent(&self) -> Option<GameObjectId> {
        self.parent
    }

    pub(crate) fn set_parent_unchecked(&mut self, parent: Option<GameObjectId>) {
        self.parent = parent;
    }

    fn rebuild_local(&mut self) {
        self.local = compose_trs(&self.position, &self.rotation, &self.scale);
    }

    /// Attach a component
    ///
    /// At most one component of each concrete type may be attached.
    /// Configure the component fully before attaching it; use
    /// [`get_mut`](Self::get_mut) to reach it afterwards.
    pub fn add<T: Component>(&mut self, component: T) -> Result<(), SceneError> {
        self.add_boxed(Box::new(component), true)
    }

    /// Attach an already boxed component
    pub fn add_boxed(&mut self, component: Box<dyn Component>, enabled: bool) -> Result<(), SceneError> {
        // Deref first: `Box<dyn Component>` is itself `Any`
        let type_id = (*component).as_any().type_id();
        let type_name = component.type_name();
        if self.components.iter().any(|slot| slot.type_id == type_id) {
            return Err(SceneError::DuplicateComponent {
                object: self.name.clone(),
                component: type_name,
            });
        }

        log::trace!("Attached {} to '{}'", type_name, self.name);
        self.components.push(ComponentSlot {
            type_id,
            type_name,
            enabled,
            state: ComponentState::AwakePending,
            component: Some(component),
        });
        Ok(())
    }

    /// Attached component of type `T`
    pub fn get<T: Component>(&self) -> Option<&T> {
        self.slot::<T>()?.component.as_deref()?.as_any().downcast_ref::<T>()
    }

    /// Attached component of type `T`, mutably
    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        let index = self.slot_index(TypeId::of::<T>())?;
        self.components[index]
            .component
            .as_deref_mut()?
            .as_any_mut()
            .downcast_mut::<T>()
    }

    /// True if a component of type `T` is attached
    pub fn has<T: Component>(&self) -> bool {
        self.slot::<T>().is_some()
    }

    /// Detach and drop the component of type `T`
    pub fn remove<T: Component>(&mut self) -> bool {
        match self.slot_index(TypeId::of::<T>()) {
            Some(index) => {
                let slot = self.components.remove(index);
                log::trace!("Removed {} from '{}'", slot.type_name, self.name);
                true
            }
            None => false,
        }
    }

    /// Enable or disable the component of type `T`; false if absent
    pub fn set_enabled<T: Component>(&mut self, enabled: bool) -> bool {
        match self.slot_index(TypeId::of::<T>()) {
            Some(index) => {
                self.components[index].enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Whether the component of type `T` is enabled
    pub fn is_enabled<T: Component>(&self) -> Option<bool> {
        self.slot::<T>().map(|slot| slot.enabled)
    }

    /// Number of attached components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Type names in attachment order
    pub fn component_type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.components.iter().map(|slot| slot.type_name)
    }

    /// Attached components with their enabled flag, in attachment order
    pub fn components(&self) -> impl Iterator<Item = (&dyn Component, bool)> + '_ {
        self.components
            .iter()
            .filter_map(|slot| slot.component.as_deref().map(|c| (c, slot.enabled)))
    }

    fn slot<T: Component>(&self) -> Option<&ComponentSlot> {
        let type_id = TypeId::of::<T>();
        self.components.iter().find(|slot| slot.type_id == type_id)
    }

    fn slot_index(&self, type_id: TypeId) -> Option<usize> {
        self.components.iter().position(|slot| slot.type_id == type_id)
    }

    /// Type ids in attachment order
    pub(crate) fn component_type_ids(&self) -> Vec<TypeId> {
        self.components.iter().map(|slot| slot.type_id).collect()
    }

    pub(crate) fn slot_by_type(&self, type_id: TypeId) -> Option<&ComponentSlot> {
        self.components.iter().find(|slot| slot.type_id == type_id)
    }

    pub(crate) fn slot_by_type_mut(&mut self, type_id: TypeId) -> Option<&mut ComponentSlot> {
        self.components.iter_mut().find(|slot| slot.type_id == type_id)
    }

    /// Take a component out of its slot so it can borrow its owner mutably
    pub(crate) fn take_component(&mut self, type_id: TypeId) -> Option<Box<dyn Component>> {
        self.slot_by_type_mut(type_id)?.component.take()
    }

    /// Put a taken component back; dropped if its slot was removed meanwhile
    pub(crate) fn restore_component(&mut self, type_id: TypeId, component: Box<dyn Component>) {
        if let Some(slot) = self.slot_by_type_mut(type_id) {
            slot.component = Some(component);
        }
    }

    pub(crate) fn mutate_slots(&mut self) -> impl Iterator<Item = &mut ComponentSlot> + '_ {
        self.components.iter_mut()
    }
}

impl ComponentSlot {
    pub(crate) fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn component(&self) -> Option<&dyn Component> {
        self.component.as_deref()
    }

    pub(crate) fn component_mut(&mut self) -> Option<&mut (dyn Component + 'static)> {
        self.component.as_deref_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::component::ComponentContext;
    use approx::assert_relative_eq;

    #[derive(Debug, Default)]
    struct Marker(u32);

    impl Component for Marker {
        fn type_name(&self) -> &'static str {
            "Marker"
        }

        fn update(&mut self, _ctx: &mut ComponentContext<'_>) {
            self.0 += 1;
        }

        fn to_value(&self) -> Result<serde_json::Value, SceneError> {
            Ok(serde_json::json!(self.0))
        }
    }

    #[derive(Debug, Default)]
    struct Other;

    impl Component for Other {
        fn type_name(&self) -> &'static str {
            "Other"
        }

        fn to_value(&self) -> Result<serde_json::Value, SceneError> {
            Ok(serde_json::Value::Null)
        }
    }

    #[test]
    fn test_default_transform() {
        let object = GameObject::new("thing", ObjectGuid::new(1));
        assert_eq!(object.position(), Vec3::zeros());
        assert_eq!(object.rotation(), Vec3::zeros());
        assert_eq!(object.scale(), Vec3::repeat(1.0));
        assert_eq!(*object.local_transform(), Mat4::identity());
    }

    #[test]
    fn test_setters_rebuild_local_matrix() {
        let mut object = GameObject::new("thing", ObjectGuid::new(1));
        object.set_position(Vec3::new(1.0, 2.0, 3.0));
        object.set_scale(Vec3::repeat(2.0));
        let local = object.local_transform();
        assert_relative_eq!(local.m14, 1.0);
        assert_relative_eq!(local.m34, 3.0);
        assert_relative_eq!(local.m11, 2.0);
    }

    #[test]
    fn test_one_component_per_type() {
        let mut object = GameObject::new("thing", ObjectGuid::new(1));
        object.add(Marker(3)).unwrap();
        object.add(Other).unwrap();
        assert!(matches!(
            object.add(Marker(4)),
            Err(SceneError::DuplicateComponent { component: "Marker", .. })
        ));
        assert_eq!(object.get::<Marker>().unwrap().0, 3);
        assert_eq!(object.component_type_names().collect::<Vec<_>>(), vec!["Marker", "Other"]);
    }

    #[test]
    fn test_missing_component_is_none() {
        let mut object = GameObject::new("thing", ObjectGuid::new(1));
        assert!(object.get::<Marker>().is_none());
        assert!(object.get_mut::<Marker>().is_none());
        assert!(!object.remove::<Marker>());
        assert_eq!(object.is_enabled::<Marker>(), None);
    }

    #[test]
    fn test_remove_and_disable() {
        let mut object = GameObject::new("thing", ObjectGuid::new(1));
        object.add(Marker::default()).unwrap();
        object.add(Other).unwrap();
        assert!(object.set_enabled::<Other>(false));
        assert_eq!(object.is_enabled::<Other>(), Some(false));
        assert!(object.remove::<Marker>());
        assert!(!object.has::<Marker>());
        assert_eq!(object.component_count(), 1);
    }

    #[test]
    fn test_taken_component_is_invisible_until_restored() {
        let mut object = GameObject::new("thing", ObjectGuid::new(1));
        object.add(Marker(1)).unwrap();
        let type_id = TypeId::of::<Marker>();
        let taken = object.take_component(type_id).unwrap();
        assert!(object.get::<Marker>().is_none());
        object.restore_component(type_id, taken);
        assert_eq!(object.get::<Marker>().unwrap().0, 1);
    }
}

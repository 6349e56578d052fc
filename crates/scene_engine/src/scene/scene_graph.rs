//! The scene: aggregate root for objects, lights, environment and physics
//!
//! Objects live in a slot map and are iterated in creation order. Each tick
//! runs in fixed phases:
//!
//! 1. awake components that have not been awoken yet
//! 2. update every active component (creation order, then attachment order)
//! 3. push object poses into the physics world and step it
//! 4. copy dynamic bodies back to their objects
//! 5. diff trigger overlap sets and dispatch enter/leave hooks
//!
//! A hook runs with its component taken out of the owning object, so the
//! component and its owner can be borrowed mutably at the same time.

use super::component::{Component, ComponentContext, ComponentLoadContext, ComponentState, ObjectSummary, TriggerContact, WorldView};
use super::document::{ComponentRecord, GameObjectRecord, SceneDocument, SkyboxRecord, SCENE_VERSION};
use super::environment::{Environment, Light, RenderFlags, Skybox, MAX_LIGHTS};
use super::game_object::{GameObject, GameObjectId, ObjectGuid};
use super::registry::ComponentRegistry;
use super::render_frame::{DrawItem, RenderFrame};
use super::SceneError;
use crate::assets::{Asset, ColorLut, RenderQueue, ResourceManager, ShaderProgram, TextureCube};
use crate::components::{Camera, RenderComponent, RigidBody, TriggerVolume};
use crate::editor::Inspector;
use crate::foundation::math::{euler_degrees_to_quat, transform_point, translation_of, Mat4, Quat, Vec3};
use crate::input::InputSnapshot;
use crate::physics::{BodyDesc, BodyHandle, BodyKind, DebugDrawMode, PhysicsWorld, SimplePhysicsWorld};
use slotmap::SlotMap;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Which physics body of an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum BodyRole {
    Rigid,
    Trigger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Awake,
    Active,
}

/// Per-pass inputs shared by every hook
struct HookFrame<'a> {
    input: &'a InputSnapshot,
    delta_time: f32,
    world: &'a WorldView,
}

/// A level: objects, lights, camera, environment and physics
pub struct Scene {
    objects: SlotMap<GameObjectId, GameObject>,
    order: Vec<GameObjectId>,
    next_guid: u64,
    main_camera: GameObjectId,
    lights: Vec<Light>,
    light_capacity: usize,
    environment: Environment,
    physics: Box<dyn PhysicsWorld>,
    bodies: BTreeMap<(GameObjectId, BodyRole), BodyHandle>,
    body_owners: BTreeMap<BodyHandle, GameObjectId>,
    trigger_overlaps: BTreeMap<BodyHandle, BTreeSet<BodyHandle>>,
    is_active: bool,
    tick: u64,
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("objects", &self.order.len())
            .field("main_camera", &self.main_camera)
            .field("lights", &self.lights.len())
            .field("bodies", &self.bodies.len())
            .field("is_active", &self.is_active)
            .field("tick", &self.tick)
            .finish_non_exhaustive()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Empty scene with a "Main Camera" object and the built-in physics
    pub fn new() -> Self {
        Self::with_physics(Box::new(SimplePhysicsWorld::new()))
    }

    /// Empty scene with a "Main Camera" object and a custom physics backend
    pub fn with_physics(physics: Box<dyn PhysicsWorld>) -> Self {
        let mut scene = Self::bare(physics);
        let camera = scene.create_game_object("Main Camera");
        if let Some(object) = scene.objects.get_mut(camera) {
            let attached = object.add(Camera::default());
            debug_assert!(attached.is_ok());
        }
        scene.main_camera = camera;
        log::debug!("Created scene");
        scene
    }

    /// Scene without any objects; the main camera must be assigned before use
    fn bare(physics: Box<dyn PhysicsWorld>) -> Self {
        Self {
            objects: SlotMap::with_key(),
            order: Vec::new(),
            next_guid: 1,
            main_camera: GameObjectId::default(),
            lights: Vec::new(),
            light_capacity: MAX_LIGHTS,
            environment: Environment::default(),
            physics,
            bodies: BTreeMap::new(),
            body_owners: BTreeMap::new(),
            trigger_overlaps: BTreeMap::new(),
            is_active: false,
            tick: 0,
        }
    }

    // ---------------------------------------------------------------------
    // Objects
    // ---------------------------------------------------------------------

    /// Create an object at the origin, appended to the update order
    pub fn create_game_object(&mut self, name: impl Into<String>) -> GameObjectId {
        let guid = ObjectGuid::new(self.next_guid);
        self.next_guid += 1;
        self.insert_object(GameObject::new(name, guid))
    }

    fn insert_object(&mut self, object: GameObject) -> GameObjectId {
        log::trace!("Creating game object '{}' ({})", object.name(), object.guid());
        let id = self.objects.insert(object);
        self.order.push(id);
        id
    }

    /// Destroy an object, its descendants and their components immediately
    pub fn destroy_game_object(&mut self, id: GameObjectId) -> Result<(), SceneError> {
        if !self.objects.contains_key(id) {
            return Err(SceneError::UnknownObject(id));
        }

        let doomed: Vec<GameObjectId> = self
            .order
            .iter()
            .copied()
            .filter(|candidate| *candidate == id || self.is_ancestor(id, *candidate))
            .collect();

        if doomed.contains(&self.main_camera) {
            return Err(SceneError::MainCameraRemoval {
                name: self.object_name(self.main_camera),
            });
        }

        for victim in &doomed {
            self.unregister_bodies_of(*victim);
            if let Some(object) = self.objects.remove(*victim) {
                log::debug!("Destroyed game object '{}'", object.name());
            }
        }
        self.order.retain(|candidate| !doomed.contains(candidate));
        Ok(())
    }

    /// Object by id
    pub fn object(&self, id: GameObjectId) -> Option<&GameObject> {
        self.objects.get(id)
    }

    /// Object by id, mutably
    pub fn object_mut(&mut self, id: GameObjectId) -> Option<&mut GameObject> {
        self.objects.get_mut(id)
    }

    /// Objects in creation order
    pub fn objects(&self) -> impl Iterator<Item = (GameObjectId, &GameObject)> + '_ {
        self.order.iter().filter_map(|id| self.objects.get(*id).map(|o| (*id, o)))
    }

    /// Number of objects
    pub fn object_count(&self) -> usize {
        self.order.len()
    }

    /// First object with the given name, in creation order
    pub fn find_by_name(&self, name: &str) -> Option<GameObjectId> {
        self.objects().find(|(_, o)| o.name() == name).map(|(id, _)| id)
    }

    /// Object with the given persistent id
    pub fn find_by_guid(&self, guid: ObjectGuid) -> Option<GameObjectId> {
        self.objects().find(|(_, o)| o.guid() == guid).map(|(id, _)| id)
    }

    fn object_name(&self, id: GameObjectId) -> String {
        self.objects.get(id).map_or_else(|| format!("{id:?}"), |o| o.name().to_string())
    }

    // ---------------------------------------------------------------------
    // Main camera
    // ---------------------------------------------------------------------

    /// Object carrying the active camera
    pub fn main_camera(&self) -> GameObjectId {
        self.main_camera
    }

    /// Make another object the main camera; it must carry a [`Camera`]
    pub fn set_main_camera(&mut self, id: GameObjectId) -> Result<(), SceneError> {
        let object = self.objects.get(id).ok_or(SceneError::UnknownObject(id))?;
        if !object.has::<Camera>() {
            return Err(SceneError::NotACamera {
                name: object.name().to_string(),
            });
        }
        log::info!("Main camera is now '{}'", object.name());
        self.main_camera = id;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Hierarchy
    // ---------------------------------------------------------------------

    /// Reparent `child`; `None` makes it a root. Local transforms are kept.
    pub fn set_parent(&mut self, child: GameObjectId, parent: Option<GameObjectId>) -> Result<(), SceneError> {
        if !self.objects.contains_key(child) {
            return Err(SceneError::UnknownObject(child));
        }
        if let Some(parent) = parent {
            if !self.objects.contains_key(parent) {
                return Err(SceneError::UnknownObject(parent));
            }
            if parent == child || self.is_ancestor(child, parent) {
                return Err(SceneError::ParentCycle {
                    child: self.object_name(child),
                    parent: self.object_name(parent),
                });
            }
        }
        if let Some(object) = self.objects.get_mut(child) {
            object.set_parent_unchecked(parent);
        }
        Ok(())
    }

    /// Direct children in creation order
    pub fn children(&self, id: GameObjectId) -> Vec<GameObjectId> {
        self.objects()
            .filter(|(_, o)| o.parent() == Some(id))
            .map(|(child, _)| child)
            .collect()
    }

    /// True if `ancestor` is somewhere up `descendant`'s parent chain
    fn is_ancestor(&self, ancestor: GameObjectId, descendant: GameObjectId) -> bool {
        let mut current = self.objects.get(descendant).and_then(GameObject::parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.objects.get(id).and_then(GameObject::parent);
        }
        false
    }

    /// Local transform composed with every ancestor's
    pub fn world_transform(&self, id: GameObjectId) -> Option<Mat4> {
        let object = self.objects.get(id)?;
        let mut matrix = *object.local_transform();
        let mut parent = object.parent();
        while let Some(parent_id) = parent {
            let Some(ancestor) = self.objects.get(parent_id) else {
                break;
            };
            matrix = ancestor.local_transform() * matrix;
            parent = ancestor.parent();
        }
        Some(matrix)
    }

    /// World-space position
    pub fn world_position(&self, id: GameObjectId) -> Option<Vec3> {
        self.world_transform(id).map(|m| translation_of(&m))
    }

    /// World position, rotation and per-axis scale
    pub fn world_pose(&self, id: GameObjectId) -> Option<(Vec3, Quat, Vec3)> {
        let world = self.world_transform(id)?;
        let object = self.objects.get(id)?;
        let mut rotation = euler_degrees_to_quat(&object.rotation());
        let mut scale = object.scale();
        let mut parent = object.parent();
        while let Some(parent_id) = parent {
            let Some(ancestor) = self.objects.get(parent_id) else {
                break;
            };
            rotation = euler_degrees_to_quat(&ancestor.rotation()) * rotation;
            scale = scale.component_mul(&ancestor.scale());
            parent = ancestor.parent();
        }
        Some((translation_of(&world), rotation, scale))
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// True once the first update or [`activate`](Self::activate) ran
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Number of completed updates
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Awake every pending component once, without updating
    pub fn activate(&mut self) {
        let input = InputSnapshot::empty();
        let world = self.world_view();
        let frame = HookFrame {
            input: &input,
            delta_time: 0.0,
            world: &world,
        };
        self.mark_active();
        self.awake_pending(&frame);
    }

    /// Run one tick
    pub fn update(&mut self, delta_time: f32, input: &InputSnapshot) {
        self.mark_active();

        let world = self.world_view();
        let frame = HookFrame {
            input,
            delta_time,
            world: &world,
        };

        self.awake_pending(&frame);
        for id in self.order.clone() {
            self.run_hooks(id, &frame, Phase::Active, |component, ctx| component.update(ctx));
        }

        self.sync_physics();
        self.physics.step(delta_time);
        self.read_back_physics();
        self.dispatch_triggers(&frame);

        self.tick += 1;
    }

    fn mark_active(&mut self) {
        if !self.is_active {
            log::info!("Activating scene ({} objects)", self.order.len());
            self.is_active = true;
        }
    }

    fn awake_pending(&mut self, frame: &HookFrame<'_>) {
        for id in self.order.clone() {
            self.run_hooks(id, frame, Phase::Awake, |component, ctx| {
                log::trace!("Awake {} on '{}'", component.type_name(), ctx.object.name());
                component.awake(ctx);
            });
        }
    }

    fn world_view(&self) -> WorldView {
        WorldView::new(
            self.objects()
                .map(|(id, object)| ObjectSummary {
                    id,
                    guid: object.guid(),
                    name: object.name().to_string(),
                    world_position: self.world_position(id).unwrap_or_else(Vec3::zeros),
                    components: object.component_type_names().collect(),
                })
                .collect(),
        )
    }

    /// Invoke `hook` on every enabled component of `id` in the given phase
    fn run_hooks<F>(&mut self, id: GameObjectId, frame: &HookFrame<'_>, phase: Phase, mut hook: F)
    where
        F: FnMut(&mut dyn Component, &mut ComponentContext<'_>),
    {
        let Some(object) = self.objects.get_mut(id) else {
            return;
        };

        for type_id in object.component_type_ids() {
            let runnable = object.slot_by_type(type_id).is_some_and(|slot| {
                slot.enabled
                    && match phase {
                        Phase::Awake => slot.state == ComponentState::AwakePending,
                        Phase::Active => slot.state == ComponentState::Active,
                    }
            });
            if !runnable {
                continue;
            }
            let Some(mut component) = object.take_component(type_id) else {
                continue;
            };

            let mut ctx = ComponentContext {
                object: &mut *object,
                id,
                input: frame.input,
                delta_time: frame.delta_time,
                world: frame.world,
            };
            hook(&mut *component, &mut ctx);

            object.restore_component(type_id, component);
            if phase == Phase::Awake {
                if let Some(slot) = object.slot_by_type_mut(type_id) {
                    slot.state = ComponentState::Active;
                }
            }
        }
    }

    // ---------------------------------------------------------------------
    // Physics bridge
    // ---------------------------------------------------------------------

    /// Physics backend
    pub fn physics(&self) -> &dyn PhysicsWorld {
        self.physics.as_ref()
    }

    /// Physics backend, mutably
    pub fn physics_mut(&mut self) -> &mut dyn PhysicsWorld {
        self.physics.as_mut()
    }

    /// Body registered for an object's [`RigidBody`]
    pub fn rigid_body_handle(&self, id: GameObjectId) -> Option<BodyHandle> {
        self.bodies.get(&(id, BodyRole::Rigid)).copied()
    }

    /// Body registered for an object's [`TriggerVolume`]
    pub fn trigger_handle(&self, id: GameObjectId) -> Option<BodyHandle> {
        self.bodies.get(&(id, BodyRole::Trigger)).copied()
    }

    /// Object owning a body
    pub fn body_owner(&self, handle: BodyHandle) -> Option<GameObjectId> {
        self.body_owners.get(&handle).copied()
    }

    /// Physics debug visualisation
    pub fn physics_debug_mode(&self) -> DebugDrawMode {
        self.physics.debug_draw_mode()
    }

    /// Change physics debug visualisation
    pub fn set_physics_debug_mode(&mut self, mode: DebugDrawMode) {
        self.physics.set_debug_draw_mode(mode);
    }

    fn wants_body(&self, id: GameObjectId, role: BodyRole) -> bool {
        self.objects.get(id).is_some_and(|object| match role {
            BodyRole::Rigid => object.is_enabled::<RigidBody>() == Some(true),
            BodyRole::Trigger => object.is_enabled::<TriggerVolume>() == Some(true),
        })
    }

    fn body_desc(&self, id: GameObjectId, role: BodyRole) -> Option<BodyDesc> {
        let object = self.objects.get(id)?;
        let (position, rotation, scale) = self.world_pose(id)?;
        let desc = match role {
            BodyRole::Rigid => {
                let body = object.get::<RigidBody>()?;
                let mut desc = BodyDesc::new(body.kind, body.colliders.clone());
                desc.mass = body.mass;
                desc.gravity_scale = body.gravity_scale;
                desc.linear_velocity = body.linear_velocity;
                desc
            }
            BodyRole::Trigger => BodyDesc::trigger(object.get::<TriggerVolume>()?.colliders.clone()),
        };
        Some(desc.with_pose(position, rotation, scale))
    }

    fn unregister_body(&mut self, key: (GameObjectId, BodyRole), handle: BodyHandle) {
        self.bodies.remove(&key);
        self.body_owners.remove(&handle);
        self.trigger_overlaps.remove(&handle);
        // Gone bodies leave trigger sets without a leaving event
        for inside in self.trigger_overlaps.values_mut() {
            inside.remove(&handle);
        }
        self.physics.remove_body(handle);
        log::trace!("Unregistered {handle}");
    }

    fn unregister_bodies_of(&mut self, id: GameObjectId) {
        for role in [BodyRole::Rigid, BodyRole::Trigger] {
            if let Some(handle) = self.bodies.get(&(id, role)).copied() {
                self.unregister_body((id, role), handle);
            }
        }
    }

    /// Prune stale bodies, register new ones and push poses in
    fn sync_physics(&mut self) {
        let stale: Vec<((GameObjectId, BodyRole), BodyHandle)> = self
            .bodies
            .iter()
            .filter(|((id, role), _)| !self.wants_body(*id, *role))
            .map(|(key, handle)| (*key, *handle))
            .collect();
        for (key, handle) in stale {
            self.unregister_body(key, handle);
        }

        for id in self.order.clone() {
            for role in [BodyRole::Rigid, BodyRole::Trigger] {
                if !self.wants_body(id, role) {
                    continue;
                }
                let handle = match self.bodies.get(&(id, role)).copied() {
                    Some(handle) => {
                        if let Some((position, rotation, scale)) = self.world_pose(id) {
                            self.physics.set_pose(handle, position, rotation, scale);
                        }
                        handle
                    }
                    None => {
                        let Some(desc) = self.body_desc(id, role) else {
                            continue;
                        };
                        let handle = self.physics.add_body(desc);
                        self.bodies.insert((id, role), handle);
                        self.body_owners.insert(handle, id);
                        log::debug!("Registered {role:?} {handle} for '{}'", self.object_name(id));
                        handle
                    }
                };

                if role == BodyRole::Rigid {
                    self.push_rigid_body_state(id, handle);
                }
            }
        }
    }

    fn push_rigid_body_state(&mut self, id: GameObjectId, handle: BodyHandle) {
        let Some(body) = self.objects.get_mut(id).and_then(|o| o.get_mut::<RigidBody>()) else {
            return;
        };
        if body.kind != BodyKind::Dynamic {
            return;
        }
        let velocity = body.linear_velocity;
        let impulse = body.take_impulse();
        self.physics.set_linear_velocity(handle, velocity);
        if impulse != Vec3::zeros() {
            self.physics.apply_impulse(handle, impulse);
        }
    }

    /// Copy simulated dynamic bodies back onto their objects
    fn read_back_physics(&mut self) {
        let rigid: Vec<(GameObjectId, BodyHandle)> = self
            .bodies
            .iter()
            .filter(|((_, role), _)| *role == BodyRole::Rigid)
            .map(|((id, _), handle)| (*id, *handle))
            .collect();

        for (id, handle) in rigid {
            let is_dynamic = self
                .objects
                .get(id)
                .and_then(|o| o.get::<RigidBody>())
                .is_some_and(|body| body.kind == BodyKind::Dynamic);
            if !is_dynamic {
                continue;
            }
            let Some((world_position, _)) = self.physics.pose(handle) else {
                continue;
            };
            let velocity = self.physics.linear_velocity(handle).unwrap_or_else(Vec3::zeros);
            let parent_inverse = self
                .objects
                .get(id)
                .and_then(GameObject::parent)
                .and_then(|parent| self.world_transform(parent))
                .and_then(|m| m.try_inverse());
            let local = parent_inverse.map_or(world_position, |inv| transform_point(&inv, &world_position));

            if let Some(object) = self.objects.get_mut(id) {
                object.set_position(local);
                if let Some(body) = object.get_mut::<RigidBody>() {
                    body.linear_velocity = velocity;
                }
            }
        }
    }

    /// Diff every trigger's overlap set and fire edge-triggered hooks
    fn dispatch_triggers(&mut self, frame: &HookFrame<'_>) {
        let triggers: Vec<(GameObjectId, BodyHandle)> = self
            .order
            .iter()
            .filter_map(|id| self.bodies.get(&(*id, BodyRole::Trigger)).map(|h| (*id, *h)))
            .collect();

        for (owner, trigger) in triggers {
            let mut current = self.physics.overlapping(trigger);
            if let Some(own) = self.bodies.get(&(owner, BodyRole::Rigid)) {
                current.remove(own);
            }
            let previous = self.trigger_overlaps.get(&trigger).cloned().unwrap_or_default();
            let entered: Vec<BodyHandle> = current.difference(&previous).copied().collect();
            let left: Vec<BodyHandle> = previous.difference(&current).copied().collect();

            if let Some(volume) = self.objects.get_mut(owner).and_then(|o| o.get_mut::<TriggerVolume>()) {
                volume.set_overlapping(current.clone());
            }
            self.trigger_overlaps.insert(trigger, current);

            for body in entered {
                let Some(other) = self.body_owners.get(&body).copied() else {
                    continue;
                };
                let contact = TriggerContact { trigger, body, other };
                log::debug!("'{}' entered trigger on '{}'", self.object_name(other), self.object_name(owner));
                self.run_hooks(owner, frame, Phase::Active, |component, ctx| {
                    component.on_trigger_volume_entered(ctx, &contact);
                });
            }
            for body in left {
                let Some(other) = self.body_owners.get(&body).copied() else {
                    continue;
                };
                let contact = TriggerContact { trigger, body, other };
                log::debug!("'{}' left trigger on '{}'", self.object_name(other), self.object_name(owner));
                self.run_hooks(owner, frame, Phase::Active, |component, ctx| {
                    component.on_trigger_volume_leaving(ctx, &contact);
                });
            }
        }
    }

    // ---------------------------------------------------------------------
    // Lights and environment
    // ---------------------------------------------------------------------

    /// Append a light; fails once every slot is taken
    pub fn add_light(&mut self, light: Light) -> Result<usize, SceneError> {
        if self.lights.len() >= self.light_capacity {
            return Err(SceneError::Capacity {
                what: "lights",
                max: self.light_capacity,
            });
        }
        self.lights.push(light);
        Ok(self.lights.len() - 1)
    }

    /// Lights in slot order
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Lights in slot order, mutably
    pub fn lights_mut(&mut self) -> &mut [Light] {
        &mut self.lights
    }

    /// Remove every light
    pub fn clear_lights(&mut self) {
        self.lights.clear();
    }

    /// Number of light slots
    pub fn light_capacity(&self) -> usize {
        self.light_capacity
    }

    /// Change the number of light slots; fails if more lights exist already
    pub fn set_light_capacity(&mut self, capacity: usize) -> Result<(), SceneError> {
        if self.lights.len() > capacity {
            return Err(SceneError::Capacity {
                what: "lights",
                max: capacity,
            });
        }
        self.light_capacity = capacity;
        Ok(())
    }

    /// Skybox settings
    pub fn skybox(&self) -> Option<&Skybox> {
        self.environment.skybox.as_ref()
    }

    /// Set or clear the skybox
    pub fn set_skybox(&mut self, skybox: Option<Skybox>) {
        self.environment.skybox = skybox;
    }

    /// Colour-correction lookup table
    pub fn color_lut(&self) -> Option<&Arc<ColorLut>> {
        self.environment.color_lut.as_ref()
    }

    /// Set or clear the lookup table
    pub fn set_color_lut(&mut self, lut: Option<Arc<ColorLut>>) {
        self.environment.color_lut = lut;
    }

    /// Post-process switches
    pub fn render_flags(&self) -> RenderFlags {
        self.environment.flags
    }

    /// Replace the post-process switches
    pub fn set_render_flags(&mut self, flags: RenderFlags) {
        self.environment.flags = flags;
    }

    /// Turn individual post-process switches on or off
    pub fn set_render_flag(&mut self, flag: RenderFlags, enabled: bool) {
        self.environment.flags.set(flag, enabled);
    }

    // ---------------------------------------------------------------------
    // Render / editor side channels
    // ---------------------------------------------------------------------

    /// Flatten the scene into draw lists for a renderer
    pub fn extract_frame(&self, aspect_ratio: f32) -> RenderFrame {
        let camera_world = self.world_transform(self.main_camera).unwrap_or_else(Mat4::identity);
        let view = camera_world.try_inverse().unwrap_or_else(Mat4::identity);
        let projection = self
            .objects
            .get(self.main_camera)
            .and_then(|o| o.get::<Camera>())
            .map_or_else(Mat4::identity, |camera| camera.projection(aspect_ratio));

        let mut opaque = Vec::new();
        let mut transparent = Vec::new();
        for (id, object) in self.objects() {
            if object.is_enabled::<RenderComponent>() != Some(true) {
                continue;
            }
            let Some(renderer) = object.get::<RenderComponent>() else {
                continue;
            };
            let (Some(mesh), Some(material)) = (renderer.mesh(), renderer.material()) else {
                continue;
            };
            let item = DrawItem {
                object: id,
                mesh: Arc::clone(mesh),
                material: Arc::clone(material),
                transform: self.world_transform(id).unwrap_or_else(Mat4::identity),
            };
            match material.render_queue() {
                RenderQueue::Opaque => opaque.push(item),
                RenderQueue::Transparent => transparent.push(item),
            }
        }

        RenderFrame {
            opaque,
            transparent,
            view,
            projection,
            camera_position: translation_of(&camera_world),
            skybox: self.environment.skybox.clone(),
            color_lut: self.environment.color_lut.clone(),
            flags: self.environment.flags,
            lights: self.lights.clone(),
            debug_draw: self.physics.debug_draw_mode(),
        }
    }

    /// Draw every object's transform and components into an inspector
    pub fn render_inspector(&mut self, ui: &mut dyn Inspector) {
        for id in self.order.clone() {
            let Some(object) = self.objects.get_mut(id) else {
                continue;
            };
            if !ui.header(object.name()) {
                continue;
            }

            let mut position = object.position();
            let mut rotation = object.rotation();
            let mut scale = object.scale();
            if ui.drag_float3("Position", &mut position) {
                object.set_position(position);
            }
            if ui.drag_float3("Rotation", &mut rotation) {
                object.set_rotation(rotation);
            }
            if ui.drag_float3("Scale", &mut scale) {
                object.set_scale(scale);
            }

            for slot in object.mutate_slots() {
                ui.label(slot.type_name());
                if let Some(component) = slot.component_mut() {
                    component.render_inspector(ui);
                }
            }
        }
    }

    // ---------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------

    /// Snapshot the scene as a document
    pub fn to_document(&self) -> Result<SceneDocument, SceneError> {
        let mut objects = Vec::with_capacity(self.order.len());
        for (_, object) in self.objects() {
            let components = object
                .components()
                .map(|(component, enabled)| -> Result<ComponentRecord, SceneError> {
                    Ok(ComponentRecord {
                        type_name: component.type_name().to_string(),
                        enabled,
                        payload: component.to_value()?,
                    })
                })
                .collect::<Result<Vec<_>, SceneError>>()?;

            objects.push(GameObjectRecord {
                guid: object.guid(),
                name: object.name().to_string(),
                position: object.position(),
                rotation: object.rotation(),
                scale: object.scale(),
                parent: object.parent().and_then(|p| self.objects.get(p)).map(GameObject::guid),
                components,
            });
        }

        let main_camera = self
            .objects
            .get(self.main_camera)
            .map(GameObject::guid)
            .ok_or(SceneError::UnknownObject(self.main_camera))?;

        Ok(SceneDocument {
            version: SCENE_VERSION,
            skybox: self.environment.skybox.as_ref().map(|skybox| SkyboxRecord {
                texture: skybox.texture.id(),
                shader: skybox.shader.id(),
                rotation: skybox.rotation,
            }),
            color_lut: self.environment.color_lut.as_ref().map(|lut| lut.id()),
            main_camera,
            render_flags: self.environment.flags,
            physics_debug_mode: self.physics.debug_draw_mode(),
            lights: self.lights.clone(),
            objects,
        })
    }

    /// Rebuild a scene from a document with the built-in physics
    ///
    /// Nothing is returned unless every object, component and asset
    /// reference resolves.
    pub fn from_document(
        document: &SceneDocument,
        resources: &ResourceManager,
        registry: &ComponentRegistry,
    ) -> Result<Self, SceneError> {
        Self::from_document_with_physics(document, resources, registry, Box::new(SimplePhysicsWorld::new()))
    }

    /// Rebuild a scene from a document on top of a custom physics backend
    ///
    /// The document's debug-draw mode is applied to `physics`; bodies are
    /// registered on the first tick as usual.
    pub fn from_document_with_physics(
        document: &SceneDocument,
        resources: &ResourceManager,
        registry: &ComponentRegistry,
        physics: Box<dyn PhysicsWorld>,
    ) -> Result<Self, SceneError> {
        if document.version > SCENE_VERSION {
            return Err(SceneError::Serialization(format!(
                "unsupported scene version {} (newest is {SCENE_VERSION})",
                document.version
            )));
        }

        let ctx = ComponentLoadContext::new(resources);
        let mut scene = Self::bare(physics);

        if let Some(record) = &document.skybox {
            scene.environment.skybox = Some(Skybox {
                texture: ctx.asset::<TextureCube>(record.texture)?,
                shader: ctx.asset::<ShaderProgram>(record.shader)?,
                rotation: record.rotation,
            });
        }
        scene.environment.color_lut = document.color_lut.map(|id| ctx.asset::<ColorLut>(id)).transpose()?;
        scene.environment.flags = document.render_flags;
        scene.physics.set_debug_draw_mode(document.physics_debug_mode);

        for light in &document.lights {
            scene.add_light(*light)?;
        }

        let mut by_guid = BTreeMap::new();
        for record in &document.objects {
            if by_guid.contains_key(&record.guid) {
                return Err(SceneError::Serialization(format!("duplicate object id {}", record.guid)));
            }
            let mut object = GameObject::new(record.name.clone(), record.guid);
            object.set_position(record.position);
            object.set_rotation(record.rotation);
            object.set_scale(record.scale);
            for component in &record.components {
                let built = registry.create(&component.type_name, &component.payload, &ctx)?;
                object.add_boxed(built, component.enabled)?;
            }
            scene.next_guid = scene.next_guid.max(record.guid.raw() + 1);
            by_guid.insert(record.guid, scene.insert_object(object));
        }

        for record in &document.objects {
            let Some(parent_guid) = record.parent else {
                continue;
            };
            let parent = by_guid.get(&parent_guid).copied().ok_or_else(|| {
                SceneError::Serialization(format!("'{}' has unknown parent {parent_guid}", record.name))
            })?;
            if let Some(child) = by_guid.get(&record.guid).copied() {
                scene.set_parent(child, Some(parent))?;
            }
        }

        let camera = by_guid
            .get(&document.main_camera)
            .copied()
            .ok_or_else(|| SceneError::Serialization(format!("main camera {} is not in the scene", document.main_camera)))?;
        scene.set_main_camera(camera)?;

        Ok(scene)
    }

    /// Write the scene document to `path`
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let path = path.as_ref();
        self.to_document()?.write(path)?;
        log::info!("Saved scene ({} objects) to {}", self.order.len(), path.display());
        Ok(())
    }

    /// Load a scene document, resolving assets through `resources`
    pub fn load(path: impl AsRef<Path>, resources: &ResourceManager, registry: &ComponentRegistry) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let document = SceneDocument::read(path)?;
        let scene = Self::from_document(&document, resources, registry).map_err(|e| {
            log::error!("Failed to load scene {}: {e}", path.display());
            e
        })?;
        log::info!("Loaded scene ({} objects) from {}", scene.order.len(), path.display());
        Ok(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::Collider;
    use approx::assert_relative_eq;

    #[derive(Debug, Default)]
    struct Log(Vec<&'static str>);

    impl Component for Log {
        fn type_name(&self) -> &'static str {
            "Log"
        }

        fn awake(&mut self, _ctx: &mut ComponentContext<'_>) {
            self.0.push("awake");
        }

        fn update(&mut self, _ctx: &mut ComponentContext<'_>) {
            self.0.push("update");
        }

        fn to_value(&self) -> Result<serde_json::Value, SceneError> {
            Ok(serde_json::Value::Null)
        }
    }

    #[test]
    fn test_new_scene_has_main_camera() {
        let scene = Scene::new();
        let camera = scene.object(scene.main_camera()).unwrap();
        assert_eq!(camera.name(), "Main Camera");
        assert!(camera.has::<Camera>());
        assert_eq!(scene.object_count(), 1);
    }

    #[test]
    fn test_main_camera_cannot_be_destroyed() {
        let mut scene = Scene::new();
        let camera = scene.main_camera();
        assert!(matches!(
            scene.destroy_game_object(camera),
            Err(SceneError::MainCameraRemoval { .. })
        ));

        let other = scene.create_game_object("Other Camera");
        assert!(matches!(scene.set_main_camera(other), Err(SceneError::NotACamera { .. })));
        scene.object_mut(other).unwrap().add(Camera::default()).unwrap();
        scene.set_main_camera(other).unwrap();
        scene.destroy_game_object(camera).unwrap();
        assert_eq!(scene.main_camera(), other);
    }

    #[test]
    fn test_destroy_removes_descendants() {
        let mut scene = Scene::new();
        let root = scene.create_game_object("root");
        let child = scene.create_game_object("child");
        let grandchild = scene.create_game_object("grandchild");
        let bystander = scene.create_game_object("bystander");
        scene.set_parent(child, Some(root)).unwrap();
        scene.set_parent(grandchild, Some(child)).unwrap();

        scene.destroy_game_object(root).unwrap();
        assert!(scene.object(root).is_none());
        assert!(scene.object(grandchild).is_none());
        assert!(scene.object(bystander).is_some());
        assert!(matches!(scene.destroy_game_object(child), Err(SceneError::UnknownObject(_))));
    }

    #[test]
    fn test_parent_cycles_are_rejected() {
        let mut scene = Scene::new();
        let a = scene.create_game_object("a");
        let b = scene.create_game_object("b");
        scene.set_parent(b, Some(a)).unwrap();
        assert!(matches!(scene.set_parent(a, Some(b)), Err(SceneError::ParentCycle { .. })));
        assert!(matches!(scene.set_parent(a, Some(a)), Err(SceneError::ParentCycle { .. })));
        assert_eq!(scene.children(a), vec![b]);
    }

    #[test]
    fn test_find_by_name_returns_first_match() {
        let mut scene = Scene::new();
        let first = scene.create_game_object("Crate");
        let _second = scene.create_game_object("Crate");
        assert_eq!(scene.find_by_name("Crate"), Some(first));
        assert_eq!(scene.find_by_name("Barrel"), None);
        let guid = scene.object(first).unwrap().guid();
        assert_eq!(scene.find_by_guid(guid), Some(first));
    }

    #[test]
    fn test_awake_runs_once_before_update() {
        let mut scene = Scene::new();
        let id = scene.create_game_object("logger");
        scene.object_mut(id).unwrap().add(Log::default()).unwrap();

        scene.update(0.1, &InputSnapshot::empty());
        scene.update(0.1, &InputSnapshot::empty());

        let log = scene.object(id).unwrap().get::<Log>().unwrap();
        assert_eq!(log.0, vec!["awake", "update", "update"]);
        assert!(scene.is_active());
        assert_eq!(scene.tick_count(), 2);
    }

    #[test]
    fn test_disabled_components_get_no_hooks() {
        let mut scene = Scene::new();
        let id = scene.create_game_object("logger");
        scene.object_mut(id).unwrap().add_boxed(Box::new(Log::default()), false).unwrap();
        scene.update(0.1, &InputSnapshot::empty());
        assert!(scene.object(id).unwrap().get::<Log>().unwrap().0.is_empty());

        scene.object_mut(id).unwrap().set_enabled::<Log>(true);
        scene.update(0.1, &InputSnapshot::empty());
        assert_eq!(scene.object(id).unwrap().get::<Log>().unwrap().0, vec!["awake", "update"]);
    }

    #[test]
    fn test_light_capacity() {
        let mut scene = Scene::new();
        scene.set_light_capacity(2).unwrap();
        scene.add_light(Light::default()).unwrap();
        assert_eq!(scene.add_light(Light::default()).unwrap(), 1);
        assert!(matches!(
            scene.add_light(Light::default()),
            Err(SceneError::Capacity { what: "lights", max: 2 })
        ));
        assert!(scene.set_light_capacity(1).is_err());
    }

    #[test]
    fn test_dynamic_body_falls_onto_static_floor() {
        let mut scene = Scene::new();
        let floor = scene.create_game_object("floor");
        scene
            .object_mut(floor)
            .unwrap()
            .add(RigidBody::new(BodyKind::Static, vec![Collider::plane(Vec3::z())]))
            .unwrap();
        let ball = scene.create_game_object("ball");
        {
            let object = scene.object_mut(ball).unwrap();
            object.set_position(Vec3::new(0.0, 0.0, 2.0));
            object.add(RigidBody::new(BodyKind::Dynamic, vec![Collider::sphere(0.5)])).unwrap();
        }

        for _ in 0..180 {
            scene.update(1.0 / 60.0, &InputSnapshot::empty());
        }

        assert_relative_eq!(scene.object(ball).unwrap().position().z, 0.5, epsilon = 1e-3);
        assert!(scene.rigid_body_handle(floor).is_some());
    }

    #[test]
    fn test_removed_body_leaves_trigger_set_silently() {
        let mut scene = Scene::new();
        let zone = scene.create_game_object("zone");
        scene
            .object_mut(zone)
            .unwrap()
            .add(TriggerVolume::new(vec![Collider::sphere(1.0)]))
            .unwrap();
        let visitor = scene.create_game_object("visitor");
        scene
            .object_mut(visitor)
            .unwrap()
            .add(RigidBody::new(BodyKind::Kinematic, vec![Collider::sphere(0.1)]))
            .unwrap();

        scene.update(0.1, &InputSnapshot::empty());
        let handle = scene.rigid_body_handle(visitor).unwrap();
        assert!(scene.object(zone).unwrap().get::<TriggerVolume>().unwrap().overlapping().contains(&handle));

        scene.destroy_game_object(visitor).unwrap();
        scene.update(0.1, &InputSnapshot::empty());
        assert!(scene.object(zone).unwrap().get::<TriggerVolume>().unwrap().overlapping().is_empty());
        assert!(!scene.physics().contains(handle));
    }

    #[test]
    fn test_document_reload_keeps_custom_physics() {
        let mut scene = Scene::new();
        scene.set_physics_debug_mode(DebugDrawMode::WIREFRAME);
        let ball = scene.create_game_object("ball");
        scene
            .object_mut(ball)
            .unwrap()
            .add(RigidBody::new(BodyKind::Dynamic, vec![Collider::sphere(0.5)]))
            .unwrap();
        let document = scene.to_document().unwrap();

        let mut physics = SimplePhysicsWorld::new();
        physics.set_gravity(Vec3::new(0.0, 0.0, -1.0));
        let resources = ResourceManager::default();
        let registry = ComponentRegistry::with_builtin();
        let mut loaded = Scene::from_document_with_physics(&document, &resources, &registry, Box::new(physics)).unwrap();

        assert_eq!(loaded.physics().gravity(), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(loaded.physics_debug_mode(), DebugDrawMode::WIREFRAME);
        loaded.update(0.1, &InputSnapshot::empty());
        assert_eq!(loaded.physics().body_count(), 1);
    }
}

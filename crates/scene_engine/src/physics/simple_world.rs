//! Built-in physics backend
//!
//! Enough simulation for gameplay triggers and simple falling objects:
//! dynamic bodies integrate gravity and velocity with semi-implicit Euler,
//! then are pushed out of static and kinematic colliders. Triggers never
//! collide; they only answer overlap queries.

use super::collision::WorldSpaceShape;
use super::{BodyDesc, BodyHandle, BodyKind, DebugDrawMode, PhysicsWorld};
use crate::foundation::math::{Quat, Vec3};
use std::collections::{BTreeMap, BTreeSet};

/// Standard gravity along -Z (the scene is Z-up)
pub const DEFAULT_GRAVITY: Vec3 = Vec3::new(0.0, 0.0, -9.81);

#[derive(Debug, Clone)]
struct Body {
    desc: BodyDesc,
    shapes: Vec<WorldSpaceShape>,
}

impl Body {
    fn new(desc: BodyDesc) -> Self {
        let mut body = Self {
            desc,
            shapes: Vec::new(),
        };
        body.refresh_shapes();
        body
    }

    fn refresh_shapes(&mut self) {
        let desc = &self.desc;
        self.shapes = desc
            .colliders
            .iter()
            .map(|c| c.to_world_space(&desc.position, &desc.rotation, &desc.scale))
            .collect();
    }

    fn overlaps(&self, other: &Self) -> bool {
        self.shapes
            .iter()
            .any(|a| other.shapes.iter().any(|b| a.intersects(b)))
    }

    fn is_solid(&self) -> bool {
        !self.desc.is_trigger && self.desc.kind != BodyKind::Dynamic
    }
}

/// Minimal rigid-body world
#[derive(Debug, Clone)]
pub struct SimplePhysicsWorld {
    bodies: BTreeMap<BodyHandle, Body>,
    next_handle: u64,
    gravity: Vec3,
    debug_draw_mode: DebugDrawMode,
}

impl Default for SimplePhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SimplePhysicsWorld {
    /// Empty world with standard gravity
    pub fn new() -> Self {
        Self {
            bodies: BTreeMap::new(),
            next_handle: 1,
            gravity: DEFAULT_GRAVITY,
            debug_draw_mode: DebugDrawMode::empty(),
        }
    }

    fn resolve_contacts(&mut self, handle: BodyHandle) {
        let Some(body) = self.bodies.get(&handle) else {
            return;
        };

        let mut correction = Vec3::zeros();
        for (other_handle, other) in &self.bodies {
            if *other_handle == handle || !other.is_solid() {
                continue;
            }
            for shape in &body.shapes {
                for other_shape in &other.shapes {
                    if let Some(push) = shape.push_out_of(other_shape) {
                        if push.magnitude_squared() > correction.magnitude_squared() {
                            correction = push;
                        }
                    }
                }
            }
        }

        if correction == Vec3::zeros() {
            return;
        }

        if let Some(body) = self.bodies.get_mut(&handle) {
            body.desc.position += correction;
            // Cancel velocity into the contact
            if let Some(normal) = correction.try_normalize(f32::EPSILON) {
                let into = body.desc.linear_velocity.dot(&normal);
                if into < 0.0 {
                    body.desc.linear_velocity -= normal * into;
                }
            }
            body.refresh_shapes();
        }
    }
}

impl PhysicsWorld for SimplePhysicsWorld {
    fn add_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let handle = BodyHandle::from_raw(self.next_handle);
        self.next_handle += 1;
        log::trace!("Added {:?} body {} ({} colliders)", desc.kind, handle, desc.colliders.len());
        self.bodies.insert(handle, Body::new(desc));
        handle
    }

    fn remove_body(&mut self, handle: BodyHandle) -> bool {
        self.bodies.remove(&handle).is_some()
    }

    fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(&handle)
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn set_pose(&mut self, handle: BodyHandle, position: Vec3, rotation: Quat, scale: Vec3) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.desc.position = position;
            body.desc.rotation = rotation;
            body.desc.scale = scale;
            body.refresh_shapes();
        }
    }

    fn pose(&self, handle: BodyHandle) -> Option<(Vec3, Quat)> {
        self.bodies
            .get(&handle)
            .map(|body| (body.desc.position, body.desc.rotation))
    }

    fn linear_velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        self.bodies.get(&handle).map(|body| body.desc.linear_velocity)
    }

    fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.desc.linear_velocity = velocity;
        }
    }

    fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            if body.desc.kind == BodyKind::Dynamic && body.desc.mass > 0.0 {
                body.desc.linear_velocity += impulse / body.desc.mass;
            }
        }
    }

    fn step(&mut self, delta_time: f32) {
        if delta_time <= 0.0 {
            return;
        }

        let gravity = self.gravity;
        let dynamic: Vec<BodyHandle> = self
            .bodies
            .iter()
            .filter(|(_, body)| body.desc.kind == BodyKind::Dynamic && !body.desc.is_trigger)
            .map(|(handle, _)| *handle)
            .collect();

        for handle in dynamic {
            if let Some(body) = self.bodies.get_mut(&handle) {
                body.desc.linear_velocity += gravity * body.desc.gravity_scale * delta_time;
                body.desc.position += body.desc.linear_velocity * delta_time;
                body.refresh_shapes();
            }
            self.resolve_contacts(handle);
        }
    }

    fn overlapping(&self, trigger: BodyHandle) -> BTreeSet<BodyHandle> {
        let Some(volume) = self.bodies.get(&trigger) else {
            return BTreeSet::new();
        };

        self.bodies
            .iter()
            .filter(|(handle, body)| **handle != trigger && !body.desc.is_trigger && volume.overlaps(body))
            .map(|(handle, _)| *handle)
            .collect()
    }

    fn gravity(&self) -> Vec3 {
        self.gravity
    }

    fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    fn debug_draw_mode(&self) -> DebugDrawMode {
        self.debug_draw_mode
    }

    fn set_debug_draw_mode(&mut self, mode: DebugDrawMode) {
        self.debug_draw_mode = mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::Collider;
    use approx::assert_relative_eq;

    fn sphere_at(kind: BodyKind, position: Vec3) -> BodyDesc {
        BodyDesc::new(kind, vec![Collider::sphere(0.5)]).with_pose(position, Quat::identity(), Vec3::repeat(1.0))
    }

    #[test]
    fn test_dynamic_body_falls_and_lands_on_ground() {
        let mut world = SimplePhysicsWorld::new();
        world.add_body(BodyDesc::new(BodyKind::Static, vec![Collider::plane(Vec3::z())]));
        let ball = world.add_body(sphere_at(BodyKind::Dynamic, Vec3::new(0.0, 0.0, 3.0)));

        for _ in 0..240 {
            world.step(1.0 / 60.0);
        }

        let (position, _) = world.pose(ball).unwrap();
        assert_relative_eq!(position.z, 0.5, epsilon = 1e-3);
        assert!(world.linear_velocity(ball).unwrap().z.abs() < 0.2);
    }

    #[test]
    fn test_static_bodies_do_not_move() {
        let mut world = SimplePhysicsWorld::new();
        let rock = world.add_body(sphere_at(BodyKind::Static, Vec3::new(0.0, 0.0, 5.0)));
        world.step(1.0);
        assert_eq!(world.pose(rock).unwrap().0, Vec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn test_trigger_overlap_set_is_sorted_and_excludes_triggers() {
        let mut world = SimplePhysicsWorld::new();
        let trigger = world.add_body(
            BodyDesc::trigger(vec![Collider::sphere(2.0)]).with_pose(Vec3::zeros(), Quat::identity(), Vec3::repeat(1.0)),
        );
        let a = world.add_body(sphere_at(BodyKind::Kinematic, Vec3::new(1.0, 0.0, 0.0)));
        let _far = world.add_body(sphere_at(BodyKind::Kinematic, Vec3::new(10.0, 0.0, 0.0)));
        let b = world.add_body(sphere_at(BodyKind::Static, Vec3::new(0.0, 1.0, 0.0)));
        let _other_trigger = world.add_body(BodyDesc::trigger(vec![Collider::sphere(1.0)]));

        let inside: Vec<BodyHandle> = world.overlapping(trigger).into_iter().collect();
        assert_eq!(inside, vec![a, b]);
    }

    #[test]
    fn test_impulse_only_moves_dynamic_bodies() {
        let mut world = SimplePhysicsWorld::new();
        world.set_gravity(Vec3::zeros());
        let dynamic = world.add_body(sphere_at(BodyKind::Dynamic, Vec3::zeros()));
        let kinematic = world.add_body(sphere_at(BodyKind::Kinematic, Vec3::new(5.0, 0.0, 0.0)));

        world.apply_impulse(dynamic, Vec3::new(0.0, 2.0, 0.0));
        world.apply_impulse(kinematic, Vec3::new(0.0, 2.0, 0.0));
        world.step(0.5);

        assert_relative_eq!(world.pose(dynamic).unwrap().0, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(world.linear_velocity(kinematic).unwrap(), Vec3::zeros());
    }

    #[test]
    fn test_removed_bodies_are_gone() {
        let mut world = SimplePhysicsWorld::new();
        let body = world.add_body(sphere_at(BodyKind::Static, Vec3::zeros()));
        assert!(world.remove_body(body));
        assert!(!world.remove_body(body));
        assert_eq!(world.body_count(), 0);
        assert!(world.pose(body).is_none());
    }
}

//! Scene hierarchy, update scheduling and trigger dispatch

use approx::assert_relative_eq;
use scene_engine::foundation::math::transform_point;
use scene_engine::prelude::*;
use scene_engine::components::EnemyPatrolConfig;
use scene_engine::scene::{ComponentLoadContext, TriggerContact};
use std::sync::{Arc, Mutex};

type Journal = Arc<Mutex<Vec<String>>>;

/// Appends "<object>:<event>" to a shared journal
#[derive(Debug)]
struct Recorder {
    journal: Journal,
}

impl Recorder {
    fn push(&self, entry: String) {
        self.journal.lock().unwrap().push(entry);
    }
}

impl Component for Recorder {
    fn type_name(&self) -> &'static str {
        "Recorder"
    }

    fn awake(&mut self, ctx: &mut ComponentContext<'_>) {
        self.push(format!("{}:awake", ctx.object.name()));
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>) {
        self.push(format!("{}:update", ctx.object.name()));
    }

    fn on_trigger_volume_entered(&mut self, ctx: &mut ComponentContext<'_>, contact: &TriggerContact) {
        let other = ctx.world.get(contact.other).map(|o| o.name.clone()).unwrap_or_default();
        self.push(format!("enter:{other}"));
    }

    fn on_trigger_volume_leaving(&mut self, ctx: &mut ComponentContext<'_>, contact: &TriggerContact) {
        let other = ctx.world.get(contact.other).map(|o| o.name.clone()).unwrap_or_default();
        self.push(format!("leave:{other}"));
    }

    fn to_value(&self) -> Result<serde_json::Value, SceneError> {
        Ok(serde_json::json!({}))
    }
}

/// Moves its owner by a fixed offset every tick
#[derive(Debug, Clone, PartialEq)]
struct Mover(Vec3);

impl Component for Mover {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>) {
        let position = ctx.object.position();
        ctx.object.set_position(position + self.0);
    }

    fn to_value(&self) -> Result<serde_json::Value, SceneError> {
        Ok(serde_json::json!({ "step": [self.0.x, self.0.y, self.0.z] }))
    }
}

impl ComponentType for Mover {
    const TYPE_NAME: &'static str = "Mover";

    fn from_value(value: &serde_json::Value, _ctx: &ComponentLoadContext<'_>) -> Result<Self, SceneError> {
        let step: [f32; 3] = serde_json::from_value(value["step"].clone()).map_err(|e| SceneError::InvalidComponent {
            component: Self::TYPE_NAME.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self(Vec3::from(step)))
    }
}

fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

#[test]
fn world_transform_composes_parent_chain() {
    let mut scene = Scene::new();
    let parent = scene.create_game_object("parent");
    let child = scene.create_game_object("child");
    scene.object_mut(parent).unwrap().set_position(Vec3::new(1.0, 0.0, 0.0));
    scene.object_mut(parent).unwrap().set_rotation(Vec3::new(0.0, 0.0, 90.0));
    scene.object_mut(child).unwrap().set_position(Vec3::new(1.0, 0.0, 0.0));
    scene.set_parent(child, Some(parent)).unwrap();

    // Local +X of the child is world +Y once the parent turns 90 degrees about Z
    assert_relative_eq!(scene.world_position(child).unwrap(), Vec3::new(1.0, 1.0, 0.0), epsilon = 1e-5);

    let world = scene.world_transform(child).unwrap();
    let tip = transform_point(&world, &Vec3::new(1.0, 0.0, 0.0));
    assert_relative_eq!(tip, Vec3::new(1.0, 2.0, 0.0), epsilon = 1e-5);
}

#[test]
fn scaled_parent_scales_child_offset() {
    let mut scene = Scene::new();
    let parent = scene.create_game_object("parent");
    let child = scene.create_game_object("child");
    scene.object_mut(parent).unwrap().set_scale(Vec3::new(2.0, 2.0, 2.0));
    scene.object_mut(child).unwrap().set_position(Vec3::new(0.0, 0.0, 1.5));
    scene.set_parent(child, Some(parent)).unwrap();

    assert_relative_eq!(scene.world_position(child).unwrap(), Vec3::new(0.0, 0.0, 3.0), epsilon = 1e-5);
}

#[test]
fn reparenting_changes_world_position_not_local() {
    let mut scene = Scene::new();
    let a = scene.create_game_object("a");
    let b = scene.create_game_object("b");
    let child = scene.create_game_object("child");
    scene.object_mut(a).unwrap().set_position(Vec3::new(5.0, 0.0, 0.0));
    scene.object_mut(b).unwrap().set_position(Vec3::new(0.0, 0.0, -2.0));
    scene.object_mut(child).unwrap().set_position(Vec3::new(1.0, 1.0, 1.0));

    scene.set_parent(child, Some(a)).unwrap();
    assert_relative_eq!(scene.world_position(child).unwrap(), Vec3::new(6.0, 1.0, 1.0), epsilon = 1e-5);

    scene.set_parent(child, Some(b)).unwrap();
    assert_relative_eq!(scene.world_position(child).unwrap(), Vec3::new(1.0, 1.0, -1.0), epsilon = 1e-5);
    assert_eq!(scene.children(a), Vec::<GameObjectId>::new());
    assert_eq!(scene.children(b), vec![child]);

    scene.set_parent(child, None).unwrap();
    assert_eq!(scene.object(child).unwrap().position(), Vec3::new(1.0, 1.0, 1.0));
    assert_relative_eq!(scene.world_position(child).unwrap(), Vec3::new(1.0, 1.0, 1.0), epsilon = 1e-5);
}

#[test]
fn parenting_onto_descendant_fails() {
    let mut scene = Scene::new();
    let root = scene.create_game_object("root");
    let mid = scene.create_game_object("mid");
    let leaf = scene.create_game_object("leaf");
    scene.set_parent(mid, Some(root)).unwrap();
    scene.set_parent(leaf, Some(mid)).unwrap();

    assert!(matches!(scene.set_parent(root, Some(leaf)), Err(SceneError::ParentCycle { .. })));
    assert!(matches!(scene.set_parent(root, Some(root)), Err(SceneError::ParentCycle { .. })));
    assert_eq!(scene.object(root).unwrap().parent(), None);
}

#[test]
fn objects_update_in_creation_order() {
    let log = journal();
    let mut scene = Scene::new();
    for name in ["X", "Y", "Z"] {
        let id = scene.create_game_object(name);
        scene
            .object_mut(id)
            .unwrap()
            .add(Recorder { journal: Arc::clone(&log) })
            .unwrap();
    }

    scene.update(0.016, &InputSnapshot::empty());
    scene.update(0.016, &InputSnapshot::empty());

    assert_eq!(
        entries(&log),
        vec![
            "X:awake", "Y:awake", "Z:awake", "X:update", "Y:update", "Z:update", "X:update", "Y:update", "Z:update",
        ]
    );
}

#[test]
fn activate_awakes_without_updating() {
    let log = journal();
    let mut scene = Scene::new();
    let id = scene.create_game_object("X");
    scene
        .object_mut(id)
        .unwrap()
        .add(Recorder { journal: Arc::clone(&log) })
        .unwrap();

    scene.activate();
    scene.activate();
    assert!(scene.is_active());
    assert_eq!(entries(&log), vec!["X:awake"]);

    scene.update(0.016, &InputSnapshot::empty());
    assert_eq!(entries(&log), vec!["X:awake", "X:update"]);
}

#[test]
fn mover_advances_once_per_tick() {
    let mut scene = Scene::new();
    let id = scene.create_game_object("mover");
    scene.object_mut(id).unwrap().add(Mover(Vec3::new(1.0, 0.0, 0.0))).unwrap();

    for _ in 0..3 {
        scene.update(0.016, &InputSnapshot::empty());
    }

    assert_eq!(scene.object(id).unwrap().position(), Vec3::new(3.0, 0.0, 0.0));
    assert_eq!(scene.tick_count(), 3);
}

#[test]
fn custom_components_round_trip_through_registry() {
    let mut registry = ComponentRegistry::with_builtin();
    registry.register::<Mover>();

    let mut scene = Scene::new();
    let id = scene.create_game_object("mover");
    scene.object_mut(id).unwrap().add(Mover(Vec3::new(0.0, 2.0, 0.0))).unwrap();

    let document = scene.to_document().unwrap();
    let resources = ResourceManager::default();
    let mut loaded = Scene::from_document(&document, &resources, &registry).unwrap();
    let id = loaded.find_by_name("mover").unwrap();
    loaded.update(0.016, &InputSnapshot::empty());
    assert_eq!(loaded.object(id).unwrap().position(), Vec3::new(0.0, 2.0, 0.0));

    let err = Scene::from_document(&document, &resources, &ComponentRegistry::with_builtin()).unwrap_err();
    assert!(matches!(err, SceneError::UnknownComponentType(name) if name == "Mover"));
}

fn visitor(scene: &mut Scene, name: &str, position: Vec3) -> GameObjectId {
    let id = scene.create_game_object(name);
    let object = scene.object_mut(id).unwrap();
    object.set_position(position);
    object
        .add(RigidBody::new(BodyKind::Kinematic, vec![Collider::sphere(0.1)]))
        .unwrap();
    id
}

#[test]
fn trigger_hooks_fire_on_edges_only() {
    let log = journal();
    let mut scene = Scene::new();
    let zone = scene.create_game_object("zone");
    {
        let object = scene.object_mut(zone).unwrap();
        object.add(TriggerVolume::new(vec![Collider::sphere(1.0)])).unwrap();
        object.add(Recorder { journal: Arc::clone(&log) }).unwrap();
    }
    let a = visitor(&mut scene, "A", Vec3::new(0.0, 0.0, 0.0));
    let _b = visitor(&mut scene, "B", Vec3::new(0.5, 0.0, 0.0));
    let c = visitor(&mut scene, "C", Vec3::new(10.0, 0.0, 0.0));

    scene.update(0.016, &InputSnapshot::empty());
    let hooks = |log: &Journal| -> Vec<String> {
        entries(log)
            .into_iter()
            .filter(|e| e.starts_with("enter:") || e.starts_with("leave:"))
            .collect()
    };
    assert_eq!(hooks(&log), vec!["enter:A", "enter:B"]);

    // Nothing moved: no new events
    scene.update(0.016, &InputSnapshot::empty());
    assert_eq!(hooks(&log), vec!["enter:A", "enter:B"]);

    scene.object_mut(a).unwrap().set_position(Vec3::new(10.0, 0.0, 0.0));
    scene.object_mut(c).unwrap().set_position(Vec3::new(0.0, 0.5, 0.0));
    scene.update(0.016, &InputSnapshot::empty());
    assert_eq!(hooks(&log), vec!["enter:A", "enter:B", "enter:C", "leave:A"]);

    let inside: Vec<GameObjectId> = scene
        .object(zone)
        .unwrap()
        .get::<TriggerVolume>()
        .unwrap()
        .overlapping()
        .iter()
        .filter_map(|handle| scene.body_owner(*handle))
        .collect();
    assert_eq!(inside.len(), 2);
    assert!(inside.contains(&c));
    assert!(!inside.contains(&a));
}

#[test]
fn disabled_trigger_stops_reporting() {
    let mut scene = Scene::new();
    let zone = scene.create_game_object("zone");
    {
        let object = scene.object_mut(zone).unwrap();
        object.add(TriggerVolume::new(vec![Collider::sphere(1.0)])).unwrap();
        object.add(TriggerVolumeEnterBehaviour::default()).unwrap();
    }
    visitor(&mut scene, "A", Vec3::zeros());

    scene.update(0.016, &InputSnapshot::empty());
    let counter = scene.object(zone).unwrap().get::<TriggerVolumeEnterBehaviour>().unwrap();
    assert_eq!((counter.inside(), counter.total_entered()), (1, 1));

    scene.object_mut(zone).unwrap().set_enabled::<TriggerVolume>(false);
    scene.update(0.016, &InputSnapshot::empty());
    assert!(scene.trigger_handle(zone).is_none());

    scene.object_mut(zone).unwrap().set_enabled::<TriggerVolume>(true);
    scene.update(0.016, &InputSnapshot::empty());
    let counter = scene.object(zone).unwrap().get::<TriggerVolumeEnterBehaviour>().unwrap();
    assert_eq!(counter.total_entered(), 2);
}

#[test]
fn player_loses_one_life_per_hit() {
    let mut scene = Scene::new();
    let player = scene.create_game_object("Player");
    {
        let object = scene.object_mut(player).unwrap();
        object.set_position(Vec3::new(0.0, 0.0, 1.0));
        object.add(CharacterMovement::default()).unwrap();
        object.add(TriggerVolume::new(vec![Collider::sphere(1.0)])).unwrap();
    }
    let enemy = visitor(&mut scene, "Turtle", Vec3::new(0.5, 0.0, 1.0));
    scene
        .object_mut(enemy)
        .unwrap()
        .add(EnemyPatrol::new(EnemyPatrolConfig {
            step: 0.0,
            ..EnemyPatrolConfig::default()
        }))
        .unwrap();

    // Enemy is inside for several ticks but only the entry counts
    for _ in 0..3 {
        scene.update(0.016, &InputSnapshot::empty());
    }
    let movement = scene.object(player).unwrap().get::<CharacterMovement>().unwrap();
    assert_eq!(movement.lives(), 2);
    assert_relative_eq!(scene.object(player).unwrap().position(), Vec3::new(-4.0, 0.0, 1.0));

    scene.object_mut(enemy).unwrap().set_position(Vec3::new(-4.0, 0.0, 1.0));
    scene.update(0.016, &InputSnapshot::empty());
    scene.update(0.016, &InputSnapshot::empty());
    assert_eq!(scene.object(player).unwrap().get::<CharacterMovement>().unwrap().lives(), 1);
}

#[test]
fn jumping_over_the_floor_costs_no_life() {
    let mut scene = Scene::new();
    let floor = scene.create_game_object("Floor");
    scene
        .object_mut(floor)
        .unwrap()
        .add(RigidBody::new(BodyKind::Static, vec![Collider::plane(Vec3::z())]))
        .unwrap();
    let ball = visitor(&mut scene, "Ball", Vec3::new(0.0, 0.0, 1.2));

    let player = scene.create_game_object("Player");
    {
        let object = scene.object_mut(player).unwrap();
        object.set_position(Vec3::new(0.0, 0.0, 1.0));
        object.add(CharacterMovement::default()).unwrap();
        object.add(RigidBody::new(BodyKind::Kinematic, vec![Collider::sphere(0.5)])).unwrap();
        object.add(TriggerVolume::new(vec![Collider::sphere(0.75)])).unwrap();
    }

    let jump = InputSnapshot::empty().with_key(KeyCode::Space, ButtonState::Pressed);
    scene.update(0.016, &jump);
    let mut touched = 0;
    for _ in 0..60 {
        scene.update(0.016, &InputSnapshot::empty());
        touched += scene.object(player).unwrap().get::<TriggerVolume>().unwrap().overlapping().len();
    }

    // The floor and the ball both overlapped the trigger, neither is a hazard
    assert!(touched > 0);
    assert!(scene.object(ball).is_some());
    let movement = scene.object(player).unwrap().get::<CharacterMovement>().unwrap();
    assert_eq!(movement.lives(), 3);
    assert!(movement.is_grounded());
}

#[test]
fn inspector_walks_objects_and_components() {
    let mut scene = Scene::new();
    let id = scene.create_game_object("Spinner");
    scene.object_mut(id).unwrap().add(RotatingBehaviour::default()).unwrap();

    let mut ui = RecordingInspector::new();
    ui.collapse("Main Camera");
    scene.render_inspector(&mut ui);

    assert!(ui.contains("v Spinner"));
    assert!(ui.contains("RotatingBehaviour"));
    assert!(ui.contains("> Main Camera"));
    assert!(!ui.contains("FOV"));
}

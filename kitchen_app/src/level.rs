//! The kitchen level
//!
//! Builds the sample scene from scratch. File assets that are missing from
//! the asset root are logged and the objects using them are left without a
//! renderer, so the level can always be built headless.

use scene_engine::assets::{AssetError, ColorLut, ShaderParams, TextureCube, TextureParams};
use scene_engine::prelude::*;
use scene_engine::scene::Skybox;
use std::sync::Arc;

use crate::AppError;

/// Handles the driver needs after building
pub struct KitchenLevel {
    /// The player object
    pub player: GameObjectId,
    /// The patrolling turtle
    pub turtle: GameObjectId,
}

fn optional<T>(what: &str, result: Result<Arc<T>, AssetError>) -> Option<Arc<T>> {
    match result {
        Ok(asset) => Some(asset),
        Err(e) => {
            log::warn!("{what} unavailable: {e}");
            None
        }
    }
}

struct Shared {
    standard: Option<Arc<ShaderProgram>>,
    plane: Arc<Mesh>,
    sphere: Arc<Mesh>,
}

impl Shared {
    fn material(&self, resources: &mut ResourceManager, name: &str, rgba: [f32; 4]) -> Option<Arc<Material>> {
        let shader = self.standard.as_ref()?;
        optional(
            name,
            resources.create_asset::<Material>(
                MaterialParams::new(name, shader)
                    .with_color("u_Material.Diffuse", rgba)
                    .with_float("u_Material.Shininess", 32.0),
            ),
        )
    }
}

fn add_renderer(scene: &mut Scene, id: GameObjectId, mesh: Option<Arc<Mesh>>, material: Option<Arc<Material>>) -> Result<(), AppError> {
    if let (Some(mesh), Some(material), Some(object)) = (mesh, material, scene.object_mut(id)) {
        object.add(RenderComponent::new(mesh, material))?;
    }
    Ok(())
}

fn prop(
    scene: &mut Scene,
    resources: &mut ResourceManager,
    shared: &Shared,
    name: &str,
    model: &str,
    position: Vec3,
    rotation: Vec3,
) -> Result<GameObjectId, AppError> {
    let id = scene.create_game_object(name);
    if let Some(object) = scene.object_mut(id) {
        object.set_position(position);
        object.set_rotation(rotation);
    }
    let mesh = optional(name, resources.create_asset::<Mesh>(MeshSource::file(model)));
    let material = shared.material(resources, name, [0.8, 0.8, 0.8, 1.0]);
    add_renderer(scene, id, mesh, material)?;
    Ok(id)
}

/// Build the kitchen into `scene`
pub fn build(scene: &mut Scene, resources: &mut ResourceManager, gameplay: &GameplayConfig) -> Result<KitchenLevel, AppError> {
    let shared = Shared {
        standard: optional(
            "standard shader",
            resources.create_asset::<ShaderProgram>(ShaderParams::new("shaders/standard.vert", "shaders/standard.frag")),
        ),
        plane: resources
            .create_asset::<Mesh>(MeshSource::Plane {
                position: Vec3::zeros(),
                normal: Vec3::z(),
                tangent: Vec3::x(),
                size: [60.0, 20.0],
            })?,
        sphere: resources
            .create_asset::<Mesh>(MeshSource::IcoSphere {
                center: Vec3::zeros(),
                radius: 0.5,
                subdivisions: 2,
            })?,
    };

    // Environment
    let skybox_shader = optional(
        "skybox shader",
        resources.create_asset::<ShaderProgram>(ShaderParams::new("shaders/skybox.vert", "shaders/skybox.frag")),
    );
    let cubemap = optional(
        "skybox cubemap",
        resources.create_asset::<TextureCube>(TextureParams::new("cubemaps/ocean/ocean.jpg")),
    );
    if let (Some(texture), Some(shader)) = (cubemap, skybox_shader) {
        scene.set_skybox(Some(Skybox {
            texture,
            shader,
            rotation: Vec3::new(90.0, 0.0, 0.0),
        }));
    }
    scene.set_color_lut(optional("colour LUT", resources.create_asset::<ColorLut>(TextureParams::new("luts/cool.CUBE"))));
    for x in [0.0, 1.0, 20.0] {
        scene.add_light(Light::new(Vec3::new(x, 3.0, 10.0), Vec3::repeat(1.0), 100.0))?;
    }

    // Camera
    let camera = scene.main_camera();
    if let Some(object) = scene.object_mut(camera) {
        object.set_position(Vec3::new(9.0, -9.0, 9.0));
        object.set_rotation(Vec3::new(70.0, 0.0, 0.0));
        object.add(SimpleCameraControl {
            config: gameplay.camera_control.clone(),
        })?;
    }

    // Props
    prop(scene, resources, &shared, "Kitchen", "models/megaKitchen.obj", Vec3::new(9.63, 0.04, 2.66), Vec3::new(0.0, 0.0, -173.0))?;
    prop(scene, resources, &shared, "Trash", "models/trash.obj", Vec3::new(1.98, -3.1, 2.84), Vec3::new(90.0, 0.0, 0.0))?;
    let fruit = prop(
        scene,
        resources,
        &shared,
        "Bowl of Fruit",
        "models/bowl_of_fruit.obj",
        Vec3::new(15.61, 5.67, 6.82),
        Vec3::new(90.0, 0.0, 0.0),
    )?;
    if let Some(object) = scene.object_mut(fruit) {
        object.add(RotatingBehaviour {
            config: gameplay.rotating.clone(),
        })?;
    }

    // Floor
    let floor = scene.create_game_object("Floor");
    if let Some(object) = scene.object_mut(floor) {
        object.set_position(Vec3::new(10.0, 0.0, 0.0));
        object.add(RigidBody::new(BodyKind::Static, vec![Collider::plane(Vec3::z())]))?;
    }
    let floor_material = shared.material(resources, "Floor", [0.4, 0.35, 0.3, 1.0]);
    add_renderer(scene, floor, Some(Arc::clone(&shared.plane)), floor_material)?;

    // Turtle
    let turtle = scene.create_game_object("Turtle");
    if let Some(object) = scene.object_mut(turtle) {
        object.set_position(Vec3::new(20.0, 0.0, 3.2));
        object.set_rotation(Vec3::new(90.0, 0.0, 0.0));
        object.set_scale(Vec3::repeat(0.45));
        object.add(EnemyPatrol::new(gameplay.enemy_patrol.clone()))?;
        object.add(RigidBody::new(BodyKind::Kinematic, vec![Collider::sphere(1.5)]))?;
    }
    let turtle_texture = optional("turtle texture", resources.create_asset::<Texture2D>(TextureParams::new("textures/turtle.png")));
    let turtle_material = match (&shared.standard, turtle_texture) {
        (Some(shader), Some(texture)) => optional(
            "Turtle",
            resources.create_asset::<Material>(
                MaterialParams::new("Turtle", shader)
                    .with_texture("u_Material.Diffuse", &texture)
                    .with_float("u_Material.Shininess", 0.1),
            ),
        ),
        _ => None,
    };
    let turtle_mesh = optional("turtle mesh", resources.create_asset::<Mesh>(MeshSource::file("models/turtle.obj")));
    add_renderer(scene, turtle, turtle_mesh, turtle_material)?;

    // Player
    let player = scene.create_game_object("Player");
    if let Some(object) = scene.object_mut(player) {
        object.set_position(gameplay.character_movement.spawn_point);
        object.add(CharacterMovement::new(gameplay.character_movement.clone()))?;
        object.add(RigidBody::new(BodyKind::Kinematic, vec![Collider::sphere(0.5)]))?;
        object.add(TriggerVolume::new(vec![Collider::sphere(0.75)]))?;
    }
    let player_material = shared.material(resources, "Player", [0.2, 0.6, 1.0, 1.0]);
    add_renderer(scene, player, Some(Arc::clone(&shared.sphere)), player_material)?;

    // Bouncing ball over the sink, lights up a pad while resting on it
    let ball = scene.create_game_object("Ball");
    if let Some(object) = scene.object_mut(ball) {
        object.set_position(Vec3::new(4.0, 4.0, 3.0));
        object.add(RigidBody::new(BodyKind::Dynamic, vec![Collider::sphere(0.5)]))?;
        object.add(JumpBehaviour {
            config: gameplay.jump.clone(),
        })?;
    }
    let ball_material = shared.material(resources, "Ball", [1.0, 0.8, 0.1, 1.0]);
    add_renderer(scene, ball, Some(Arc::clone(&shared.sphere)), ball_material)?;

    let pad = scene.create_game_object("Pad");
    if let Some(object) = scene.object_mut(pad) {
        object.set_position(Vec3::new(4.0, 4.0, 0.25));
        object.set_scale(Vec3::new(2.0, 2.0, 0.1));
        object.add(TriggerVolume::new(vec![Collider::cuboid(Vec3::new(0.5, 0.5, 5.0))]))?;
        object.add(TriggerVolumeEnterBehaviour::default())?;
    }
    let idle = shared.material(resources, "Pad Idle", [0.3, 0.3, 0.3, 1.0]);
    let lit = shared.material(resources, "Pad Lit", [0.1, 1.0, 0.2, 1.0]);
    if let (Some(idle), Some(lit)) = (idle, lit) {
        if let Some(object) = scene.object_mut(pad) {
            object.add(MaterialSwapBehaviour::new(lit, Arc::clone(&idle)))?;
        }
        add_renderer(scene, pad, Some(Arc::clone(&shared.plane)), Some(idle))?;
    }

    log::info!("Built kitchen level: {} objects, {} assets", scene.object_count(), resources.len());
    Ok(KitchenLevel { player, turtle })
}

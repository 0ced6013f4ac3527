//! Integration tests for the frame pipeline
//!
//! These tests drive a whole World the way a host does:
//! 1. Scene instantiation creates tracked physics bodies
//! 2. Physics simulation applies gravity and collision
//! 3. Entity transforms sync from physics bodies every frame
//! 4. Followers and spinners run alongside physics

use glam::{Quat, Vec3};
use tabletop_core::{
    top_face, Appearance, BodyTemplate, ColliderTemplate, EntityTemplate, FollowerTemplate,
    PhysicsMaterial, RollGenerator, Scene, Shape, SpinnerTemplate, Transform, World, DIE_TAG,
    FIXED_TIMESTEP,
};

const ARENA_HALF_SIZE: f32 = 5.0;
const WALL_THICKNESS: f32 = 0.2;
const WALL_HEIGHT: f32 = 100.0;

fn dice_arena() -> Scene {
    let mut scene = Scene::new("Dice Arena").with_gravity(Vec3::new(0.0, -9.82, 0.0));
    scene.add_collider(ColliderTemplate::Floor { y: 0.0, material: PhysicsMaterial::FELT });

    let offset = ARENA_HALF_SIZE + WALL_THICKNESS / 2.0;
    let half_height = WALL_HEIGHT / 2.0;
    for (center, half_extents) in [
        (Vec3::new(offset, half_height, 0.0), Vec3::new(WALL_THICKNESS / 2.0, half_height, offset)),
        (Vec3::new(-offset, half_height, 0.0), Vec3::new(WALL_THICKNESS / 2.0, half_height, offset)),
        (Vec3::new(0.0, half_height, offset), Vec3::new(offset, half_height, WALL_THICKNESS / 2.0)),
        (Vec3::new(0.0, half_height, -offset), Vec3::new(offset, half_height, WALL_THICKNESS / 2.0)),
    ] {
        scene.add_collider(ColliderTemplate::Box {
            center,
            half_extents,
            material: PhysicsMaterial::WOOD,
        });
    }

    for (name, x) in [("die_1", -1.0), ("die_2", 1.0)] {
        scene.add_entity(
            EntityTemplate::new(
                Shape::cube(1.0),
                Transform::from_position(Vec3::new(x, 5.0, 0.0)),
                Appearance::WHITE,
            )
            .with_name(name)
            .with_tag(DIE_TAG)
            .with_body(BodyTemplate::Dynamic { mass: 1.0, material: PhysicsMaterial::PLASTIC }),
        );
    }
    scene
}

fn run(world: &mut World, frames: usize) {
    for _ in 0..frames {
        world.update(FIXED_TIMESTEP);
    }
}

fn assert_poses_synced(world: &World) {
    let physics = world.physics().expect("arena has physics");
    for (_, entity) in world.iter_tagged(DIE_TAG) {
        let body = physics
            .get_body(entity.physics_body.expect("dice are tracked"))
            .expect("body is registered");
        assert_eq!(entity.transform.position, body.position);
        assert_eq!(entity.transform.rotation, body.orientation);
    }
}

// ==================== Dice Arena ====================

#[test]
fn test_dropped_dice_land_on_the_floor() {
    let mut world = dice_arena().instantiate().unwrap();

    run(&mut world, 300);

    for (_, die) in world.iter_tagged(DIE_TAG) {
        assert!(
            (die.transform.position.y - 0.5).abs() < 0.05,
            "die should rest on the floor, y = {}",
            die.transform.position.y
        );
    }
    assert_poses_synced(&world);
}

#[test]
fn test_rolled_dice_stay_inside_the_walls() {
    let mut world = dice_arena().instantiate().unwrap();
    run(&mut world, 120);

    for seed in 0..5 {
        let thrown = world.roll_dice(&mut RollGenerator::new(seed));
        assert_eq!(thrown, 2);
        run(&mut world, 240);

        for (_, die) in world.iter_tagged(DIE_TAG) {
            let p = die.transform.position;
            assert!(p.x.abs() <= ARENA_HALF_SIZE, "die escaped in x: {}", p);
            assert!(p.z.abs() <= ARENA_HALF_SIZE, "die escaped in z: {}", p);
            assert!(p.y > 0.0, "die fell through the floor: {}", p);
        }
    }
    assert_poses_synced(&world);
}

#[test]
fn test_rolled_dice_show_a_face() {
    let mut world = dice_arena().instantiate().unwrap();
    world.roll_dice(&mut RollGenerator::new(2024));
    run(&mut world, 600);

    let faces = world.top_faces();
    assert_eq!(faces.len(), 2);
    for (key, face) in faces {
        assert!((1..=6).contains(&face));
        let rotation = world.get_entity(key).unwrap().transform.rotation;
        assert_eq!(face, top_face(rotation));
        assert!(rotation.is_normalized());
    }
}

#[test]
fn test_same_seed_same_outcome() {
    let outcome = |seed| {
        let mut world = dice_arena().instantiate().unwrap();
        world.roll_dice(&mut RollGenerator::new(seed));
        run(&mut world, 200);
        world
            .iter_tagged(DIE_TAG)
            .map(|(_, die)| (die.transform.position, die.transform.rotation))
            .collect::<Vec<(Vec3, Quat)>>()
    };

    assert_eq!(outcome(7), outcome(7));
}

#[test]
fn test_removed_die_leaves_physics() {
    let mut world = dice_arena().instantiate().unwrap();
    let key = world.find("die_1").unwrap();

    world.remove_entity(key);
    run(&mut world, 10);

    assert_eq!(world.physics().unwrap().body_count(), 1);
    assert_eq!(world.roll_dice(&mut RollGenerator::new(0)), 1);
}

// ==================== Board Token ====================

#[test]
fn test_token_loops_its_route() {
    let mut scene = Scene::new("Board");
    scene.add_entity(
        EntityTemplate::new(Shape::sphere(0.3), Transform::identity(), Appearance::RED)
            .with_name("token"),
    );
    let corners = vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(4.0, 0.0, 0.0),
        Vec3::new(4.0, 0.0, 4.0),
        Vec3::new(0.0, 0.0, 4.0),
    ];
    scene.add_route("square", corners.clone());
    scene.add_follower(FollowerTemplate {
        entity: "token".to_string(),
        route: "square".to_string(),
        speed: 0.5,
        tolerance: None,
        start: Some(1),
    });
    let mut world = scene.instantiate().unwrap();

    let mut reached = Vec::new();
    for _ in 0..200 {
        for arrival in world.update(FIXED_TIMESTEP) {
            assert_eq!(arrival.position, corners[arrival.reached]);
            reached.push(arrival.reached);
        }
    }

    // 4 units per side at 0.5 per frame: 8 moving frames plus 1 snap frame
    assert_eq!(reached.len(), 200 / 9);
    assert_eq!(&reached[..5], &[1, 2, 3, 0, 1]);
}

// ==================== Mixed ====================

#[test]
fn test_spinning_shape_beside_falling_die() {
    let mut scene = dice_arena();
    scene.add_entity(
        EntityTemplate::new(
            Shape::sphere(1.0),
            Transform::from_position(Vec3::new(0.0, 3.0, -3.0)),
            Appearance::textured("world.png"),
        )
        .with_name("globe"),
    );
    scene.add_spinner(SpinnerTemplate { entity: "globe".to_string(), axis: Vec3::Y, rate: 0.01 });
    let mut world = scene.instantiate().unwrap();

    run(&mut world, 100);

    let (_, globe) = world.get_by_name("globe").unwrap();
    assert_eq!(globe.transform.position, Vec3::new(0.0, 3.0, -3.0));
    let expected = Quat::from_rotation_y(1.0);
    assert!(globe.transform.rotation.abs_diff_eq(expected, 1e-4));
}

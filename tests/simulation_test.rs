use orrery::{
    camera::Camera,
    config::SimulationConfig,
    data_structures::{
        material::TextureSlot,
        scene::Scene,
    },
    input::{InputEvent, KeyState},
    simulation::Simulation,
};
use winit::keyboard::KeyCode;

use crate::common::test_utils::{FakeImages, TwoLevel, send, triangle, two_level_system};

mod common;

fn config() -> SimulationConfig {
    SimulationConfig {
        time_speed: 1.0,
        time_step: 5.0,
        size_scale: 0.5,
        distance_scale: 2.0,
    }
}

fn populated() -> (Simulation, Scene, TwoLevel) {
    let fixture = two_level_system();
    let mut scene = Scene::new();
    let sphere = scene.add_meshes(&triangle(None)).unwrap();
    let simulation = Simulation::populate(
        &mut scene,
        fixture.system.clone(),
        sphere,
        &FakeImages::new(),
        &config(),
    )
    .unwrap();
    (simulation, scene, fixture)
}

fn tap(simulation: &mut Simulation, keys: &mut KeyState, key: KeyCode) {
    send(simulation, keys, InputEvent::KeyDown(key));
    send(simulation, keys, InputEvent::KeyUp(key));
}

#[test]
fn every_body_gets_a_textured_instance() {
    let (simulation, scene, fixture) = populated();
    assert_eq!(scene.instances().len(), 3);
    assert_eq!(simulation.bodies().len(), 3);
    assert_eq!(simulation.bodies()[0].element, fixture.star);
    assert_eq!(simulation.bodies()[1].element, fixture.planet);
    assert_eq!(simulation.bodies()[2].element, fixture.moon);
    for instance in scene.instances() {
        assert!(instance.material.is_some());
        let material = scene.material_of_instance(instance);
        assert!(material.texture(TextureSlot::Diffuse).is_some());
        assert!(material.texture(TextureSlot::Ambient).is_some());
    }
}

#[test]
fn star_lights_the_scene() {
    let (_, scene, _) = populated();
    assert_eq!(scene.lights.point.power, 100.0);
    assert_eq!(scene.lights.point.position, cgmath::vec3(0.0, 0.0, 0.0));
    assert_eq!(scene.lights.directional.power, 0.1);
    assert_eq!(scene.lights.directional.color, cgmath::vec3(1.0, 1.0, 1.0));
}

#[test]
fn missing_body_texture_fails_population() {
    let fixture = two_level_system();
    let mut scene = Scene::new();
    let sphere = scene.add_meshes(&triangle(None)).unwrap();
    let result = Simulation::populate(
        &mut scene,
        fixture.system,
        sphere,
        &FakeImages::new().without("moon.png"),
        &config(),
    );
    assert!(result.is_err());
}

#[test]
fn bodies_start_placed() {
    let (simulation, scene, fixture) = populated();
    let planet = scene.instance(simulation.bodies()[1].instance);
    assert_eq!(
        planet.transform.position,
        fixture.system.position(fixture.planet, 0.0) * 2.0
    );
    assert_eq!(planet.transform.scale, fixture.system.size(fixture.planet) * 0.5);
}

#[test]
fn tab_cycles_cameras() {
    let (mut simulation, _, _) = populated();
    let mut keys = KeyState::new();
    assert_eq!(simulation.camera_count(), 3);
    assert!(matches!(simulation.camera(), Camera::Orbital(_)));

    let mut seen = vec![simulation.current_camera()];
    for _ in 0..3 {
        tap(&mut simulation, &mut keys, KeyCode::Tab);
        seen.push(simulation.current_camera());
    }
    assert_eq!(seen, vec![0, 1, 2, 0]);
}

#[test]
fn escape_and_close_stop_the_loop() {
    let (mut simulation, _, _) = populated();
    let mut keys = KeyState::new();
    assert!(!simulation.is_done());
    tap(&mut simulation, &mut keys, KeyCode::Escape);
    assert!(simulation.is_done());

    let (mut simulation, _, _) = populated();
    send(&mut simulation, &mut keys, InputEvent::Quit);
    assert!(simulation.is_done());
}

#[test]
fn p_pauses_and_resumes() {
    let (mut simulation, _, _) = populated();
    let mut keys = KeyState::new();
    simulation.time_speed = 2.0;
    tap(&mut simulation, &mut keys, KeyCode::KeyP);
    assert_eq!(simulation.time_speed, 0.0);
    tap(&mut simulation, &mut keys, KeyCode::KeyP);
    assert_eq!(simulation.time_speed, 2.0);
}

#[test]
fn arrows_scale_time_while_held() {
    let (mut simulation, _, _) = populated();
    let mut keys = KeyState::new();

    send(&mut simulation, &mut keys, InputEvent::KeyDown(KeyCode::ArrowRight));
    assert_eq!(simulation.time_speed, 3.0);
    send(&mut simulation, &mut keys, InputEvent::KeyUp(KeyCode::ArrowRight));
    assert_eq!(simulation.time_speed, 1.0);

    send(&mut simulation, &mut keys, InputEvent::KeyDown(KeyCode::ArrowLeft));
    assert_eq!(simulation.time_speed, -3.0);
    send(&mut simulation, &mut keys, InputEvent::KeyUp(KeyCode::ArrowLeft));
    assert_eq!(simulation.time_speed, 1.0);
}

#[test]
fn arrow_while_paused_resumes_from_last_speed() {
    let (mut simulation, _, _) = populated();
    let mut keys = KeyState::new();
    tap(&mut simulation, &mut keys, KeyCode::KeyP);
    assert_eq!(simulation.time_speed, 0.0);

    send(&mut simulation, &mut keys, InputEvent::KeyDown(KeyCode::ArrowRight));
    assert_eq!(simulation.time_speed, 3.0);
    send(&mut simulation, &mut keys, InputEvent::KeyUp(KeyCode::ArrowRight));
    assert_eq!(simulation.time_speed, 1.0);
}

#[test]
fn up_and_down_step_time() {
    let (mut simulation, _, _) = populated();
    let mut keys = KeyState::new();
    tap(&mut simulation, &mut keys, KeyCode::ArrowUp);
    tap(&mut simulation, &mut keys, KeyCode::ArrowUp);
    assert_eq!(simulation.time, 10.0);
    tap(&mut simulation, &mut keys, KeyCode::ArrowDown);
    assert_eq!(simulation.time, 5.0);
}

#[test]
fn update_places_bodies_before_advancing_the_clock() {
    let (mut simulation, mut scene, fixture) = populated();
    simulation.time_speed = 2.0;

    simulation.update(0.5, &mut scene);
    assert_eq!(simulation.time, 1.0);
    assert_eq!(simulation.frame(), 1);
    let planet = simulation.bodies()[1].instance;
    assert_eq!(
        scene.instance(planet).transform.position,
        fixture.system.position(fixture.planet, 0.0) * 2.0
    );

    simulation.update(0.0, &mut scene);
    assert_eq!(simulation.time, 1.0);
    assert_eq!(simulation.frame(), 2);
    assert_eq!(
        scene.instance(planet).transform.position,
        fixture.system.position(fixture.planet, 1.0) * 2.0
    );
    assert_eq!(
        scene.instance(planet).transform.rotation,
        fixture.system.rotation(fixture.planet, 1.0)
    );
}

#[test]
fn space_moves_the_tracking_camera_on() {
    let (mut simulation, mut scene, _) = populated();
    let mut keys = KeyState::new();
    tap(&mut simulation, &mut keys, KeyCode::Tab);
    tap(&mut simulation, &mut keys, KeyCode::Tab);

    let Camera::Target(camera) = simulation.camera() else {
        panic!("third camera should track bodies");
    };
    assert_eq!(camera.current(), simulation.bodies()[1]);

    tap(&mut simulation, &mut keys, KeyCode::Space);
    let Camera::Target(camera) = simulation.camera() else {
        unreachable!()
    };
    assert_eq!(camera.current(), simulation.bodies()[2]);

    simulation.update(0.0, &mut scene);
    let Camera::Target(camera) = simulation.camera() else {
        unreachable!()
    };
    let moon = simulation.bodies()[2].instance;
    assert_eq!(camera.orbit.target, scene.instance(moon).transform.position);
}

#[test]
fn space_is_ignored_by_overview_cameras() {
    let (mut simulation, _, _) = populated();
    let mut keys = KeyState::new();
    let before = simulation.camera().clone();
    tap(&mut simulation, &mut keys, KeyCode::Space);
    assert_eq!(simulation.camera(), &before);
}

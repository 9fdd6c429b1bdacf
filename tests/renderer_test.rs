use std::path::{Path, PathBuf};

use cgmath::{Matrix4, vec3};
use orrery::{
    camera::{Camera, OrbitalCamera},
    data_structures::{
        material::{Material, TextureSlot},
        scene::Scene,
        texture::TextureId,
    },
    pipelines::{Capabilities, Renderer, SkyboxRenderer, skybox::damped_view},
    render::{DrawCommand, ProgramKind, RenderContext},
};

use crate::common::test_utils::{FakeImages, red_material, triangle};

mod common;

fn context() -> RenderContext {
    RenderContext {
        view_width: 1600,
        view_height: 900,
        asset_root: PathBuf::from("assets"),
    }
}

fn camera() -> Camera {
    Camera::Orbital(OrbitalCamera {
        target: vec3(20.0, 0.0, -5.0),
        distance: 30.0,
        pitch: -0.4,
        ..OrbitalCamera::default()
    })
}

struct Fixture {
    scene: Scene,
    texture: TextureId,
}

/// Three instances: textured override, mesh default material, bare.
fn fixture() -> Fixture {
    let mut scene = Scene::new();
    let with_default = scene.add_meshes(&triangle(Some(red_material()))).unwrap();
    let bare = scene.add_meshes(&triangle(None)).unwrap();
    let texture = scene
        .add_texture(&FakeImages::new(), Path::new("earth.png"))
        .unwrap();
    let textured = scene.add_material(Material::textured(vec3(1.0, 1.0, 1.0), texture));

    let first = scene.make_instance(with_default);
    scene.instance_mut(first).material = Some(textured);
    scene.instance_mut(first).transform.position = vec3(1.0, 0.0, 0.0);
    let second = scene.make_instance(with_default);
    scene.instance_mut(second).transform.position = vec3(2.0, 0.0, 0.0);
    let third = scene.make_instance(bare);
    scene.instance_mut(third).transform.position = vec3(3.0, 0.0, 0.0);

    Fixture { scene, texture }
}

#[test]
fn textured_lit_list_binds_textures_before_their_draw() {
    let Fixture { scene, texture } = fixture();
    let renderer = Renderer::new(Capabilities::TEXTURED_LIT);
    let list = renderer.record(&scene, &camera(), &context());

    let commands = list.commands();
    assert_eq!(commands[0], DrawCommand::UseProgram(ProgramKind::TexturedLit));
    assert_eq!(commands[1], DrawCommand::BindScene);
    assert!(matches!(commands[2], DrawCommand::FrameUniforms(_)));
    assert_eq!(commands[3], DrawCommand::BindTexture { unit: 0, texture });
    assert_eq!(commands[4], DrawCommand::BindTexture { unit: 1, texture });
    assert!(matches!(commands[5], DrawCommand::Draw { .. }));
    assert!(matches!(commands[6], DrawCommand::Draw { .. }));
    assert!(matches!(commands[7], DrawCommand::Draw { .. }));
    assert_eq!(commands[8], DrawCommand::UnbindScene);
    assert_eq!(commands.len(), 9);

    let flags: Vec<_> = list.draws().map(|(_, uniforms)| uniforms.use_textures).collect();
    assert_eq!(flags, vec![[1, 1, 0, 0], [0; 4], [0; 4]]);
}

#[test]
fn draws_follow_instance_order() {
    let Fixture { scene, .. } = fixture();
    let renderer = Renderer::new(Capabilities::LIT);
    let camera = camera();
    let context = context();
    let list = renderer.record(&scene, &camera, &context);

    let view = camera.view_matrix();
    let projection = camera.projection_matrix(1600.0, 900.0);
    let draws: Vec<_> = list.draws().collect();
    assert_eq!(draws.len(), scene.instances().len());
    for ((mesh, uniforms), instance) in draws.iter().zip(scene.instances()) {
        let model_view = view * instance.transform.to_matrix();
        assert_eq!(*mesh, instance.mesh);
        assert_eq!(uniforms.mv, Into::<[[f32; 4]; 4]>::into(model_view));
        assert_eq!(uniforms.mvp, Into::<[[f32; 4]; 4]>::into(projection * model_view));
    }
}

#[test]
fn lit_uniforms_carry_resolved_materials() {
    let Fixture { scene, .. } = fixture();
    let renderer = Renderer::new(Capabilities::LIT);
    let list = renderer.record(&scene, &camera(), &context());

    let frame = list.frame_uniforms().unwrap();
    assert_eq!(frame.point_power, scene.lights.point.power);
    assert_eq!(frame.ambient_color, Into::<[f32; 3]>::into(scene.lights.ambient.color));

    let draws: Vec<_> = list.draws().map(|(_, uniforms)| *uniforms).collect();
    assert_eq!(draws[0].diffuse, [1.0, 1.0, 1.0]);
    assert_eq!(draws[1].diffuse, [0.8, 0.0, 0.0]);
    assert_eq!(draws[1].shininess, 32.0);
    assert_eq!(draws[2].ambient, Material::DEFAULT.ambient);
    assert!(draws.iter().all(|uniforms| uniforms.use_textures == [0; 4]));
    assert!(
        !list
            .commands()
            .iter()
            .any(|command| matches!(command, DrawCommand::BindTexture { .. }))
    );
}

#[test]
fn cube_texture_in_a_flat_slot_is_skipped() {
    let Fixture { mut scene, texture } = fixture();
    let cube = scene
        .add_sky_texture(&FakeImages::new(), Path::new("sky"))
        .unwrap();
    let mixed = scene.add_material(
        Material::DEFAULT
            .with_texture(TextureSlot::Ambient, texture)
            .with_texture(TextureSlot::Diffuse, cube),
    );
    let mesh = scene.instances()[0].mesh;
    let last = scene.make_instance(mesh);
    scene.instance_mut(last).material = Some(mixed);

    let renderer = Renderer::new(Capabilities::TEXTURED_LIT);
    let list = renderer.record(&scene, &camera(), &context());

    let (_, uniforms) = list.draws().last().unwrap();
    assert_eq!(uniforms.use_textures, [1, 0, 0, 0]);
    assert!(
        !list
            .commands()
            .contains(&DrawCommand::BindTexture { unit: 1, texture: cube })
    );
}

#[test]
fn unlit_list_has_matrices_only() {
    let Fixture { scene, .. } = fixture();
    let renderer = Renderer::new(Capabilities::UNLIT);
    let list = renderer.record(&scene, &camera(), &context());

    assert_eq!(list.commands()[0], DrawCommand::UseProgram(ProgramKind::Unlit));
    assert!(list.frame_uniforms().is_none());
    for (_, uniforms) in list.draws() {
        assert_eq!(uniforms.diffuse, [0.0; 3]);
        assert_eq!(uniforms.shininess, 0.0);
        assert_eq!(uniforms.use_textures, [0; 4]);
    }
}

#[test]
fn skybox_is_not_drawn_by_the_body_renderer() {
    let Fixture { mut scene, .. } = fixture();
    scene
        .set_skybox(&triangle(None), &FakeImages::new(), Path::new("sky"))
        .unwrap();
    let renderer = Renderer::new(Capabilities::TEXTURED_LIT);
    let list = renderer.record(&scene, &camera(), &context());
    assert_eq!(list.draws().count(), 3);
}

#[test]
fn skybox_without_mesh_records_nothing() {
    let Fixture { scene, .. } = fixture();
    let sky = SkyboxRenderer::new();
    assert!(sky.record(&scene, &camera(), &context()).is_empty());
    assert!(!sky.is_initialized());
}

#[test]
fn skybox_binds_its_cube_and_damps_translation() {
    let mut scene = Scene::new();
    scene
        .set_skybox(&triangle(None), &FakeImages::new(), Path::new("sky"))
        .unwrap();
    let skybox = scene.skybox().unwrap().clone();
    let cube = scene
        .material_of_instance(&skybox)
        .texture(TextureSlot::Diffuse)
        .unwrap();

    let camera = camera();
    let list = SkyboxRenderer::new().record(&scene, &camera, &context());
    let commands = list.commands();
    assert_eq!(commands[0], DrawCommand::UseProgram(ProgramKind::Skybox));
    assert_eq!(commands[1], DrawCommand::BindScene);
    assert_eq!(commands[2], DrawCommand::BindTexture { unit: 0, texture: cube });
    assert_eq!(commands[4], DrawCommand::UnbindScene);

    let (mesh, uniforms) = list.draws().next().unwrap();
    assert_eq!(mesh, skybox.mesh);
    let expected: Matrix4<f32> = damped_view(camera.view_matrix()) * skybox.transform.to_matrix();
    assert_eq!(uniforms.mv, Into::<[[f32; 4]; 4]>::into(expected));
    assert_ne!(uniforms.mv, Into::<[[f32; 4]; 4]>::into(camera.view_matrix() * skybox.transform.to_matrix()));
}

#[test]
fn recording_leaves_the_scene_unbound() {
    let Fixture { scene, .. } = fixture();
    for capabilities in [Capabilities::UNLIT, Capabilities::LIT, Capabilities::TEXTURED_LIT] {
        let list = Renderer::new(capabilities).record(&scene, &camera(), &context());
        assert_eq!(list.commands().last(), Some(&DrawCommand::UnbindScene));
    }
}

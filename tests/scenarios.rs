//! End-to-end scenarios through the public API

use crater_sim::Settings;
use crater_sim::sim::{
    Body, CraterSet, EventLog, Impact, MapInfo, Projectile, SimulationContext, Team, Walker, World,
    move_to, tick,
};
use crater_sim::terrain::generate::physics_test_map;
use crater_sim::terrain::{TerrainBuffer, from_rgba};
use glam::Vec2;
use image::{Rgba, RgbaImage};

#[test]
fn test_rect_stamp_and_erase() {
    let mut buffer = TerrainBuffer::create_empty(100, 100, true).unwrap();
    let block = TerrainBuffer::create_rect_tile(10, 10, true).unwrap();

    buffer.add(45, 45, &block);
    assert!(!buffer.is_empty(50, 50));
    assert!(buffer.is_empty(0, 0));

    buffer.remove(45, 45, &block);
    assert_eq!(buffer, TerrainBuffer::create_empty(100, 100, true).unwrap());
}

#[test]
fn test_body_crosses_empty_world() {
    let mut world = World::empty(200, 200, &Settings::default()).unwrap();
    let id = world.add_physical(Body::default().at(0.0, 0.0)).unwrap();

    let event = move_to(
        &mut world,
        id,
        Vec2::new(100.0, 0.0),
        &SimulationContext::default(),
        &mut (),
    );
    assert!(event.is_none());
    let body = world.body(id).unwrap();
    assert_eq!(body.pos, Vec2::new(100.0, 0.0));
    assert!(body.is_living);
}

#[test]
fn test_shell_digs_crater_where_it_lands() {
    let settings = Settings::default();
    let ctx = SimulationContext::from_settings(&settings);
    let info = MapInfo {
        spawn_a: "300,100".to_string(),
        ..Default::default()
    };
    let mut world = World::new(info, physics_test_map(600, 300).unwrap(), None, &settings).unwrap();
    let mut craters = CraterSet::from_settings(&settings);
    craters.register_radius("small", 8);

    let spawn = world.spawn_point(Team::A);
    let walker = world
        .add_physical(Body::walker(Walker::new(Team::A), 10, 10).at(spawn.x as f32, spawn.y as f32))
        .unwrap();

    let mut shell = Projectile::default().with_crater("small");
    shell.launch(-std::f32::consts::FRAC_PI_4, 40.0);
    let shot = world
        .add_physical(Body::projectile(shell, 4).at(360.0, 100.0))
        .unwrap();

    let before = world.ground().count_solid();
    let mut log = EventLog::new();
    let mut impacts = Vec::new();
    // Long enough for the shell to land and the walker to reach the floor
    for _ in 0..100 {
        let report = tick(&mut world, &ctx, &mut log);
        craters.apply_all(&mut world, &report.impacts);
        impacts.extend(report.impacts);
    }
    assert!(world.body(shot).is_none());

    assert_eq!(impacts.len(), 1);
    let landing = &impacts[0];
    assert_eq!(landing.impact, Impact::Ground);
    assert_eq!(landing.crater.as_deref(), Some("small"));
    assert_eq!(log.events.len(), 1);

    // Crater is dug around the landing point
    assert!(world.ground().count_solid() < before);
    let (x, y) = (landing.position.x as i32, landing.position.y as i32);
    assert!(world.is_empty(x, y + 3));

    // The walker found the floor (row 225) and stayed alive
    let body = world.body(walker).unwrap();
    assert!(body.is_living);
    assert!(body.as_walker().unwrap().grounded);
    assert_eq!(body.pos.y, 219.0);
}

#[test]
fn test_alpha_mask_threshold() {
    let mut image = RgbaImage::from_pixel(16, 4, Rgba([0, 0, 0, 0]));
    image.put_pixel(3, 1, Rgba([255, 255, 255, 255]));
    image.put_pixel(9, 2, Rgba([255, 255, 255, 40]));

    let strict = from_rgba(&image, 250, true).unwrap();
    assert!(!strict.is_empty(3, 1));
    assert!(strict.is_empty(9, 2));

    // Low thresholds keep anti-aliased edges
    let loose = from_rgba(&image, 10, true).unwrap();
    assert!(!loose.is_empty(9, 2));
    assert_eq!(loose.count_solid(), 2);
}

#[test]
fn test_world_from_png() {
    let path = std::env::temp_dir().join(format!("crater-sim-ground-{}.png", std::process::id()));
    let image = RgbaImage::from_fn(64, 32, |_, y| {
        if y >= 20 {
            Rgba([90, 60, 30, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    image.save(&path).unwrap();

    let world = World::from_image(&path, MapInfo::default(), &Settings::default());
    std::fs::remove_file(&path).ok();
    let world = world.unwrap();

    assert_eq!(world.bound().width, 64);
    assert_eq!(world.bound().height, 32);
    assert!(world.is_solid(10, 20));
    assert!(!world.is_solid(10, 19));
}

#[test]
fn test_missing_image_is_an_error() {
    let result = World::from_image(
        std::path::Path::new("/no/such/ground.png"),
        MapInfo::default(),
        &Settings::default(),
    );
    assert!(result.is_err());
}

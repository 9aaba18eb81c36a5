//! Behavioral coverage for the layered liquid tests, driven by box scenes.

use blast_fishing_core::{
    Aabb, GeometryError, GeometryQuery, SurfaceHit, SurfaceMask, SurfaceTag, TaggedVolume,
};
use blast_fishing_scene::Scene;
use blast_fishing_system_classifier::{ClassifierConfig, LiquidClassifier};
use glam::Vec3;

/// A pond with a lakebed underneath: water fills y in [-3, 0] over a 20x20
/// footprint, ground fills y in [-5, -3] over a slightly larger one.
fn pond() -> Scene {
    let mut scene = Scene::new();
    let water = scene.register_tag("Water").expect("tag capacity");
    let ground = scene.register_tag("Ground").expect("tag capacity");
    let _ = scene.add_volume(
        water,
        Aabb::from_corners(Vec3::new(-10.0, -3.0, -10.0), Vec3::new(10.0, 0.0, 10.0)),
    );
    let _ = scene.add_volume(
        ground,
        Aabb::from_corners(Vec3::new(-12.0, -5.0, -12.0), Vec3::new(12.0, -3.0, 12.0)),
    );
    scene
}

fn classifier_for(scene: &Scene) -> LiquidClassifier {
    let mut classifier = LiquidClassifier::default();
    let cached = classifier.rebuild_cache(scene);
    assert_eq!(cached, 1, "pond scenes cache exactly the water volume");
    classifier
}

#[test]
fn point_inside_the_water_volume_is_liquid() {
    let scene = pond();
    let mut classifier = classifier_for(&scene);

    assert!(classifier.is_in_liquid(&scene, Vec3::new(0.0, -1.0, 0.0)));
    let assessment = classifier.last_assessment().expect("assessment recorded");
    assert_eq!(assessment.point, Vec3::new(0.0, -1.0, 0.0));
    assert!(assessment.in_liquid);
}

#[test]
fn point_on_the_lakebed_under_water_is_liquid() {
    let scene = pond();
    let mut classifier = classifier_for(&scene);

    assert!(classifier.is_in_liquid(&scene, Vec3::new(4.0, -2.9, -4.0)));
}

#[test]
fn hover_just_above_the_surface_is_still_liquid() {
    let scene = pond();
    let mut classifier = classifier_for(&scene);

    // Above the column accept band but below the dry-land threshold; the
    // unfiltered first-contact probe still sees water first below.
    assert!(classifier.is_in_liquid(&scene, Vec3::new(0.0, 0.4, 0.0)));
}

#[test]
fn hover_past_the_dry_land_threshold_is_dry() {
    let scene = pond();
    let mut classifier = classifier_for(&scene);

    assert!(!classifier.is_in_liquid(&scene, Vec3::new(0.0, 0.6, 0.0)));
    let assessment = classifier.last_assessment().expect("assessment recorded");
    assert!(!assessment.in_liquid);
}

#[test]
fn far_away_point_is_rejected_by_the_bounds_prefilter() {
    let scene = pond();
    let mut classifier = classifier_for(&scene);

    assert!(!classifier.is_in_liquid(&scene, Vec3::new(100.0, 0.0, 0.0)));
}

#[test]
fn bank_point_within_proximity_reach_is_liquid() {
    let scene = pond();
    let mut classifier = classifier_for(&scene);

    // Standing on the bank 0.4 units from the water's edge: no water in the
    // vertical column, but the proximity capsule reaches it unoccluded.
    assert!(classifier.is_in_liquid(&scene, Vec3::new(10.4, -2.9, 0.0)));
}

#[test]
fn bank_point_behind_a_wall_is_dry() {
    let mut scene = pond();
    let wall = scene.register_tag("Wall").expect("tag capacity");
    let _ = scene.add_volume(
        wall,
        Aabb::from_corners(Vec3::new(10.0, -3.0, -2.0), Vec3::new(10.15, 1.0, 2.0)),
    );
    let mut classifier = classifier_for(&scene);

    // Same bank point as the open case, but a wall sits between it and the
    // water's closest point, so the proximity hit is discarded.
    assert!(!classifier.is_in_liquid(&scene, Vec3::new(10.4, -2.9, 0.0)));
}

#[test]
fn bank_point_beyond_proximity_reach_is_dry() {
    let scene = pond();
    let mut config = ClassifierConfig::default();
    config.bounds_margin = 2.0;
    let mut classifier = LiquidClassifier::new(config);
    let _ = classifier.rebuild_cache(&scene);

    // Wide prefilter margin lets the point through, but at 1.1 units from
    // the edge neither the capsule nor the sweeps reach the water.
    assert!(!classifier.is_in_liquid(&scene, Vec3::new(11.1, -2.9, 0.0)));
}

#[test]
fn sphere_sweep_catches_water_diagonally_off_the_corner() {
    let scene = pond();
    let mut classifier = classifier_for(&scene);

    // Diagonally past the water's top corner: the capsule gap exceeds its
    // radius and a thin ray misses, but the default sphere sweep connects.
    assert!(classifier.is_in_liquid(&scene, Vec3::new(10.45, 0.4, 10.45)));
}

#[test]
fn thin_ray_fallback_misses_water_off_the_corner() {
    let scene = pond();
    let mut config = ClassifierConfig::default();
    config.probe_radius = 0.0;
    let mut classifier = LiquidClassifier::new(config);
    let _ = classifier.rebuild_cache(&scene);

    assert!(!classifier.is_in_liquid(&scene, Vec3::new(10.45, 0.4, 10.45)));
}

#[test]
fn missing_liquid_tag_classifies_everything_dry() {
    let mut scene = Scene::new();
    let ground = scene.register_tag("Ground").expect("tag capacity");
    let _ = scene.add_volume(
        ground,
        Aabb::from_corners(Vec3::new(-12.0, -5.0, -12.0), Vec3::new(12.0, -3.0, 12.0)),
    );

    let mut classifier = LiquidClassifier::default();
    assert_eq!(classifier.rebuild_cache(&scene), 0);
    assert!(!classifier.is_in_liquid(&scene, Vec3::new(0.0, -4.0, 0.0)));
}

#[test]
fn cache_rebuild_picks_up_new_volumes() {
    let mut scene = pond();
    let mut classifier = classifier_for(&scene);

    // A second pool appears far from the first; the stale cache rejects it.
    let water = scene.register_tag("Water").expect("tag capacity");
    let _ = scene.add_volume(
        water,
        Aabb::from_corners(Vec3::new(40.0, -3.0, 40.0), Vec3::new(50.0, 0.0, 50.0)),
    );
    assert!(!classifier.is_in_liquid(&scene, Vec3::new(45.0, -1.0, 45.0)));

    assert_eq!(classifier.rebuild_cache(&scene), 2);
    assert!(classifier.is_in_liquid(&scene, Vec3::new(45.0, -1.0, 45.0)));
}

/// Scene wrapper whose directional casts always fail, leaving only the
/// overlap query and the scan usable.
struct FailingRays {
    inner: Scene,
}

impl GeometryQuery for FailingRays {
    fn resolve_tag(&self, name: &str) -> Option<SurfaceTag> {
        self.inner.resolve_tag(name)
    }

    fn tagged_volumes(&self, mask: SurfaceMask) -> Result<Vec<TaggedVolume>, GeometryError> {
        self.inner.tagged_volumes(mask)
    }

    fn cast_ray(
        &self,
        _origin: Vec3,
        _direction: Vec3,
        _max_distance: f32,
        _mask: SurfaceMask,
    ) -> Result<Option<SurfaceHit>, GeometryError> {
        Err(GeometryError::ProbeFailed {
            operation: "cast_ray",
            detail: String::from("probe backend offline"),
        })
    }

    fn cast_sphere(
        &self,
        _origin: Vec3,
        _radius: f32,
        _direction: Vec3,
        _max_distance: f32,
        _mask: SurfaceMask,
    ) -> Result<Option<SurfaceHit>, GeometryError> {
        Err(GeometryError::ProbeFailed {
            operation: "cast_sphere",
            detail: String::from("probe backend offline"),
        })
    }

    fn overlap_capsule(
        &self,
        center: Vec3,
        half_height: f32,
        radius: f32,
        mask: SurfaceMask,
        out: &mut Vec<SurfaceHit>,
    ) -> Result<(), GeometryError> {
        self.inner
            .overlap_capsule(center, half_height, radius, mask, out)
    }
}

/// Scene wrapper that fails only the sphere sweep.
struct FailingSphere {
    inner: Scene,
}

impl GeometryQuery for FailingSphere {
    fn resolve_tag(&self, name: &str) -> Option<SurfaceTag> {
        self.inner.resolve_tag(name)
    }

    fn tagged_volumes(&self, mask: SurfaceMask) -> Result<Vec<TaggedVolume>, GeometryError> {
        self.inner.tagged_volumes(mask)
    }

    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: SurfaceMask,
    ) -> Result<Option<SurfaceHit>, GeometryError> {
        self.inner.cast_ray(origin, direction, max_distance, mask)
    }

    fn cast_sphere(
        &self,
        _origin: Vec3,
        _radius: f32,
        _direction: Vec3,
        _max_distance: f32,
        _mask: SurfaceMask,
    ) -> Result<Option<SurfaceHit>, GeometryError> {
        Err(GeometryError::ProbeFailed {
            operation: "cast_sphere",
            detail: String::from("sweep backend offline"),
        })
    }

    fn overlap_capsule(
        &self,
        center: Vec3,
        half_height: f32,
        radius: f32,
        mask: SurfaceMask,
        out: &mut Vec<SurfaceHit>,
    ) -> Result<(), GeometryError> {
        self.inner
            .overlap_capsule(center, half_height, radius, mask, out)
    }
}

#[test]
fn failing_ray_probes_abstain_without_poisoning_the_verdict() {
    let geometry = FailingRays { inner: pond() };
    let mut classifier = LiquidClassifier::default();
    let _ = classifier.rebuild_cache(&geometry);

    // Interior point: the proximity capsule still reaches it, and a
    // zero-length path to its own closest point cannot be occluded.
    assert!(classifier.is_in_liquid(&geometry, Vec3::new(0.0, -1.0, 0.0)));

    // Hovering point: every signal that could accept it needs a ray, so the
    // failures leave it dry instead of erroring out.
    assert!(!classifier.is_in_liquid(&geometry, Vec3::new(0.0, 0.4, 0.0)));
}

#[test]
fn failing_sphere_sweep_leaves_earlier_signals_intact() {
    let geometry = FailingSphere { inner: pond() };
    let mut classifier = LiquidClassifier::default();
    let _ = classifier.rebuild_cache(&geometry);

    assert!(classifier.is_in_liquid(&geometry, Vec3::new(0.0, -1.0, 0.0)));
    assert!(!classifier.is_in_liquid(&geometry, Vec3::new(10.45, 0.4, 10.45)));
}

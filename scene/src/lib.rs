#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! In-memory tagged-volume scene for the blast-fishing engine.
//!
//! The scene is the reference implementation of
//! [`GeometryQuery`]: a registry of named surface categories plus a flat list
//! of axis-aligned volumes. Hosts embedding the systems into a real engine
//! supply their own implementation; this one backs the CLI and the test
//! suites with fully deterministic probe results.
//!
//! Rays treat volumes as one-sided solids. A ray that starts inside a volume
//! passes through it and can only contact other volumes, which mirrors how
//! solid colliders behave in the engines this scene stands in for.

use blast_fishing_core::{
    Aabb, GeometryError, GeometryQuery, SurfaceHit, SurfaceMask, SurfaceTag, TaggedVolume,
    VolumeId,
};
use glam::Vec3;

const MAX_TAGS: usize = 32;
const AXIS_EPSILON: f32 = 1e-6;

/// Deterministic in-memory scene made of tagged axis-aligned volumes.
#[derive(Debug, Default)]
pub struct Scene {
    tags: Vec<String>,
    volumes: Vec<Volume>,
}

#[derive(Debug)]
struct Volume {
    id: VolumeId,
    tag: SurfaceTag,
    bounds: Aabb,
}

impl Scene {
    /// Creates an empty scene with no registered surface categories.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a surface category, or returns the existing tag for `name`.
    ///
    /// Returns `None` once all 32 representable categories are taken.
    pub fn register_tag(&mut self, name: &str) -> Option<SurfaceTag> {
        if let Some(existing) = self.resolve_tag(name) {
            return Some(existing);
        }
        if self.tags.len() >= MAX_TAGS {
            return None;
        }
        let tag = SurfaceTag::new(self.tags.len() as u8);
        self.tags.push(name.to_string());
        Some(tag)
    }

    /// Adds a volume carrying the provided tag and returns its handle.
    pub fn add_volume(&mut self, tag: SurfaceTag, bounds: Aabb) -> VolumeId {
        let id = VolumeId::new(self.volumes.len() as u32);
        self.volumes.push(Volume { id, tag, bounds });
        id
    }

    /// Number of volumes currently in the scene.
    #[must_use]
    pub fn volume_count(&self) -> usize {
        self.volumes.len()
    }

    fn masked(&self, mask: SurfaceMask) -> impl Iterator<Item = &Volume> {
        self.volumes
            .iter()
            .filter(move |volume| mask.contains(volume.tag))
    }
}

impl GeometryQuery for Scene {
    fn resolve_tag(&self, name: &str) -> Option<SurfaceTag> {
        self.tags
            .iter()
            .position(|registered| registered == name)
            .map(|index| SurfaceTag::new(index as u8))
    }

    fn tagged_volumes(&self, mask: SurfaceMask) -> Result<Vec<TaggedVolume>, GeometryError> {
        Ok(self
            .masked(mask)
            .map(|volume| TaggedVolume {
                id: volume.id,
                tag: volume.tag,
                bounds: volume.bounds,
            })
            .collect())
    }

    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: SurfaceMask,
    ) -> Result<Option<SurfaceHit>, GeometryError> {
        let Some(direction) = direction.try_normalize() else {
            return Ok(None);
        };

        let mut nearest: Option<SurfaceHit> = None;
        for volume in self.masked(mask) {
            let Some(distance) = ray_entry_distance(&volume.bounds, origin, direction, max_distance)
            else {
                continue;
            };
            if nearest.map_or(true, |hit| distance < hit.distance) {
                nearest = Some(SurfaceHit {
                    volume: volume.id,
                    tag: volume.tag,
                    point: origin + direction * distance,
                    distance,
                });
            }
        }
        Ok(nearest)
    }

    fn cast_sphere(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: SurfaceMask,
    ) -> Result<Option<SurfaceHit>, GeometryError> {
        let radius = radius.max(0.0);
        let Some(direction) = direction.try_normalize() else {
            return Ok(None);
        };

        let mut nearest: Option<SurfaceHit> = None;
        for volume in self.masked(mask) {
            let inflated = volume.bounds.inflated(radius);
            let Some(distance) = ray_entry_distance(&inflated, origin, direction, max_distance)
            else {
                continue;
            };
            if nearest.map_or(true, |hit| distance < hit.distance) {
                let sphere_center = origin + direction * distance;
                nearest = Some(SurfaceHit {
                    volume: volume.id,
                    tag: volume.tag,
                    point: volume.bounds.closest_point(sphere_center),
                    distance,
                });
            }
        }
        Ok(nearest)
    }

    fn overlap_capsule(
        &self,
        center: Vec3,
        half_height: f32,
        radius: f32,
        mask: SurfaceMask,
        out: &mut Vec<SurfaceHit>,
    ) -> Result<(), GeometryError> {
        let half_height = half_height.max(0.0);
        let radius = radius.max(0.0);

        for volume in self.masked(mask) {
            if !capsule_overlaps(&volume.bounds, center, half_height, radius) {
                continue;
            }
            let closest = volume.bounds.closest_point(center);
            out.push(SurfaceHit {
                volume: volume.id,
                tag: volume.tag,
                point: closest,
                distance: center.distance(closest),
            });
        }
        Ok(())
    }
}

/// Distance along the ray at which it enters the box, if it does so within
/// `max_distance`. Rays originating inside the box report no entry.
fn ray_entry_distance(
    bounds: &Aabb,
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
) -> Option<f32> {
    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        let lo = bounds.min()[axis];
        let hi = bounds.max()[axis];

        if d.abs() < AXIS_EPSILON {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }

        let mut t1 = (lo - o) / d;
        let mut t2 = (hi - o) / d;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        t_near = t_near.max(t1);
        t_far = t_far.min(t2);
        if t_near > t_far {
            return None;
        }
    }

    // Entry strictly behind the origin means the origin sits inside.
    if t_near < 0.0 || t_far < 0.0 {
        return None;
    }
    (t_near <= max_distance).then_some(t_near)
}

/// Exact overlap test between a vertical capsule and a box.
fn capsule_overlaps(bounds: &Aabb, center: Vec3, half_height: f32, radius: f32) -> bool {
    let gap_x = axis_gap(center.x, bounds.min().x, bounds.max().x);
    let gap_z = axis_gap(center.z, bounds.min().z, bounds.max().z);

    let segment_lo = center.y - half_height;
    let segment_hi = center.y + half_height;
    let gap_y = if segment_hi < bounds.min().y {
        bounds.min().y - segment_hi
    } else if segment_lo > bounds.max().y {
        segment_lo - bounds.max().y
    } else {
        0.0
    };

    gap_x * gap_x + gap_y * gap_y + gap_z * gap_z <= radius * radius
}

fn axis_gap(value: f32, lo: f32, hi: f32) -> f32 {
    (lo - value).max(value - hi).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blast_fishing_core::SurfaceMask;

    fn pond_scene() -> (Scene, SurfaceTag, SurfaceTag) {
        let mut scene = Scene::new();
        let water = scene.register_tag("Water").expect("tag capacity");
        let ground = scene.register_tag("Ground").expect("tag capacity");

        // Water slab with its surface at y = 0, lakebed below it.
        let _ = scene.add_volume(
            water,
            Aabb::from_corners(Vec3::new(-10.0, -3.0, -10.0), Vec3::new(10.0, 0.0, 10.0)),
        );
        let _ = scene.add_volume(
            ground,
            Aabb::from_corners(Vec3::new(-10.0, -5.0, -10.0), Vec3::new(10.0, -3.0, 10.0)),
        );
        (scene, water, ground)
    }

    #[test]
    fn registering_a_tag_twice_returns_the_same_tag() {
        let mut scene = Scene::new();
        let first = scene.register_tag("Water").expect("tag capacity");
        let second = scene.register_tag("Water").expect("tag capacity");

        assert_eq!(first, second);
        assert_eq!(scene.resolve_tag("Water"), Some(first));
        assert_eq!(scene.resolve_tag("Lava"), None);
    }

    #[test]
    fn downward_ray_contacts_the_water_surface() {
        let (scene, water, _) = pond_scene();
        let mask = SurfaceMask::EMPTY.with(water);

        let hit = scene
            .cast_ray(Vec3::new(0.0, 12.0, 0.0), Vec3::NEG_Y, 24.0, mask)
            .expect("probe")
            .expect("water below");

        assert_eq!(hit.tag, water);
        assert!((hit.point.y - 0.0).abs() < 1e-4);
        assert!((hit.distance - 12.0).abs() < 1e-4);
    }

    #[test]
    fn ray_starting_inside_a_volume_passes_through_it() {
        let (scene, water, ground) = pond_scene();
        let mask = SurfaceMask::EMPTY.with(water).with(ground);

        // From inside the water slab, the first reportable contact going down
        // is the lakebed, not the water volume the origin sits in.
        let hit = scene
            .cast_ray(Vec3::new(0.0, -1.0, 0.0), Vec3::NEG_Y, 24.0, mask)
            .expect("probe")
            .expect("lakebed below");

        assert_eq!(hit.tag, ground);
        assert!((hit.point.y - -3.0).abs() < 1e-4);
    }

    #[test]
    fn masked_ray_ignores_other_categories() {
        let (scene, water, ground) = pond_scene();
        let water_only = SurfaceMask::EMPTY.with(water);

        let hit = scene
            .cast_ray(Vec3::new(0.0, -1.0, 0.0), Vec3::NEG_Y, 24.0, water_only)
            .expect("probe");

        assert!(hit.is_none(), "ground must be filtered out, got {hit:?}");
        let ground_only = SurfaceMask::EMPTY.with(ground);
        let none = scene
            .cast_ray(Vec3::new(40.0, 12.0, 0.0), Vec3::NEG_Y, 24.0, ground_only)
            .expect("probe");
        assert!(none.is_none());
    }

    #[test]
    fn ray_respects_maximum_distance() {
        let (scene, water, _) = pond_scene();
        let mask = SurfaceMask::EMPTY.with(water);

        let short = scene
            .cast_ray(Vec3::new(0.0, 12.0, 0.0), Vec3::NEG_Y, 5.0, mask)
            .expect("probe");

        assert!(short.is_none());
    }

    #[test]
    fn sphere_cast_reports_the_surface_point_of_the_contacted_volume() {
        let (scene, water, _) = pond_scene();
        let mask = SurfaceMask::EMPTY.with(water);

        let hit = scene
            .cast_sphere(Vec3::new(0.0, 6.0, 0.0), 0.5, Vec3::NEG_Y, 24.0, mask)
            .expect("probe")
            .expect("water below");

        // The inflated slab is contacted half a unit early, but the reported
        // point lies on the real surface.
        assert!((hit.distance - 5.5).abs() < 1e-4);
        assert!((hit.point.y - 0.0).abs() < 1e-4);
    }

    #[test]
    fn capsule_overlap_reports_closest_points() {
        let (scene, water, _) = pond_scene();
        let mask = SurfaceMask::EMPTY.with(water);

        let mut hits = Vec::new();
        scene
            .overlap_capsule(Vec3::new(0.0, 0.3, 0.0), 1.2, 0.4, mask, &mut hits)
            .expect("probe");

        assert_eq!(hits.len(), 1);
        assert!((hits[0].point.y - 0.0).abs() < 1e-4);
        assert!((hits[0].distance - 0.3).abs() < 1e-4);
    }

    #[test]
    fn capsule_beyond_radius_misses() {
        let (scene, water, _) = pond_scene();
        let mask = SurfaceMask::EMPTY.with(water);

        let mut hits = Vec::new();
        scene
            .overlap_capsule(Vec3::new(0.0, 2.0, 0.0), 1.2, 0.4, mask, &mut hits)
            .expect("probe");

        assert!(hits.is_empty(), "surface is 0.8 below the capsule tip");
    }

    #[test]
    fn capsule_next_to_a_volume_uses_horizontal_distance() {
        let (scene, water, _) = pond_scene();
        let mask = SurfaceMask::EMPTY.with(water);

        let mut hits = Vec::new();
        scene
            .overlap_capsule(Vec3::new(10.3, -1.0, 0.0), 1.2, 0.4, mask, &mut hits)
            .expect("probe");
        assert_eq!(hits.len(), 1, "0.3 outside the slab face is within radius");

        hits.clear();
        scene
            .overlap_capsule(Vec3::new(10.5, -1.0, 0.0), 1.2, 0.4, mask, &mut hits)
            .expect("probe");
        assert!(hits.is_empty(), "0.5 outside the slab face is out of reach");
    }

    #[test]
    fn tagged_volume_scan_filters_by_mask() {
        let (scene, water, ground) = pond_scene();

        let liquid = scene
            .tagged_volumes(SurfaceMask::EMPTY.with(water))
            .expect("scan");
        assert_eq!(liquid.len(), 1);
        assert_eq!(liquid[0].tag, water);

        let everything = scene
            .tagged_volumes(SurfaceMask::EMPTY.with(water).with(ground))
            .expect("scan");
        assert_eq!(everything.len(), 2);
    }
}

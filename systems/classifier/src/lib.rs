#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Liquid region classification for explosion sites.
//!
//! Liquid volumes are thin, irregular shapes, and a single geometric signal
//! misclassifies points near banks, bridges and roads running alongside
//! water. The classifier layers several probes of increasing cost over a
//! cached volume scan: a bounds prefilter that can only reject, a vertical
//! column probe against the liquid surface, unfiltered first-contact probes,
//! a proximity capsule with per-hit occlusion filtering, and a final precise
//! sweep. Any confidently positive signal short-circuits to `true`; a point
//! that convinces no signal is dry.

use blast_fishing_core::{GeometryQuery, SurfaceHit, SurfaceMask, TaggedVolume};
use glam::Vec3;

/// Probe origins are nudged off the query point so a surface crossing the
/// point itself still registers.
const PROBE_ORIGIN_LIFT: f32 = 0.2;
const PROBE_ORIGIN_DROP: f32 = 0.1;
const MIN_PROBE_DISTANCE: f32 = 0.01;
/// Paths shorter than this are never considered occluded.
const OCCLUSION_EPSILON: f32 = 1e-3;

/// Tuning for the layered liquid tests.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassifierConfig {
    /// Surface category names treated as liquid. Unresolvable names are
    /// skipped with a warning; if none resolve, every point is dry.
    pub liquid_tags: Vec<String>,
    /// Reach of the directional probes in world units.
    pub raycast_depth: f32,
    /// Radius of the precise sweep. Zero falls back to a thin ray.
    pub probe_radius: f32,
    /// Reject points outside every cached volume's bounds before probing.
    pub use_bounds_prefilter: bool,
    /// Margin added to cached bounds so the prefilter stays coarse.
    pub bounds_margin: f32,
    /// Radius of the proximity capsule.
    pub near_radius: f32,
    /// Half-height of the proximity capsule.
    pub vertical_half_extent: f32,
    /// Tolerated height above the liquid surface for the column accept.
    pub surface_allowance: f32,
    /// Height above the liquid surface past which the point is dry land and
    /// no proximity signal may overrule that.
    pub dry_land_allowance: f32,
    /// Height above the query point from which the surface probe scans down.
    pub scan_height: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            liquid_tags: vec![String::from("Water")],
            raycast_depth: 5.0,
            probe_radius: 0.5,
            use_bounds_prefilter: true,
            bounds_margin: 0.5,
            near_radius: 0.6,
            vertical_half_extent: 1.2,
            surface_allowance: 0.35,
            dry_land_allowance: 0.5,
            scan_height: 12.0,
        }
    }
}

impl ClassifierConfig {
    /// Clamps every field into its workable range.
    ///
    /// Extreme values do not fail construction; they are pulled back to the
    /// nearest value the probes can operate with.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.raycast_depth = self.raycast_depth.clamp(0.5, 50.0);
        self.probe_radius = self.probe_radius.clamp(0.0, 5.0);
        self.bounds_margin = self.bounds_margin.max(0.0);
        self.near_radius = self.near_radius.clamp(0.05, 3.0);
        self.vertical_half_extent = self.vertical_half_extent.clamp(0.05, 5.0);
        self.surface_allowance = self.surface_allowance.max(0.0);
        self.dry_land_allowance = self.dry_land_allowance.max(self.surface_allowance);
        self.scan_height = self.scan_height.clamp(2.0, 100.0);
        self
    }
}

/// Diagnostic record of the most recent classification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Assessment {
    /// Point that was classified.
    pub point: Vec3,
    /// Verdict returned to the caller.
    pub in_liquid: bool,
}

/// Decides whether a world-space point lies inside a liquid region.
///
/// The classifier holds a cache of liquid volume bounds that callers refresh
/// explicitly via [`LiquidClassifier::rebuild_cache`]; classification never
/// rescans the scene on its own. Until a rebuild resolves at least one liquid
/// tag, every point is reported dry.
#[derive(Debug)]
pub struct LiquidClassifier {
    config: ClassifierConfig,
    liquid_mask: SurfaceMask,
    cached_volumes: Vec<TaggedVolume>,
    overlap_scratch: Vec<SurfaceHit>,
    last_assessment: Option<Assessment>,
}

impl LiquidClassifier {
    /// Creates a classifier with the given tuning, sanitized first.
    #[must_use]
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config: config.sanitized(),
            liquid_mask: SurfaceMask::EMPTY,
            cached_volumes: Vec::new(),
            overlap_scratch: Vec::new(),
            last_assessment: None,
        }
    }

    /// Tuning currently in effect.
    #[must_use]
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// The most recent point and verdict, for visualization.
    #[must_use]
    pub fn last_assessment(&self) -> Option<Assessment> {
        self.last_assessment
    }

    /// Number of liquid volumes currently cached.
    #[must_use]
    pub fn cached_volume_count(&self) -> usize {
        self.cached_volumes.len()
    }

    /// Re-resolves the liquid tags and re-scans the scene for their volumes.
    ///
    /// Returns the number of volumes cached. Callers own the refresh cadence;
    /// a scene that changes shape is stale until the next rebuild.
    pub fn rebuild_cache<G: GeometryQuery>(&mut self, geometry: &G) -> usize {
        let mut mask = SurfaceMask::EMPTY;
        for name in &self.config.liquid_tags {
            match geometry.resolve_tag(name) {
                Some(tag) => mask = mask.with(tag),
                None => log::warn!("liquid_classifier: surface tag '{name}' not found in scene"),
            }
        }
        self.liquid_mask = mask;
        self.cached_volumes.clear();

        if mask.is_empty() {
            log::warn!("liquid_classifier: no liquid tag resolved, every point will be dry");
            return 0;
        }

        match geometry.tagged_volumes(mask) {
            Ok(volumes) => self.cached_volumes = volumes,
            Err(error) => log::warn!("liquid_classifier: volume scan failed: {error}"),
        }
        log::info!(
            "liquid_classifier: cache rebuilt with {} liquid volumes",
            self.cached_volumes.len()
        );
        self.cached_volumes.len()
    }

    /// Classifies a world-space point, recording it as the last assessment.
    pub fn is_in_liquid<G: GeometryQuery>(&mut self, geometry: &G, point: Vec3) -> bool {
        let in_liquid = self.classify(geometry, point);
        self.last_assessment = Some(Assessment { point, in_liquid });
        in_liquid
    }

    fn classify<G: GeometryQuery>(&mut self, geometry: &G, point: Vec3) -> bool {
        if self.liquid_mask.is_empty() {
            return false;
        }

        // The prefilter only ever rejects. An empty cache abstains so probes
        // still run against a scene that was never scanned successfully.
        if self.config.use_bounds_prefilter
            && !self.cached_volumes.is_empty()
            && !self.inside_cached_bounds(point)
        {
            return false;
        }

        let surface_height = self.probe_surface_height(geometry, point);

        if let Some(surface_y) = surface_height {
            if point.y <= surface_y + self.config.surface_allowance {
                let surface_point = Vec3::new(point.x, surface_y, point.z);
                if !self.occluded(geometry, point, surface_point) {
                    return true;
                }
            }
        }

        // A point well above the only liquid surface in its column is dry
        // land; no nearby-volume signal may overrule that.
        if surface_height
            .is_some_and(|surface_y| point.y > surface_y + self.config.dry_land_allowance)
        {
            return false;
        }

        let probe_distance =
            (self.config.raycast_depth + PROBE_ORIGIN_LIFT).max(MIN_PROBE_DISTANCE);
        let down_origin = point + Vec3::Y * PROBE_ORIGIN_LIFT;
        let up_origin = point - Vec3::Y * PROBE_ORIGIN_DROP;

        if self.first_contact_is_liquid(geometry, down_origin, -Vec3::Y, probe_distance)
            || self.first_contact_is_liquid(geometry, up_origin, Vec3::Y, probe_distance)
        {
            return true;
        }

        if self.proximity_accepts(geometry, point) {
            return true;
        }

        self.precise_cast_accepts(geometry, point, down_origin, -Vec3::Y, probe_distance)
            || self.precise_cast_accepts(geometry, point, up_origin, Vec3::Y, probe_distance)
    }

    fn inside_cached_bounds(&self, point: Vec3) -> bool {
        let margin = self.config.bounds_margin;
        self.cached_volumes
            .iter()
            .any(|volume| volume.bounds.inflated(margin).contains(point))
    }

    /// Height of the nearest liquid surface straight above or below the
    /// point, found by scanning down through its column. `None` abstains.
    fn probe_surface_height<G: GeometryQuery>(&self, geometry: &G, point: Vec3) -> Option<f32> {
        let top = point + Vec3::Y * self.config.scan_height;
        match geometry.cast_ray(top, -Vec3::Y, self.config.scan_height * 2.0, self.liquid_mask) {
            Ok(hit) => hit.map(|hit| hit.point.y),
            Err(error) => {
                log::warn!("liquid_classifier: surface probe failed: {error}");
                None
            }
        }
    }

    /// Whether a straight path between two points crosses non-liquid
    /// geometry. A probe failure suppresses the accept that asked, so a
    /// faulting scene cannot produce a false positive.
    fn occluded<G: GeometryQuery>(&self, geometry: &G, from: Vec3, to: Vec3) -> bool {
        let delta = to - from;
        let distance = delta.length();
        if distance <= OCCLUSION_EPSILON {
            return false;
        }
        match geometry.cast_ray(from, delta / distance, distance, self.liquid_mask.complement()) {
            Ok(hit) => hit.is_some(),
            Err(error) => {
                log::warn!("liquid_classifier: occlusion probe failed: {error}");
                true
            }
        }
    }

    fn first_contact_is_liquid<G: GeometryQuery>(
        &self,
        geometry: &G,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
    ) -> bool {
        match geometry.cast_ray(origin, direction, max_distance, SurfaceMask::ALL) {
            Ok(Some(hit)) => self.liquid_mask.contains(hit.tag),
            Ok(None) => false,
            Err(error) => {
                log::warn!("liquid_classifier: first-contact probe failed: {error}");
                false
            }
        }
    }

    fn proximity_accepts<G: GeometryQuery>(&mut self, geometry: &G, point: Vec3) -> bool {
        self.overlap_scratch.clear();
        if let Err(error) = geometry.overlap_capsule(
            point,
            self.config.vertical_half_extent,
            self.config.near_radius,
            self.liquid_mask,
            &mut self.overlap_scratch,
        ) {
            log::warn!("liquid_classifier: proximity probe failed: {error}");
            return false;
        }
        self.overlap_scratch
            .iter()
            .any(|hit| !self.occluded(geometry, point, hit.point))
    }

    fn precise_cast_accepts<G: GeometryQuery>(
        &self,
        geometry: &G,
        point: Vec3,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
    ) -> bool {
        let cast = if self.config.probe_radius > 0.0 {
            geometry.cast_sphere(
                origin,
                self.config.probe_radius,
                direction,
                max_distance,
                self.liquid_mask,
            )
        } else {
            geometry.cast_ray(origin, direction, max_distance, self.liquid_mask)
        };
        match cast {
            Ok(Some(hit)) => !self.occluded(geometry, point, hit.point),
            Ok(None) => false,
            Err(error) => {
                log::warn!("liquid_classifier: precise probe failed: {error}");
                false
            }
        }
    }
}

impl Default for LiquidClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

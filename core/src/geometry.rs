//! Spatial query contracts the classifier probes the host scene through.
//!
//! The classifier never talks to a concrete scene type. It sees the world as
//! a set of tagged volumes behind [`GeometryQuery`], which keeps the layered
//! classification logic independent of whichever spatial index the host
//! actually runs. Probe failures surface as [`GeometryError`] values so the
//! caller can treat a broken probe as an abstaining signal instead of a
//! crash.

use std::fmt;

use glam::Vec3;

/// Identifier of a named surface category registered with the host scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceTag(u8);

impl SurfaceTag {
    /// Creates a tag wrapping the provided category index.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Retrieves the category index backing the tag.
    #[must_use]
    pub const fn index(&self) -> u8 {
        self.0
    }
}

/// Bit-set of surface categories used to filter geometry probes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceMask(u32);

impl SurfaceMask {
    /// Mask that matches no surface category.
    pub const EMPTY: SurfaceMask = SurfaceMask(0);

    /// Mask that matches every surface category.
    pub const ALL: SurfaceMask = SurfaceMask(u32::MAX);

    /// Returns a copy of the mask with the provided tag included.
    ///
    /// Tags beyond the 32 representable categories leave the mask unchanged.
    #[must_use]
    pub const fn with(self, tag: SurfaceTag) -> Self {
        if tag.index() < 32 {
            Self(self.0 | 1 << (tag.index() as u32))
        } else {
            self
        }
    }

    /// Reports whether the mask includes the provided tag.
    #[must_use]
    pub const fn contains(&self, tag: SurfaceTag) -> bool {
        tag.index() < 32 && self.0 & (1 << (tag.index() as u32)) != 0
    }

    /// Returns the mask matching exactly the categories this one excludes.
    #[must_use]
    pub const fn complement(self) -> Self {
        Self(!self.0)
    }

    /// Reports whether the mask matches no category at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// Unique handle assigned to a volume by the host scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VolumeId(u32);

impl VolumeId {
    /// Creates a new volume handle with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Axis-aligned box in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    min: Vec3,
    max: Vec3,
}

impl Aabb {
    /// Builds a box from two opposite corners, normalizing their order.
    #[must_use]
    pub fn from_corners(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Lower corner of the box.
    #[must_use]
    pub const fn min(&self) -> Vec3 {
        self.min
    }

    /// Upper corner of the box.
    #[must_use]
    pub const fn max(&self) -> Vec3 {
        self.max
    }

    /// Geometric center of the box.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Reports whether the point lies inside the box, boundary included.
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Closest point on or inside the box to the provided point.
    #[must_use]
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        point.clamp(self.min, self.max)
    }

    /// Returns a copy of the box grown by `margin` on every side.
    ///
    /// Negative margins are treated as zero.
    #[must_use]
    pub fn inflated(&self, margin: f32) -> Self {
        let margin = margin.max(0.0);
        let delta = Vec3::splat(margin);
        Self {
            min: self.min - delta,
            max: self.max + delta,
        }
    }
}

/// Single contact reported by a geometry probe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceHit {
    /// Handle of the volume that produced the contact.
    pub volume: VolumeId,
    /// Surface category of the contacted volume.
    pub tag: SurfaceTag,
    /// Contact point in world space.
    pub point: Vec3,
    /// Distance from the probe origin to the contact point.
    pub distance: f32,
}

/// Bounds snapshot of one tagged volume, as enumerated by a scene scan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TaggedVolume {
    /// Handle of the enumerated volume.
    pub id: VolumeId,
    /// Surface category the volume carries.
    pub tag: SurfaceTag,
    /// World-space bounds of the volume.
    pub bounds: Aabb,
}

/// Failure raised by a geometry probe that could not be evaluated.
#[derive(Debug, PartialEq, Eq)]
pub enum GeometryError {
    /// The scene does not support the requested probe at all.
    Unsupported {
        /// Name of the probe that was requested.
        operation: &'static str,
    },
    /// The probe started but failed before producing a verdict.
    ProbeFailed {
        /// Name of the probe that failed.
        operation: &'static str,
        /// Scene-specific description of the failure.
        detail: String,
    },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported { operation } => {
                write!(f, "geometry probe {operation} is not supported by the scene")
            }
            Self::ProbeFailed { operation, detail } => {
                write!(f, "geometry probe {operation} failed: {detail}")
            }
        }
    }
}

impl std::error::Error for GeometryError {}

/// Spatial query capability a scene must offer the classifier.
///
/// Rays treat volumes as one-sided solids: a ray whose origin lies inside a
/// volume passes through that volume and can only contact others. Every probe
/// reports the nearest qualifying contact.
pub trait GeometryQuery {
    /// Resolves a surface category name to its runtime tag.
    ///
    /// Returns `None` when the scene defines no such category.
    fn resolve_tag(&self, name: &str) -> Option<SurfaceTag>;

    /// Enumerates the bounds of every volume whose tag is included in `mask`.
    fn tagged_volumes(&self, mask: SurfaceMask) -> Result<Vec<TaggedVolume>, GeometryError>;

    /// Casts a ray and reports the first volume boundary it crosses.
    ///
    /// `direction` does not need to be normalized; `max_distance` is measured
    /// in world units along the normalized direction.
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: SurfaceMask,
    ) -> Result<Option<SurfaceHit>, GeometryError>;

    /// Sweeps a sphere of `radius` along a ray and reports the first contact.
    fn cast_sphere(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: SurfaceMask,
    ) -> Result<Option<SurfaceHit>, GeometryError>;

    /// Collects every masked volume overlapping a vertical capsule.
    ///
    /// The capsule's axis runs from `center - half_height` to
    /// `center + half_height` along the world up axis. Each reported hit
    /// carries the closest point on the volume to the capsule center, along
    /// with the distance to that point. Results are appended to `out` without
    /// clearing it.
    fn overlap_capsule(
        &self,
        center: Vec3,
        half_height: f32,
        radius: f32,
        mask: SurfaceMask,
        out: &mut Vec<SurfaceHit>,
    ) -> Result<(), GeometryError>;
}

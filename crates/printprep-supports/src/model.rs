//! The model being prepared: a list of rigid panels.

use printprep_kernel::{Aabb3, Solid};
use printprep_math::{Point3, Transform};

use crate::error::{PrepError, Result};

/// One rigid solid of the model with its bounding box cached.
#[derive(Debug, Clone)]
pub struct Panel {
    solid: Solid,
    bbox: Aabb3,
}

impl Panel {
    /// Wrap a solid, caching its bounds.
    pub fn new(solid: Solid) -> Self {
        let bbox = solid.bounding_box();
        Self { solid, bbox }
    }

    /// The panel geometry.
    pub fn solid(&self) -> &Solid {
        &self.solid
    }

    /// Cached bounds.
    pub fn bbox(&self) -> &Aabb3 {
        &self.bbox
    }

    /// Center of mass, falling back to the bounding-box center.
    pub fn centroid(&self) -> Point3 {
        self.solid.centroid().unwrap_or_else(|| self.bbox.center())
    }
}

/// A possibly multi-panel model. Panels are never mutated; transforms
/// produce a new model.
#[derive(Debug, Clone)]
pub struct Model {
    panels: Vec<Panel>,
}

impl Model {
    /// Build a model from its panels; empty solids are dropped.
    pub fn new(panels: impl IntoIterator<Item = Solid>) -> Result<Self> {
        let panels: Vec<Panel> = panels
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(Panel::new)
            .collect();
        if panels.is_empty() {
            return Err(PrepError::EmptyModel);
        }
        Ok(Self { panels })
    }

    /// Single-panel model.
    pub fn from_solid(solid: Solid) -> Result<Self> {
        Self::new([solid])
    }

    /// Model whose panels are the connected parts of `solid`.
    pub fn from_components(solid: &Solid) -> Result<Self> {
        Self::new(solid.components())
    }

    /// The panels.
    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// Bounds of every panel.
    pub fn bounding_box(&self) -> Aabb3 {
        self.panels
            .iter()
            .fold(Aabb3::empty(), |acc, p| acc.union(p.bbox()))
    }

    /// All panels as one solid.
    pub fn shape(&self) -> Solid {
        Solid::compound(self.panels.iter().map(|p| p.solid.clone()))
    }

    /// Copy of the model mapped through `t`.
    pub fn transformed(&self, t: &Transform) -> Model {
        Self {
            panels: self
                .panels
                .iter()
                .map(|p| Panel::new(p.solid.transformed(t)))
                .collect(),
        }
    }

    /// Copy of the model moved by `(dx, dy, dz)`.
    pub fn translated(&self, dx: f64, dy: f64, dz: f64) -> Model {
        self.transformed(&Transform::translation(dx, dy, dz))
    }
}

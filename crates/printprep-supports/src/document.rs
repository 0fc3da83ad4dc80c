//! Named-object document holding source and prepared solids.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use printprep_kernel::{export, Solid};
use tracing::{debug, info};

use crate::config::PrepConfig;
use crate::error::{PrepError, Result};
use crate::model::Model;
use crate::pipeline::{prepare_print, PrintJob};

/// Name under which [`prepare_document`] stores the composed print.
pub const PRINT_OBJECT: &str = "PrintSupported";

/// A flat store of named solids.
///
/// Edits mark objects as touched until the next [`Document::recompute`].
#[derive(Debug, Clone, Default)]
pub struct Document {
    objects: BTreeMap<String, Solid>,
    touched: BTreeSet<String>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `shape` under `name`, or under `name001`, `name002`, ... when
    /// taken. Returns the name used.
    pub fn add(&mut self, name: &str, shape: Solid) -> String {
        let mut unique = name.to_string();
        let mut n = 1;
        while self.objects.contains_key(&unique) {
            unique = format!("{name}{n:03}");
            n += 1;
        }
        self.touched.insert(unique.clone());
        self.objects.insert(unique.clone(), shape);
        unique
    }

    /// Look up an object.
    pub fn get(&self, name: &str) -> Option<&Solid> {
        self.objects.get(name)
    }

    /// Whether `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.objects.contains_key(name)
    }

    /// Remove an object, returning its shape.
    pub fn remove(&mut self, name: &str) -> Option<Solid> {
        self.touched.remove(name);
        self.objects.remove(name)
    }

    /// Replace the shape of an existing object.
    pub fn replace(&mut self, name: &str, shape: Solid) -> Result<Solid> {
        let slot = self
            .objects
            .get_mut(name)
            .ok_or_else(|| PrepError::MissingObject(name.to_string()))?;
        self.touched.insert(name.to_string());
        Ok(std::mem::replace(slot, shape))
    }

    /// Object names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.objects.keys().map(String::as_str)
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True when the document holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Settle pending edits; returns how many objects were touched.
    pub fn recompute(&mut self) -> usize {
        let touched = std::mem::take(&mut self.touched);
        for name in &touched {
            if let Some(shape) = self.objects.get(name) {
                debug!(name = %name, pieces = shape.piece_count(), "recomputed object");
            }
        }
        touched.len()
    }
}

/// Prepare the object named `source` and store the composed print.
///
/// The source solid is split into panels by connectivity. An existing
/// print object is replaced.
pub fn prepare_document(doc: &mut Document, source: &str, cfg: &PrepConfig) -> Result<PrintJob> {
    let solid = doc
        .get(source)
        .ok_or_else(|| PrepError::MissingObject(source.to_string()))?;
    let model = Model::from_components(solid)?;
    let job = prepare_print(&model, cfg)?;

    doc.remove(PRINT_OBJECT);
    doc.add(PRINT_OBJECT, job.to_solid());
    doc.recompute();
    info!(source, panels = job.model.panels().len(), "stored {PRINT_OBJECT}");
    Ok(job)
}

/// Write the print to a binary STL file; returns the triangle count.
pub fn export_print<P: AsRef<Path>>(job: &PrintJob, path: P) -> Result<usize> {
    Ok(export::write_stl(path, &job.parts())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orient::OrientationMode;
    use printprep_math::{Point3, Vec3};

    fn block() -> Solid {
        Solid::cuboid(Point3::origin(), Vec3::new(20.0, 8.0, 2.0)).unwrap()
    }

    fn cfg() -> PrepConfig {
        let mut cfg = PrepConfig::default();
        cfg.orientation.mode = OrientationMode::RaiseOnly;
        cfg
    }

    #[test]
    fn test_add_makes_names_unique() {
        let mut doc = Document::new();
        assert_eq!(doc.add("Wall", block()), "Wall");
        assert_eq!(doc.add("Wall", block()), "Wall001");
        assert_eq!(doc.add("Wall", block()), "Wall002");
        assert_eq!(doc.names().collect::<Vec<_>>(), vec!["Wall", "Wall001", "Wall002"]);
        assert_eq!(doc.recompute(), 3);
        assert_eq!(doc.recompute(), 0);
    }

    #[test]
    fn test_replace_and_remove() {
        let mut doc = Document::new();
        doc.add("Wall", block());
        doc.recompute();
        let old = doc.replace("Wall", Solid::empty()).unwrap();
        assert!(!old.is_empty());
        assert!(doc.get("Wall").unwrap().is_empty());
        assert_eq!(doc.recompute(), 1);

        assert!(matches!(doc.replace("Roof", block()), Err(PrepError::MissingObject(_))));
        assert!(doc.remove("Wall").is_some());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let mut doc = Document::new();
        let err = prepare_document(&mut doc, "ThinBuilding", &cfg()).unwrap_err();
        assert!(matches!(err, PrepError::MissingObject(name) if name == "ThinBuilding"));
        assert!(!doc.contains(PRINT_OBJECT));
    }

    #[test]
    fn test_prepare_stores_print_once() {
        let mut doc = Document::new();
        doc.add("ThinBuilding", block());
        let job = prepare_document(&mut doc, "ThinBuilding", &cfg()).unwrap();
        assert!(doc.contains(PRINT_OBJECT));
        prepare_document(&mut doc, "ThinBuilding", &cfg()).unwrap();
        assert_eq!(doc.len(), 2);

        let stored = doc.get(PRINT_OBJECT).unwrap();
        assert_eq!(stored.piece_count(), job.to_solid().piece_count());
    }

    #[test]
    fn test_export_print_writes_stl() {
        let mut doc = Document::new();
        doc.add("ThinBuilding", block());
        let job = prepare_document(&mut doc, "ThinBuilding", &cfg()).unwrap();

        let path = std::env::temp_dir().join(format!("printprep-print-{}.stl", std::process::id()));
        let triangles = export_print(&job, &path).unwrap();
        assert!(triangles > 12);
        let bytes = std::fs::read(&path).unwrap();
        // 80-byte header, u32 count, 50 bytes per triangle.
        assert_eq!(bytes.len(), 84 + 50 * triangles);
        std::fs::remove_file(&path).ok();
    }
}

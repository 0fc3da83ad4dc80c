//! Build-volume check against a printer catalogue.

use printprep_kernel::Aabb3;
use printprep_math::Vec3;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::FitConfig;
use crate::error::{PrepError, Result};

/// Known printers and their build volumes (X, Y, Z) in mm.
const PRINTERS: &[(&str, [f64; 3])] = &[
    ("m7_pro", [218.0, 123.0, 260.0]),
    ("m7_max", [298.0, 164.0, 300.0]),
];

/// Names of all catalogued printers.
pub fn printer_names() -> Vec<&'static str> {
    PRINTERS.iter().map(|(name, _)| *name).collect()
}

/// Build volume of a catalogued printer.
pub fn printer_volume(name: &str) -> Result<[f64; 3]> {
    PRINTERS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| *v)
        .ok_or_else(|| PrepError::UnknownPrinter(name.to_string()))
}

/// Outcome of a build-volume check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitReport {
    /// Printer checked against.
    pub printer: String,
    /// True when every axis fits.
    pub fits: bool,
    /// Extent of the print (X, Y, Z).
    pub model_size: [f64; 3],
    /// Printer envelope before margins.
    pub build_volume: [f64; 3],
    /// Size minus available space per axis; positive means too large.
    pub overflow: [f64; 3],
}

/// Compare the print's bounds with the printer envelope less the margin.
///
/// The check only reports; it never changes geometry.
pub fn check_build_fit(bbox: &Aabb3, cfg: &FitConfig) -> Result<FitReport> {
    let build_volume = printer_volume(&cfg.printer)?;
    let size = if bbox.is_empty() { Vec3::zeros() } else { bbox.size() };
    let model_size = [size.x, size.y, size.z];
    let overflow: [f64; 3] =
        std::array::from_fn(|i| model_size[i] - (build_volume[i] - 2.0 * cfg.margin));
    let fits = overflow.iter().all(|o| *o <= 0.0);

    let report = FitReport {
        printer: cfg.printer.clone(),
        fits,
        model_size,
        build_volume,
        overflow,
    };
    if fits {
        info!(
            printer = %report.printer,
            x = model_size[0],
            y = model_size[1],
            z = model_size[2],
            "print fits build volume"
        );
    } else {
        warn!(
            printer = %report.printer,
            overflow_x = overflow[0],
            overflow_y = overflow[1],
            overflow_z = overflow[2],
            "print does not fit build volume"
        );
    }
    Ok(report)
}

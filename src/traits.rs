use std::path::Path;

use crate::error::Result;
use crate::parcellation::SurfaceParcellation;

/// Reads the per-hemisphere files of a subject. Implementations provide the file formats, e.g. FreeSurfer curv and
/// MGH files for morphometry and annot files for parcellations.
pub trait MorphometryReader {
    /// Read one value per vertex from a morphometry file.
    fn read_morphometry(&self, path: &Path) -> Result<Vec<f64>>;
    fn read_parcellation(&self, path: &Path) -> Result<SurfaceParcellation>;
}

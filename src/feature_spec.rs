//! Requested morphometric features and their resolution to per-hemisphere files of a FreeSurfer subject.
//!
//! A feature can be requested by shorthand code (like `CT`), by the name of a default file in the subject's
//! `surf` directory (like `thickness`), by a templated full path with a `?` marking the hemisphere
//! (like `/data/subj1/surf/?h.FA.mgh`), or by an explicit pair of files.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{MindError, Result};


/// The standard FreeSurfer surface morphometry measures known by shorthand code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Morphometry {
    CorticalThickness,
    Volume,
    SurfaceArea,
    MeanCurvature,
    SulcalDepth,
}

pub const ALL_MORPHOMETRY: [Morphometry; 5] = [
    Morphometry::CorticalThickness,
    Morphometry::Volume,
    Morphometry::SurfaceArea,
    Morphometry::MeanCurvature,
    Morphometry::SulcalDepth,
];

impl Morphometry {

    /// The shorthand code, which is also the column name of the measure in a vertex table.
    pub fn code(&self) -> &'static str {
        match self {
            Morphometry::CorticalThickness => "CT",
            Morphometry::Volume => "Vol",
            Morphometry::SurfaceArea => "SA",
            Morphometry::MeanCurvature => "MC",
            Morphometry::SulcalDepth => "SD",
        }
    }

    /// The file name suffix FreeSurfer uses for the measure, as in `surf/lh.thickness`.
    pub fn default_filename(&self) -> &'static str {
        match self {
            Morphometry::CorticalThickness => "thickness",
            Morphometry::Volume => "volume",
            Morphometry::SurfaceArea => "area",
            Morphometry::MeanCurvature => "curv",
            Morphometry::SulcalDepth => "sulc",
        }
    }

    /// Whether a value of exactly zero marks an anatomically meaningless vertex for this measure.
    pub fn is_degenerate_when_zero(&self) -> bool {
        matches!(self, Morphometry::CorticalThickness | Morphometry::Volume | Morphometry::SurfaceArea)
    }

    pub fn from_code(code: &str) -> Option<Morphometry> {
        ALL_MORPHOMETRY.iter().copied().find(|m| m.code() == code)
    }
}

impl fmt::Display for Morphometry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}


/// A requested feature, before it is resolved to files.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureSpec {
    Shorthand(Morphometry),
    /// A file name suffix in the subject's `surf` directory, like `thickness` or `pial_lgi`.
    DefaultFilename(String),
    /// A full path whose file name starts with `?`, which is replaced by `l` and `r` for the two hemispheres.
    TemplatedPath(PathBuf),
    ExplicitPair { name: String, lh: PathBuf, rh: PathBuf },
}

/// The per-hemisphere files of a feature, and the column name the feature gets in the vertex table.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFiles {
    pub name: String,
    pub lh: PathBuf,
    pub rh: PathBuf,
}

impl FeatureFiles {
    /// Whether the files are in MGH/MGZ format rather than curv format.
    pub fn is_volume_format(&self) -> bool {
        let ext = self.lh.extension().and_then(|e| e.to_str()).unwrap_or("");
        ext == "mgh" || ext == "mgz"
    }
}


impl FeatureSpec {

    /// Interpret a feature given as a string.
    ///
    /// Shorthand codes take precedence, then strings containing a path separator are treated as templated paths,
    /// and everything else as a default file name.
    ///
    /// # Examples
    ///
    /// ```
    /// use mindnet::{FeatureSpec, Morphometry};
    /// assert_eq!(FeatureSpec::Shorthand(Morphometry::SulcalDepth), FeatureSpec::parse("SD"));
    /// assert_eq!(FeatureSpec::DefaultFilename(String::from("pial_lgi")), FeatureSpec::parse("pial_lgi"));
    /// ```
    pub fn parse(feature: &str) -> FeatureSpec {
        if let Some(m) = Morphometry::from_code(feature) {
            FeatureSpec::Shorthand(m)
        } else if feature.contains('/') || feature.contains(std::path::MAIN_SEPARATOR) {
            FeatureSpec::TemplatedPath(PathBuf::from(feature))
        } else {
            FeatureSpec::DefaultFilename(feature.to_string())
        }
    }

    /// The column name this feature gets in the vertex table.
    ///
    /// Shorthand features are named by their code, default files by their file name suffix, templated paths by the
    /// file name without the hemisphere prefix (`?h.FA.mgh` becomes `FA.mgh`), explicit pairs by their given name.
    pub fn column_name(&self) -> String {
        match self {
            FeatureSpec::Shorthand(m) => m.code().to_string(),
            FeatureSpec::DefaultFilename(f) => f.clone(),
            FeatureSpec::TemplatedPath(p) => {
                let file_name = p.file_name().map(|f| f.to_string_lossy().into_owned()).unwrap_or_default();
                file_name.strip_prefix("?h.").map(|s| s.to_string()).unwrap_or(file_name)
            }
            FeatureSpec::ExplicitPair { name, .. } => name.clone(),
        }
    }


    /// Resolve the feature to its left and right hemisphere files, relative to the `subject_dir` where needed.
    ///
    /// # Errors
    ///
    /// [`MindError::FeatureFilesNotFound`] if either file does not exist, [`MindError::InvalidFeatureTemplate`] for a
    /// templated path whose file name does not start with `?`.
    pub fn resolve<P: AsRef<Path>>(&self, subject_dir: P) -> Result<FeatureFiles> {
        let surf_dir = subject_dir.as_ref().join("surf");
        let (lh, rh) = match self {
            FeatureSpec::Shorthand(m) => hemisphere_files(&surf_dir, m.default_filename()),
            FeatureSpec::DefaultFilename(f) => hemisphere_files(&surf_dir, f),
            FeatureSpec::TemplatedPath(p) => expand_template(p)?,
            FeatureSpec::ExplicitPair { lh, rh, .. } => (lh.clone(), rh.clone()),
        };

        if !lh.is_file() || !rh.is_file() {
            return Err(MindError::FeatureFilesNotFound { feature: self.to_string(), lh, rh });
        }

        Ok(FeatureFiles { name: self.column_name(), lh, rh })
    }
}

impl fmt::Display for FeatureSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FeatureSpec::Shorthand(m) => write!(f, "{}", m),
            FeatureSpec::DefaultFilename(name) => write!(f, "{}", name),
            FeatureSpec::TemplatedPath(p) => write!(f, "{}", p.display()),
            FeatureSpec::ExplicitPair { name, .. } => write!(f, "{}", name),
        }
    }
}


fn hemisphere_files(surf_dir: &Path, filename: &str) -> (PathBuf, PathBuf) {
    (surf_dir.join(format!("lh.{}", filename)), surf_dir.join(format!("rh.{}", filename)))
}


fn expand_template(template: &Path) -> Result<(PathBuf, PathBuf)> {
    let file_name = template.file_name().and_then(|f| f.to_str());
    match file_name {
        Some(name) if name.starts_with('?') => {
            let rest = &name[1..];
            Ok((template.with_file_name(format!("l{}", rest)), template.with_file_name(format!("r{}", rest))))
        }
        _ => Err(MindError::InvalidFeatureTemplate { template: template.to_path_buf() }),
    }
}


#[cfg(test)]
mod test {
    use super::*;
    use std::fs::{self, File};
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        File::create(path).unwrap();
    }

    #[test]
    fn shorthand_codes_are_parsed() {
        assert_eq!(FeatureSpec::Shorthand(Morphometry::CorticalThickness), FeatureSpec::parse("CT"));
        assert_eq!(FeatureSpec::Shorthand(Morphometry::Volume), FeatureSpec::parse("Vol"));
        assert_eq!(FeatureSpec::TemplatedPath(PathBuf::from("/data/?h.FA.mgh")), FeatureSpec::parse("/data/?h.FA.mgh"));
    }

    #[test]
    fn only_thickness_volume_and_area_are_degenerate_when_zero() {
        let degenerate: Vec<&str> = ALL_MORPHOMETRY.iter().filter(|m| m.is_degenerate_when_zero()).map(|m| m.code()).collect();
        assert_eq!(vec!["CT", "Vol", "SA"], degenerate);
    }

    #[test]
    fn column_names_are_explicit() {
        assert_eq!("SA", FeatureSpec::parse("SA").column_name());
        assert_eq!("sulc", FeatureSpec::parse("sulc").column_name());
        assert_eq!("FA.mgh", FeatureSpec::parse("/data/?h.FA.mgh").column_name());
        let pair = FeatureSpec::ExplicitPair { name: String::from("MD"), lh: PathBuf::from("a"), rh: PathBuf::from("b") };
        assert_eq!("MD", pair.column_name());
    }

    #[test]
    fn shorthand_features_resolve_to_default_files() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("surf/lh.thickness"));
        touch(&dir.path().join("surf/rh.thickness"));

        let files = FeatureSpec::parse("CT").resolve(dir.path()).unwrap();
        assert_eq!("CT", files.name);
        assert_eq!(dir.path().join("surf/lh.thickness"), files.lh);
        assert_eq!(dir.path().join("surf/rh.thickness"), files.rh);
        assert!(!files.is_volume_format());
    }

    #[test]
    fn templated_paths_are_expanded_per_hemisphere() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("dwi/lh.FA.mgh"));
        touch(&dir.path().join("dwi/rh.FA.mgh"));

        let template = dir.path().join("dwi/?h.FA.mgh");
        let files = FeatureSpec::TemplatedPath(template).resolve("/nonexistent").unwrap();
        assert_eq!(dir.path().join("dwi/lh.FA.mgh"), files.lh);
        assert_eq!(dir.path().join("dwi/rh.FA.mgh"), files.rh);
        assert!(files.is_volume_format());
    }

    #[test]
    fn a_missing_hemisphere_file_is_reported() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("surf/lh.sulc"));

        match FeatureSpec::parse("SD").resolve(dir.path()) {
            Err(MindError::FeatureFilesNotFound { feature, .. }) => assert_eq!("SD", feature),
            other => panic!("Expected FeatureFilesNotFound, got {:?}", other),
        }
    }

    #[test]
    fn templates_without_hemisphere_marker_are_rejected() {
        let spec = FeatureSpec::TemplatedPath(PathBuf::from("/data/lh.FA.mgh"));
        assert!(matches!(spec.resolve("/data"), Err(MindError::InvalidFeatureTemplate { .. })));
    }
}

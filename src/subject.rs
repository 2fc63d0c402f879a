//! Loading the vertex table of a FreeSurfer subject, and computing its MIND network.
//!
//! The subject directory is the FreeSurfer output directory of one subject, containing the `surf` and `label`
//! sub directories. File contents are read through a [`MorphometryReader`].

use log::{debug, info};

use std::path::{Path, PathBuf};

use crate::assemble::{assemble_vertex_table, HemisphereData};
use crate::error::{MindError, Result};
use crate::feature_spec::{FeatureFiles, FeatureSpec};
use crate::network::{compute_network, MindNetwork, MindOptions};
use crate::table::VertexTable;
use crate::traits::MorphometryReader;


/// The FreeSurfer output directory of a subject.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectDir {
    root: PathBuf,
}

impl SubjectDir {
    pub fn new<P: AsRef<Path>>(root: P) -> SubjectDir {
        SubjectDir { root: root.as_ref().to_path_buf() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Locate the annot files of the named parcellation, like `aparc` or `aparc.a2009s`.
    ///
    /// # Errors
    ///
    /// [`MindError::ParcellationNotFound`] if the file of either hemisphere does not exist.
    pub fn parcellation_files(&self, parcellation: &str) -> Result<(PathBuf, PathBuf)> {
        let label_dir = self.root.join("label");
        let lh = label_dir.join(format!("lh.{}.annot", parcellation));
        let rh = label_dir.join(format!("rh.{}.annot", parcellation));
        if !lh.is_file() || !rh.is_file() {
            return Err(MindError::ParcellationNotFound { name: parcellation.to_string(), lh, rh });
        }
        Ok((lh, rh))
    }

    /// Resolve all requested features to their files. Fails on the first feature that cannot be found.
    pub fn resolve_features(&self, features: &[FeatureSpec]) -> Result<Vec<FeatureFiles>> {
        features.iter().map(|f| f.resolve(&self.root)).collect()
    }
}


/// Load the vertex table of a subject and the list of its regions.
///
/// All files are located before any of them is read. The columns of the table are named by
/// [`FeatureSpec::column_name`], in the order of `features`.
pub fn load_subject<R: MorphometryReader>(subject: &SubjectDir, features: &[FeatureSpec], parcellation: &str, reader: &R) -> Result<(VertexTable, Vec<String>)> {
    let (lh_annot, rh_annot) = subject.parcellation_files(parcellation)?;
    let files = subject.resolve_features(features)?;

    let feature_names: Vec<String> = files.iter().map(|f| f.name.clone()).collect();
    info!("Loading features {} with parcellation '{}' from '{}'.", feature_names.join(", "), parcellation, subject.root().display());

    let mut lh = HemisphereData { parcellation: reader.read_parcellation(&lh_annot)?, features: Vec::with_capacity(files.len()) };
    let mut rh = HemisphereData { parcellation: reader.read_parcellation(&rh_annot)?, features: Vec::with_capacity(files.len()) };
    for f in files.iter() {
        debug!("Reading feature '{}' from '{}' and '{}'.", f.name, f.lh.display(), f.rh.display());
        lh.features.push(reader.read_morphometry(&f.lh)?);
        rh.features.push(reader.read_morphometry(&f.rh)?);
    }

    assemble_vertex_table(&feature_names, &lh, &rh)
}


/// Load a subject and compute its MIND network over all features that were loaded.
pub fn compute_subject_network<R: MorphometryReader>(subject: &SubjectDir, features: &[FeatureSpec], parcellation: &str, reader: &R, options: &MindOptions) -> Result<MindNetwork> {
    let (table, regions) = load_subject(subject, features, parcellation, reader)?;
    let used: Vec<String> = features.iter().map(FeatureSpec::column_name).collect();
    compute_network(&table, &used, &regions, options)
}

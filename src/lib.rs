//! Morphometric Inverse Divergence (MIND) networks for surface-based brain morphometry.
//!
//! A MIND network quantifies the similarity of every pair of brain regions as `1 / (1 + KL)`, where `KL` is a
//! k-nearest-neighbour estimate of the symmetrized Kullback-Leibler divergence between the multivariate distributions
//! of the per-vertex features (like cortical thickness, volume, surface area, curvature, sulcal depth) of the regions.
//!
//! The entry point is [`compute_network`], which works on an in-memory [`VertexTable`]. The [`subject`] module builds
//! such a table from the FreeSurfer output directory of a subject, given a [`MorphometryReader`] for the file formats.

pub mod assemble;
pub mod divergence;
pub mod error;
pub mod feature_spec;
pub mod network;
pub mod parcellation;
pub mod region;
pub mod spatial;
pub mod standardize;
pub mod subject;
pub mod table;
pub mod traits;
pub mod util;

pub use assemble::{assemble_vertex_table, Hemisphere, HemisphereData};
pub use divergence::{directed_divergence, symmetric_divergence};
pub use error::{MindError, Result};
pub use feature_spec::{FeatureFiles, FeatureSpec, Morphometry};
pub use network::{calculate_mind_network, compute_network, similarity_from_divergence, MindNetwork, MindOptions};
pub use parcellation::{Colortable, ColortableEntry, SurfaceParcellation};
pub use region::{group_by_region, IndexedRegion, RegionGroup};
pub use spatial::{Neighbor, SpatialIndex};
pub use standardize::{standardize, StandardizeOptions, DEFAULT_OUTLIER_THRESHOLD};
pub use subject::{compute_subject_network, load_subject, SubjectDir};
pub use table::VertexTable;
pub use traits::MorphometryReader;

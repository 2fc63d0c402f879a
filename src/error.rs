use quick_error::quick_error;
use std::io::Error as IOError;
use std::path::PathBuf;

quick_error! {
    /// Error type for all error variants originated by this crate.
    #[derive(Debug)]
    pub enum MindError {
        /// A requested feature is not a column of the vertex table.
        UnknownFeature { name: String } {
            display("Requested feature '{}' not available in the vertex table", name)
        }

        NoFeatures {
            display("No features requested")
        }

        DuplicateFeature { name: String } {
            display("Feature '{}' requested or provided more than once", name)
        }

        DuplicateRegion { region: String } {
            display("Region '{}' listed more than once", region)
        }

        /// A listed region has no vertices left after filtering.
        EmptyRegion { region: String } {
            display("Region '{}' has no vertices", region)
        }

        NoVerticesRemaining {
            display("Filtering removed all vertices")
        }

        ShapeMismatch { what: String, expected: usize, found: usize } {
            display("Shape mismatch for {}: expected {}, found {}", what, expected, found)
        }

        NonFiniteValue { feature: String, vertex: usize } {
            display("Non-finite value for feature '{}' at vertex {}", feature, vertex)
        }

        /// Z-scoring is undefined for a feature without variance.
        ConstantFeature { name: String } {
            display("Feature '{}' has zero standard deviation", name)
        }

        DimensionMismatch { expected: usize, found: usize } {
            display("Feature dimension mismatch: expected {}, found {}", expected, found)
        }

        /// Too few usable neighbour ratios to estimate the divergence of a region pair.
        DivergenceUndefined { source_region: String, target_region: String, valid_ratios: usize } {
            display("Divergence from '{}' to '{}' is undefined ({} valid neighbour ratios)", source_region, target_region, valid_ratios)
        }

        FeatureFilesNotFound { feature: String, lh: PathBuf, rh: PathBuf } {
            display("Feature files for input '{}' not found: '{}', '{}'", feature, lh.display(), rh.display())
        }

        InvalidFeatureTemplate { template: PathBuf } {
            display("Feature template '{}' must name a file starting with '?'", template.display())
        }

        ParcellationNotFound { name: String, lh: PathBuf, rh: PathBuf } {
            display("Parcellation '{}' not found: '{}', '{}'", name, lh.display(), rh.display())
        }

        /// I/O Error
        Io(err: IOError) {
            from()
            source(err)
        }
    }
}

impl MindError {
    /// Whether this error signals malformed input data (as opposed to a missing feature,
    /// an undefined divergence, or a problem locating the subject files).
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            MindError::NoFeatures
                | MindError::DuplicateFeature { .. }
                | MindError::DuplicateRegion { .. }
                | MindError::EmptyRegion { .. }
                | MindError::NoVerticesRemaining
                | MindError::ShapeMismatch { .. }
                | MindError::NonFiniteValue { .. }
                | MindError::ConstantFeature { .. }
                | MindError::DimensionMismatch { .. }
        )
    }
}

/// Alias type for results originated from this crate.
pub type Result<T> = ::std::result::Result<T, MindError>;

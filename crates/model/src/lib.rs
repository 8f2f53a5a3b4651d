//! Data model for the `KBaseFeatureValues` service.
//!
//! Every parameter and result type the service's operations accept or return,
//! the identifiers they use, and the matrix objects callers hand to the
//! service. Nothing here performs I/O: these types only describe the wire.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype string identifiers (`ObjectRef`, `WorkspaceName`, etc.) |
//! | [`types`] | Shared value types (`BoolFlag`, `FloatMatrix2D`, `ExpressionMatrix`) |
//! | [`params`] | One parameter/result struct per remote operation |

pub mod identifiers;
pub mod params;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use identifiers::{FeatureId, ObjectName, ObjectRef, ShockId, WorkspaceName};
pub use params::{
    BuildFeatureSetParams, ClusterHierarchicalParams, ClusterKMeansParams,
    ClustersFromDendrogramParams, ClustersToFileOutput, ClustersToFileParams, CorrectMatrixParams,
    EstimateKParams, EstimateKParamsNew, EstimateKResult, EvaluateClustersetQualityParams,
    ExportClustersSifOutput, ExportClustersSifParams, ExportClustersTsvOutput,
    ExportClustersTsvParams, ExportMatrixOutput, ExportMatrixParams, GetMatrixDescriptorParams,
    GetMatrixItemDescriptorsParams, GetMatrixItemsStatParams, GetMatrixSetStatParams,
    GetMatrixSetsStatParams, GetMatrixStatParams, GetSubmatrixStatParams, ItemDescriptor,
    ItemSetStat, ItemStat, MatrixDescriptor, MatrixStat, MatrixToTsvFileOutput,
    MatrixToTsvFileParams, PairwiseComparison, ReconnectMatrixToGenomeParams, SubmatrixStat,
    TsvFileToMatrixOutput, TsvFileToMatrixParams, ValidateMatrixParams,
};
pub use types::{AnalysisReport, BoolFlag, ExpressionMatrix, FloatMatrix2D, LabeledCluster};

//! Parameter and result structures for each remote operation.
//!
//! Field names are the wire names. Optional fields are omitted from the request
//! when `None`, letting the service apply its own defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{BoolFlag, FeatureId, ObjectName, ObjectRef, ShockId, WorkspaceName};

// ---------------------------------------------------------------------------
// Estimating K
// ---------------------------------------------------------------------------

/// Input for `estimate_k`: scans `min_k..=max_k` and scores each K by
/// silhouette.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EstimateKParams {
    pub input_matrix: ObjectRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_k: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_k: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iter: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighb_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<i64>,
    pub out_workspace: WorkspaceName,
    pub out_estimate_result: ObjectName,
}

/// Input for `estimate_k_new`, the criterion-based estimator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EstimateKParamsNew {
    pub input_matrix: ObjectRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_k: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_k: Option<i64>,
    /// `"silhouette"`, `"calinski-harabasz"` or `"ssi"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criterion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usepam: Option<BoolFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diss_metric: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<i64>,
    pub out_workspace: WorkspaceName,
    pub out_estimate_result: ObjectName,
}

/// Best K and the per-K quality scores it was chosen from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EstimateKResult {
    pub best_k: i64,
    /// `(k, score)` pairs.
    #[serde(default)]
    pub estimate_cluster_sizes: Vec<(i64, f64)>,
}

// ---------------------------------------------------------------------------
// Clustering
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClusterKMeansParams {
    pub k: i64,
    pub input_data: ObjectRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_start: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iter: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<i64>,
    /// `"Hartigan-Wong"`, `"Lloyd"`, `"Forgy"` or `"MacQueen"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    pub out_workspace: WorkspaceName,
    pub out_clusterset_id: ObjectName,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClusterHierarchicalParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_metric: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkage_criteria: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_height_cutoff: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_height_cutoff: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<i64>,
    pub input_data: ObjectRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    pub out_workspace: WorkspaceName,
    pub out_clusterset_id: ObjectName,
}

/// Re-cuts an existing dendrogram at new heights.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClustersFromDendrogramParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_height_cutoff: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_height_cutoff: Option<f64>,
    pub input_data: ObjectRef,
    pub out_workspace: WorkspaceName,
    pub out_clusterset_id: ObjectName,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EvaluateClustersetQualityParams {
    pub input_clusterset: ObjectRef,
    pub out_workspace: WorkspaceName,
    pub out_report_id: ObjectName,
}

// ---------------------------------------------------------------------------
// Matrix maintenance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidateMatrixParams {
    /// Name of the calling method, used in error messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub input_data: ObjectRef,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CorrectMatrixParams {
    /// `"missing"` fills gaps, `"log"` rescales.
    pub transform_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform_value: Option<f64>,
    pub input_data: ObjectRef,
    pub out_workspace: WorkspaceName,
    pub out_matrix_id: ObjectName,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReconnectMatrixToGenomeParams {
    pub input_data: ObjectRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genome_ref: Option<ObjectRef>,
    pub out_workspace: WorkspaceName,
    pub out_matrix_id: ObjectName,
}

/// Builds a feature set from explicit ids and/or an existing set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BuildFeatureSetParams {
    pub genome: ObjectRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_ids: Option<Vec<FeatureId>>,
    /// Comma- or whitespace-separated ids typed by a user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_ids_custom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_feature_set: Option<ObjectRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub out_workspace: WorkspaceName,
    pub output_feature_set: ObjectName,
}

// ---------------------------------------------------------------------------
// Descriptors and statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GetMatrixDescriptorParams {
    pub input_data: ObjectRef,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MatrixDescriptor {
    #[serde(default)]
    pub matrix_id: String,
    #[serde(default)]
    pub matrix_name: String,
    #[serde(default)]
    pub matrix_description: String,
    #[serde(default)]
    pub genome_id: String,
    #[serde(default)]
    pub genome_name: String,
    pub rows_count: i64,
    pub columns_count: i64,
    #[serde(default)]
    pub scale: String,
    #[serde(default, rename = "type")]
    pub data_type: String,
    #[serde(default)]
    pub row_normalization: String,
    #[serde(default)]
    pub col_normalization: String,
}

/// Selects rows or columns by index and the properties to report for them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GetMatrixItemDescriptorsParams {
    pub input_data: ObjectRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_indeces_ordered: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_property_types: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ItemDescriptor {
    pub index: i64,
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

/// Statistics of selected items (`item_indeces_for`) computed over another
/// set of indices on the opposite axis (`item_indeces_on`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GetMatrixItemsStatParams {
    pub input_data: ObjectRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_indeces_for: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_indeces_on: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fl_indeces_on: Option<BoolFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fl_avgs: Option<BoolFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fl_mins: Option<BoolFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fl_maxs: Option<BoolFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fl_stds: Option<BoolFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fl_missing_values: Option<BoolFlag>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ItemStat {
    pub index_for: i64,
    #[serde(default)]
    pub indeces_on: Vec<i64>,
    pub size: i64,
    #[serde(default)]
    pub avgs: Vec<f64>,
    #[serde(default)]
    pub mins: Vec<f64>,
    #[serde(default)]
    pub maxs: Vec<f64>,
    #[serde(default)]
    pub stds: Vec<f64>,
    #[serde(default)]
    pub missing_values: Vec<i64>,
}

/// One set of items to summarise in a sets-stat call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GetMatrixSetStatParams {
    pub input_data: ObjectRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_indeces_for: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_indeces_on: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fl_indeces_on: Option<BoolFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fl_avgs: Option<BoolFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fl_mins: Option<BoolFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fl_maxs: Option<BoolFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fl_stds: Option<BoolFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fl_missing_values: Option<BoolFlag>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GetMatrixSetsStatParams {
    pub params: Vec<GetMatrixSetStatParams>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ItemSetStat {
    #[serde(default)]
    pub indeces_for: Vec<i64>,
    #[serde(default)]
    pub indeces_on: Vec<i64>,
    pub size: i64,
    #[serde(default)]
    pub avgs: Vec<f64>,
    #[serde(default)]
    pub mins: Vec<f64>,
    #[serde(default)]
    pub maxs: Vec<f64>,
    #[serde(default)]
    pub stds: Vec<f64>,
    #[serde(default)]
    pub missing_values: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GetMatrixStatParams {
    pub input_data: ObjectRef,
}

/// Whole-matrix summary: descriptors plus per-row and per-column statistics.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MatrixStat {
    pub mtx_descriptor: MatrixDescriptor,
    #[serde(default)]
    pub row_descriptors: Vec<ItemDescriptor>,
    #[serde(default)]
    pub column_descriptors: Vec<ItemDescriptor>,
    #[serde(default)]
    pub row_stats: Vec<ItemStat>,
    #[serde(default)]
    pub column_stats: Vec<ItemStat>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GetSubmatrixStatParams {
    pub input_data: ObjectRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fl_row_set_stats: Option<BoolFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fl_column_set_stat: Option<BoolFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fl_mtx_row_set_stat: Option<BoolFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fl_mtx_column_set_stat: Option<BoolFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fl_row_pairwise_correlation: Option<BoolFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fl_column_pairwise_correlation: Option<BoolFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fl_values: Option<BoolFlag>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PairwiseComparison {
    #[serde(default)]
    pub indeces: Vec<i64>,
    #[serde(default)]
    pub comparison_values: Vec<Vec<f64>>,
    #[serde(default)]
    pub avgs: Vec<f64>,
    #[serde(default)]
    pub mins: Vec<f64>,
    #[serde(default)]
    pub maxs: Vec<f64>,
}

/// Statistics for the sub-matrix selected by row and column ids. Every part is
/// present only when the corresponding `fl_*` flag was set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubmatrixStat {
    pub mtx_descriptor: MatrixDescriptor,
    #[serde(default)]
    pub row_descriptors: Vec<ItemDescriptor>,
    #[serde(default)]
    pub column_descriptors: Vec<ItemDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_set_stats: Option<ItemSetStat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_set_stat: Option<ItemSetStat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtx_row_set_stat: Option<ItemSetStat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtx_column_set_stat: Option<ItemSetStat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_pairwise_correlation: Option<PairwiseComparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_pairwise_correlation: Option<PairwiseComparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Vec<Option<f64>>>>,
}

// ---------------------------------------------------------------------------
// Import / export
// ---------------------------------------------------------------------------

/// Imports a tab-separated table, either already in the blob store or at a
/// path visible to the server.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TsvFileToMatrixParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_shock_id: Option<ShockId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genome_ref: Option<ObjectRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_missing_values: Option<BoolFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_scale: Option<String>,
    pub output_ws_name: WorkspaceName,
    pub output_obj_name: ObjectName,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TsvFileToMatrixOutput {
    pub output_matrix_ref: ObjectRef,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MatrixToTsvFileParams {
    pub input_ref: ObjectRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_shock: Option<BoolFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MatrixToTsvFileOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shock_id: Option<ShockId>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExportMatrixParams {
    pub input_ref: ObjectRef,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExportMatrixOutput {
    pub shock_id: ShockId,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClustersToFileParams {
    pub input_ref: ObjectRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_shock: Option<BoolFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// `"TSV"` or `"SIF"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClustersToFileOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shock_id: Option<ShockId>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExportClustersTsvParams {
    pub input_ref: ObjectRef,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExportClustersTsvOutput {
    pub shock_id: ShockId,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExportClustersSifParams {
    pub input_ref: ObjectRef,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExportClustersSifOutput {
    pub shock_id: ShockId,
}

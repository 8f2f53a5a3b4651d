//! Shared value types used inside parameter and result structures.
//!
//! These mirror the typed objects the service stores: the 2D float matrix and
//! the expression matrix that wraps it, plus small wire conventions such as
//! integer booleans.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{FeatureId, ObjectRef};

// ---------------------------------------------------------------------------
// Wire conventions
// ---------------------------------------------------------------------------

/// A boolean carried as an integer on the wire (`0` or `1`).
///
/// The remote type system has no boolean; flags are `int` fields where any
/// non-zero value means "on". Deserialization also accepts JSON `true`/`false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BoolFlag(bool);

impl BoolFlag {
    /// The "on" value.
    pub const ON: Self = Self(true);
    /// The "off" value.
    pub const OFF: Self = Self(false);

    /// Returns the flag as a plain `bool`.
    pub fn get(self) -> bool {
        self.0
    }
}

impl From<bool> for BoolFlag {
    fn from(value: bool) -> Self {
        Self(value)
    }
}

impl Serialize for BoolFlag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(i64::from(self.0))
    }
}

impl<'de> Deserialize<'de> for BoolFlag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Int(i64),
            Bool(bool),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Int(n) => Self(n != 0),
            Repr::Bool(b) => Self(b),
        })
    }
}

// ---------------------------------------------------------------------------
// Matrices
// ---------------------------------------------------------------------------

/// A dense 2D matrix of floats with row and column labels.
///
/// `values[i][j]` is the value for row `row_ids[i]` and column `col_ids[j]`;
/// `None` marks a missing measurement (JSON `null`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FloatMatrix2D {
    pub row_ids: Vec<String>,
    pub col_ids: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl FloatMatrix2D {
    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.row_ids.len()
    }

    /// Number of columns.
    pub fn columns(&self) -> usize {
        self.col_ids.len()
    }

    /// Returns `true` if `values` has exactly `rows() x columns()` cells.
    pub fn is_rectangular(&self) -> bool {
        self.values.len() == self.rows() && self.values.iter().all(|r| r.len() == self.columns())
    }

    /// Number of `None` cells.
    pub fn missing_values(&self) -> usize {
        self.values.iter().flatten().filter(|v| v.is_none()).count()
    }
}

/// Expression data for a set of genome features measured under a set of
/// conditions.
///
/// Produced by the external ingestion utility from uploaded tables and saved
/// to the workspace; the client only passes it through.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExpressionMatrix {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Data type, e.g. `"log-ratio"` or `"level"`.
    #[serde(rename = "type")]
    pub data_type: String,

    /// Scale of the values, e.g. `"1.0"` or `"log2"`.
    pub scale: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_normalization: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col_normalization: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genome_ref: Option<ObjectRef>,

    /// Row id to genome feature id, for rows whose ids are aliases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_mapping: Option<BTreeMap<String, FeatureId>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditionset_ref: Option<ObjectRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_mapping: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_expr_matrix_ref: Option<ObjectRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<AnalysisReport>,

    pub data: FloatMatrix2D,
}

/// Free-form checks attached to a matrix by whoever produced it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(default)]
    pub check_type_names: Vec<String>,
    #[serde(default)]
    pub checks: Vec<i64>,
    #[serde(default)]
    pub messages: Vec<String>,
}

// ---------------------------------------------------------------------------
// Clusters
// ---------------------------------------------------------------------------

/// Labeled cluster: member item ids to their index in the source matrix.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LabeledCluster {
    pub id_to_pos: BTreeMap<String, i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meancor: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msec: Option<f64>,
}

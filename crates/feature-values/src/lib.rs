//! Typed client for the `KBaseFeatureValues` service.
//!
//! [`FeatureValuesClient`] exposes one async method per remote operation.
//! Each takes the operation's parameter struct from the [`model`] crate and an
//! optional [`RpcContext`], and returns the operation's typed result.
//!
//! ## Architectural Layer
//!
//! **Facade.** This crate only knows method names, argument order, result
//! shapes and which operations need a credential. Everything about the wire
//! lives in [`jsonrpc`].
//!
//! ```no_run
//! # async fn demo() -> Result<(), jsonrpc::RpcError> {
//! use feature_values::FeatureValuesClient;
//!
//! let client = FeatureValuesClient::new("https://kbase.us/services/feature_values/jsonrpc")?;
//! let status = client.status(None).await?;
//! println!("{}", status.get("state").cloned().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::time::Duration;

use jsonrpc::{
    AuthPolicy, AuthToken, Authenticator, CallSpec, ClientConfig, Endpoint, HttpAuthenticator,
    JsonClientCaller, NoArgs, Positional, RpcContext, RpcError,
};
use model::{
    BuildFeatureSetParams, ClusterHierarchicalParams, ClusterKMeansParams,
    ClustersFromDendrogramParams, ClustersToFileOutput, ClustersToFileParams, CorrectMatrixParams,
    EstimateKParams, EstimateKParamsNew, EstimateKResult, EvaluateClustersetQualityParams,
    ExportClustersSifOutput, ExportClustersSifParams, ExportClustersTsvOutput,
    ExportClustersTsvParams, ExportMatrixOutput, ExportMatrixParams, GetMatrixDescriptorParams,
    GetMatrixItemDescriptorsParams, GetMatrixItemsStatParams, GetMatrixSetsStatParams,
    GetMatrixStatParams, GetSubmatrixStatParams, ItemDescriptor, ItemSetStat, ItemStat,
    MatrixDescriptor, MatrixStat, MatrixToTsvFileOutput, MatrixToTsvFileParams, ObjectRef,
    ReconnectMatrixToGenomeParams, SubmatrixStat, TsvFileToMatrixOutput, TsvFileToMatrixParams,
    ValidateMatrixParams,
};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::{Map, Value};
use tracing::debug;

/// Name every wire method is prefixed with.
pub const SERVICE_NAME: &str = "KBaseFeatureValues";

/// Async client for `KBaseFeatureValues`.
#[derive(Debug)]
pub struct FeatureValuesClient {
    caller: JsonClientCaller,
}

impl FeatureValuesClient {
    /// Anonymous client. Only auth-optional operations will succeed.
    ///
    /// # Errors
    ///
    /// [`RpcError::Configuration`] for a malformed URL.
    pub fn new(url: &str) -> Result<Self, RpcError> {
        Ok(Self::from_caller(JsonClientCaller::new(Endpoint::parse(url)?)?))
    }

    /// Client whose token is checked against the default auth service.
    ///
    /// # Errors
    ///
    /// [`RpcError::Configuration`] for a malformed URL,
    /// [`RpcError::Unauthorized`] if the token is rejected and
    /// [`RpcError::Io`] if the auth service cannot be reached.
    pub async fn with_token(url: &str, token: &str) -> Result<Self, RpcError> {
        let auth = HttpAuthenticator::new()?;
        Self::with_token_and_authenticator(url, token, &auth).await
    }

    /// Client whose token is checked by `authenticator`.
    ///
    /// # Errors
    ///
    /// [`RpcError::Configuration`] for a malformed URL, otherwise whatever
    /// the authenticator reports.
    pub async fn with_token_and_authenticator(
        url: &str,
        token: &str,
        authenticator: &dyn Authenticator,
    ) -> Result<Self, RpcError> {
        let caller = JsonClientCaller::with_token(Endpoint::parse(url)?, token, authenticator).await?;
        Ok(Self::from_caller(caller))
    }

    /// Logs in at the default login endpoint.
    ///
    /// # Errors
    ///
    /// [`RpcError::Configuration`] for a malformed URL,
    /// [`RpcError::Unauthorized`] for bad credentials and [`RpcError::Io`]
    /// if the login endpoint cannot be reached.
    pub async fn login(url: &str, user: &str, password: &str) -> Result<Self, RpcError> {
        let auth = HttpAuthenticator::new()?;
        Self::login_with_authenticator(url, user, password, &auth).await
    }

    /// Logs in at a custom login endpoint.
    ///
    /// # Errors
    ///
    /// Same as [`FeatureValuesClient::login`]; a malformed `login_url` is also
    /// [`RpcError::Configuration`].
    pub async fn login_with_auth_url(
        url: &str,
        user: &str,
        password: &str,
        login_url: &str,
    ) -> Result<Self, RpcError> {
        let auth = HttpAuthenticator::with_login_url(login_url)?;
        Self::login_with_authenticator(url, user, password, &auth).await
    }

    /// Logs in through `authenticator`.
    ///
    /// # Errors
    ///
    /// [`RpcError::Configuration`] for a malformed URL, otherwise whatever
    /// the authenticator reports.
    pub async fn login_with_authenticator(
        url: &str,
        user: &str,
        password: &str,
        authenticator: &dyn Authenticator,
    ) -> Result<Self, RpcError> {
        let caller =
            JsonClientCaller::with_credentials(Endpoint::parse(url)?, user, password, authenticator)
                .await?;
        Ok(Self::from_caller(caller))
    }

    /// Client holding a token the application has already validated.
    ///
    /// # Errors
    ///
    /// [`RpcError::Configuration`] for a malformed URL or an HTTP client
    /// that cannot be built.
    pub fn with_validated_token(url: &str, token: AuthToken) -> Result<Self, RpcError> {
        let caller = JsonClientCaller::with_validated_token(Endpoint::parse(url)?, token)?;
        Ok(Self::from_caller(caller))
    }

    /// Wraps an existing caller, e.g. one built over a custom transport.
    pub fn from_caller(caller: JsonClientCaller) -> Self {
        debug!(
            endpoint = %caller.endpoint(),
            user = caller.token().map(AuthToken::user_name),
            "feature values client ready"
        );
        Self { caller }
    }

    /// The underlying generic caller.
    pub fn caller(&self) -> &JsonClientCaller {
        &self.caller
    }

    pub fn endpoint(&self) -> &Endpoint {
        self.caller.endpoint()
    }

    pub fn token(&self) -> Option<&AuthToken> {
        self.caller.token()
    }

    pub fn config(&self) -> ClientConfig {
        self.caller.config()
    }

    pub fn set_config(&self, config: ClientConfig) {
        self.caller.set_config(config);
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.caller.read_timeout()
    }

    pub fn set_read_timeout(&self, timeout: Option<Duration>) {
        self.caller.set_read_timeout(timeout);
    }

    pub fn is_insecure_http_allowed(&self) -> bool {
        self.caller.is_insecure_http_allowed()
    }

    pub fn set_insecure_http_allowed(&self, allowed: bool) {
        self.caller.set_insecure_http_allowed(allowed);
    }

    #[deprecated(note = "use `is_insecure_http_allowed`")]
    pub fn is_auth_allowed_for_http(&self) -> bool {
        self.caller.is_insecure_http_allowed()
    }

    #[deprecated(note = "use `set_insecure_http_allowed`")]
    pub fn set_auth_allowed_for_http(&self, allowed: bool) {
        self.caller.set_insecure_http_allowed(allowed);
    }

    pub fn is_trust_all_certificates(&self) -> bool {
        self.caller.is_trust_all_certificates()
    }

    pub fn set_trust_all_certificates(&self, trust_all: bool) {
        self.caller.set_trust_all_certificates(trust_all);
    }

    pub fn is_streaming_mode(&self) -> bool {
        self.caller.is_streaming_mode()
    }

    pub fn set_streaming_mode(&self, streaming: bool) {
        self.caller.set_streaming_mode(streaming);
    }

    /// The pinned service version, if any.
    pub fn service_version(&self) -> Option<String> {
        self.caller.service_version()
    }

    /// Pins subsequent calls to `version`; `None` clears the pin.
    pub fn set_service_version(&self, version: Option<String>) {
        self.caller.set_service_version(version);
    }

    pub fn set_file_for_next_rpc_response(&self, path: impl Into<PathBuf>) {
        self.caller.set_file_for_next_rpc_response(path);
    }

    /// Service health and build information. Needs no credential.
    pub async fn status(&self, context: Option<&RpcContext>) -> Result<Map<String, Value>, RpcError> {
        self.single("KBaseFeatureValues.status", AuthPolicy::Optional, NoArgs, context)
            .await
    }

    /// Calls any method with a raw positional argument list.
    ///
    /// A `method` without a `.` is prefixed with [`SERVICE_NAME`]. Returns the
    /// whole result array.
    pub async fn call_raw(
        &self,
        method: &str,
        params: Vec<Value>,
        auth: AuthPolicy,
        context: Option<&RpcContext>,
    ) -> Result<Vec<Value>, RpcError> {
        let qualified = if method.contains('.') {
            method.to_string()
        } else {
            format!("{SERVICE_NAME}.{method}")
        };
        self.caller
            .invoke(CallSpec::returning(&qualified, auth), params, context)
            .await
    }

    async fn single<A, R>(
        &self,
        method: &str,
        auth: AuthPolicy,
        args: A,
        context: Option<&RpcContext>,
    ) -> Result<R, RpcError>
    where
        A: Positional,
        R: DeserializeOwned,
    {
        let mut results: Vec<R> = self
            .caller
            .invoke(CallSpec::returning(method, auth), args, context)
            .await?;
        let actual = results.len();
        match results.pop() {
            Some(value) if actual == 1 => Ok(value),
            _ => Err(RpcError::ProtocolViolation {
                method: method.to_string(),
                expected: 1,
                actual,
            }),
        }
    }

    async fn void<A: Positional>(
        &self,
        method: &str,
        auth: AuthPolicy,
        args: A,
        context: Option<&RpcContext>,
    ) -> Result<(), RpcError> {
        self.caller
            .invoke::<A, IgnoredAny>(CallSpec::void(method, auth), args, context)
            .await
            .map(drop)
    }
}

macro_rules! service_methods {
    (
        returning {
            $( $(#[$rdoc:meta])* $rname:ident($rparams:ty) -> $ret:ty, $rauth:ident; )*
        }
        void {
            $( $(#[$vdoc:meta])* $vname:ident($vparams:ty), $vauth:ident; )*
        }
    ) => {
        impl FeatureValuesClient {
            $(
                $(#[$rdoc])*
                pub async fn $rname(
                    &self,
                    params: $rparams,
                    context: Option<&RpcContext>,
                ) -> Result<$ret, RpcError> {
                    self.single(
                        concat!("KBaseFeatureValues.", stringify!($rname)),
                        AuthPolicy::$rauth,
                        (params,),
                        context,
                    )
                    .await
                }
            )*
            $(
                $(#[$vdoc])*
                pub async fn $vname(
                    &self,
                    params: $vparams,
                    context: Option<&RpcContext>,
                ) -> Result<(), RpcError> {
                    self.void(
                        concat!("KBaseFeatureValues.", stringify!($vname)),
                        AuthPolicy::$vauth,
                        (params,),
                        context,
                    )
                    .await
                }
            )*
        }
    };
}

service_methods! {
    returning {
        /// Scores candidate cluster counts and stores the best K.
        estimate_k(EstimateKParams) -> EstimateKResult, Required;
        /// Criterion-based variant of `estimate_k`.
        estimate_k_new(EstimateKParamsNew) -> EstimateKResult, Required;
        /// K-means clustering; returns the reference of the stored cluster set.
        cluster_k_means(ClusterKMeansParams) -> ObjectRef, Required;
        /// Hierarchical clustering; returns the reference of the stored cluster set.
        cluster_hierarchical(ClusterHierarchicalParams) -> ObjectRef, Required;
        clusters_from_dendrogram(ClustersFromDendrogramParams) -> ObjectRef, Required;
        /// Fills missing values; returns the reference of the corrected matrix.
        correct_matrix(CorrectMatrixParams) -> ObjectRef, Required;
        reconnect_matrix_to_genome(ReconnectMatrixToGenomeParams) -> ObjectRef, Required;
        build_feature_set(BuildFeatureSetParams) -> ObjectRef, Required;
        get_matrix_descriptor(GetMatrixDescriptorParams) -> MatrixDescriptor, Required;
        get_matrix_row_descriptors(GetMatrixItemDescriptorsParams) -> Vec<ItemDescriptor>, Required;
        get_matrix_column_descriptors(GetMatrixItemDescriptorsParams) -> Vec<ItemDescriptor>, Required;
        get_matrix_rows_stat(GetMatrixItemsStatParams) -> Vec<ItemStat>, Required;
        get_matrix_columns_stat(GetMatrixItemsStatParams) -> Vec<ItemStat>, Required;
        get_matrix_row_sets_stat(GetMatrixSetsStatParams) -> Vec<ItemSetStat>, Required;
        get_matrix_column_sets_stat(GetMatrixSetsStatParams) -> Vec<ItemSetStat>, Required;
        get_matrix_stat(GetMatrixStatParams) -> MatrixStat, Required;
        get_submatrix_stat(GetSubmatrixStatParams) -> SubmatrixStat, Required;
        /// Uploads a TSV file from Shock as a new expression matrix.
        tsv_file_to_matrix(TsvFileToMatrixParams) -> TsvFileToMatrixOutput, Required;
        matrix_to_tsv_file(MatrixToTsvFileParams) -> MatrixToTsvFileOutput, Required;
        export_matrix(ExportMatrixParams) -> ExportMatrixOutput, Required;
        clusters_to_file(ClustersToFileParams) -> ClustersToFileOutput, Required;
        export_clusters_tsv(ExportClustersTsvParams) -> ExportClustersTsvOutput, Required;
        export_clusters_sif(ExportClustersSifParams) -> ExportClustersSifOutput, Required;
    }
    void {
        /// Computes quality metrics for a stored cluster set.
        evaluate_clusterset_quality(EvaluateClustersetQualityParams), Required;
        /// Checks a matrix object for consistency; the server errors if it is invalid.
        validate_matrix(ValidateMatrixParams), Optional;
    }
}

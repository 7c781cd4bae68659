//! Wiring of the security core from configuration.

use std::sync::Arc;

use lightsec_auth::{
    AuthType, AuthorityNode, AuthorityTree, BuilderSelector, ProcessorContext, ProcessorSelector,
    Subject,
};
use lightsec_core::{RowSource, SecurityResult};

use crate::catalog::StaticQueryCatalog;
use crate::config::SecurityConfig;

/// Processor context for `config`, reading through `rows`.
///
/// The catalog starts from the default query texts with the configured
/// overrides applied on top.
pub fn build_context(config: &SecurityConfig, rows: Arc<dyn RowSource>) -> ProcessorContext {
    let catalog = StaticQueryCatalog::with_defaults().merge(&config.queries);
    let mut ctx = ProcessorContext::new(rows, Arc::new(catalog)).with_config(config.processor);
    if !config.additional_authorities.is_empty() {
        ctx = ctx.with_additional_authorities(Arc::new(config.additional_authorities.clone()));
    }
    ctx
}

/// Assembled selectors plus the configured authentication mode.
#[derive(Clone)]
pub struct SecurityCore {
    auth_type: AuthType,
    processors: ProcessorSelector,
    builders: BuilderSelector,
}

impl SecurityCore {
    /// Built-in processors and builders, configured from `config`.
    pub fn from_config(config: &SecurityConfig, rows: Arc<dyn RowSource>) -> Self {
        Self::new(
            config.auth_type.clone(),
            ProcessorSelector::with_defaults(build_context(config, rows)),
            BuilderSelector::with_defaults(),
        )
    }

    pub fn new(auth_type: AuthType, processors: ProcessorSelector, builders: BuilderSelector) -> Self {
        tracing::info!(
            auth_type = %auth_type,
            processors = processors.len(),
            "security core assembled"
        );
        Self {
            auth_type,
            processors,
            builders,
        }
    }

    pub fn auth_type(&self) -> &AuthType {
        &self.auth_type
    }

    pub fn processors(&self) -> &ProcessorSelector {
        &self.processors
    }

    /// Resolve with the processor matching the configured mode.
    pub fn resolve_principal(&self, subject_name: &str) -> SecurityResult<Subject> {
        self.processors
            .resolve_principal(&self.auth_type, subject_name)
    }

    pub fn build_tree(&self, nodes: Vec<AuthorityNode>) -> SecurityResult<AuthorityTree> {
        self.builders.build(nodes)
    }
}

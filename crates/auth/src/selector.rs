//! Processor selection by authentication mode.

use std::sync::{Arc, OnceLock};

use lightsec_core::{SecurityError, SecurityResult};

use crate::auth_type::AuthType;
use crate::processor::{
    GroupJdbcProcessor, PrincipalDataProcessor, ProcessorContext, SimpleJdbcProcessor,
};
use crate::strategy::StrategyRegistry;
use crate::subject::Subject;

static GLOBAL: OnceLock<ProcessorSelector> = OnceLock::new();

/// Chooses the principal processor whose `supports` predicate accepts an
/// [`AuthType`].
#[derive(Clone, Default)]
pub struct ProcessorSelector {
    registry: StrategyRegistry<dyn PrincipalDataProcessor>,
}

impl ProcessorSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in processors (`SIMPLE`, then `GROUP`) sharing one context.
    pub fn with_defaults(ctx: ProcessorContext) -> Self {
        Self::new()
            .register(Arc::new(SimpleJdbcProcessor::new(ctx.clone())))
            .register(Arc::new(GroupJdbcProcessor::new(ctx)))
    }

    pub fn register(self, processor: Arc<dyn PrincipalDataProcessor>) -> Self {
        Self {
            registry: self.registry.register(processor),
        }
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// First registered processor supporting `auth_type`.
    pub fn select(&self, auth_type: &AuthType) -> SecurityResult<&Arc<dyn PrincipalDataProcessor>> {
        self.registry
            .find(|p| p.supports(auth_type))
            .ok_or_else(|| {
                tracing::warn!(auth_type = %auth_type, "no principal processor registered");
                SecurityError::no_strategy(format!("auth type '{auth_type}'"))
            })
    }

    pub fn resolve_principal(
        &self,
        auth_type: &AuthType,
        subject_name: &str,
    ) -> SecurityResult<Subject> {
        self.select(auth_type)?.resolve_principal(subject_name)
    }

    /// Install this selector as the process-wide registry.
    ///
    /// Only the first install succeeds; later calls get their selector back.
    pub fn install_global(self) -> Result<&'static ProcessorSelector, ProcessorSelector> {
        let mut candidate = Some(self);
        let installed = GLOBAL.get_or_init(|| candidate.take().unwrap_or_default());
        match candidate {
            None => Ok(installed),
            Some(rejected) => Err(rejected),
        }
    }

    pub fn global() -> Option<&'static ProcessorSelector> {
        GLOBAL.get()
    }
}

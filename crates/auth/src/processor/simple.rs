use lightsec_core::{QueryKey, SecurityResult, SubjectId};

use crate::auth_type::AuthType;
use crate::authority::GrantedRole;

use super::{PrincipalDataProcessor, ProcessorContext};

/// Processor for [`AuthType::SIMPLE`]: authorities granted directly to the
/// subject, no group support.
#[derive(Debug, Clone)]
pub struct SimpleJdbcProcessor {
    ctx: ProcessorContext,
}

impl SimpleJdbcProcessor {
    pub fn new(ctx: ProcessorContext) -> Self {
        Self { ctx }
    }
}

impl PrincipalDataProcessor for SimpleJdbcProcessor {
    fn name(&self) -> &'static str {
        "simple"
    }

    fn supports(&self, auth_type: &AuthType) -> bool {
        *auth_type == AuthType::SIMPLE
    }

    fn context(&self) -> &ProcessorContext {
        &self.ctx
    }

    fn load_subject_authorities(&self, subject_id: SubjectId) -> SecurityResult<Vec<GrantedRole>> {
        Ok(self
            .ctx
            .load_authorities(QueryKey::AuthoritiesBySubjectId, subject_id)?)
    }
}

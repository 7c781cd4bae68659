use lightsec_core::{QueryKey, SecurityResult, SubjectId};

use crate::auth_type::AuthType;
use crate::authority::GrantedRole;

use super::{PrincipalDataProcessor, ProcessorContext};

/// Processor for [`AuthType::GROUP`]: direct authorities plus those inherited
/// through group membership.
///
/// Group loading still only runs when `groups_enabled` is set.
#[derive(Debug, Clone)]
pub struct GroupJdbcProcessor {
    ctx: ProcessorContext,
}

impl GroupJdbcProcessor {
    pub fn new(ctx: ProcessorContext) -> Self {
        Self { ctx }
    }
}

impl PrincipalDataProcessor for GroupJdbcProcessor {
    fn name(&self) -> &'static str {
        "group"
    }

    fn supports(&self, auth_type: &AuthType) -> bool {
        *auth_type == AuthType::GROUP
    }

    fn context(&self) -> &ProcessorContext {
        &self.ctx
    }

    fn load_subject_authorities(&self, subject_id: SubjectId) -> SecurityResult<Vec<GrantedRole>> {
        Ok(self
            .ctx
            .load_authorities(QueryKey::AuthoritiesBySubjectId, subject_id)?)
    }

    fn load_group_authorities(&self, subject_id: SubjectId) -> SecurityResult<Vec<GrantedRole>> {
        Ok(self
            .ctx
            .load_authorities(QueryKey::GroupAuthoritiesBySubjectId, subject_id)?)
    }
}

use crate::error::{LeadFlowError, Result};
use crate::model::LeadData;

/// Required-field checks applied before a lead record is created. A
/// rejection aborts only the item being processed.
pub struct LeadValidator;

impl LeadValidator {
    pub fn validate(data: &LeadData) -> Result<()> {
        if data.name.trim().is_empty() {
            return Err(LeadFlowError::Validation("name is required".to_string()));
        }
        if data.specialization.trim().is_empty() {
            return Err(LeadFlowError::Validation(
                "legal specialization is required".to_string(),
            ));
        }
        if data.phone.as_deref().map_or(true, |p| p.trim().is_empty())
            && data.email.as_deref().map_or(true, |e| e.trim().is_empty())
        {
            return Err(LeadFlowError::Validation(
                "phone or email is required".to_string(),
            ));
        }
        Ok(())
    }
}

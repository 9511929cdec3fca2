use crate::engine::error::BootstrapError;
use crate::model::case::CaseRecord;

/// Pull the case record out of the model's bootstrap reply.
///
/// Models like to wrap JSON in prose or markdown fences, so everything outside
/// the first `{` and the last `}` is ignored. Shape beyond "it deserializes" is
/// not checked.
pub fn parse_case(text: &str) -> Result<CaseRecord, BootstrapError> {
    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        return Err(BootstrapError::Format("no JSON object in reply".into()));
    };
    if end < start {
        return Err(BootstrapError::Format("no JSON object in reply".into()));
    }

    serde_json::from_str(&text[start..=end])
        .map_err(|e| BootstrapError::Format(e.to_string()))
}

//! Field validation shared by the handlers and the meta directives.

use crate::config::EngineConfig;
use crate::domain::args::CreateProjectArgs;
use crate::domain::entities::{CALLER_PLACEHOLDER, NFT_PLACEHOLDER};
use crate::errors::DaoError;

const HTTPS: &str = "https://";

/// Length check in characters; `required` also rejects empty text.
pub fn validate_text(field: &'static str, value: &str, max: usize, required: bool) -> Result<(), DaoError> {
    let len = value.chars().count();
    if required && len == 0 {
        return Err(DaoError::InvalidField {
            field,
            reason: "must not be empty".to_string(),
        });
    }
    if len > max {
        return Err(DaoError::InvalidField {
            field,
            reason: format!("{len} characters exceeds the limit of {max}"),
        });
    }
    Ok(())
}

/// Empty URLs are allowed; others must be https and within `max` bytes.
pub fn validate_url(url: &str, max: usize) -> Result<(), DaoError> {
    if url.is_empty() {
        return Ok(());
    }
    if url.len() > max {
        return Err(DaoError::UrlTooLong { len: url.len(), max });
    }
    if !url.starts_with(HTTPS) {
        return Err(DaoError::UrlNotHttps);
    }
    Ok(())
}

/// Percent within (0, 100].
pub fn validate_percent(field: &'static str, value: f64) -> Result<(), DaoError> {
    if value.is_finite() && value > 0.0 && value <= 100.0 {
        Ok(())
    } else {
        Err(DaoError::InvalidPercent { field, value })
    }
}

pub fn validate_nft_payload(format: &str) -> Result<(), DaoError> {
    if format.contains(NFT_PLACEHOLDER) && format.contains(CALLER_PLACEHOLDER) {
        Ok(())
    } else {
        Err(DaoError::InvalidNftPayload)
    }
}

pub fn validate_option_text(text: &str, max: usize) -> Result<(), DaoError> {
    let len = text.trim().chars().count();
    if len == 0 || len > max {
        return Err(DaoError::InvalidOptionText { max });
    }
    Ok(())
}

/// Checks a parsed `project_create` before anything is drawn or written.
pub fn validate_create_project(args: &CreateProjectArgs, config: &EngineConfig) -> Result<(), DaoError> {
    validate_text("project name", &args.name, config.max_name_len, true)?;
    validate_text("project description", &args.description, config.max_description_len, false)?;
    validate_text("project metadata", &args.metadata, config.max_metadata_len, false)?;
    validate_url(&args.url, config.max_url_len)?;
    validate_percent("threshold", args.threshold_percent)?;
    validate_percent("quorum", args.quorum_percent)?;
    if args.proposal_duration_hours == 0 {
        return Err(DaoError::InvalidField {
            field: "proposal duration",
            reason: "must be at least one hour".to_string(),
        });
    }
    validate_nft_payload(&args.membership_nft_payload)?;
    if args.membership_nft_contract.is_some() && args.membership_nft_function.is_none() {
        return Err(DaoError::InvalidField {
            field: "membership nft function",
            reason: "required when an nft contract is set".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_rules() {
        assert!(validate_url("", 10).is_ok());
        assert_eq!(validate_url("http://a.io", 64), Err(DaoError::UrlNotHttps));
        assert_eq!(
            validate_url("https://example.com", 10),
            Err(DaoError::UrlTooLong { len: 19, max: 10 })
        );
        assert!(validate_url("https://a.io", 64).is_ok());
    }

    #[test]
    fn test_percent_bounds() {
        assert!(validate_percent("quorum", 100.0).is_ok());
        assert!(validate_percent("quorum", 0.001).is_ok());
        assert!(validate_percent("quorum", 0.0).is_err());
        assert!(validate_percent("quorum", 100.5).is_err());
        assert!(validate_percent("quorum", f64::NAN).is_err());
    }

    #[test]
    fn test_option_text() {
        assert!(validate_option_text("yes", 500).is_ok());
        assert_eq!(validate_option_text("  ", 500), Err(DaoError::InvalidOptionText { max: 500 }));
        assert!(validate_option_text(&"x".repeat(501), 500).is_err());
    }

    #[test]
    fn test_nft_payload_needs_both_placeholders() {
        assert!(validate_nft_payload("{nft}|{caller}").is_ok());
        assert!(validate_nft_payload("{caller}").is_err());
    }

    #[test]
    fn test_create_project_checks() {
        let config = EngineConfig::default();
        let mut args = crate::adapters::payload::parse_create_project("dao", &config).unwrap();
        assert!(validate_create_project(&args, &config).is_ok());

        args.membership_nft_contract = Some("contract:nft".into());
        assert!(validate_create_project(&args, &config).is_err());
        args.membership_nft_function = Some("owns".into());
        assert!(validate_create_project(&args, &config).is_ok());

        args.quorum_percent = 0.0;
        assert!(matches!(
            validate_create_project(&args, &config),
            Err(DaoError::InvalidPercent { field: "quorum", .. })
        ));
    }
}

use crate::shared::config::ContentLimits;
use crate::shared::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reasons a draft is rejected before a mutation is ever created.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ValidationFailureKind {
    Generic,
    EmptyCommentBody,
    CommentTooLong,
    TitleTooShort,
    TitleTooLong,
    PostBodyTooLong,
    BioTooLong,
    EmptyFeedback,
    FeedbackTooLong,
}

impl ValidationFailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationFailureKind::Generic => "generic",
            ValidationFailureKind::EmptyCommentBody => "empty_comment_body",
            ValidationFailureKind::CommentTooLong => "comment_too_long",
            ValidationFailureKind::TitleTooShort => "title_too_short",
            ValidationFailureKind::TitleTooLong => "title_too_long",
            ValidationFailureKind::PostBodyTooLong => "post_body_too_long",
            ValidationFailureKind::BioTooLong => "bio_too_long",
            ValidationFailureKind::EmptyFeedback => "empty_feedback",
            ValidationFailureKind::FeedbackTooLong => "feedback_too_long",
        }
    }
}

impl fmt::Display for ValidationFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn reject(kind: ValidationFailureKind) -> AppError {
    AppError::Validation(kind.to_string())
}

pub fn validate_comment_body(content: &str, limits: &ContentLimits) -> Result<(), AppError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(reject(ValidationFailureKind::EmptyCommentBody));
    }
    if trimmed.chars().count() > limits.comment_max_chars {
        return Err(reject(ValidationFailureKind::CommentTooLong));
    }
    Ok(())
}

pub fn validate_post_draft(
    title: &str,
    content: &str,
    limits: &ContentLimits,
) -> Result<(), AppError> {
    let title_len = title.trim().chars().count();
    if title_len < limits.title_min_chars {
        return Err(reject(ValidationFailureKind::TitleTooShort));
    }
    if title_len > limits.title_max_chars {
        return Err(reject(ValidationFailureKind::TitleTooLong));
    }
    if content.chars().count() > limits.post_body_max_chars {
        return Err(reject(ValidationFailureKind::PostBodyTooLong));
    }
    Ok(())
}

pub fn validate_bio(bio: &str, limits: &ContentLimits) -> Result<(), AppError> {
    if bio.chars().count() > limits.bio_max_chars {
        return Err(reject(ValidationFailureKind::BioTooLong));
    }
    Ok(())
}

pub fn validate_feedback(message: &str, limits: &ContentLimits) -> Result<(), AppError> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return Err(reject(ValidationFailureKind::EmptyFeedback));
    }
    if trimmed.chars().count() > limits.feedback_max_chars {
        return Err(reject(ValidationFailureKind::FeedbackTooLong));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> ContentLimits {
        ContentLimits::default()
    }

    #[test]
    fn test_whitespace_only_comment_rejected() {
        let err = validate_comment_body("   \n\t ", &limits()).unwrap_err();
        assert!(err.to_string().contains("empty_comment_body"));
    }

    #[test]
    fn test_comment_within_limit_accepted() {
        assert!(validate_comment_body("looks good to me", &limits()).is_ok());
    }

    #[test]
    fn test_comment_over_limit_rejected() {
        let body = "x".repeat(limits().comment_max_chars + 1);
        assert!(validate_comment_body(&body, &limits()).is_err());
    }

    #[test]
    fn test_blank_feedback_rejected() {
        let err = validate_feedback("  \n ", &limits()).unwrap_err();
        assert!(err.to_string().contains("empty_feedback"));
        assert!(validate_feedback("the vote button lags", &limits()).is_ok());
    }

    #[test]
    fn test_title_bounds() {
        assert!(validate_post_draft("ab", "body", &limits()).is_err());
        assert!(validate_post_draft("a valid title", "body", &limits()).is_ok());
        let long = "t".repeat(limits().title_max_chars + 1);
        assert!(validate_post_draft(&long, "body", &limits()).is_err());
    }
}

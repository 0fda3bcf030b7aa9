//! Result type alias for the archiver

use super::errors::ArchiverError;

/// Result type alias for archiver operations
///
/// # Examples
///
/// ```
/// use article_archiver::domain::result::Result;
/// use article_archiver::domain::errors::ArchiverError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(ArchiverError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, ArchiverError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ArchiverError;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(ArchiverError::Validation("test error".to_string()));
        assert!(result.is_err());
    }
}

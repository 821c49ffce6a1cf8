//! Result type alias for Orderflow
//!
//! This module provides a convenient Result type alias that uses OrderflowError
//! as the error type.

use super::errors::OrderflowError;

/// Result type alias for Orderflow operations
///
/// # Examples
///
/// ```
/// use orderflow::domain::result::Result;
/// use orderflow::domain::errors::OrderflowError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(OrderflowError::InvalidOrder("empty body".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, OrderflowError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::OrderflowError;

    #[test]
    fn test_result_ok() {
        let result: Result<i32> = Ok(42);
        assert!(result.is_ok());
    }

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(OrderflowError::Other("test error".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}

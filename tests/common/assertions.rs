//! Assertion helpers with readable failure messages.

/// Unwrap `result`, naming the operation on failure.
#[allow(dead_code)]
pub fn assert_ok<T, E: std::fmt::Debug>(result: Result<T, E>, operation: &str) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("{} failed: {:?}", operation, err),
    }
}

/// Unwrap the error of `result`, naming the operation if it succeeded.
#[allow(dead_code)]
pub fn assert_err<T: std::fmt::Debug, E>(result: Result<T, E>, operation: &str) -> E {
    match result {
        Ok(value) => panic!("{} should have failed, got {:?}", operation, value),
        Err(err) => err,
    }
}

/// Case-insensitive check that an error's message (with its chain) mentions `expected`.
#[allow(dead_code)]
pub fn assert_error_contains<E: std::fmt::Display>(error: E, expected: &str, operation: &str) {
    let message = error.to_string();
    assert!(
        message.to_lowercase().contains(&expected.to_lowercase()),
        "{}: expected error mentioning '{}', got: {}",
        operation,
        expected,
        message
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_ok_returns_value() {
        let result: Result<u64, &str> = Ok(7);
        assert_eq!(assert_ok(result, "lookup"), 7);
    }

    #[test]
    #[should_panic(expected = "lookup failed")]
    fn test_assert_ok_panics_on_err() {
        let result: Result<u64, &str> = Err("gone");
        assert_ok(result, "lookup");
    }

    #[test]
    fn test_assert_err_returns_error() {
        let result: Result<u64, &str> = Err("gone");
        assert_eq!(assert_err(result, "lookup"), "gone");
    }

    #[test]
    fn test_assert_error_contains_ignores_case() {
        assert_error_contains("Object NOT FOUND", "not found", "lookup");
    }
}

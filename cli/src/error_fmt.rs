use std::error::Error;
use std::fmt::Write;

/// Formats an error chain with numbered lines.
///
/// Traverses the error's source chain and prints each unique message with a
/// numbered prefix (0:, 1:, 2:, ...), so a plugin or safe-path failure shows
/// its underlying I/O cause without repeating identical messages.
pub fn format_error_chain(error: &dyn Error) -> String {
    let mut message = String::new();
    let mut display_count = 0;

    // Start with the error itself
    let current_message = error.to_string();
    let _ = write!(&mut message, "\n    {display_count}: {current_message}");
    let mut past_message = current_message;
    display_count += 1;

    // Then traverse the source chain
    let mut maybe_source = error.source();
    while let Some(source) = maybe_source {
        let current_message = source.to_string();
        maybe_source = source.source();

        if current_message != past_message {
            let _ = write!(&mut message, "\n    {display_count}: {current_message}");
            past_message = current_message;
            display_count += 1;
        }

        // Limit depth to prevent infinite loops
        if display_count >= 8 {
            message.push_str("\n    ...");
            break;
        }
    }

    message
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code: unwrap is acceptable
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Outer(std::io::Error);

    impl std::fmt::Display for Outer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "interpreter failed to start")
        }
    }

    impl Error for Outer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn numbers_each_unique_message() {
        let err = Outer(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        let formatted = format_error_chain(&err);
        assert_eq!(
            formatted,
            "\n    0: interpreter failed to start\n    1: missing"
        );
    }

    #[test]
    fn skips_repeated_messages() {
        let err = std::io::Error::other("same text");
        let formatted = format_error_chain(&err);
        assert_eq!(formatted, "\n    0: same text");
    }
}

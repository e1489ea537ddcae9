//! Command errors and their exit status mapping.

use fcdb_core::{ExitStatus, FcdbError};
use thiserror::Error;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// An input file could not be read or parsed.
    #[error("Invalid {input}: {source}")]
    Input {
        input: String,
        #[source]
        source: FcdbError,
    },

    /// A command line argument was rejected.
    #[error("Invalid argument '{argument}': {message}")]
    InvalidArgument { argument: String, message: String },

    /// An output file could not be written.
    #[error("Failed to write {output}: {source}")]
    Output {
        output: String,
        #[source]
        source: FcdbError,
    },

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

impl CliError {
    pub fn input(input: impl Into<String>, source: FcdbError) -> Self {
        Self::Input {
            input: input.into(),
            source,
        }
    }

    pub fn invalid_argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            message: message.into(),
        }
    }

    pub fn output(output: impl Into<String>, source: FcdbError) -> Self {
        Self::Output {
            output: output.into(),
            source,
        }
    }

    /// Status the process exits with when the command fails.
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            CliError::Input { .. } | CliError::InvalidArgument { .. } => ExitStatus::InputError,
            CliError::Output { .. } | CliError::Logging(_) => ExitStatus::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_input_errors_exit_with_input_status() {
        let err = CliError::input("dump", FcdbError::user("format_version", "unsupported"));
        assert_eq!(err.exit_status(), ExitStatus::InputError);
        assert_eq!(err.exit_status().code(), 7);

        let err = CliError::invalid_argument("kind", "unknown entity kind 'switchx'");
        assert_eq!(err.exit_status().code(), 7);
    }

    #[test]
    fn test_output_errors_are_internal() {
        let err = CliError::output(
            "report",
            FcdbError::io("/nonexistent/report.json", std::io::ErrorKind::NotFound.into()),
        );
        assert_eq!(err.exit_status(), ExitStatus::Error);
        assert!(err.to_string().starts_with("Failed to write report"));
    }
}

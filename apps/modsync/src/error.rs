//! CLI error handling

use std::fmt;

use modsync_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Configuration error
    Config(modsync_errors::ConfigError),
    /// Operations error
    Ops(modsync_errors::Error),
    /// Verification finished but some modules do not match
    Invalid(Vec<String>),
    /// The command finished, but some modules could not be handled
    Incomplete(Vec<String>),
    /// I/O error
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => {
                write!(f, "Configuration error: {e}")?;
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                Ok(())
            }
            CliError::Ops(e) => {
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                if e.is_retryable() {
                    write!(f, "\n  Retry: safe to retry this operation.")?;
                }
                Ok(())
            }
            CliError::Invalid(modules) => {
                write!(f, "Invalid modules: {}", modules.join(", "))?;
                write!(f, "\n  Hint: run `modsync update` to repair them.")
            }
            CliError::Incomplete(problems) => {
                write!(f, "Some modules could not be handled:")?;
                for problem in problems {
                    write!(f, "\n  - {problem}")?;
                }
                write!(f, "\n  Hint: check the module names, or enable the release host with `--github`.")
            }
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Ops(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::Invalid(_) | CliError::Incomplete(_) => None,
        }
    }
}

impl From<modsync_errors::ConfigError> for CliError {
    fn from(e: modsync_errors::ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<modsync_errors::Error> for CliError {
    fn from(e: modsync_errors::Error) -> Self {
        match e {
            modsync_errors::Error::Config(e) => CliError::Config(e),
            other => CliError::Ops(other),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modsync_errors::{Error, VerifyError};

    #[test]
    fn ops_errors_carry_code_and_hint() {
        let err = CliError::from(Error::from(VerifyError::NothingToVerify));
        let text = err.to_string();
        assert!(text.contains("Code: verify."));
        assert!(text.contains("Hint:"));
    }

    #[test]
    fn incomplete_runs_list_every_problem() {
        let err = CliError::Incomplete(vec![
            "provider error: no provider configured for module go-module".to_string(),
            "provider error: no provider configured for module js-module-v2".to_string(),
        ]);
        let text = err.to_string();
        assert!(text.contains("  - provider error: no provider configured for module go-module"));
        assert!(text.contains("js-module-v2"));
        assert!(text.contains("Hint:"));
    }

    #[test]
    fn config_errors_are_unwrapped() {
        let err = CliError::from(Error::from(modsync_errors::ConfigError::InvalidValue {
            field: "branch".to_string(),
            value: "beta".to_string(),
        }));
        assert!(matches!(err, CliError::Config(_)));
        assert!(err.to_string().starts_with("Configuration error"));
    }
}

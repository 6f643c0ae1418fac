use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Case-insensitive markers that identify an authentication failure in the
/// external tool's output. The tool reports auth problems as free text, so
/// substring matching is the only signal available.
const AUTH_FAILURE_MARKERS: &[&str] = &["authentication", "authorized", "tf30063", "tf400813"];

#[derive(Error, Debug)]
pub enum Error {
    #[error("No workspace root: {0}")]
    Workspace(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Command `{command}` failed with exit code {exit_code}: {output}")]
    Command {
        command: String,
        args: Vec<String>,
        exit_code: i32,
        output: String,
    },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn command(
        command: impl Into<String>,
        args: &[&str],
        exit_code: i32,
        output: impl Into<String>,
    ) -> Self {
        Error::Command {
            command: command.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            exit_code,
            output: output.into(),
        }
    }

    /// Diagnostic sub-classification of command failures. Does not change how
    /// the error propagates, only how it is logged.
    pub fn is_authentication_failure(&self) -> bool {
        match self {
            Error::Command { output, .. } => {
                let lower = output.to_lowercase();
                AUTH_FAILURE_MARKERS.iter().any(|m| lower.contains(m))
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_classification() {
        let err = Error::command(
            "tf",
            &["status"],
            100,
            "TF30063: You are not authorized to access the server.",
        );
        assert!(err.is_authentication_failure());

        let err = Error::command("tf", &["status"], 1, "Authentication failed");
        assert!(err.is_authentication_failure());

        let err = Error::command("tf", &["status"], 1, "unable to determine the workspace");
        assert!(!err.is_authentication_failure());

        assert!(!Error::Workspace("missing".to_string()).is_authentication_failure());
    }
}

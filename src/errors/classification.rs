use super::types::RestockError;

#[derive(Debug, Clone)]
pub struct ErrorClass {
    pub error_type: &'static str,
    /// Whether an optional checkpoint (cookie banner, transient popup) may
    /// absorb this error and carry on. Everywhere else every class is fatal
    /// to the step that raised it.
    pub checkpoint_recoverable: bool,
}

impl RestockError {
    /// Classify this error for checkpoint handling and reporting.
    pub fn classify(&self) -> ErrorClass {
        match self {
            // A missing element is expected at optional checkpoints.
            RestockError::ElementNotFound(_) => ErrorClass {
                error_type: "ElementNotFound",
                checkpoint_recoverable: true,
            },

            // The page no longer looks like what the site definition
            // expects. Retrying or skipping will not help.
            RestockError::StructuralMismatch(_) => ErrorClass {
                error_type: "StructuralMismatch",
                checkpoint_recoverable: false,
            },

            // An overlay swallowed the interaction. Terminal for the step.
            RestockError::Intercepted(_) => ErrorClass {
                error_type: "InterceptedInteraction",
                checkpoint_recoverable: false,
            },

            RestockError::Step { .. } => ErrorClass {
                error_type: "StepFailure",
                checkpoint_recoverable: false,
            },

            RestockError::Config(_) => ErrorClass {
                error_type: "ConfigError",
                checkpoint_recoverable: false,
            },

            RestockError::Browser(_) => ErrorClass {
                error_type: "BrowserError",
                checkpoint_recoverable: false,
            },

            // Notification delivery is best-effort by contract; callers log
            // and continue, so the class is recoverable everywhere.
            RestockError::Notify(_) => ErrorClass {
                error_type: "NotifyError",
                checkpoint_recoverable: true,
            },

            RestockError::Cancelled(_) => ErrorClass {
                error_type: "Cancelled",
                checkpoint_recoverable: false,
            },

            RestockError::Http(_) => ErrorClass {
                error_type: "HttpError",
                checkpoint_recoverable: false,
            },

            RestockError::Io(_) => ErrorClass {
                error_type: "IoError",
                checkpoint_recoverable: false,
            },

            RestockError::Json(_) => ErrorClass {
                error_type: "JsonError",
                checkpoint_recoverable: false,
            },

            RestockError::Yaml(_) => ErrorClass {
                error_type: "YamlError",
                checkpoint_recoverable: false,
            },

            RestockError::Internal(_) => ErrorClass {
                error_type: "InternalError",
                checkpoint_recoverable: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_not_found_recoverable_at_checkpoints() {
        let err = RestockError::ElementNotFound(".cookiePolicy_inner-link".into());
        let class = err.classify();
        assert!(class.checkpoint_recoverable);
        assert_eq!(class.error_type, "ElementNotFound");
    }

    #[test]
    fn test_structural_mismatch_not_recoverable() {
        let err = RestockError::StructuralMismatch("listing tile missing".into());
        let class = err.classify();
        assert!(!class.checkpoint_recoverable);
        assert_eq!(class.error_type, "StructuralMismatch");
    }

    #[test]
    fn test_intercepted_not_recoverable() {
        let err = RestockError::Intercepted("overlay blocked click".into());
        assert!(!err.classify().checkpoint_recoverable);
    }

    #[test]
    fn test_step_failure_not_recoverable() {
        let err = RestockError::step("payment-details", "unknown card type");
        let class = err.classify();
        assert!(!class.checkpoint_recoverable);
        assert_eq!(class.error_type, "StepFailure");
    }

    #[test]
    fn test_notify_recoverable() {
        let err = RestockError::Notify("telegram 502".into());
        assert!(err.classify().checkpoint_recoverable);
    }

    #[test]
    fn test_config_not_recoverable() {
        let err = RestockError::Config("missing login details".into());
        assert!(!err.classify().checkpoint_recoverable);
    }
}

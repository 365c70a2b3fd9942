//! Configuration validation for mirror runs.
//!
//! This module checks a parsed configuration for values that would make a
//! run unsafe or meaningless before any filesystem work starts.

use tracing::debug;

use super::spec::MirrorConfig;

/// Validator for mirror configurations.
#[derive(Debug, Default)]
pub struct ConfigValidator;

/// Validation result containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a mirror configuration.
    #[must_use]
    pub fn validate(&self, config: &MirrorConfig) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_roots(config, &mut result);
        Self::validate_sync(config, &mut result);

        debug!(
            "Validation finished with {} errors, {} warnings",
            result.errors.len(),
            result.warnings.len()
        );
        result
    }

    /// Checks the two roots for existence and overlap.
    fn validate_roots(config: &MirrorConfig, result: &mut ValidationResult) {
        if !config.source_root.is_dir() {
            result.errors.push(ValidationError {
                field: String::from("source_root"),
                message: format!(
                    "not an existing directory: {}",
                    config.source_root.display()
                ),
            });
        }

        if config.source_root == config.backup_root {
            result.errors.push(ValidationError {
                field: String::from("backup_root"),
                message: String::from("backup root must differ from source root"),
            });
            return;
        }

        // Nested roots make the traversals feed on their own output.
        if config.backup_root.starts_with(&config.source_root) {
            result.errors.push(ValidationError {
                field: String::from("backup_root"),
                message: String::from("backup root must not be nested under source root"),
            });
        }
        if config.source_root.starts_with(&config.backup_root) {
            result.errors.push(ValidationError {
                field: String::from("source_root"),
                message: String::from("source root must not be nested under backup root"),
            });
        }

        if !config.backup_root.exists() {
            result.warnings.push(format!(
                "backup root {} does not exist yet and will be created",
                config.backup_root.display()
            ));
        }
    }

    /// Checks the sync options.
    fn validate_sync(config: &MirrorConfig, result: &mut ValidationResult) {
        if config.sync.deadline_minutes == 0 {
            result.errors.push(ValidationError {
                field: String::from("sync.deadline_minutes"),
                message: String::from("deadline must be at least 1 minute"),
            });
        }

        for name in &config.sync.ignore_names {
            if name.is_empty() {
                result.errors.push(ValidationError {
                    field: String::from("sync.ignore_names"),
                    message: String::from("ignore names must not be empty"),
                });
            } else if name.contains('/') || name.contains('\\') {
                result.errors.push(ValidationError {
                    field: String::from("sync.ignore_names"),
                    message: format!(
                        "'{name}' is a path; ignore entries match directory names only"
                    ),
                });
            }
        }
    }
}

impl ValidationResult {
    /// Returns true if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of errors.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Returns the number of warnings.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

//! Configuration module for the mirror engine.
//!
//! This module handles loading, parsing, and validation of the
//! `treemirror.yaml` configuration file.

mod parser;
mod spec;
mod validator;

pub use parser::{find_config_file, ConfigParser, CONFIG_FILE_NAME};
pub use spec::{MirrorConfig, StoreOptions, SyncOptions};
pub use validator::{ConfigValidator, ValidationError, ValidationResult};

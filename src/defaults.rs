//! Default values for descriptor processing.
//!
//! This module provides centralized default values used by the resolver and
//! the commands, ensuring consistency and avoiding duplication.

/// Key under which a required dependency declares its dependency type.
///
/// This can be overridden by the `--dependency-type-property` CLI flag or the
/// `MTA_DEPENDENCY_TYPE_PROPERTY` environment variable.
pub const DEPENDENCY_TYPE_PROPERTY: &str = "dependency-type";

/// Dependency type that stays an ordering constraint under parallel deployment.
///
/// This can be overridden by the `--hard-dependency-type` CLI flag or the
/// `MTA_HARD_DEPENDENCY_TYPE` environment variable.
pub const HARD_DEPENDENCY_TYPE: &str = "hard";

/// Descriptor parameter that enables parallel module deployment.
pub const PARALLEL_DEPLOYMENTS_PARAMETER: &str = "enable-parallel-deployments";

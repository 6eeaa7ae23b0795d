// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used across Glance

// Preview Server Configuration
pub const GLANCE_PORT: &str = "GLANCE_PORT";
pub const PORT: &str = "PORT"; // Legacy

// Task Integration
pub const GLANCE_RUN_AS_TASK: &str = "GLANCE_RUN_AS_TASK";
pub const GLANCE_TASK_VERBOSE: &str = "GLANCE_TASK_VERBOSE";

// Server Lifecycle
pub const GLANCE_KEEP_ALIVE_MINUTES: &str = "GLANCE_KEEP_ALIVE_MINUTES";

// Notifications
pub const GLANCE_NOTIFY_LOOSE_FILES: &str = "GLANCE_NOTIFY_LOOSE_FILES";

// System Environment Variables
pub const HOME: &str = "HOME";
pub const USERPROFILE: &str = "USERPROFILE"; // Windows

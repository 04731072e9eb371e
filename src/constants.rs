//! Application-wide constants
//!
//! Node paths, preference keys and config locations used throughout
//! the application, providing a single source of truth for constant values.

/// Sysfs layout exposed by the phantom key press filter driver
pub mod paths {
    /// Default root that node locations are resolved against
    pub const SYSFS_ROOT: &str = "/sys/kernel";

    /// Directory created by the driver module (relative to the sysfs root)
    pub const MODULE_DIR: &str = "phantom_kp_filter";

    pub const HOMEKEY_FILTER_STATUS: &str = "phantom_kp_filter/home_enabled";
    pub const HOMEKEY_ALLOWED_IRQS: &str = "phantom_kp_filter/home_allowed_irqs";
    pub const HOMEKEY_REPORT_WAIT: &str = "phantom_kp_filter/home_report_wait";
    pub const HOMEKEY_IGNORED_KP: &str = "phantom_kp_filter/home_ignored_kp";

    pub const TOUCHKEYS_FILTER_STATUS: &str = "phantom_kp_filter/touchkeys_enabled";
    pub const TOUCHKEYS_INTERRUPT_CHECKS: &str = "phantom_kp_filter/touchkeys_interrupt_checks";
    pub const TOUCHKEYS_FIRSTERR_WAIT: &str = "phantom_kp_filter/touchkeys_first_err_wait";
    pub const TOUCHKEYS_LASTERR_WAIT: &str = "phantom_kp_filter/touchkeys_last_err_wait";
    pub const TOUCHKEYS_IGNORED_KP: &str = "phantom_kp_filter/touchkeys_ignored_kp";
}

/// Preference keys (also used as setting ids)
pub mod ids {
    pub const HOMEKEY_FILTER_STATUS: &str = "homekey_filter_status";
    pub const HOMEKEY_ALLOWED_IRQS: &str = "homekey_allowed_irqs";
    pub const HOMEKEY_REPORT_WAIT: &str = "homekey_report_wait";
    pub const HOMEKEY_IGNORED_KP: &str = "homekey_ignored_kp";

    pub const TOUCHKEYS_FILTER_STATUS: &str = "touchkeys_filter_status";
    pub const TOUCHKEYS_INTERRUPT_CHECKS: &str = "touchkeys_interrupt_checks";
    pub const TOUCHKEYS_FIRSTERR_WAIT: &str = "touchkeys_firsterr_wait";
    pub const TOUCHKEYS_LASTERR_WAIT: &str = "touchkeys_lasterr_wait";
    pub const TOUCHKEYS_IGNORED_KP: &str = "touchkeys_ignored_kp";
}

/// Config file locations
pub mod config {
    /// Directory under the user's config dir
    pub const APP_DIR: &str = "pkf-manager";

    /// Application config filename
    pub const FILENAME: &str = "config.json";

    /// Preference store filename
    pub const PREFERENCES_FILENAME: &str = "preferences.json";
}

/// Environment variables that override the config file
pub mod env {
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
    pub const SYSFS_ROOT: &str = "PKF_SYSFS_ROOT";
    pub const PREFS_PATH: &str = "PKF_PREFS_PATH";
}

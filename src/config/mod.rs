//! Configuration management module

pub mod env;
pub mod parser;

// Re-export main functionality
pub use env::EnvManager;
pub use parser::{display_config_summary, load_config, ConfigParser};

// Re-export from models for convenience
pub use crate::models::Config;

#[cfg(test)]
pub(crate) mod tests {
    use super::EnvManager;
    use std::sync::Mutex;

    /// Serializes tests that touch process environment variables
    pub(crate) static ENV_LOCK: Mutex<()> = Mutex::new(());

    pub(crate) fn clear_env() {
        for (name, _, _) in EnvManager::get_supported_env_vars() {
            std::env::remove_var(name);
        }
    }

    #[test]
    fn test_clear_env_removes_supported_vars() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var("SRT_PROFILE", "simple");
        clear_env();
        assert!(std::env::var("SRT_PROFILE").is_err());
        assert!(EnvManager::validate_current_env().is_empty());
    }
}

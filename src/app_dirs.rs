use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "typesprint";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
    }

    /// Where history, mistake stats and the log live. Falls back to the
    /// working directory when no home directory can be found.
    pub fn data_dir() -> PathBuf {
        Self::project_dirs()
            .map(|dirs| dirs.data_local_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|dirs| dirs.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from(format!("{APP_NAME}_config.json")))
    }

    pub fn history_path() -> PathBuf {
        Self::data_dir().join("history.json")
    }

    pub fn mistakes_path() -> PathBuf {
        Self::data_dir().join("mistakes.json")
    }

    pub fn log_path() -> PathBuf {
        Self::data_dir().join(format!("{APP_NAME}.log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_share_the_data_dir() {
        let data = AppDirs::data_dir();
        assert_eq!(AppDirs::history_path().parent(), Some(data.as_path()));
        assert_eq!(AppDirs::mistakes_path().parent(), Some(data.as_path()));
        assert_ne!(AppDirs::history_path(), AppDirs::mistakes_path());
    }

    #[test]
    fn config_is_json() {
        assert_eq!(
            AppDirs::config_path().extension().and_then(|e| e.to_str()),
            Some("json")
        );
    }
}

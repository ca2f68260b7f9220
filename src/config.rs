pub mod settings;
pub mod user;

pub use settings::{
    DEFAULT_TAB_LENGTH, LanguageConfig, QueryItem, QueryKind, QuerySource, Settings,
    default_data_dir,
};
pub use user::{ConfigError, ConfigResult, load_config_file, load_user_config, user_config_path};

pub mod avatars;

pub use avatars::{
    default_config_path, load_settings, save_settings, AvatarSettings, DEFAULT_MODEL,
};

mod settings;

pub use settings::{
    DatabaseConfig, DirectoryConfig, JwtConfig, OtelConfig, ServerConfig, Settings,
};

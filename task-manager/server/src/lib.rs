pub mod config {
    use serde::Deserialize;

    #[derive(Deserialize, Debug, Clone)]
    pub struct Config {
        pub db_url: String,
        #[serde(default = "default_port")]
        pub port: u16,
        /// Serves Swagger UI and the OpenAPI document.
        #[serde(default = "default_swagger_enabled")]
        pub swagger_enabled: bool,
        /// Redirects requests forwarded over plain HTTP to HTTPS.
        #[serde(default)]
        pub force_https: bool,
    }

    impl Config {
        /// Loads configuration from environment variables.
        pub fn from_env() -> anyhow::Result<Self> {
            let settings = config::Config::builder()
                .add_source(config::Environment::default())
                .build()?;

            let config: Config = settings.try_deserialize()?;
            Ok(config)
        }

        /// Creates a configuration with defaults for everything but the database URL.
        pub fn with_db_url(db_url: impl Into<String>) -> Self {
            Self {
                db_url: db_url.into(),
                port: default_port(),
                swagger_enabled: default_swagger_enabled(),
                force_https: false,
            }
        }
    }

    fn default_port() -> u16 {
        8080
    }

    fn default_swagger_enabled() -> bool {
        true
    }
}
pub mod entities;
pub mod task;
pub mod web;

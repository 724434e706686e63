//! Runtime configuration shared by the service facade and the HTTP binary.

/// Environment the process is running in; gates `bulk` and `delete-tenant`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub environment: String,
}

impl AppConfig {
    pub fn new(database_url: String, environment: String) -> Self {
        Self {
            database_url,
            environment,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

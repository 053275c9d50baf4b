use std::env;

/// Shared secret used to authenticate inbound Splynx webhooks.
#[derive(Debug, Clone)]
pub struct SplynxConfig {
    pub webhook_secret: String,
}

/// Connection settings for the UISP CRM API.
#[derive(Debug, Clone)]
pub struct UispConfig {
    pub base_url: String,
    pub app_key: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub splynx: SplynxConfig,
    pub uisp: UispConfig,
    pub dev_mode: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("PAYSYNC_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "paysync.db".to_string()),
            splynx: SplynxConfig {
                webhook_secret: env::var("SPLYNX_WEBHOOK_SECRET").unwrap_or_default(),
            },
            uisp: UispConfig {
                base_url: env::var("UISP_BASE_URL")
                    .unwrap_or_else(|_| "https://uisp.example.com/api/v1.0".to_string()),
                app_key: env::var("UISP_APP_KEY").unwrap_or_default(),
            },
            dev_mode,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

use anyhow::{Context, Result};

use crate::config::stage::Stage;

use super::config_model::{AdminBootstrap, Database, DotEnvyConfig, Server, Session};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = Server {
        port: required("SERVER_PORT")?
            .parse()
            .context("SERVER_PORT is invalid")?,
        body_limit: required("SERVER_BODY_LIMIT")?
            .parse()
            .context("SERVER_BODY_LIMIT is invalid")?,
        timeout: required("SERVER_TIMEOUT")?
            .parse()
            .context("SERVER_TIMEOUT is invalid")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
    };

    let session = Session {
        secret: required("SESSION_SECRET")?,
        ttl_minutes: std::env::var("SESSION_TTL_MINUTES")
            .unwrap_or_else(|_| "1440".to_string())
            .parse()
            .context("SESSION_TTL_MINUTES is invalid")?,
        cookie_secure: std::env::var("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .context("SESSION_COOKIE_SECURE is invalid")?,
    };

    Ok(DotEnvyConfig {
        server,
        database,
        session,
        admin_bootstrap: admin_bootstrap(),
        stage: get_stage(),
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = std::env::var("STAGE").unwrap_or("".to_string());
    Stage::try_from(&stage_str).unwrap_or_default()
}

fn admin_bootstrap() -> Option<AdminBootstrap> {
    let username = optional("ADMIN_USERNAME")?;
    let email = optional("ADMIN_EMAIL")?;
    let password = optional("ADMIN_PASSWORD")?;

    Some(AdminBootstrap {
        username,
        email,
        password,
    })
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{} is invalid", key))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

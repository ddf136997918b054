use anyhow::{Context, Result};
use places_hub::{
    application::usecases::iam::IamUseCase,
    config::{config_loader, config_model::DotEnvyConfig},
    infrastructure::{
        axum_http::http_serve,
        postgres::{
            postgres_connection::{self, PgPoolSquad},
            repositories::{subscriptions::SubscriptionPostgres, users::UserPostgres},
        },
        security::argon2_hasher::Argon2PasswordHasher,
    },
    observability,
};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("places-hub exited with error: {}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    observability::init_observability("places-hub")?;

    let dotenvy_env = Arc::new(config_loader::load()?);
    info!("ENV has been loaded");

    let postgres_pool = Arc::new(postgres_connection::establish_connection(
        &dotenvy_env.database.url,
    )?);
    info!("Postgres connection has been established");

    bootstrap_admin(&dotenvy_env, &postgres_pool).await?;

    http_serve::start(dotenvy_env, postgres_pool).await?;

    Ok(())
}

async fn bootstrap_admin(config: &DotEnvyConfig, db_pool: &Arc<PgPoolSquad>) -> Result<()> {
    let Some(admin) = config.admin_bootstrap.clone() else {
        info!("No admin bootstrap credentials configured");
        return Ok(());
    };

    let iam_usecase = IamUseCase::new(
        Arc::new(UserPostgres::new(Arc::clone(db_pool))),
        Arc::new(SubscriptionPostgres::new(Arc::clone(db_pool))),
        Arc::new(Argon2PasswordHasher),
    );

    iam_usecase
        .bootstrap_admin(admin.username, admin.email, admin.password)
        .await
        .context("admin bootstrap failed")?;

    Ok(())
}

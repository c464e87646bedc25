use anyhow::{Context, Result};
use clap::Parser;
use estates::{
    config::ConfigLoader,
    db,
    repositories::{NewUser, UserRepository},
    telemetry,
};

/// Create an administrator account with staff and superuser rights.
#[derive(Parser, Debug)]
#[command(name = "create_superuser", version, about = "Create an Estates superuser")]
struct Args {
    #[arg(long)]
    username: String,

    #[arg(long)]
    email: String,

    #[arg(long)]
    first_name: String,

    #[arg(long)]
    last_name: String,

    /// Falls back to ESTATES_SUPERUSER_PASSWORD so it stays out of shell history
    #[arg(long, env = "ESTATES_SUPERUSER_PASSWORD", hide_env_values = true)]
    password: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ConfigLoader::new().load().context("loading configuration")?;
    telemetry::init_tracing(&config).context("initializing tracing")?;

    let db = db::init_pool(&config)
        .await
        .context("initializing database connection pool")?;
    db::run_migrations(&db).await?;

    let request = NewUser::new(
        args.username,
        args.first_name,
        args.last_name,
        args.email,
        args.password,
    );
    let user = UserRepository::new(&db)
        .create_superuser(request)
        .await
        .context("creating superuser")?;

    println!("Created superuser {} <{}> ({})", user.username, user.email, user.id);

    Ok(())
}

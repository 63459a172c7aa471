use std::{io, sync::Arc};

use actix_cors::Cors;
use actix_governor::Governor;
use actix_web::{middleware, App, HttpServer};
use clap::Parser;
use dotenvy::dotenv;

use newsletter::{
    api,
    config::AppConfig,
    identity::{self, JwtIdentityResolver},
    initialize_db_pool,
    observability::{init_logging, TracingTelemetry},
    run_migrations, security,
    store::SqliteSubscriptionStore,
    AppState,
};

/// CLI options
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Print a bearer token for this user id and exit
    #[clap(long, value_name = "USER_ID")]
    issue_token: Option<i64>,

    /// Lifetime of an issued token, in hours
    #[clap(long, default_value_t = 24)]
    token_hours: i64,
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    dotenv().ok();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };
    init_logging(&config.log_level, &config.log_format);

    tracing::info!(db_path = %config.db_path, "Opening database");
    let db_pool = initialize_db_pool(&config.db_path).map_err(to_io)?;
    run_migrations(&db_pool).map_err(to_io)?;

    let secret = {
        let mut conn = db_pool.get().map_err(to_io)?;
        identity::load_or_create_secret(&mut conn, config.jwt_secret.as_deref()).map_err(to_io)?
    };

    if let Some(user_id) = args.issue_token {
        let token = identity::issue_token(&secret, user_id, chrono::Duration::hours(args.token_hours))
            .map_err(to_io)?;
        println!("{token}");
        return Ok(());
    }

    let state = AppState::new(
        db_pool.clone(),
        Arc::new(SqliteSubscriptionStore::new(db_pool)),
        Arc::new(JwtIdentityResolver::new(&secret)),
        Arc::new(TracingTelemetry),
        config.count_deadline,
        config.toggle_deadline,
    );

    run_server(config, state)
}

#[actix_web::main]
async fn run_server(config: AppConfig, state: AppState) -> io::Result<()> {
    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        count_deadline_ms = config.count_deadline.as_millis() as u64,
        toggle_deadline_ms = config.toggle_deadline.as_millis() as u64,
        "Starting server"
    );

    let rate_limiter = security::create_rate_limiter().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "invalid rate limiter settings")
    })?;

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(tracing_actix_web::TracingLogger::default())
            .wrap(middleware::Compress::default())
            .wrap(middleware::NormalizePath::new(
                middleware::TrailingSlash::Trim,
            ))
            .wrap(security::SecurityHeaders)
            .wrap(cors)
            .configure(|cfg| state.configure(cfg))
            .service(api::routes().wrap(Governor::new(&rate_limiter)))
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}

fn to_io<E: std::fmt::Display>(e: E) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

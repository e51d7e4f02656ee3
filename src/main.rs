use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use profiles::config::AppConfig;
use profiles::handlers::{self, AppState};
use profiles::jwt::TokenCodec;
use profiles::middleware::RequestTrace;
use profiles::profile::ProfileStore;
use profiles::telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    if config.using_dev_secret {
        tracing::warn!(
            "JWT_SECRET is not set; signing with the built-in development secret. \
             Tokens issued by this process can be forged by anyone with the source."
        );
    }

    let state = web::Data::new(AppState {
        codec: TokenCodec::new(&config.jwt_secret),
        store: ProfileStore::new(&config.profiles_file),
        profile_update_auth: config.profile_update_auth,
    });

    tracing::info!(
        host = %config.host,
        port = config.port,
        profiles_file = %config.profiles_file.display(),
        profile_update_auth = ?config.profile_update_auth,
        "starting profile service"
    );

    let cors_origin = config.cors_allowed_origin.clone();

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&cors_origin)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();

        App::new()
            .wrap(cors)
            .wrap(RequestTrace)
            .app_data(state.clone())
            .configure(handlers::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

use std::sync::Arc;

use hyper::{
    service::{make_service_fn, service_fn},
    Server,
};
use lib::{
    app::App,
    auth::{self, TokenHandler},
    AppSettings, Webserver,
};
use structopt::StructOpt;

#[macro_use]
extern crate log;

#[tokio::main]
async fn main() {
    let env = std::env::var("WEBSERVER_ENV").unwrap_or_else(|_| "test".to_string());

    let env_file_name = format!("{}.env", env);

    if let Err(e) = dotenv::from_filename(&env_file_name) {
        warn!(
            "environment file not found: {}, error: {}",
            env_file_name, e
        );
    }

    pretty_env_logger::formatted_timed_builder()
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let settings = AppSettings::from(Opts::from_args());

    let tokens = TokenHandler::new(settings.jwt_secret.clone());

    let app = match App::from_settings(&settings, tokens.clone()).await {
        Ok(app) => Arc::new(app),
        Err(e) => {
            error!("failed to set up the list store: '{}'", e);
            std::process::exit(1);
        }
    };

    let webserver = Arc::new(Webserver::new(app, tokens));

    let addr = ([0, 0, 0, 0], settings.port).into();

    let service = make_service_fn(|_| {
        let webserver = webserver.clone();
        async {
            Ok::<_, hyper::Error>(service_fn(move |request| {
                let webserver = webserver.clone();
                lib::entry_point(webserver, request)
            }))
        }
    });

    let server = Server::bind(&addr).serve(service);

    info!("starting server on {:?}", addr);
    if let Err(e) = server.await {
        error!("server error: '{}'", e);
    }
}

#[derive(StructOpt, Debug, Clone)]
pub struct Opts {
    #[structopt(long, default_value = "3000", env = "WEBSERVER_LISTEN_PORT")]
    port: u16,
    /// Postgres connection string, lists are kept in memory if left out
    #[structopt(long, env = "WEBSERVER_DATABASE_ADDR")]
    database_addr: Option<String>,
    #[structopt(long, env = "WEBSERVER_JWT_SECRET")]
    jwt_secret: String,
    #[structopt(long, default_value = "3600", env = "WEBSERVER_TOKEN_TTL_S")]
    token_ttl_s: i64,
}

impl From<Opts> for AppSettings {
    fn from(
        Opts {
            port,
            database_addr,
            jwt_secret,
            token_ttl_s,
        }: Opts,
    ) -> Self {
        let clamped_ttl_s = auth::clamp_token_ttl(token_ttl_s);
        if clamped_ttl_s != token_ttl_s {
            warn!(
                "token ttl of {}s is out of range, using {}s",
                token_ttl_s, clamped_ttl_s
            );
        }

        AppSettings {
            port,
            database_addr,
            jwt_secret,
            token_ttl_s: clamped_ttl_s,
        }
    }
}

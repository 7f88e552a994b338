use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::info;

use pow_sim::api::{self, AppState};
use pow_sim::config::Config;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let config = Config::from_env();
    let (host, port) = (config.host.clone(), config.port);

    info!(
        "⛓️ Starting proof-of-work simulator at http://{host}:{port} (difficulty {})",
        config.initial_difficulty
    );

    let state = web::Data::new(AppState::new(config));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}

//! Single binary web server for the tournament bracket API.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! DATA_DIR switches from in-memory to JSON file storage; ROSTER_CSV loads display names.

use actix_web::{web::Data, App, HttpServer};
use cobblemon_bracket::{
    api, JsonFileRepository, MemoryRepository, Roster, ServerConfig, TournamentRepository,
    TournamentService,
};
use std::io;
use std::sync::Arc;

fn open_repository(config: &ServerConfig) -> io::Result<Arc<dyn TournamentRepository>> {
    match &config.data_dir {
        Some(dir) => {
            let repo = JsonFileRepository::open(dir).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            Ok(Arc::new(repo))
        }
        None => {
            log::info!("No DATA_DIR set, tournaments are kept in memory only");
            Ok(Arc::new(MemoryRepository::new()))
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    let repo = open_repository(&config)?;
    let mut service = TournamentService::new(repo, config.engine);
    if let Some(path) = &config.roster_csv {
        match Roster::from_path(path) {
            Ok(roster) => {
                log::info!("Loaded {} roster entries from {}", roster.len(), path.display());
                service = service.with_roster(roster);
            }
            Err(e) => log::warn!("Could not load roster {}: {e}", path.display()),
        }
    }
    let state = Data::new(service);

    let bind = (config.host.as_str(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || App::new().app_data(state.clone()).configure(api::configure))
        .bind(bind)?
        .run()
        .await
}

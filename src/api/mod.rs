mod chain;
mod health;
mod mining;
pub mod models;

use actix_web::HttpResponse;
use actix_web::web::{self, ServiceConfig};
use log::warn;

use crate::blockchain::Hash;
use crate::error::LedgerError;
use crate::session::Session;

pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(health::health_check)
            .service(chain::get_chain)
            .service(chain::get_block)
            .service(chain::validate_chain)
            .service(chain::orphan_block)
            .service(chain::clear_orphans)
            .service(chain::undo)
            .service(chain::reset)
            .service(mining::attempt)
            .service(mining::mine_block),
    );
}

/// Map a ledger error onto an HTTP status.
fn error_response(err: &LedgerError) -> HttpResponse {
    warn!("request rejected: {}", err);
    match err {
        LedgerError::BlockNotFound(_) => HttpResponse::NotFound().body(err.to_string()),
        _ => HttpResponse::BadRequest().body(err.to_string()),
    }
}

fn parse_id(raw: &str) -> Result<Hash, HttpResponse> {
    raw.parse()
        .map_err(|_| HttpResponse::BadRequest().body("block id must be 40 hex characters"))
}

fn summary(session: &Session) -> models::LedgerSummary {
    let ledger = session.ledger();
    models::LedgerSummary {
        length: ledger.len(),
        difficulty: ledger.difficulty(),
        max_weight: ledger.max_weight(),
        undo_depth: session.history_len(),
    }
}

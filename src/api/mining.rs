use actix_web::{HttpResponse, Responder, post, web};
use log::debug;

use super::models::{AppState, AttemptResponse, MineRequest};
use super::{error_response, parse_id};

/// One proof-of-work attempt against a block. Does not change the ledger.
#[post("/blocks/{id}/attempt/")]
pub async fn attempt(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = match parse_id(&path) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let mut session = state.session.lock().expect("mutex poisoned");
    let difficulty = session.ledger().difficulty();
    match session.attempt(&id) {
        Ok(attempt) => {
            debug!(
                "attempt on {} nonce={} success={}",
                id,
                attempt.nonce,
                attempt.succeeded()
            );
            HttpResponse::Ok().json(AttemptResponse {
                nonce: attempt.nonce,
                hash: attempt.hash,
                success: attempt.succeeded(),
                difficulty,
            })
        }
        Err(e) => error_response(&e),
    }
}

/// Mine on a block until an attempt succeeds, then append the new block.
#[post("/blocks/{id}/mine/")]
pub async fn mine_block(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: Option<web::Json<MineRequest>>,
) -> impl Responder {
    let id = match parse_id(&path) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let req = body.map(web::Json::into_inner).unwrap_or_default();

    let mut session = state.session.lock().expect("mutex poisoned");
    match session.mine_on(&id, req.miner.as_deref()) {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => error_response(&e),
    }
}

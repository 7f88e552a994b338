use actix_web::{HttpResponse, Responder, get, post, web};
use log::info;

use super::models::{
    AppState, BlockDetailsResponse, BlockView, ChainResponse, ClearOrphansResponse,
    ValidateResponse,
};
use super::{error_response, parse_id, summary};
use crate::error::LedgerError;

/// Snapshot of every block with its structural children.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    let session = state.session.lock().expect("mutex poisoned");
    let ledger = session.ledger();
    let blocks: Result<Vec<BlockView>, LedgerError> = ledger
        .blocks()
        .iter()
        .map(|b| BlockView::build(ledger, b))
        .collect();
    match blocks {
        Ok(blocks) => HttpResponse::Ok().json(ChainResponse {
            length: ledger.len(),
            difficulty: ledger.difficulty(),
            max_weight: ledger.max_weight(),
            blocks,
        }),
        Err(e) => error_response(&e),
    }
}

/// Full details of one block, payload included.
#[get("/blocks/{id}/")]
pub async fn get_block(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = match parse_id(&path) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let session = state.session.lock().expect("mutex poisoned");
    let ledger = session.ledger();

    let details = session.block(&id).and_then(|block| {
        Ok(BlockDetailsResponse {
            block: BlockView::build(ledger, block)?,
            transactions: block.transactions.clone(),
            verified: block.verify(),
            longest_branch_weight: ledger.longest_branch_weight(block)?,
            extendable: ledger.can_extend(block)?,
        })
    });
    match details {
        Ok(details) => HttpResponse::Ok().json(details),
        Err(e) => error_response(&e),
    }
}

/// Check payload integrity and linkage of the whole ledger.
#[get("/validate/")]
pub async fn validate_chain(state: web::Data<AppState>) -> impl Responder {
    let session = state.session.lock().expect("mutex poisoned");
    let ledger = session.ledger();
    let result = ledger.verify_chain();
    HttpResponse::Ok().json(ValidateResponse {
        valid: result.is_ok(),
        length: ledger.len(),
        difficulty: ledger.difficulty(),
        error: result.err().map(|e| e.to_string()),
    })
}

/// Orphan a block and everything built on it.
#[post("/blocks/{id}/orphan/")]
pub async fn orphan_block(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = match parse_id(&path) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let mut session = state.session.lock().expect("mutex poisoned");
    match session.orphan(&id) {
        Ok(()) => {
            info!("orphaned branch at {}", id);
            HttpResponse::Ok().json(summary(&session))
        }
        Err(e) => error_response(&e),
    }
}

#[post("/orphans/clear/")]
pub async fn clear_orphans(state: web::Data<AppState>) -> impl Responder {
    let mut session = state.session.lock().expect("mutex poisoned");
    let removed = session.clear_orphans();
    info!("cleared {} orphan(s)", removed);
    HttpResponse::Ok().json(ClearOrphansResponse {
        removed,
        ledger: summary(&session),
    })
}

/// Restore the ledger as it was before the last change.
#[post("/undo/")]
pub async fn undo(state: web::Data<AppState>) -> impl Responder {
    let mut session = state.session.lock().expect("mutex poisoned");
    match session.undo() {
        Ok(()) => HttpResponse::Ok().json(summary(&session)),
        Err(e) => error_response(&e),
    }
}

#[post("/reset/")]
pub async fn reset(state: web::Data<AppState>) -> impl Responder {
    let mut session = state.session.lock().expect("mutex poisoned");
    session.reset();
    info!("simulation reset");
    HttpResponse::Ok().json(summary(&session))
}

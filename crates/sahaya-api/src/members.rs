use axum::{
    extract::{Path, State},
    Json,
};

use sahaya_data::{Fine, MemberId};
use sahaya_reconcile::{store, ReconcileError};

use crate::{ApiError, AppState};

/// The fine ledger of a member.
pub async fn fines(
    State(state): State<AppState>,
    Path(member_id): Path<u32>,
) -> Result<Json<Vec<Fine>>, ApiError> {
    let member_id = MemberId(member_id);
    let member = store::find_member(&state.db, member_id)
        .await?
        .ok_or_else(|| ReconcileError::not_found("member", member_id))?;
    Ok(Json(member.get_fines(&state.db).await?))
}

//! Loads the name → id lookups an import needs

use super::remote_store::{RemoteStore, StoreError};
use crate::models::ImportContext;

pub const BRANCHES_TABLE: &str = "branches";
pub const SHIFTS_TABLE: &str = "shifts";

/// Fetch branches and shifts from the store
///
/// Both tables are listed for every kind so one context serves any file.
pub async fn load_context(store: &dyn RemoteStore) -> Result<ImportContext, StoreError> {
    let (branches, shifts) = futures::try_join!(
        store.list_references(BRANCHES_TABLE),
        store.list_references(SHIFTS_TABLE),
    )?;

    let context = ImportContext::from_references(
        branches.into_iter().map(|r| (r.id, r.name)),
        shifts.into_iter().map(|r| (r.id, r.name)),
    );

    tracing::info!(
        branches = context.branch_count(),
        shifts = context.shift_count(),
        "Loaded reference data"
    );

    Ok(context)
}

//! Range download for the located sheet

use log::{debug, info};

use crate::error::{Error, Result};
use crate::service::TableService;
use crate::sheets::{a1_range, Grid};

/// Columns read from every preference sheet
pub const RANGE_COLUMNS: &str = "A:F";

/// Read the six preference columns of `sheet_name`
///
/// The grid comes back exactly as the service sent it. A sheet with no values
/// is an error here; header stripping happens in [`crate::records`].
pub async fn fetch_range<S: TableService + ?Sized>(
    service: &S,
    access_token: &str,
    spreadsheet_id: &str,
    sheet_name: &str,
) -> Result<Grid> {
    let range = a1_range(sheet_name, RANGE_COLUMNS);
    info!("Fetching sheet data from {} ({})", spreadsheet_id, range);

    let grid = service
        .get_values(access_token, spreadsheet_id, &range)
        .await
        .map_err(|e| match e {
            Error::Fetch(_) => e,
            other => Error::fetch(other),
        })?;

    if grid.is_empty() {
        return Err(Error::fetch(format!("no values in {}", range)));
    }

    debug!("Fetched {} row(s)", grid.len());
    Ok(grid)
}

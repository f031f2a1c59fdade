//! Status consistency between referring and referenced definitions.

use crate::error::{Error, Result};
use crate::schema::Status;

/// Checks that a definition may reference another, given both statuses.
///
/// Within one module, a definition must not reference anything less alive
/// than itself along current > deprecated > obsolete; across module
/// boundaries every combination is fine.
pub fn check_status(
    referrer_status: Status,
    referrer_module: &str,
    referrer: &str,
    target_status: Status,
    target_module: &str,
    target: &str,
) -> Result<()> {
    if referrer_status < target_status && referrer_module == target_module {
        return Err(Error::InvalidSyntax(format!(
            "a {referrer_status} definition \"{referrer}\" is not allowed to \
             reference {target_status} definition \"{target}\""
        )));
    }
    Ok(())
}

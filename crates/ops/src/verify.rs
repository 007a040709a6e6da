//! Verify command implementation

use std::time::Instant;

use modsync_checker::Verification;
use modsync_errors::Error;
use modsync_events::EventEmitter;

use crate::types::elapsed_ms;
use crate::{OpsCtx, VerifyReport};

/// Check the install root against local and, with `remote`, latest manifests
///
/// `modules` is only consulted when the root holds no manifests of its own.
///
/// # Errors
///
/// Returns an error when nothing could be evaluated, or the run is cancelled
/// or exceeds its deadline. Modules that could not be evaluated are listed
/// in [`VerifyReport::errors`].
pub async fn verify(ctx: &OpsCtx, modules: &[String], remote: bool) -> Result<VerifyReport, Error> {
    let start = Instant::now();

    ctx.run("verify", async {
        let verification = ctx.checker(modules).verify(ctx.root(), remote).await?;

        for error in &verification.errors {
            ctx.emit_warning_with_context(skip_reason(&verification, error), error.to_string());
        }

        Ok(VerifyReport::new(
            ctx.root().to_path_buf(),
            remote,
            &verification,
            elapsed_ms(start),
        ))
    })
    .await
}

/// A module whose local check ran only missed the comparison with the latest
fn skip_reason(verification: &Verification, error: &Error) -> &'static str {
    let checked_locally = error
        .module()
        .is_some_and(|module| verification.local.contains_key(module));
    if checked_locally {
        "freshness not checked"
    } else {
        "module not evaluated"
    }
}

use super::{ContinueContext, HOME_PATH};
use crate::{
    client::{ApiError, Outcome},
    navigation::Navigation,
};

/// handle_service_login
///
/// Logs in at `private-auth`. The backend checks the SSO session, then
/// membership; both failures are turned into detours by the client, so only
/// unexpected errors come back as `Err`. On success the redirect guard is
/// cleared and the user resumes at `returnTo`, or `/home`.
pub async fn handle_service_login(ctx: &ContinueContext) -> Result<Navigation, ApiError> {
    let scope = &ctx.scope;

    match scope.api.login().await {
        Outcome::Resolved(login) => {
            scope.guard.reset();
            tracing::info!(is_new_user = login.is_new_user, "Service login succeeded");
            Ok(scope.navigate(Navigation::replace(ctx.destination_or(HOME_PATH))))
        }
        Outcome::Redirected(navigation) => Ok(navigation),
        Outcome::Rejected(e) => Err(e),
    }
}

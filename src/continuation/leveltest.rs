use super::{CONSENT_PATH, ContinueContext, Intent, TEST_START_PATH, continuation_url};
use crate::{
    client::{ApiError, Outcome, SIGNUP_PATH},
    navigation::{Navigation, with_return_to},
};

/// handle_leveltest
///
/// Prerequisite chain for starting a level test, strictly in order:
/// 1. consent: missing consent short-circuits before nickname is ever queried;
/// 2. nickname: a missing nickname sends the user through signup;
/// 3. both present: resume at `returnTo`, or the test start page.
///
/// Both detours hand the consent/signup page a continuation URL that embeds the
/// original `returnTo`, so the destination survives two levels of indirection.
pub async fn handle_leveltest(ctx: &ContinueContext) -> Result<Navigation, ApiError> {
    let scope = &ctx.scope;
    let resume_here = continuation_url(Intent::Leveltest, ctx.return_to.as_deref());

    let consent = match scope.api.consent_status().await {
        Outcome::Resolved(consent) => consent,
        Outcome::Redirected(navigation) => return Ok(navigation),
        Outcome::Rejected(e) => return Err(e),
    };
    if !consent.consented {
        tracing::info!("Consent missing, detouring through consent page");
        return Ok(scope.navigate(Navigation::replace(with_return_to(
            CONSENT_PATH,
            &resume_here,
        ))));
    }

    let profile = match scope.api.nickname().await {
        Outcome::Resolved(profile) => profile,
        Outcome::Redirected(navigation) => return Ok(navigation),
        Outcome::Rejected(e) => return Err(e),
    };
    let Some(nickname) = profile.registered_nickname() else {
        scope.hints.forget_nickname();
        tracing::info!("Nickname missing, detouring through signup");
        return Ok(scope.navigate(Navigation::replace(with_return_to(
            SIGNUP_PATH,
            &resume_here,
        ))));
    };
    scope.hints.remember_nickname(nickname);

    tracing::info!("Level test prerequisites satisfied");
    Ok(scope.navigate(Navigation::replace(ctx.destination_or(TEST_START_PATH))))
}

use maud::{DOCTYPE, Markup, html};

use crate::{
    continuation::ROOT_PATH,
    messages::{Locale, messages},
};

/// Path of the "try again" action on the auth error page.
pub const RETRY_ACTION: &str = "/auth-error/retry";

/// render_failure
///
/// The terminal error view: the message and a manual way home.
pub fn render_failure(locale: Locale, message: &str) -> String {
    let text = messages(locale);
    layout(
        locale,
        html! {
            p class="sc-failure" { (message) }
            a href=(ROOT_PATH) { (text.back_home) }
        },
    )
    .into_string()
}

/// render_auth_error
///
/// Remediation steps for a broken sign-in loop, with a form posting to the retry action.
pub fn render_auth_error(locale: Locale) -> String {
    let text = messages(locale);
    layout(
        locale,
        html! {
            h1 { (text.auth_error_title) }
            p { (text.auth_error_description) }
            h2 { (text.remediation_heading) }
            ul {
                @for (title, body) in text.remediation {
                    li {
                        strong { (title) }
                        p { (body) }
                    }
                }
            }
            form method="post" action=(RETRY_ACTION) {
                button type="submit" { (text.try_again) }
            }
        },
    )
    .into_string()
}

fn layout(locale: Locale, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(locale.tag()) {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "SkillCheck" }
            }
            body {
                main { (body) }
            }
        }
    }
}

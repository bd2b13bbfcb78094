/// Locale
///
/// UI language for the few user-facing strings the flow renders itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    Ko,
    En,
}

impl Locale {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ko" | "ko-kr" => Some(Self::Ko),
            "en" | "en-us" => Some(Self::En),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Ko => "ko",
            Self::En => "en",
        }
    }
}

/// Messages
///
/// Internal failure details are never shown, except on the login page where the
/// server's `detail` is already user-facing.
#[derive(Debug, Clone, Copy)]
pub struct Messages {
    pub generic_failure: &'static str,
    pub back_home: &'static str,
    pub sso_failure: &'static str,
    pub login_failure: &'static str,
    pub auth_error_title: &'static str,
    pub auth_error_description: &'static str,
    pub remediation_heading: &'static str,
    pub remediation: [(&'static str, &'static str); 3],
    pub try_again: &'static str,
}

const KO: Messages = Messages {
    generic_failure: "알 수 없는 오류가 발생했습니다. 잠시 후 다시 시도해주세요.",
    back_home: "홈으로 돌아가기",
    sso_failure: "로그인 처리 중 오류가 발생했습니다.",
    login_failure: "로그인 처리 중 오류가 발생했습니다.",
    auth_error_title: "로그인이 정상적으로 완료되지 않았습니다",
    auth_error_description: "인증 과정에서 문제가 발생했습니다. 아래 권장 조치를 확인해주세요.",
    remediation_heading: "권장 조치",
    remediation: [
        (
            "브라우저 쿠키 설정 확인",
            "브라우저 설정에서 쿠키가 차단되어 있지 않은지 확인해주세요.",
        ),
        (
            "다른 브라우저로 시도",
            "Chrome, Edge, Safari 등 다른 브라우저를 사용해보세요.",
        ),
        (
            "IT 헬프데스크 연락",
            "문제가 계속되면 IT 헬프데스크에 문의해주세요.",
        ),
    ],
    try_again: "다시 시도",
};

const EN: Messages = Messages {
    generic_failure: "Something went wrong. Please try again shortly.",
    back_home: "Back to home",
    sso_failure: "Something went wrong while signing you in.",
    login_failure: "Something went wrong while signing you in.",
    auth_error_title: "Sign-in did not complete",
    auth_error_description: "A problem occurred during authentication. Please check the steps below.",
    remediation_heading: "Recommended steps",
    remediation: [
        (
            "Check browser cookie settings",
            "Make sure cookies are not blocked in your browser settings.",
        ),
        (
            "Try another browser",
            "Use a different browser such as Chrome, Edge or Safari.",
        ),
        (
            "Contact the IT help desk",
            "If the problem persists, contact the IT help desk.",
        ),
    ],
    try_again: "Try again",
};

pub fn messages(locale: Locale) -> &'static Messages {
    match locale {
        Locale::Ko => &KO,
        Locale::En => &EN,
    }
}

// loginsight - core/auth.rs
//
// Pulls the interesting signals out of an authentication message body.
// Each signal is an independent extraction over the same text; a message
// can report an invalid user, carry an IP and be preauth all at once.

use crate::core::model::AuthDetails;
use regex::Regex;
use std::sync::OnceLock;

const PREAUTH_MARKER: &str = "[preauth]";
const CONNECTION_CLOSED: &str = "connection closed by";

struct AuthPatterns {
    ipv4: Regex,
    invalid_user: Regex,
    failed_password: Regex,
}

fn patterns() -> &'static AuthPatterns {
    static PATTERNS: OnceLock<AuthPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        // Fixed patterns; covered by the tests below.
        fn re(pat: &str) -> Regex {
            Regex::new(pat).expect("auth pattern: invalid regex")
        }
        AuthPatterns {
            ipv4: re(r"(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})"),
            invalid_user: re(r"(?i)invalid\suser\s(\w+)\s"),
            failed_password: re(r"(?i)failed\spassword\sfor\s(\w+)\s"),
        }
    })
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Decompose an auth message body.
///
/// - `ip`: first IPv4 literal anywhere in the text
/// - `invalid_user`: NAME in "invalid user NAME "
/// - `invalid_pass_user`: NAME in "failed password for NAME "
/// - `is_preauth`: text contains `[preauth]`
/// - `is_closed`: text contains "connection closed by"
///
/// All matching ignores case.
pub fn decompose(message: &str) -> AuthDetails {
    let p = patterns();
    let lower = message.to_lowercase();
    AuthDetails {
        ip: first_capture(&p.ipv4, message),
        invalid_user: first_capture(&p.invalid_user, message),
        invalid_pass_user: first_capture(&p.failed_password, message),
        is_preauth: lower.contains(PREAUTH_MARKER),
        is_closed: lower.contains(CONNECTION_CLOSED),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_user_preauth() {
        let d = decompose("Invalid user admin from 10.0.0.5 port 51515 [preauth]");
        assert_eq!(d.ip.as_deref(), Some("10.0.0.5"));
        assert_eq!(d.invalid_user.as_deref(), Some("admin"));
        assert_eq!(d.invalid_pass_user, None);
        assert!(d.is_preauth);
        assert!(!d.is_closed);
    }

    #[test]
    fn test_failed_password() {
        let d = decompose("Failed password for root from 120.25.229.167 port 40604 ssh2");
        assert_eq!(d.invalid_pass_user.as_deref(), Some("root"));
        assert_eq!(d.invalid_user, None);
        assert_eq!(d.ip.as_deref(), Some("120.25.229.167"));
    }

    #[test]
    fn test_failed_password_for_invalid_user_reports_both() {
        let d = decompose("Failed password for invalid user guest from 1.2.3.4 port 22 ssh2");
        assert_eq!(d.invalid_pass_user.as_deref(), Some("invalid"));
        assert_eq!(d.invalid_user.as_deref(), Some("guest"));
    }

    #[test]
    fn test_connection_closed_any_case() {
        let d = decompose("Connection closed by 120.25.229.167 port 52162 [PREAUTH]");
        assert!(d.is_closed);
        assert!(d.is_preauth);
    }

    #[test]
    fn test_nothing_found() {
        let d = decompose("pam_unix(cron:session): session opened for user root by (uid=0)");
        assert_eq!(d, AuthDetails::default());
    }

    #[test]
    fn test_first_ip_wins() {
        let d = decompose("relay 10.1.1.1 to 10.2.2.2");
        assert_eq!(d.ip.as_deref(), Some("10.1.1.1"));
    }
}

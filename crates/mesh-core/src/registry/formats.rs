//! Built-in format predicates
//!
//! Formats inspect the textual form of the working value. They never fail a
//! check through `Err`; an `Err` from here always means the step itself is
//! misconfigured (bad regex, unknown card type, wrongly typed parameter).

use std::net::IpAddr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::{Regex, RegexBuilder};
use url::Url;

use crate::error::{Error, Result};
use crate::types::FieldValue;

use super::{cards, params, PredicateRegistry};

pub const ALPHA: &str = "alpha";
pub const ALPHA_SPACE: &str = "alpha_space";
pub const ALPHA_NUMERIC: &str = "alpha_numeric";
pub const ALPHA_DASH: &str = "alpha_dash";
pub const DIGIT: &str = "digit";
pub const NUMERIC: &str = "numeric";
pub const DECIMAL: &str = "decimal";
pub const COLOR: &str = "color";
pub const CREDIT_CARD: &str = "credit_card";
pub const PHONE: &str = "phone";
pub const DATE: &str = "date";
pub const EMAIL: &str = "email";
pub const EMAIL_DOMAIN: &str = "email_domain";
pub const IP: &str = "ip";
pub const URL: &str = "url";
pub const REGEX: &str = "regex";
pub const USERNAME: &str = "username";
pub const NAME: &str = "name";
pub const TEXT: &str = "text";

/// Default accepted digit counts for `phone`
pub const DEFAULT_PHONE_LENGTHS: [usize; 3] = [7, 10, 11];

/// Default number of decimal places for `decimal`
pub const DEFAULT_DECIMAL_PLACES: usize = 2;

/// Host-provided MX record lookup backing the `email_domain` format
pub trait MxResolver: Send + Sync {
    /// Whether `domain` publishes at least one MX record
    fn has_mx(&self, domain: &str) -> bool;
}

static ALPHA_UTF8: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\p{L}+$").expect("alpha pattern is valid"));
static ALPHA_NUMERIC_UTF8: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\p{N}]+$").expect("alpha_numeric pattern is valid"));
static ALPHA_DASH_ASCII: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[-a-z0-9_]+$").expect("alpha_dash pattern is valid"));
static ALPHA_DASH_UTF8: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-\p{L}\p{N}_]+$").expect("alpha_dash pattern is valid"));
static DIGIT_UTF8: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\p{N}+$").expect("digit pattern is valid"));
static NUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9.]+$").expect("numeric pattern is valid"));
static COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^#?[0-9a-f]{3}(?:[0-9a-f]{3})?$").expect("color pattern is valid")
});
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{1,2}-[0-9]{1,2}$").expect("date pattern is valid"));
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z0-9_]+$").expect("username pattern is valid"));
static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z\-' ]+$").expect("name pattern is valid"));
static TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{L}\p{N}\p{Z}\p{Pc}\p{Pd}\p{Po}]+$").expect("text pattern is valid")
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)^[-_a-z0-9'+*$^&%=~!?{}]+(?:\.[-_a-z0-9'+*$^&%=~!?{}]+)*@",
        r"(?:[a-z0-9](?:[-a-z0-9.]*[a-z0-9])?\.[a-z]{2,6}|[0-9]{1,3}(?:\.[0-9]{1,3}){3})",
        r"(?::[0-9]+)?$",
    ))
    .expect("email pattern is valid")
});

// RFC 822 grammar restricted to ASCII
static EMAIL_STRICT_RE: LazyLock<Regex> = LazyLock::new(|| {
    let qtext = r"[\x00-\x0c\x0e-\x21\x23-\x5b\x5d-\x7f]";
    let dtext = r"[\x00-\x0c\x0e-\x5a\x5e-\x7f]";
    let atom = r"[\x21\x23-\x27\x2a\x2b\x2d\x2f-\x39\x3d\x3f\x41-\x5a\x5e-\x7e]+";
    let pair = r"\x5c[\x00-\x7f]";

    let domain_literal = format!(r"\x5b(?:{dtext}|{pair})*\x5d");
    let quoted_string = format!(r"\x22(?:{qtext}|{pair})*\x22");
    let sub_domain = format!("(?:{atom}|{domain_literal})");
    let word = format!("(?:{atom}|{quoted_string})");
    let domain = format!(r"{sub_domain}(?:\x2e{sub_domain})*");
    let local_part = format!(r"{word}(?:\x2e{word})*");

    Regex::new(&format!(r"^{local_part}\x40{domain}$")).expect("strict email pattern is valid")
});

pub(crate) fn register_builtins(registry: &mut PredicateRegistry) {
    registry
        .register_format(ALPHA, |value, p| {
            Ok(alpha(&value.to_text(), params::flag(ALPHA, p, 0, false)?))
        })
        .register_format(ALPHA_SPACE, |value, p| {
            Ok(alpha_space(&value.to_text(), params::flag(ALPHA_SPACE, p, 0, false)?))
        })
        .register_format(ALPHA_NUMERIC, |value, p| {
            Ok(alpha_numeric(&value.to_text(), params::flag(ALPHA_NUMERIC, p, 0, false)?))
        })
        .register_format(ALPHA_DASH, |value, p| {
            Ok(alpha_dash(&value.to_text(), params::flag(ALPHA_DASH, p, 0, false)?))
        })
        .register_format(DIGIT, |value, p| {
            let utf8 = params::flag(DIGIT, p, 0, false)?;
            Ok(match value {
                FieldValue::Number(n) => n.fract() == 0.0,
                other => digit(&other.to_text(), utf8),
            })
        })
        .register_format(NUMERIC, |value, _| Ok(numeric(&value.to_text())))
        .register_format(DECIMAL, |value, p| {
            let places = params::count_or(DECIMAL, p, 0, DEFAULT_DECIMAL_PLACES)?;
            Ok(decimal(&value.to_text(), places))
        })
        .register_format(COLOR, |value, _| Ok(color(&value.to_text())))
        .register_format(CREDIT_CARD, |value, p| credit_card(&value.to_text(), p))
        .register_format(PHONE, |value, p| {
            let lengths = phone_lengths(p)?;
            Ok(phone(&value.to_text(), &lengths))
        })
        .register_format(DATE, |value, _| Ok(date(&value.to_text())))
        .register_format(EMAIL, |value, p| {
            Ok(email(&value.to_text(), params::flag(EMAIL, p, 0, false)?))
        })
        .register_format(IP, |value, p| {
            Ok(ip(&value.to_text(), params::flag(IP, p, 0, true)?))
        })
        .register_format(URL, |value, _| Ok(url(&value.to_text())))
        .register_format(REGEX, |value, p| {
            let pattern = compile_pattern(params::text(REGEX, p, 0)?)?;
            Ok(pattern.is_match(&value.to_text()))
        })
        .register_format(USERNAME, |value, _| Ok(USERNAME_RE.is_match(&value.to_text())))
        .register_format(NAME, |value, _| Ok(NAME_RE.is_match(&value.to_text())))
        .register_format(TEXT, |value, _| Ok(TEXT_RE.is_match(&value.to_text())));
}

/// Letters only. Without `utf8` only ASCII letters count.
pub fn alpha(s: &str, utf8: bool) -> bool {
    if utf8 {
        ALPHA_UTF8.is_match(s)
    } else {
        !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphabetic())
    }
}

/// Letters and spaces; spaces alone do not count as letters
pub fn alpha_space(s: &str, utf8: bool) -> bool {
    alpha(&s.replace(' ', ""), utf8)
}

pub fn alpha_numeric(s: &str, utf8: bool) -> bool {
    if utf8 {
        ALPHA_NUMERIC_UTF8.is_match(s)
    } else {
        !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric())
    }
}

/// Letters, digits, underscores and dashes
pub fn alpha_dash(s: &str, utf8: bool) -> bool {
    if utf8 {
        ALPHA_DASH_UTF8.is_match(s)
    } else {
        ALPHA_DASH_ASCII.is_match(s)
    }
}

/// Digits only, no sign or decimal point
pub fn digit(s: &str, utf8: bool) -> bool {
    if utf8 {
        DIGIT_UTF8.is_match(s)
    } else {
        !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
    }
}

/// Optionally negative digits with decimal points
pub fn numeric(s: &str) -> bool {
    NUMERIC_RE.is_match(s)
}

/// Digits, a decimal point and exactly `places` fractional digits
pub fn decimal(s: &str, places: usize) -> bool {
    let Some((whole, fraction)) = s.split_once('.') else {
        return false;
    };
    !whole.is_empty()
        && whole.bytes().all(|b| b.is_ascii_digit())
        && fraction.len() == places
        && fraction.bytes().all(|b| b.is_ascii_digit())
}

/// Hexadecimal HTML color, `#` optional, 3 or 6 digits
pub fn color(s: &str) -> bool {
    COLOR_RE.is_match(s)
}

/// Credit card number check against one card type or any of a list.
///
/// Non-digit characters are stripped before checking. Unknown card types are
/// a configuration error.
pub fn credit_card(number: &str, p: &[FieldValue]) -> Result<bool> {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();

    let types: Vec<&str> = match params::optional(p, 0) {
        None => vec!["default"],
        Some(FieldValue::String(name)) => vec![name.as_str()],
        Some(FieldValue::List(items)) => items
            .iter()
            .map(|item| {
                item.as_str().ok_or_else(|| {
                    Error::configuration(CREDIT_CARD, "'credit_card' card types must be strings")
                })
            })
            .collect::<Result<_>>()?,
        Some(other) => {
            return Err(Error::configuration(
                CREDIT_CARD,
                format!(
                    "'credit_card' parameter 1 must be a card type or list of card types, got {}",
                    other.type_name()
                ),
            ))
        }
    };

    let mut accepted = false;
    for name in types {
        let card = cards::lookup(name).ok_or_else(|| {
            Error::configuration(CREDIT_CARD, format!("unknown card type '{}'", name))
        })?;
        accepted |= !digits.is_empty() && card.accepts(&digits);
    }
    Ok(accepted)
}

fn phone_lengths(p: &[FieldValue]) -> Result<Vec<usize>> {
    match params::optional(p, 0) {
        None => Ok(DEFAULT_PHONE_LENGTHS.to_vec()),
        Some(FieldValue::List(items)) => (0..items.len())
            .map(|i| params::count(PHONE, items, i))
            .collect(),
        Some(other) => Err(Error::configuration(
            PHONE,
            format!("'phone' parameter 1 must be a list of lengths, got {}", other.type_name()),
        )),
    }
}

/// Phone number whose digit count is one of `lengths`
pub fn phone(number: &str, lengths: &[usize]) -> bool {
    let count = number.chars().filter(char::is_ascii_digit).count();
    lengths.contains(&count)
}

/// Calendar date written as `yyyy-mm-dd`
pub fn date(s: &str) -> bool {
    if !DATE_RE.is_match(s) {
        return false;
    }
    let mut parts = s.split('-').map(str::parse::<u32>);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(Ok(year)), Some(Ok(month)), Some(Ok(day))) => {
            i32::try_from(year)
                .ok()
                .and_then(|year| NaiveDate::from_ymd_opt(year, month, day))
                .is_some()
        }
        _ => false,
    }
}

/// Email address. `strict` switches to the RFC 822 grammar.
pub fn email(s: &str, strict: bool) -> bool {
    if strict {
        EMAIL_STRICT_RE.is_match(s)
    } else {
        EMAIL_RE.is_match(s)
    }
}

/// Email whose domain has an MX record according to `resolver`
pub fn email_domain(resolver: &dyn MxResolver, address: &str) -> bool {
    let domain = address.split_once('@').map_or(address, |(_, domain)| domain);
    !domain.is_empty() && resolver.has_mx(domain)
}

/// IP address outside the reserved ranges; `allow_private` admits private networks
pub fn ip(s: &str, allow_private: bool) -> bool {
    let Ok(addr) = s.trim().parse::<IpAddr>() else {
        return false;
    };
    match addr {
        IpAddr::V4(v4) => {
            let [first, second, ..] = v4.octets();
            let reserved = first == 0
                || v4.is_loopback()
                || (first == 169 && second == 254)
                || first >= 240;
            !reserved && (allow_private || !v4.is_private())
        }
        IpAddr::V6(v6) => {
            let head = v6.segments()[0];
            let reserved = v6.is_loopback() || v6.is_unspecified() || (head & 0xffc0) == 0xfe80;
            let private = (head & 0xfe00) == 0xfc00;
            !reserved && (allow_private || !private)
        }
    }
}

/// Absolute URL with a host
pub fn url(s: &str) -> bool {
    Url::parse(s)
        .map(|parsed| parsed.host_str().is_some_and(|host| !host.is_empty()))
        .unwrap_or(false)
}

/// Compile a `regex` step parameter.
///
/// Accepts a bare pattern or a delimited `/pattern/flags` form. The flags
/// `i`, `m`, `s` and `x` map onto the matching regex options; `u` and `D` are
/// accepted and ignored.
pub fn compile_pattern(raw: &str) -> Result<Regex> {
    let (pattern, flags) = match raw.strip_prefix('/').and_then(|rest| rest.rsplit_once('/')) {
        Some((pattern, flags)) if flags.chars().all(|c| "imsxuD".contains(c)) => (pattern, flags),
        _ => (raw, ""),
    };

    RegexBuilder::new(pattern)
        .case_insensitive(flags.contains('i'))
        .multi_line(flags.contains('m'))
        .dot_matches_new_line(flags.contains('s'))
        .ignore_whitespace(flags.contains('x'))
        .build()
        .map_err(|e| Error::configuration(REGEX, format!("invalid pattern '{}': {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_family() {
        assert!(alpha("Mesh", false));
        assert!(!alpha("Mésh", false));
        assert!(alpha("Mésh", true));
        assert!(!alpha("", false));

        assert!(alpha_space("John Smith", false));
        assert!(!alpha_space("   ", false));

        assert!(alpha_numeric("abc123", false));
        assert!(!alpha_numeric("abc 123", false));

        assert!(alpha_dash("snake_case-name", false));
        assert!(!alpha_dash("dotted.name", false));
        assert!(alpha_dash("ünïcode-ok", true));
    }

    #[test]
    fn test_digit_and_numeric() {
        assert!(digit("0042", false));
        assert!(!digit("-42", false));
        assert!(numeric("-42.5"));
        assert!(!numeric("4e2"));
    }

    #[test]
    fn test_decimal() {
        assert!(decimal("10.25", 2));
        assert!(!decimal("10.2", 2));
        assert!(!decimal("10", 0));
        assert!(decimal("3.000", 3));
        assert!(!decimal(".25", 2));
    }

    #[test]
    fn test_color() {
        assert!(color("#fff"));
        assert!(color("A0B1C2"));
        assert!(!color("#ffff"));
    }

    #[test]
    fn test_date() {
        assert!(date("2024-02-29"));
        assert!(!date("2023-02-29"));
        assert!(date("2024-1-5"));
        assert!(!date("24-01-05"));
        assert!(!date("2024-13-01"));
    }

    #[test]
    fn test_only_ascii_digits() {
        assert!(!date("\u{662}\u{660}\u{662}\u{664}-01-05"));
        assert!(!email("a@\u{661}27.0.0.1", false));
        assert!(!email("a@b.com:\u{668}0", false));
        assert!(email("a@b.com:80", false));
    }

    #[test]
    fn test_email() {
        assert!(email("a@b.com", false));
        assert!(email("first.last+tag@example.co.uk", false));
        assert!(email("root@127.0.0.1", false));
        assert!(!email("not-an-email", false));
        assert!(!email("a@-bad.com", false));
        assert!(!email("a@b.c", false));

        assert!(email("\"quoted name\"@example.com", true));
        assert!(!email("two@@example.com", true));
    }

    #[test]
    fn test_email_domain() {
        struct Known;
        impl MxResolver for Known {
            fn has_mx(&self, domain: &str) -> bool {
                domain == "example.com"
            }
        }

        assert!(email_domain(&Known, "someone@example.com"));
        assert!(!email_domain(&Known, "someone@example.org"));
        assert!(!email_domain(&Known, "someone@"));
    }

    #[test]
    fn test_ip() {
        assert!(ip("8.8.8.8", true));
        assert!(ip("192.168.1.10", true));
        assert!(!ip("192.168.1.10", false));
        assert!(!ip("127.0.0.1", true));
        assert!(!ip("0.1.2.3", true));
        assert!(!ip("250.0.0.1", true));
        assert!(ip("2001:4860:4860::8888", false));
        assert!(!ip("::1", true));
        assert!(!ip("fd00::1", false));
        assert!(!ip("not an ip", true));
    }

    #[test]
    fn test_url() {
        assert!(url("https://example.com/path?q=1"));
        assert!(!url("example.com"));
        assert!(!url("mailto:someone@example.com"));
    }

    #[test]
    fn test_phone() {
        assert!(phone("(555) 123-4567", &DEFAULT_PHONE_LENGTHS));
        assert!(phone("555-1234", &DEFAULT_PHONE_LENGTHS));
        assert!(!phone("12345", &DEFAULT_PHONE_LENGTHS));
        assert!(phone("12345", &[5]));
    }

    #[test]
    fn test_phone_lengths_parameter() {
        assert_eq!(phone_lengths(&[]).unwrap(), vec![7, 10, 11]);
        assert_eq!(
            phone_lengths(&[FieldValue::from(vec![8, 9])]).unwrap(),
            vec![8, 9]
        );
        assert!(phone_lengths(&[FieldValue::from("ten")]).is_err());
    }

    #[test]
    fn test_credit_card() {
        assert!(credit_card("4111 1111 1111 1111", &[]).unwrap());
        assert!(credit_card("4111-1111-1111-1111", &[FieldValue::from("visa")]).unwrap());
        assert!(!credit_card("4111111111111111", &[FieldValue::from("mastercard")]).unwrap());
        assert!(credit_card(
            "5555555555554444",
            &[FieldValue::from(vec!["visa", "mastercard"])]
        )
        .unwrap());
        assert!(!credit_card("no digits", &[]).unwrap());

        let err = credit_card("4111111111111111", &[FieldValue::from("store card")]).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_compile_pattern() {
        let bare = compile_pattern(r"^\d{3}$").unwrap();
        assert!(bare.is_match("123"));

        let delimited = compile_pattern("/^abc$/i").unwrap();
        assert!(delimited.is_match("ABC"));

        let err = compile_pattern("([unclosed").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_username_name_text() {
        assert!(USERNAME_RE.is_match("user_01"));
        assert!(!USERNAME_RE.is_match("user-01"));
        assert!(!USERNAME_RE.is_match("user\u{661}"));
        assert!(NAME_RE.is_match("O'Brien-Smith"));
        assert!(!NAME_RE.is_match("R2D2"));
        assert!(TEXT_RE.is_match("Hello, world - it's fine."));
        assert!(!TEXT_RE.is_match("<script>"));
    }
}

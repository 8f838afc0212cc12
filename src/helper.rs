use url::Url;

/// Escapes HTML special characters so a value can sit inside a hidden form field.
///
/// The input is unescaped first, which makes the function idempotent.
pub fn escape(text: &str) -> String {
    let text = unescape(text);
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Reverses [`escape`].
pub fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Absolute http(s) URL with a host.
pub fn is_valid_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}

/// Loose `local@domain.tld` shape check.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !email.chars().any(char::is_whitespace)
}

/// Finite and strictly positive.
pub fn is_valid_amount(amount: f64) -> bool {
    amount.is_finite() && amount > 0.0
}

/// Three ASCII letters (ISO-4217 shape).
pub fn is_valid_currency(currency: &str) -> bool {
    currency.len() == 3 && currency.chars().all(|c| c.is_ascii_alphabetic())
}

/// Three or four digits.
pub fn is_valid_cvc(cvc: &str) -> bool {
    (3..=4).contains(&cvc.len()) && cvc.chars().all(|c| c.is_ascii_digit())
}

/// Non-empty after trimming. Used for order ids, transaction references and names.
pub fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Renders an amount with two decimals, the form the gateway echoes back.
pub fn format_amount(amount: f64) -> String {
    format!("{amount:.2}")
}

/// Amount in cents, or `None` when it is not finite or carries a fraction of a cent.
pub fn to_cents(amount: f64) -> Option<i64> {
    let scaled = amount * 100.0;
    let cents = scaled.round();
    ((scaled - cents).abs() < 1e-6).then_some(cents as i64)
}

/// Renders a cent count with two decimals.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!("{sign}{}.{:02}", cents / 100, cents % 100)
}

/// Compares dotted numeric versions, returns true when `current >= required`.
///
/// Missing components count as zero; non-numeric components make the check fail.
pub fn version_check(current: &str, required: &str) -> bool {
    fn parts(v: &str) -> Option<Vec<u32>> {
        v.trim().split('.').map(|p| p.parse().ok()).collect()
    }

    let (Some(mut current), Some(mut required)) = (parts(current), parts(required)) else {
        return false;
    };

    let len = current.len().max(required.len());
    current.resize(len, 0);
    required.resize(len, 0);

    current >= required
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_is_idempotent() {
        let once = escape(r#"Tom & Jerry's <"shop">"#);
        assert_eq!(once, "Tom &amp; Jerry&#39;s &lt;&quot;shop&quot;&gt;");
        assert_eq!(escape(&once), once);
        assert_eq!(unescape(&once), r#"Tom & Jerry's <"shop">"#);
    }

    #[test]
    fn escape_leaves_plain_text() {
        assert_eq!(escape("10.00"), "10.00");
        assert_eq!(escape("a-b"), "a-b");
    }

    #[test]
    fn urls() {
        assert!(is_valid_url("https://www.mypos.eu/vmp/checkout"));
        assert!(is_valid_url("http://localhost:8080/notify"));
        assert!(!is_valid_url("ftp://example.com"));
        assert!(!is_valid_url("checkout"));
        assert!(!is_valid_url(""));
    }

    #[test]
    fn emails() {
        assert!(is_valid_email("name@website.com"));
        assert!(!is_valid_email("name@website"));
        assert!(!is_valid_email("@website.com"));
        assert!(!is_valid_email("na me@website.com"));
    }

    #[test]
    fn amounts_and_currency() {
        assert!(is_valid_amount(0.01));
        assert!(!is_valid_amount(0.0));
        assert!(!is_valid_amount(f64::NAN));
        assert_eq!(format_amount(23.4), "23.40");
        assert_eq!(format_amount(3.456), "3.46");
        assert_eq!(to_cents(19.99), Some(1999));
        assert_eq!(to_cents(0.1), Some(10));
        assert_eq!(to_cents(1.005), None);
        assert_eq!(to_cents(f64::INFINITY), None);
        assert_eq!(format_cents(201), "2.01");
        assert_eq!(format_cents(-300), "-3.00");
        assert_eq!(format_cents(5), "0.05");
        assert!(is_valid_currency("EUR"));
        assert!(!is_valid_currency("EU"));
        assert!(!is_valid_currency("E1R"));
    }

    #[test]
    fn versions() {
        assert!(version_check("1.4", "1.4"));
        assert!(version_check("1.4.1", "1.4"));
        assert!(version_check("2", "1.4"));
        assert!(!version_check("1.3", "1.4"));
        assert!(!version_check("1.x", "1.4"));
    }

    #[test]
    fn cvc() {
        assert!(is_valid_cvc("123"));
        assert!(is_valid_cvc("1234"));
        assert!(!is_valid_cvc("12"));
        assert!(!is_valid_cvc("12a"));
    }
}

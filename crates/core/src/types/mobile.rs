//! Mobile number formatting.

/// Country code used when a signup form leaves it blank.
pub const DEFAULT_COUNTRY_CODE: &str = "+91";

/// Join a country code and a local mobile number into the stored form.
///
/// Both parts are trimmed; a blank country code falls back to
/// [`DEFAULT_COUNTRY_CODE`].
///
/// ```
/// use merch_core::format_mobile;
///
/// assert_eq!(format_mobile("+91", "5551234"), "+91 5551234");
/// assert_eq!(format_mobile("", " 5551234 "), "+91 5551234");
/// assert_eq!(format_mobile(" +1 ", "5550100"), "+1 5550100");
/// ```
#[must_use]
pub fn format_mobile(country_code: &str, mobile: &str) -> String {
    let country_code = match country_code.trim() {
        "" => DEFAULT_COUNTRY_CODE,
        code => code,
    };
    format!("{country_code} {}", mobile.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_country_code() {
        assert_eq!(format_mobile("  ", "98765"), "+91 98765");
    }

    #[test]
    fn test_explicit_country_code() {
        assert_eq!(format_mobile("+44", "7700900"), "+44 7700900");
    }
}

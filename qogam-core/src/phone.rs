//! Phone numbers are kept as plain digit strings (`77001234567`): calling code digits followed by
//! the national number, no `+` and no separators. That is the form the backend expects and the
//! form [`crate::session::SessionState::pending_phone`] holds.

/// A selectable country and its calling code.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct CountryCode {
    /// Display name (Russian).
    pub name: String,
    /// Calling code including the leading `+`.
    pub code: String,
    /// Flag emoji.
    pub flag: String,
}

const COUNTRY_CODES: [(&str, &str, &str); 9] = [
    ("Казахстан", "+7", "🇰🇿"),
    ("Россия", "+7", "🇷🇺"),
    ("США", "+1", "🇺🇸"),
    ("Великобритания", "+44", "🇬🇧"),
    ("Германия", "+49", "🇩🇪"),
    ("Франция", "+33", "🇫🇷"),
    ("Турция", "+90", "🇹🇷"),
    ("Узбекистан", "+998", "🇺🇿"),
    ("Кыргызстан", "+996", "🇰🇬"),
];

/// Countries offered on the phone entry screen. Kazakhstan comes first and is the default.
#[uniffi::export]
#[must_use]
pub fn country_codes() -> Vec<CountryCode> {
    COUNTRY_CODES
        .iter()
        .map(|(name, code, flag)| CountryCode {
            name: (*name).to_string(),
            code: (*code).to_string(),
            flag: (*flag).to_string(),
        })
        .collect()
}

/// Strips everything but ASCII digits.
#[uniffi::export]
#[must_use]
pub fn clean_phone_number(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// Groups the digits of a national number for display: `700 123 45 67`.
///
/// Input is cleaned first; anything past the tenth digit is dropped.
#[uniffi::export]
#[must_use]
pub fn format_phone_number(phone: &str) -> String {
    let cleaned = clean_phone_number(phone);
    let digits = &cleaned[..cleaned.len().min(10)];
    let groups: &[usize] = match digits.len() {
        0..=3 => return digits.to_string(),
        4..=6 => &[3],
        7..=8 => &[3, 6],
        _ => &[3, 6, 8],
    };

    let mut formatted = String::with_capacity(digits.len() + groups.len());
    let mut start = 0;
    for &end in groups {
        formatted.push_str(&digits[start..end]);
        formatted.push(' ');
        start = end;
    }
    formatted.push_str(&digits[start..]);
    formatted
}

/// Joins a calling code (`+7`) and a national number (`700 123 45 67`) into the normalized
/// digit form (`77001234567`).
#[uniffi::export]
#[must_use]
pub fn compose_phone(country_code: &str, national_number: &str) -> String {
    let mut phone = clean_phone_number(country_code);
    phone.push_str(&clean_phone_number(national_number));
    phone
}

/// Returns `true` for a non-empty string made only of ASCII digits.
#[must_use]
pub fn is_normalized(phone: &str) -> bool {
    !phone.is_empty() && phone.chars().all(|c| c.is_ascii_digit())
}

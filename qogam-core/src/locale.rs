use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::store::{KeyValueStore, StoreResult, LANGUAGE_KEY};

/// Interface language of the app.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    Serialize,
    Deserialize,
    uniffi::Enum,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Russian; used when nothing else is known.
    #[default]
    Ru,
    /// Kazakh.
    Kk,
    /// English.
    En,
}

/// Code older releases stored for Kazakh.
const LEGACY_KAZAKH: &str = "kz";

impl Locale {
    /// Parses a stored code, accepting the legacy Kazakh code. Unknown codes yield `None`.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        if code.eq_ignore_ascii_case(LEGACY_KAZAKH) {
            return Some(Self::Kk);
        }
        code.to_ascii_lowercase().parse().ok()
    }
}

/// Reads the saved locale.
///
/// The legacy value `kz` is rewritten to `kk` in the store. Absent or unknown values yield
/// [`Locale::Ru`].
///
/// # Errors
/// Returns an error if the store cannot be read, or the migrated value cannot be written.
pub fn load_locale(store: &dyn KeyValueStore) -> StoreResult<Locale> {
    let Some(saved) = store.get(LANGUAGE_KEY.to_string())? else {
        return Ok(Locale::default());
    };

    if saved == LEGACY_KAZAKH {
        store.set(LANGUAGE_KEY.to_string(), Locale::Kk.to_string())?;
        tracing::info!("migrated stored locale from kz to kk");
        return Ok(Locale::Kk);
    }

    Ok(Locale::from_code(&saved).unwrap_or_else(|| {
        tracing::warn!(saved, "unknown stored locale, using default");
        Locale::default()
    }))
}

/// Persists `locale` as the user's choice.
///
/// # Errors
/// Returns an error if the store cannot be written.
pub fn save_locale(store: &dyn KeyValueStore, locale: Locale) -> StoreResult<()> {
    store.set(LANGUAGE_KEY.to_string(), locale.to_string())
}

/// Reads the saved locale from a host store. See [`load_locale`].
///
/// # Errors
/// Same as [`load_locale`].
#[uniffi::export]
#[allow(clippy::needless_pass_by_value)]
pub fn load_locale_from(store: Arc<dyn KeyValueStore>) -> StoreResult<Locale> {
    load_locale(store.as_ref())
}

/// Persists the locale into a host store. See [`save_locale`].
///
/// # Errors
/// Same as [`save_locale`].
#[uniffi::export]
#[allow(clippy::needless_pass_by_value)]
pub fn save_locale_to(store: Arc<dyn KeyValueStore>, locale: Locale) -> StoreResult<()> {
    save_locale(store.as_ref(), locale)
}

/// A per-locale variant of some backend record.
pub trait Translation {
    /// Locale code the variant is written in.
    fn locale(&self) -> &str;
}

/// Finds the variant written in `locale`.
pub fn find_translation<T: Translation>(translations: &[T], locale: Locale) -> Option<&T> {
    translations
        .iter()
        .find(|translation| Locale::from_code(translation.locale()) == Some(locale))
}

/// The translated text when present and non-empty, otherwise the base text.
#[must_use]
pub fn translated_or(translated: Option<&str>, base: &str) -> String {
    translated
        .filter(|text| !text.is_empty())
        .unwrap_or(base)
        .to_string()
}

use serde::{Deserialize, Serialize};

use crate::{
    auth::User,
    error::QogamError,
    locale::{find_translation, translated_or, Locale, Translation},
};

use super::ContentApi;

/// Full profile returned by `GET /user-info`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, uniffi::Record)]
pub struct UserProfile {
    /// Backend identifier.
    pub id: u64,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Primary phone.
    #[serde(default)]
    pub phone: String,
    /// Secondary phone.
    #[serde(default)]
    pub phone_2: Option<String>,
    /// E-mail address.
    #[serde(default)]
    pub email: Option<String>,
    /// Individual identification number.
    #[serde(default)]
    pub iin: Option<String>,
    /// Role identifier.
    #[serde(default)]
    pub role_id: Option<u64>,
    /// Role details.
    #[serde(default)]
    pub role: Option<Role>,
    /// Region identifier.
    #[serde(default)]
    pub region_id: Option<u64>,
    /// District identifier.
    #[serde(default)]
    pub district_id: Option<u64>,
    /// Town or village.
    #[serde(default)]
    pub locality: Option<String>,
    /// Birthday as sent by the backend.
    #[serde(default)]
    pub birthday: Option<String>,
    /// Earned points.
    #[serde(default)]
    pub points: u64,
    /// Account creation timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Certificate issued after finishing the programme.
    #[serde(default)]
    pub certificate: Option<Certificate>,
}

impl From<&UserProfile> for User {
    fn from(profile: &UserProfile) -> Self {
        Self {
            id: profile.id,
            phone: profile.phone.clone(),
            name: profile.name.clone(),
            role_id: profile.role_id,
            created_at: profile.created_at.clone(),
        }
    }
}

/// User role.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, uniffi::Record)]
pub struct Role {
    /// Role identifier.
    pub id: u64,
    /// Name in the backend's default language.
    #[serde(default)]
    pub name: String,
    /// Localized names.
    #[serde(default)]
    pub translations: Vec<RoleTranslation>,
}

impl Role {
    /// Name in `locale`, falling back to the default name.
    #[must_use]
    pub fn localized_name(&self, locale: Locale) -> String {
        let translated = find_translation(&self.translations, locale);
        translated_or(translated.map(|t| t.name.as_str()), &self.name)
    }
}

/// Localized role name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, uniffi::Record)]
pub struct RoleTranslation {
    /// Locale code.
    pub locale: String,
    /// Name.
    #[serde(default)]
    pub name: String,
}

impl Translation for RoleTranslation {
    fn locale(&self) -> &str {
        &self.locale
    }
}

/// A completion certificate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, uniffi::Record)]
pub struct Certificate {
    /// Backend identifier.
    pub id: u64,
    /// Certificate title.
    #[serde(default)]
    pub name: String,
    /// Issue timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Download link.
    #[serde(default)]
    pub url: Option<String>,
    /// Course the certificate was issued for.
    #[serde(default)]
    pub course_name: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Edits submitted from the profile screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, uniffi::Record)]
pub struct ProfileUpdate {
    /// Display name; required.
    pub name: String,
    /// E-mail address; blank clears it.
    pub email: Option<String>,
    /// Individual identification number; blank clears it.
    pub iin: Option<String>,
    /// Region identifier.
    pub region_id: Option<u64>,
    /// District identifier.
    pub district_id: Option<u64>,
    /// Town or village; blank clears it.
    pub locality: Option<String>,
    /// Birthday; blank clears it.
    pub birthday: Option<String>,
    /// New password; blank keeps the current one.
    pub password: Option<String>,
    /// Must repeat `password` when one is given.
    pub password_confirmation: Option<String>,
}

impl ProfileUpdate {
    /// Checks the edit before it is sent.
    ///
    /// # Errors
    /// Returns [`QogamError::InvalidInput`] if the trimmed name is empty, or a new password is
    /// given and its confirmation differs.
    pub fn validate(&self) -> Result<(), QogamError> {
        if self.name.trim().is_empty() {
            return Err(QogamError::InvalidInput {
                attribute: "name".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if let Some(password) = self.new_password() {
            if self.password_confirmation.as_deref() != Some(password) {
                return Err(QogamError::InvalidInput {
                    attribute: "password_confirmation".to_string(),
                    reason: "does not match password".to_string(),
                });
            }
        }
        Ok(())
    }

    fn new_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|password| !password.is_empty())
    }

    fn to_body(&self) -> UpdateProfileBody<'_> {
        let password = self.new_password();
        UpdateProfileBody {
            name: self.name.trim(),
            email: trimmed(self.email.as_deref()),
            iin: trimmed(self.iin.as_deref()),
            region_id: self.region_id,
            district_id: self.district_id,
            locality: trimmed(self.locality.as_deref()),
            birthday: trimmed(self.birthday.as_deref()),
            password: password.unwrap_or_default(),
            password_confirmation: password.and(self.password_confirmation.as_deref()),
        }
    }
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[derive(Debug, Serialize)]
struct UpdateProfileBody<'a> {
    name: &'a str,
    email: Option<&'a str>,
    iin: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    region_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    district_id: Option<u64>,
    locality: Option<&'a str>,
    birthday: Option<&'a str>,
    password: &'a str,
    password_confirmation: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct UpdateProfileResponse {
    success: Option<bool>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApplicationData {
    #[serde(default)]
    certificate: Option<Certificate>,
}

#[uniffi::export(async_runtime = "tokio")]
impl ContentApi {
    /// Fetches the profile of the token's user.
    ///
    /// # Errors
    /// [`QogamError::Unauthenticated`] without a token; otherwise request failures.
    pub async fn user_info(&self) -> Result<UserProfile, QogamError> {
        self.require_token()?;
        self.get_json("user-info", "Failed to fetch user info").await
    }

    /// Saves profile edits for user `user_id`. The edit is validated locally first.
    ///
    /// # Errors
    /// [`QogamError::InvalidInput`] for invalid edits (nothing is sent),
    /// [`QogamError::Unauthenticated`] without a token, [`QogamError::Rejected`] when the
    /// backend reports `success: false`; otherwise request failures.
    pub async fn update_user_info(
        &self,
        user_id: u64,
        update: ProfileUpdate,
    ) -> Result<(), QogamError> {
        update.validate()?;
        self.require_token()?;

        let body: UpdateProfileResponse = self
            .post_json(
                &format!("personal/account/update/{user_id}"),
                Some(&update.to_body()),
                "Failed to update user info",
            )
            .await?;
        if body.success == Some(false) {
            return Err(QogamError::Rejected {
                message: body
                    .message
                    .unwrap_or_else(|| "Failed to update user info".to_string()),
            });
        }
        tracing::info!(user_id, "profile updated");
        Ok(())
    }

    /// Certificates of the token's user. The backend issues at most one.
    ///
    /// # Errors
    /// [`QogamError::Unauthenticated`] without a token; otherwise request failures.
    pub async fn certificates(&self) -> Result<Vec<Certificate>, QogamError> {
        self.require_token()?;
        let data: ApplicationData = self
            .get_json("my-application-data", "Failed to fetch certificates")
            .await?;
        Ok(data.certificate.into_iter().collect())
    }
}

use serde::Deserialize;

use crate::{
    error::QogamError,
    locale::{find_translation, translated_or, Locale, Translation},
};

use super::{ContentApi, LessonSummary};

/// A lesson with everything the lesson screen shows.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct Lesson {
    /// Backend identifier.
    pub id: u64,
    /// Title in the backend's default language.
    pub title: String,
    /// Description in the backend's default language.
    pub description: String,
    /// Video link.
    pub video: String,
    /// Owning course.
    pub course_id: Option<u64>,
    /// Whether the user marked the lesson as a favourite.
    pub favourite: bool,
    /// Localized variants.
    pub translations: Vec<LessonTranslation>,
    /// The lesson to continue with.
    pub next_lesson: Option<LessonSummary>,
    /// Every lesson of the owning course, in order.
    pub course_lessons: Vec<LessonSummary>,
    /// Attached materials.
    pub materials: Vec<Material>,
}

impl Lesson {
    /// Copy with title, description and video resolved for `locale`.
    #[must_use]
    pub fn localized(&self, locale: Locale) -> Self {
        let translation = find_translation(&self.translations, locale);
        Self {
            title: translated_or(translation.map(|t| t.title.as_str()), &self.title),
            description: translated_or(
                translation.map(|t| t.description.as_str()),
                &self.description,
            ),
            video: translated_or(translation.map(|t| t.video.as_str()), &self.video),
            ..self.clone()
        }
    }
}

/// Localized variant of a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, uniffi::Record)]
pub struct LessonTranslation {
    /// Locale code.
    pub locale: String,
    /// Title.
    #[serde(default)]
    pub title: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Video link.
    #[serde(default)]
    pub video: String,
}

impl Translation for LessonTranslation {
    fn locale(&self) -> &str {
        &self.locale
    }
}

/// A downloadable attachment of a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, uniffi::Record)]
pub struct Material {
    /// Backend identifier.
    pub id: u64,
    /// Owning lesson.
    #[serde(default)]
    pub lesson_id: Option<u64>,
    /// Locale the material is written in.
    #[serde(default)]
    pub locale: Option<String>,
    /// Title.
    #[serde(default)]
    pub title: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// File path; newer uploads keep it here.
    #[serde(default)]
    pub content: Option<String>,
    /// Absolute or site-relative file URL.
    #[serde(default)]
    pub file_url: Option<String>,
    /// MIME type or extension.
    #[serde(default)]
    pub file_type: Option<String>,
    /// Storage path.
    #[serde(default)]
    pub file_path: Option<String>,
    /// Upload timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Material {
    /// Where the file lives: the first non-empty of `content`, `file_url`, `file_path`.
    #[must_use]
    pub fn file_location(&self) -> Option<&str> {
        [&self.content, &self.file_url, &self.file_path]
            .into_iter()
            .filter_map(Option::as_deref)
            .find(|location| !location.is_empty())
    }
}

/// Answer of `POST /lessons/{id}/complete`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, uniffi::Record)]
pub struct LessonCompletion {
    /// Whether the lesson is now recorded as completed.
    #[serde(default)]
    pub status: bool,
    /// Backend message.
    #[serde(default)]
    pub message: String,
}

/// Resolves the lesson's text for `locale`. See [`Lesson::localized`].
#[uniffi::export]
#[must_use]
#[allow(clippy::needless_pass_by_value)]
pub fn localized_lesson(lesson: Lesson, locale: Locale) -> Lesson {
    lesson.localized(locale)
}

#[derive(Debug, Deserialize)]
struct LessonEnvelope {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lesson: Option<RawLesson>,
}

#[derive(Debug, Deserialize)]
struct RawLesson {
    id: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    video: String,
    #[serde(default)]
    course_id: Option<u64>,
    #[serde(default)]
    favourite: Option<u8>,
    #[serde(default)]
    translations: Vec<LessonTranslation>,
    #[serde(default)]
    next_lesson: Option<LessonSummary>,
    #[serde(default)]
    course: Option<RawCourse>,
    #[serde(default)]
    materials: Vec<Material>,
}

#[derive(Debug, Deserialize)]
struct RawCourse {
    #[serde(default)]
    lessons: Vec<LessonSummary>,
}

impl From<RawLesson> for Lesson {
    fn from(raw: RawLesson) -> Self {
        Self {
            id: raw.id,
            title: raw.title,
            description: raw.description,
            video: raw.video,
            course_id: raw.course_id,
            favourite: raw.favourite.unwrap_or_default() != 0,
            translations: raw.translations,
            next_lesson: raw.next_lesson,
            course_lessons: raw.course.map(|course| course.lessons).unwrap_or_default(),
            materials: raw.materials,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MaterialsResponse {
    #[serde(default = "default_status")]
    status: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Vec<Material>>,
}

const fn default_status() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct AvailabilityResponse {
    #[serde(default)]
    status: bool,
}

#[uniffi::export(async_runtime = "tokio")]
impl ContentApi {
    /// One lesson with its translations, next lesson, sibling lessons and materials.
    ///
    /// # Errors
    /// [`QogamError::Unauthenticated`] without a token, [`QogamError::Rejected`] when the
    /// response has no lesson; otherwise request failures.
    pub async fn lesson(&self, lesson_id: u64) -> Result<Lesson, QogamError> {
        self.require_token()?;
        let envelope: LessonEnvelope = self
            .get_json(&format!("client/lesson/{lesson_id}"), "Failed to fetch lesson")
            .await?;
        envelope.lesson.map(Lesson::from).ok_or_else(|| QogamError::Rejected {
            message: envelope
                .message
                .unwrap_or_else(|| "Lesson not found".to_string()),
        })
    }

    /// Materials attached to a lesson.
    ///
    /// # Errors
    /// [`QogamError::Unauthenticated`] without a token, [`QogamError::Rejected`] when the
    /// backend reports `status: false`; otherwise request failures.
    pub async fn materials(&self, lesson_id: u64) -> Result<Vec<Material>, QogamError> {
        self.require_token()?;
        let body: MaterialsResponse = self
            .get_json(&format!("materials/{lesson_id}"), "Failed to fetch materials")
            .await?;
        if !body.status {
            return Err(QogamError::Rejected {
                message: body
                    .message
                    .unwrap_or_else(|| "Failed to fetch materials".to_string()),
            });
        }
        Ok(body.data.unwrap_or_default())
    }

    /// Whether the user may open `lesson_id` of `course_id` (earlier lessons completed).
    ///
    /// # Errors
    /// [`QogamError::Unauthenticated`] without a token; otherwise request failures.
    pub async fn check_availability(
        &self,
        lesson_id: u64,
        course_id: u64,
    ) -> Result<bool, QogamError> {
        self.require_token()?;
        let body: AvailabilityResponse = self
            .get_json(
                &format!("client/check-available/lesson/{lesson_id}/{course_id}"),
                "Failed to check availability",
            )
            .await?;
        Ok(body.status)
    }

    /// Records the lesson as completed. Sent once, never retried.
    ///
    /// # Errors
    /// [`QogamError::Unauthenticated`] without a token; otherwise request failures.
    pub async fn complete_lesson(&self, lesson_id: u64) -> Result<LessonCompletion, QogamError> {
        self.require_token()?;
        let completion: LessonCompletion = self
            .post_json::<(), _>(
                &format!("lessons/{lesson_id}/complete"),
                None,
                "Failed to complete lesson",
            )
            .await?;
        tracing::info!(lesson_id, status = completion.status, "lesson completion sent");
        Ok(completion)
    }

    /// Absolute URL of a material's file, resolving site-relative paths against the backend.
    #[must_use]
    #[allow(clippy::needless_pass_by_value)]
    pub fn material_url(&self, material: Material) -> Option<String> {
        let location = material.file_location()?;
        if location.starts_with("http") {
            return Some(location.to_string());
        }
        let separator = if location.starts_with('/') { "" } else { "/" };
        Some(format!("{}{separator}{location}", self.site_origin()))
    }
}

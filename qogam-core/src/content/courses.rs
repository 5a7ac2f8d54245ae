use serde::Deserialize;

use crate::{
    error::QogamError,
    locale::{find_translation, translated_or, Locale, Translation},
};

use super::ContentApi;

/// A course of the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, uniffi::Record)]
pub struct Course {
    /// Backend identifier.
    pub id: u64,
    /// Title in the backend's default language.
    #[serde(default)]
    pub title: String,
    /// Description in the backend's default language.
    #[serde(default)]
    pub description: String,
    /// Cover image.
    #[serde(default)]
    pub img: String,
    /// Number of lessons.
    #[serde(default)]
    pub lessons_count: u32,
    /// Localized variants.
    #[serde(default)]
    pub translations: Vec<CourseTranslation>,
    /// Lessons in order. Only filled by the single-course endpoint.
    #[serde(default)]
    pub lessons: Vec<LessonSummary>,
}

impl Course {
    /// Copy with title, description and image resolved for `locale`.
    #[must_use]
    pub fn localized(&self, locale: Locale) -> Self {
        let translation = find_translation(&self.translations, locale);
        Self {
            title: translated_or(translation.map(|t| t.title.as_str()), &self.title),
            description: translated_or(
                translation.map(|t| t.description.as_str()),
                &self.description,
            ),
            img: translated_or(translation.map(|t| t.img.as_str()), &self.img),
            ..self.clone()
        }
    }
}

/// Localized variant of a course.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, uniffi::Record)]
pub struct CourseTranslation {
    /// Locale code.
    pub locale: String,
    /// Title.
    #[serde(default)]
    pub title: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Cover image.
    #[serde(default)]
    pub img: String,
}

impl Translation for CourseTranslation {
    fn locale(&self) -> &str {
        &self.locale
    }
}

/// A lesson as listed inside a course or as the next lesson.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, uniffi::Record)]
pub struct LessonSummary {
    /// Backend identifier.
    pub id: u64,
    /// Title.
    #[serde(default)]
    pub title: String,
    /// Short description.
    #[serde(default)]
    pub description: String,
    /// Video link.
    #[serde(default)]
    pub video: String,
    /// Owning course.
    #[serde(default)]
    pub course_id: Option<u64>,
}

/// Resolves the course's text for `locale`. See [`Course::localized`].
#[uniffi::export]
#[must_use]
#[allow(clippy::needless_pass_by_value)]
pub fn localized_course(course: Course, locale: Locale) -> Course {
    course.localized(locale)
}

#[uniffi::export(async_runtime = "tokio")]
impl ContentApi {
    /// The public course catalogue.
    ///
    /// # Errors
    /// Request failures.
    pub async fn courses(&self) -> Result<Vec<Course>, QogamError> {
        self.get_json("public/courses", "Failed to fetch courses")
            .await
    }

    /// One course with its lessons.
    ///
    /// # Errors
    /// Request failures.
    pub async fn course(&self, course_id: u64) -> Result<Course, QogamError> {
        self.get_json(&format!("public/courses/{course_id}"), "Failed to fetch course")
            .await
    }
}

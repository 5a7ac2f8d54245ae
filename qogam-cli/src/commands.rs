use eyre::bail;
use qogam_core::{
    auth::AuthFlow,
    locale::{load_locale, save_locale, Locale},
    session::{RequestCodeOutcome, SessionController, SessionState, SessionUpdate, SubmitCodeOutcome},
};

use crate::{cli::Command, file_store::FileKeyValueStore};

pub async fn run(
    command: Command,
    controller: &SessionController,
    store: &FileKeyValueStore,
) -> eyre::Result<()> {
    match command {
        Command::RequestCode { phone } => request_code(controller, &phone).await,
        Command::Confirm { code } => confirm(controller, &code).await,
        Command::Status => {
            print_status(&controller.state(), store);
            Ok(())
        }
        Command::Logout => {
            controller.logout();
            println!("Logged out.");
            Ok(())
        }
        Command::Courses => courses(controller, load_locale(store)?).await,
        Command::Course { id } => course(controller, id, load_locale(store)?).await,
        Command::Lesson { id } => lesson(controller, id, load_locale(store)?).await,
        Command::CompleteLesson { id } => {
            let completion = controller.content_api().complete_lesson(id).await?;
            println!("{} ({})", completion.message, completion.status);
            Ok(())
        }
        Command::Profile => profile(controller, load_locale(store)?).await,
        Command::Certificates => certificates(controller).await,
        Command::Locale { set } => locale(store, set.as_deref()),
    }
}

async fn request_code(controller: &SessionController, phone: &str) -> eyre::Result<()> {
    controller.update(SessionUpdate {
        pending_phone: Some(phone.to_string()),
        otp_digits: None,
    });

    match controller.request_code().await {
        RequestCodeOutcome::CodeSent { flow } => {
            let state = controller.state();
            println!(
                "Code sent to +{} ({}). Resend possible in {}s.",
                state.pending_phone,
                flow_label(flow),
                state.resend_countdown
            );
            Ok(())
        }
        RequestCodeOutcome::Ignored { reason } => bail!("code not requested: {reason:?}"),
        RequestCodeOutcome::Failed { message } => bail!("code not sent: {message}"),
        RequestCodeOutcome::Cancelled => bail!("cancelled"),
    }
}

async fn confirm(controller: &SessionController, code: &str) -> eyre::Result<()> {
    controller.update(SessionUpdate {
        pending_phone: None,
        otp_digits: Some(code.chars().map(String::from).collect()),
    });

    match controller.submit_code().await {
        SubmitCodeOutcome::Authenticated { flow } => {
            if flow == AuthFlow::Registration {
                // Registration returns a token only; fetch the new user.
                controller.refresh_user().await?;
            }
            let state = controller.state();
            match &state.user {
                Some(user) => println!("Logged in as {} (id {}).", user.name, user.id),
                None => println!("Logged in."),
            }
            Ok(())
        }
        SubmitCodeOutcome::Ignored { reason } => bail!("code not submitted: {reason:?}"),
        SubmitCodeOutcome::Failed { message } => bail!("verification failed: {message}"),
        SubmitCodeOutcome::Cancelled => bail!("cancelled"),
    }
}

fn print_status(state: &SessionState, store: &FileKeyValueStore) {
    println!("session file: {}", store.path().display());
    println!("phase:        {:?}", state.phase);
    if !state.pending_phone.is_empty() {
        println!("phone:        +{}", state.pending_phone);
    }
    if let Some(user) = &state.user {
        println!("user:         {} (id {})", user.name, user.id);
    }
    println!("token:        {}", if state.token.is_some() { "present" } else { "none" });
}

async fn courses(controller: &SessionController, locale: Locale) -> eyre::Result<()> {
    for course in controller.content_api().courses().await? {
        let course = course.localized(locale);
        println!("{:>4}  {} ({} lessons)", course.id, course.title, course.lessons_count);
    }
    Ok(())
}

async fn course(controller: &SessionController, id: u64, locale: Locale) -> eyre::Result<()> {
    let course = controller.content_api().course(id).await?.localized(locale);
    println!("{}\n{}\n", course.title, course.description);
    for (index, lesson) in course.lessons.iter().enumerate() {
        println!("{:>3}. {} [lesson {}]", index + 1, lesson.title, lesson.id);
    }
    Ok(())
}

async fn lesson(controller: &SessionController, id: u64, locale: Locale) -> eyre::Result<()> {
    let api = controller.content_api();
    let lesson = api.lesson(id).await?.localized(locale);

    println!("{}\n{}\nvideo: {}", lesson.title, lesson.description, lesson.video);
    if let Some(course_id) = lesson.course_id {
        let available = api.check_availability(id, course_id).await?;
        println!("available: {available}");
    }
    for material in &lesson.materials {
        let url = api.material_url(material.clone());
        println!("  - {}: {}", material.title, url.as_deref().unwrap_or("no file"));
    }
    if let Some(next) = &lesson.next_lesson {
        println!("next: {} [lesson {}]", next.title, next.id);
    }
    Ok(())
}

async fn profile(controller: &SessionController, locale: Locale) -> eyre::Result<()> {
    let profile = controller.content_api().user_info().await?;
    println!("{} (id {})", profile.name, profile.id);
    println!("phone:  +{}", profile.phone);
    if let Some(email) = &profile.email {
        println!("email:  {email}");
    }
    if let Some(role) = &profile.role {
        println!("role:   {}", role.localized_name(locale));
    }
    println!("points: {}", profile.points);
    Ok(())
}

async fn certificates(controller: &SessionController) -> eyre::Result<()> {
    let certificates = controller.content_api().certificates().await?;
    if certificates.is_empty() {
        println!("No certificates yet.");
    }
    for certificate in certificates {
        println!(
            "{} {}",
            certificate.name,
            certificate.url.as_deref().unwrap_or_default()
        );
    }
    Ok(())
}

fn locale(store: &FileKeyValueStore, set: Option<&str>) -> eyre::Result<()> {
    if let Some(code) = set {
        let Some(locale) = Locale::from_code(code) else {
            bail!("unsupported language {code:?}; use ru, kk or en");
        };
        save_locale(store, locale)?;
    }
    println!("{}", load_locale(store)?);
    Ok(())
}

const fn flow_label(flow: AuthFlow) -> &'static str {
    match flow {
        AuthFlow::Login => "existing account",
        AuthFlow::Registration => "new account",
    }
}

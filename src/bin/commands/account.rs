use super::utils::read_image;
use dialoguer::{Input, Password};
use playlist_client::{AppServices, LoginForm, RegistrationForm, SessionPersistence};
use std::path::Path;

pub async fn handle_login(
    services: &AppServices,
    email: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let email = match email {
        Some(email) => email,
        None => Input::<String>::new().with_prompt("E-mail").interact_text()?,
    };
    let password = Password::new().with_prompt("Password").interact()?;

    println!("🔐 Signing in as {email}...");
    let session = services.login(&LoginForm::new(&email, &password)).await?;

    if let Err(e) = SessionPersistence::save_session(&session) {
        println!("⚠️  Warning: Failed to save session: {e}");
        println!("   (You'll need to login again next time)");
    } else {
        println!("💾 Session saved");
    }

    println!("✅ Signed in as {}", session.email);
    Ok(())
}

pub fn handle_logout(services: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    SessionPersistence::remove_session()?;
    services.sign_out();
    println!("👋 Signed out");
    Ok(())
}

pub async fn handle_register(
    services: &AppServices,
    email: &str,
    name: &str,
    bio: &str,
    photo: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()?;

    let mut form = RegistrationForm::new(email, &password, name).with_bio(bio);
    if let Some(path) = photo {
        println!("📷 Uploading {}...", path.display());
        form = form.with_photo(read_image(path)?);
    }

    let session = services.register(&form).await?;
    if let Err(e) = SessionPersistence::save_session(&session) {
        println!("⚠️  Warning: Failed to save session: {e}");
    }

    println!("✅ Account created for {}", session.email);
    Ok(())
}

pub async fn handle_reset_password(
    services: &AppServices,
    email: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    services.request_password_reset(email).await?;
    println!("📧 A password reset link was sent to {email}");
    Ok(())
}

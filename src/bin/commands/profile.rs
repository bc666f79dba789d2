use super::utils::read_image;
use playlist_client::{AppServices, UserProfile};
use std::path::Path;

fn print_profile(profile: &UserProfile) {
    println!("👤 {}", profile.name);
    if !profile.bio.is_empty() {
        println!("   {}", profile.bio);
    }
    match &profile.photo {
        Some(url) => println!("   📷 {url}"),
        None => println!("   📷 (no photo)"),
    }
}

pub async fn handle_show(services: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let mut screen = services.profile_screen();
    match screen.load().await? {
        Some(profile) => print_profile(profile),
        None => println!("❓ User not found. Are you logged in?"),
    }
    Ok(())
}

pub async fn handle_edit(
    services: &AppServices,
    name: Option<&str>,
    bio: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    if name.is_none() && bio.is_none() {
        return Err("Nothing to change: pass --name and/or --bio".into());
    }

    let mut screen = services.profile_screen();
    if screen.load().await?.is_none() {
        return Err("User not found. Are you logged in?".into());
    }

    screen.begin_edit();
    if let Some(name) = name {
        screen.set_draft_name(name);
    }
    if let Some(bio) = bio {
        screen.set_draft_bio(bio);
    }

    let profile = screen.save().await?;
    println!("✅ Profile updated");
    print_profile(profile);
    Ok(())
}

pub async fn handle_photo(
    services: &AppServices,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let image = read_image(path)?;
    let mut screen = services.profile_screen();
    screen.load().await?;

    println!("📷 Uploading {}...", path.display());
    let profile = screen.replace_photo(&image).await?;
    println!("✅ Profile picture replaced");
    print_profile(profile);
    Ok(())
}

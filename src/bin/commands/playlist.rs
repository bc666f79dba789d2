use super::utils::{print_entries, report_outcome};
use dialoguer::Confirm;
use playlist_client::{AppServices, DeleteChoice, EntryId, TrackField, TrackFields};

pub async fn handle_list(services: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let mut screen = services.playlist_screen();
    let entries = screen.fetch_all().await?;
    print_entries(entries);
    Ok(())
}

pub async fn handle_add(
    services: &AppServices,
    title: &str,
    performer: &str,
    label: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut screen = services.playlist_screen();

    println!("➕ Adding '{title}' by '{performer}'");
    let outcome = screen
        .submit_create(TrackFields::new(title, performer, label))
        .await?;

    println!("✅ Entry added");
    report_outcome(&outcome, screen.entries());
    Ok(())
}

pub async fn handle_update(
    services: &AppServices,
    id: &str,
    title: Option<&str>,
    performer: Option<&str>,
    label: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let id = EntryId::new(id);
    let mut screen = services.playlist_screen();
    screen.fetch_all().await?;

    let entry = screen
        .entry(&id)
        .cloned()
        .ok_or_else(|| format!("No entry with id {id}"))?;
    screen.begin_edit(&entry);

    for (field, value) in [
        (TrackField::Title, title),
        (TrackField::Performer, performer),
        (TrackField::Label, label),
    ] {
        if let Some(value) = value {
            screen.set_field(field, value);
        }
    }

    println!("✏️  Updating entry {id}");
    let outcome = screen.submit().await?;

    println!("✅ Entry updated");
    report_outcome(&outcome, screen.entries());
    Ok(())
}

pub async fn handle_delete(
    services: &AppServices,
    id: &str,
    skip_confirmation: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let id = EntryId::new(id);
    let mut screen = services.playlist_screen();

    let prompt = |entry: &EntryId| {
        if skip_confirmation {
            return DeleteChoice::Confirm;
        }
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete entry {entry}?"))
            .default(false)
            .interact()
            .unwrap_or(false);
        if confirmed {
            DeleteChoice::Confirm
        } else {
            DeleteChoice::Cancel
        }
    };

    let outcome = screen.submit_delete(&id, &prompt).await?;
    if outcome.is_applied() {
        println!("🗑️  Entry {id} deleted");
    }
    report_outcome(&outcome, screen.entries());
    Ok(())
}

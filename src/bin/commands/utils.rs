use playlist_client::{AppServices, MutationOutcome, PlaylistError, SessionPersistence, TrackEntry};
use std::path::Path;

/// Install the saved session, if there is a usable one.
///
/// Expired or unreadable session files are removed so the next run starts clean.
pub fn restore_saved_session(services: &AppServices, verbose: bool) {
    if !SessionPersistence::session_exists() {
        return;
    }

    match SessionPersistence::load_session() {
        Ok(session) => {
            let email = session.email.clone();
            if services.restore_session(session) {
                if verbose {
                    println!("📥 Restored session for {email}");
                }
            } else {
                println!("⌛ Saved session for {email} has expired, please log in again");
                let _ = SessionPersistence::remove_session();
            }
        }
        Err(e) => {
            println!("❌ Failed to load session: {e}");
            let _ = SessionPersistence::remove_session();
        }
    }
}

pub fn read_image(path: &Path) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    Ok(std::fs::read(path).map_err(PlaylistError::from)?)
}

pub fn print_entry(entry: &TrackEntry) {
    println!(
        "  [{}] {} - {} ({})",
        entry.id, entry.title, entry.performer, entry.label
    );
}

pub fn print_entries(entries: &[TrackEntry]) {
    if entries.is_empty() {
        println!("📭 The playlist is empty");
        return;
    }

    println!("🎵 {} entries:", entries.len());
    for entry in entries {
        print_entry(entry);
    }
}

/// Report what happened after a mutation was accepted or declined.
pub fn report_outcome(outcome: &MutationOutcome, entries: &[TrackEntry]) {
    match outcome {
        MutationOutcome::Refreshed => print_entries(entries),
        MutationOutcome::RefreshFailed(e) => {
            println!("⚠️  Change saved, but reloading the playlist failed: {e}");
        }
        MutationOutcome::Cancelled => println!("↩️  Nothing changed"),
    }
}

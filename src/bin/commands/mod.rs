pub mod account;
pub mod playlist;
pub mod profile;
pub mod utils;

use clap::Subcommand;
use playlist_client::AppServices;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show the signed-in user's profile
    Show,

    /// Change name and/or bio
    ///
    /// Usage examples:
    /// # Change only the bio
    /// playlist profile edit --bio "Samba and choro"
    Edit {
        /// New display name
        #[arg(long)]
        name: Option<String>,

        /// New bio
        #[arg(long)]
        bio: Option<String>,
    },

    /// Upload a new profile picture (JPEG)
    Photo {
        /// Path to the image file
        path: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every entry in the playlist
    List,

    /// Add an entry to the playlist
    ///
    /// Usage examples:
    /// playlist add "Aquarela" "Toquinho" "Ariola"
    Add {
        /// Song title
        title: String,
        /// Performing artist
        performer: String,
        /// Record label
        label: String,
    },

    /// Update an existing entry; fields not given keep their current value
    ///
    /// Usage examples:
    /// # Fix the label of entry 3
    /// playlist update 3 --label "Philips"
    Update {
        /// Id of the entry to update
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        performer: Option<String>,

        #[arg(long)]
        label: Option<String>,
    },

    /// Delete an entry from the playlist
    ///
    /// Asks for confirmation unless --yes is given.
    Delete {
        /// Id of the entry to delete
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Sign in and remember the session
    Login {
        /// E-mail address (prompted when omitted)
        #[arg(long)]
        email: Option<String>,
    },

    /// Forget the saved session
    Logout,

    /// Create an account with a profile
    ///
    /// Usage examples:
    /// playlist register --email ana@example.com --name "Ana" --photo ./me.jpg
    Register {
        #[arg(long)]
        email: String,

        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        bio: String,

        /// Optional profile picture (JPEG)
        #[arg(long)]
        photo: Option<PathBuf>,
    },

    /// E-mail a password reset link
    ResetPassword {
        email: String,
    },

    /// Show or change the signed-in user's profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
}

/// Execute the appropriate command handler based on the parsed command
pub async fn execute_command(
    command: Commands,
    services: &AppServices,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::List => playlist::handle_list(services).await,
        Commands::Add {
            title,
            performer,
            label,
        } => playlist::handle_add(services, &title, &performer, &label).await,
        Commands::Update {
            id,
            title,
            performer,
            label,
        } => {
            playlist::handle_update(
                services,
                &id,
                title.as_deref(),
                performer.as_deref(),
                label.as_deref(),
            )
            .await
        }
        Commands::Delete { id, yes } => playlist::handle_delete(services, &id, yes).await,

        Commands::Login { email } => account::handle_login(services, email).await,
        Commands::Logout => account::handle_logout(services),
        Commands::Register {
            email,
            name,
            bio,
            photo,
        } => account::handle_register(services, &email, &name, &bio, photo.as_deref()).await,
        Commands::ResetPassword { email } => account::handle_reset_password(services, &email).await,

        Commands::Profile { command } => match command {
            ProfileCommands::Show => profile::handle_show(services).await,
            ProfileCommands::Edit { name, bio } => {
                profile::handle_edit(services, name.as_deref(), bio.as_deref()).await
            }
            ProfileCommands::Photo { path } => profile::handle_photo(services, &path).await,
        },
    }
}

use anyhow::{Context, Result};
use chrono::Utc;
use std::{fs, sync::Arc};
use tracing_subscriber::EnvFilter;

use holidaze::{
    config::{AppConfig, Command, ManageCommand, NewVenueArgs, VenueUpdateArgs},
    errors::AppError,
    handlers::{
        AppState, booking_handlers, session_handlers,
        venue_handlers::{self, VenueChanges},
    },
    models::{
        profile::{Credentials, Registration},
        venue::VenueMeta,
    },
    services::{
        api_service::HolidazeClient,
        availability_service::AvailabilityChecker,
        storage_service::{FileStorage, LocalStorage, MemoryStorage},
        validation_service::VenueForm,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup (stderr, so command output stays clean) ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // --- Parse config + command ---
    let (cfg, command) = AppConfig::from_env_and_args()?;
    tracing::debug!("Starting holidaze with config: {:?}", cfg);

    // --- Session storage ---
    let storage: Arc<dyn LocalStorage> = if cfg.ephemeral {
        Arc::new(MemoryStorage::new())
    } else {
        if !cfg.storage_dir.exists() {
            fs::create_dir_all(&cfg.storage_dir).with_context(|| {
                format!("creating storage directory {}", cfg.storage_dir.display())
            })?;
            tracing::info!("Created storage directory at {}", cfg.storage_dir.display());
        }
        Arc::new(FileStorage::new(cfg.storage_dir.clone()))
    };

    // --- API client + state ---
    let client = HolidazeClient::new(
        cfg.api_base.clone(),
        cfg.api_key.clone(),
        cfg.request_timeout(),
    )
    .context("building HTTP client")?;
    let state = AppState::new(
        Arc::new(client),
        storage,
        AvailabilityChecker::new(cfg.date_policy()),
        cfg.search_debounce(),
    );

    match dispatch(&state, command).await {
        Ok(output) => {
            println!("{output}");
            Ok(())
        }
        Err(err) => {
            tracing::debug!(kind = ?err.kind, "command failed");
            eprintln!("error: {err}");
            std::process::exit(err.exit_code());
        }
    }
}

async fn dispatch(state: &AppState, command: Command) -> Result<String, AppError> {
    match command {
        Command::Venues { query } => venue_handlers::list_venues(state, query.as_deref()).await,
        Command::Venue { id } => venue_handlers::show_venue(state, &id).await,
        Command::Login {
            email,
            password,
            from,
        } => {
            session_handlers::login(state, Credentials { email, password }, from.as_deref()).await
        }
        Command::Register {
            name,
            email,
            password,
            venue_manager,
            from,
        } => {
            let registration = Registration {
                name,
                email,
                password,
                venue_manager,
            };
            session_handlers::register(state, registration, from.as_deref()).await
        }
        Command::Logout => Ok(session_handlers::logout(state)),
        Command::Whoami => Ok(session_handlers::whoami(state)),
        Command::Profile => session_handlers::my_bookings(state, Utc::now()).await,
        Command::Avatar { url, alt } => session_handlers::update_avatar(state, url, alt).await,
        Command::Book {
            venue_id,
            from,
            to,
            guests,
        } => booking_handlers::book_venue(state, &venue_id, &from, &to, guests).await,
        Command::Manage(manage) => match manage {
            ManageCommand::Venues => venue_handlers::managed_venues(state).await,
            ManageCommand::Create(args) => {
                venue_handlers::create_venue(state, new_venue_form(args)).await
            }
            ManageCommand::Update(args) => {
                let id = args.id.clone();
                venue_handlers::update_venue(state, &id, venue_changes(args)).await
            }
            ManageCommand::Delete { id } => venue_handlers::delete_venue(state, &id).await,
            ManageCommand::Bookings { id } => venue_handlers::venue_bookings(state, &id).await,
        },
    }
}

fn new_venue_form(args: NewVenueArgs) -> VenueForm {
    VenueForm {
        name: args.name,
        description: args.description,
        price: args.price,
        max_guests: args.max_guests,
        media_urls: args.media,
        city: args.city,
        country: args.country,
        meta: VenueMeta {
            wifi: args.wifi,
            parking: args.parking,
            breakfast: args.breakfast,
            pets: args.pets,
        },
    }
}

fn venue_changes(args: VenueUpdateArgs) -> VenueChanges {
    VenueChanges {
        name: args.name,
        description: args.description,
        price: args.price,
        max_guests: args.max_guests,
        media_urls: args.media,
        city: args.city,
        country: args.country,
        wifi: args.wifi,
        parking: args.parking,
        breakfast: args.breakfast,
        pets: args.pets,
    }
}

//! CLI commands

use anyhow::{Result, anyhow, bail};
use chrono::NaiveDate;
use clap::Subcommand;
use solara_core::rewards::{self, ClaimOutcome, STANDARD_TIERS};
use solara_core::{CredentialStore, FileStorage, SessionUser};
use solara_http::ApiClient;
use solara_http::types::{Event, RegisterRequest};
use solara_session::{AttendOutcome, SessionEvent, SessionManager, user_friendly_error};
use std::path::Path;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::config::Settings;

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and keep the session for later commands
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "SOLARA_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in customer
    Whoami,

    /// Create a customer account
    Register {
        #[arg(long)]
        cedula: String,

        #[arg(long)]
        nombre: String,

        #[arg(long)]
        apellido: String,

        #[arg(long)]
        telefono: String,

        #[arg(long)]
        email: String,

        #[arg(long, env = "SOLARA_PASSWORD", hide_env_values = true)]
        password: String,

        /// Birth date as YYYY-MM-DD
        #[arg(long)]
        birth_date: NaiveDate,

        /// Sign in with the same credentials once the account exists
        #[arg(long)]
        login: bool,
    },

    /// List upcoming events
    Events,

    /// Show one event
    Event {
        /// Event id
        id: String,
    },

    /// Register attendance to an event
    Attend {
        /// Event id
        event_id: String,
    },

    /// Show loyalty card points and rewards
    Points,
}

impl Commands {
    pub async fn execute(self, settings: &Settings, data_dir: &Path) -> Result<()> {
        let storage_path = settings.storage_path(data_dir);
        debug!("Using session storage at {:?}", storage_path);

        let store = CredentialStore::new(FileStorage::new(storage_path));
        let client = ApiClient::builder()
            .base_url(settings.base_url.clone())
            .timeout(settings.timeout())
            .endpoints(settings.endpoints.clone())
            .credentials(store)
            .build()?;

        let session = SessionManager::start(client);
        let mut events = session.events();
        session.ready().await;

        let result = self.run(&session).await;
        report_events(&mut events);
        result
    }

    async fn run(self, session: &SessionManager) -> Result<()> {
        match self {
            Commands::Login { email, password } => login(session, &email, &password).await,
            Commands::Logout => {
                session.logout().await;
                println!("Signed out.");
                Ok(())
            }
            Commands::Whoami => {
                match session.current_user() {
                    Some(user) => print_user(&user),
                    None => println!("Not signed in."),
                }
                Ok(())
            }
            Commands::Register {
                cedula,
                nombre,
                apellido,
                telefono,
                email,
                password,
                birth_date,
                login: then_login,
            } => {
                let payload = RegisterRequest {
                    cedula,
                    nombre,
                    apellido,
                    telefono,
                    email: email.clone(),
                    password: password.clone(),
                    birth_date,
                };
                let result = session.register(&payload).await;
                if !result.success {
                    let reason = result
                        .message
                        .clone()
                        .or_else(|| result.extra.get("message").map(ToString::to_string))
                        .unwrap_or_else(|| "Registration failed.".to_string());
                    bail!(reason);
                }
                println!(
                    "{}",
                    result
                        .message
                        .as_deref()
                        .unwrap_or("Registration successful.")
                );

                if then_login {
                    login(session, &email, &password).await
                } else {
                    println!("Run `solara login` to sign in.");
                    Ok(())
                }
            }
            Commands::Events => {
                require_user(session)?;
                let events = session
                    .api()
                    .list_events()
                    .await
                    .map_err(|e| anyhow!(user_friendly_error(&e)))?;

                if events.is_empty() {
                    println!("No upcoming events.");
                }
                for event in &events {
                    print_event_line(event);
                }
                Ok(())
            }
            Commands::Event { id } => {
                let user = require_user(session)?;
                let event = session
                    .api()
                    .get_event(&id)
                    .await
                    .map_err(|e| anyhow!(user_friendly_error(&e)))?;
                print_event(&event, user.id);
                Ok(())
            }
            Commands::Attend { event_id } => {
                let client_id = customer_id(&require_user(session)?)?;
                let outcome = session
                    .api()
                    .attend(&event_id, client_id)
                    .await
                    .map_err(|e| anyhow!(user_friendly_error(&e)))?;

                match outcome {
                    AttendOutcome::AlreadyAttending => {
                        println!("You are already signed up for this event.");
                    }
                    AttendOutcome::Registered(result) => println!(
                        "{}",
                        result.message.as_deref().unwrap_or("Attendance registered.")
                    ),
                }
                Ok(())
            }
            Commands::Points => {
                let user = require_user(session)?;
                let card_id = customer_id(&user)?.to_string();
                let response = session
                    .api()
                    .get_card(&card_id)
                    .await
                    .map_err(|e| anyhow!(user_friendly_error(&e)))?;

                let card = match response.data {
                    Some(card) if response.success => card,
                    _ => bail!(
                        response
                            .message
                            .unwrap_or_else(|| "Could not load card data.".to_string())
                    ),
                };
                print_card(&user, card.puntos);
                Ok(())
            }
        }
    }
}

async fn login(session: &SessionManager, email: &str, password: &str) -> Result<()> {
    if !session.login(email, password).await {
        bail!("Sign in failed. Check your email and password.");
    }
    info!("Signed in as {}", email);

    let name = session
        .current_user()
        .and_then(|user| user.display_name())
        .unwrap_or_else(|| email.to_string());
    println!("Welcome, {name}!");
    Ok(())
}

fn require_user(session: &SessionManager) -> Result<SessionUser> {
    session
        .current_user()
        .ok_or_else(|| anyhow!("Not signed in. Run `solara login` first."))
}

// Sessions restored from a bare token carry no customer id
fn customer_id(user: &SessionUser) -> Result<i64> {
    user.id
        .ok_or_else(|| anyhow!("Your profile is incomplete. Run `solara login` again."))
}

fn report_events(events: &mut broadcast::Receiver<SessionEvent>) {
    while let Ok(event) = events.try_recv() {
        if let SessionEvent::Expired {
            notice,
            redirect_to,
        } = event
        {
            eprintln!("{notice}");
            debug!("Navigation requested to {}", redirect_to);
            eprintln!("Run `solara login` to continue.");
        }
    }
}

fn print_user(user: &SessionUser) {
    println!(
        "Name:   {}",
        user.display_name().as_deref().unwrap_or("(unknown)")
    );
    if let Some(email) = &user.email {
        println!("Email:  {email}");
    }
    if let Some(cedula) = &user.cedula {
        println!("Cédula: {cedula}");
    }
    if let Some(id) = user.id {
        println!("Client: {id}");
    }
}

fn print_event_line(event: &Event) {
    println!(
        "[{}] {} - {} {} @ {}",
        event.id,
        event.name.as_deref().unwrap_or("(untitled)"),
        event.date.as_deref().unwrap_or("?"),
        event.time.as_deref().unwrap_or(""),
        event.location.as_deref().unwrap_or("?"),
    );
}

fn print_event(event: &Event, client_id: Option<i64>) {
    println!("{}", event.name.as_deref().unwrap_or("(untitled)"));
    if let Some(date) = &event.date {
        println!("Date:     {date}");
    }
    if let Some(time) = &event.time {
        println!("Time:     {time}");
    }
    if let Some(location) = &event.location {
        println!("Location: {location}");
    }
    if let Some(price) = event.price {
        println!("Price:    {price}$");
    }
    if let Some(description) = &event.description {
        println!();
        println!("{description}");
    }
    if client_id.is_some_and(|id| event.is_attending(id)) {
        println!();
        println!("You are signed up for this event.");
    }
}

fn print_card(user: &SessionUser, points: u32) {
    println!("{}  {}/{}", rewards::stamp_card(points), points, rewards::CARD_CAPACITY);

    for tier in STANDARD_TIERS {
        match rewards::claim(points, tier) {
            ClaimOutcome::Eligible => {
                println!("Reward for {} points: available", tier.points_required);
            }
            ClaimOutcome::NeedsMorePoints { missing } => println!(
                "Reward for {} points: {} more needed",
                tier.points_required, missing
            ),
        }
    }

    let today = chrono::Local::now().date_naive();
    if rewards::birthday_reward_available(user.birth_date, today) {
        println!("Happy birthday! Your birthday reward is available.");
    } else {
        println!("Birthday reward: not available today");
    }
}

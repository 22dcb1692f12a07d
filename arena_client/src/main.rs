//! Terminal client for the arena tournament service.
//!
//! Pages are addressed by path (`go /home`) and guarded the same way as the
//! web app; everything else is a command typed at the prompt.

use anyhow::{Context, Result};
use arena::{
    auth::{LoginRequest, RegisterRequest, User},
    tournament::{TournamentDraft, TournamentStatus},
    wallet::TransactionDetails,
};
use arena_client::{
    api_client::{ApiClient, content_type_for},
    commands::{Command, HELP_TEXT, parse_command},
    routes::{self, Route},
    session::SessionContext,
    views,
    websocket_client::WebSocketClient,
    wizard::{self, STEPS},
};
use chrono::Utc;
use pico_args::Arguments;
use serde_json::Value;
use std::io::{self, Write};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

const HELP: &str = "\
Connect to an arena tournament server

USAGE:
  arena_client [OPTIONS]

OPTIONS:
  --server URL          Server URL  [default: http://localhost:8080]
  --email EMAIL         Sign in with this email
  --password PASS       Password for --email
  --guest               Sign in anonymously

FLAGS:
  -h, --help            Print help information
";

struct Args {
    server_url: String,
    email: Option<String>,
    password: Option<String>,
    guest: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        server_url: pargs
            .value_from_str("--server")
            .unwrap_or_else(|_| "http://localhost:8080".to_string()),
        email: pargs.opt_value_from_str("--email")?,
        password: pargs.opt_value_from_str("--password")?,
        guest: pargs.contains("--guest"),
    };

    let mut app = App::new(args.server_url);

    if let (Some(email), Some(password)) = (args.email, args.password) {
        let user = app
            .api
            .login(LoginRequest { email, password })
            .await
            .context("Failed to sign in")?;
        app.sign_in(user).await?;
    } else if args.guest {
        let user = app
            .api
            .sign_in_anonymously()
            .await
            .context("Failed to sign in as guest")?;
        app.sign_in(user).await?;
    } else {
        app.go("/").await?;
    }

    app.run().await
}

struct App {
    api: ApiClient,
    session: SessionContext,
    route: Route,
    input: Lines<BufReader<Stdin>>,
}

impl App {
    fn new(server_url: String) -> Self {
        Self {
            api: ApiClient::new(server_url),
            session: SessionContext::new(),
            route: Route::Landing,
            input: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    fn viewer(&self) -> Option<&str> {
        self.session.user().map(|user| user.id.as_str())
    }

    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        print!("{prompt}");
        io::stdout().flush()?;
        Ok(self.input.next_line().await?)
    }

    async fn run(&mut self) -> Result<()> {
        println!("Type 'help' for commands.");

        loop {
            let prompt = format!("{}> ", self.route);
            let Some(line) = self.read_line(&prompt).await? else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            let command = match parse_command(&line) {
                Ok(command) => command,
                Err(e) => {
                    println!("{e}");
                    continue;
                }
            };

            if command == Command::Quit {
                break;
            }
            if command.needs_session() && !self.session.is_authenticated() {
                println!("Sign in first.");
                if let Err(e) = self.go("/auth").await {
                    println!("Error: {e:#}");
                }
                continue;
            }

            if let Err(e) = self.execute(command).await {
                println!("Error: {e:#}");
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Navigate to `path`, applying route guards, and show the page
    async fn go(&mut self, path: &str) -> Result<()> {
        self.route = routes::navigate(path, self.session.is_authenticated());
        self.render().await
    }

    async fn render(&mut self) -> Result<()> {
        match self.route.clone() {
            Route::Landing => println!("{}", views::LANDING),
            Route::Auth => println!(
                "Sign in with 'login EMAIL PASSWORD', create an account with \
                 'register EMAIL PASSWORD [NAME]', or continue with 'guest'."
            ),
            Route::Home => self.show_home().await?,
            Route::CreateTournament => self.create_tournament().await?,
            Route::Tournament(id) => {
                let tournament = self.api.get_tournament(&id).await?;
                println!("{}", views::tournament_detail(&tournament, self.viewer()));
            }
            Route::Settings => self.show_profile().await?,
            Route::Terms => println!("{}", views::TERMS),
            Route::NotFound(path) => println!("Page not found: {path}"),
        }
        Ok(())
    }

    async fn sign_in(&mut self, user: User) -> Result<()> {
        println!("Signed in as {}.", user.display_name);
        self.session.set_user(&self.api, Some(user)).await?;
        self.go("/home").await
    }

    async fn show_home(&mut self) -> Result<()> {
        println!(
            "{}",
            views::tournament_list("Hosted by you", self.session.hosted())
        );
        let joined = self.api.list_joined().await?;
        println!("{}", views::tournament_list("Joined", &joined));
        let open = self
            .api
            .list_tournaments(Some(TournamentStatus::Active))
            .await?;
        println!("{}", views::tournament_list("Open for registration", &open));
        Ok(())
    }

    async fn show_profile(&mut self) -> Result<()> {
        let Some(user) = self.session.user() else {
            return Ok(());
        };
        let profile = self.api.profile().await?;
        println!("{}", views::profile(user, &profile));
        Ok(())
    }

    /// Walk through the wizard, saving the draft after each answer
    async fn create_tournament(&mut self) -> Result<()> {
        let mut draft = match self.api.get_draft().await? {
            Some(draft) => {
                println!("Resuming your saved draft.");
                draft
            }
            None => TournamentDraft::default(),
        };
        println!("Press Enter to keep the value in brackets, or type 'cancel' to stop.");

        for (index, step) in STEPS.iter().enumerate() {
            loop {
                let current = step.current(&draft);
                let prompt = match current.as_deref() {
                    Some(value) if !value.is_empty() => format!("{} [{}]: ", step.prompt(), value),
                    _ => format!("{}: ", step.prompt()),
                };
                let Some(line) = self.read_line(&prompt).await? else {
                    return Ok(());
                };

                let answer = line.trim();
                if answer.eq_ignore_ascii_case("cancel") {
                    println!("Stopped. Type 'create' to resume your draft.");
                    return Ok(());
                }
                let answer = if answer.is_empty() {
                    current.unwrap_or_default()
                } else {
                    answer.to_string()
                };

                match step.apply(&mut draft, &answer) {
                    Ok(()) => break,
                    Err(e) => println!("{e}"),
                }
            }

            draft.step = index as u32 + 1;
            draft = self.api.save_draft(&draft).await?;
        }

        let tournament = match wizard::build(&draft) {
            Ok(tournament) => tournament,
            Err(e) => {
                println!("{e}");
                return Ok(());
            }
        };
        if let Err(e) = tournament.validate(Utc::now()) {
            println!("{}", e.client_message());
            println!("Your draft is saved; type 'create' to fix it.");
            return Ok(());
        }

        let created = self.api.create_tournament(&tournament).await?;
        self.session.refresh_hosted(&self.api).await?;
        println!("Created tournament {}.", created.id);
        self.route = Route::Tournament(created.id.clone());
        println!("{}", views::tournament_detail(&created, self.viewer()));
        Ok(())
    }

    async fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Go(path) => self.go(&path).await?,
            Command::Register {
                email,
                password,
                display_name,
            } => {
                let user = self
                    .api
                    .register(RegisterRequest {
                        email,
                        password,
                        display_name,
                    })
                    .await?;
                self.sign_in(user).await?;
            }
            Command::Login { email, password } => {
                let user = self.api.login(LoginRequest { email, password }).await?;
                self.sign_in(user).await?;
            }
            Command::Guest => {
                let user = self.api.sign_in_anonymously().await?;
                self.sign_in(user).await?;
            }
            Command::Logout => {
                let result = self.api.logout().await;
                self.session.set_user(&self.api, None).await?;
                println!("Signed out.");
                let path = self.route.path();
                self.go(&path).await?;
                result?;
            }
            Command::Tournaments(status) => {
                let tournaments = self.api.list_tournaments(status).await?;
                let title = match status {
                    Some(status) => format!("Tournaments ({status})"),
                    None => "Tournaments".to_string(),
                };
                println!("{}", views::tournament_list(&title, &tournaments));
            }
            Command::Hosted => {
                self.session.refresh_hosted(&self.api).await?;
                println!(
                    "{}",
                    views::tournament_list("Hosted by you", self.session.hosted())
                );
            }
            Command::Joined => {
                let joined = self.api.list_joined().await?;
                println!("{}", views::tournament_list("Joined", &joined));
            }
            Command::Create => self.go("/tournament/create").await?,
            Command::Join(id) => {
                let tournament = self.api.join_tournament(&id).await?;
                println!("Joined {}.", tournament.name);
                if tournament.entry_fee > 0 {
                    println!("Entry fee of {} paid from your wallet.", tournament.entry_fee);
                }
            }
            Command::Leave(id) => {
                let tournament = self.api.leave_tournament(&id).await?;
                println!("Left {}.", tournament.name);
            }
            Command::SetStatus { id, status } => {
                let tournament = self.api.update_status(&id, status).await?;
                self.session.refresh_hosted(&self.api).await?;
                println!("{} is now {}.", tournament.name, tournament.status);
            }
            Command::Room { id, room } => {
                let tournament = self.api.set_room(&id, &room).await?;
                println!("Room details shared with {} participants.", tournament.filled_spots);
            }
            Command::Results { id, results } => {
                let tournament = self.api.complete_tournament(&id, &results).await?;
                self.session.refresh_hosted(&self.api).await?;
                println!("{}", views::tournament_detail(&tournament, self.viewer()));
            }
            Command::Banner { id, file } => {
                let bytes = read_file(&file).await?;
                let tournament = self
                    .api
                    .upload_banner(&id, content_type_for(&file), bytes)
                    .await?;
                println!(
                    "Banner uploaded: {}",
                    tournament.banner_url.unwrap_or_default()
                );
            }
            Command::Draft => match self.api.get_draft().await? {
                Some(draft) => println!("{}", views::draft_summary(&draft)),
                None => println!("No saved draft"),
            },
            Command::DiscardDraft => {
                self.api.delete_draft().await?;
                println!("Draft discarded.");
            }
            Command::Wallet => {
                let wallet = self.api.wallet().await?;
                println!("{}", views::wallet(&wallet));
            }
            Command::History(limit) => {
                let transactions = self.api.transactions(limit).await?;
                println!("{}", views::transactions(&transactions));
            }
            Command::Deposit { amount, method } => {
                println!("Processing deposit...");
                let transaction = self.api.deposit(amount, payment_details(method)).await?;
                println!("{}", views::transaction_line(&transaction));
            }
            Command::Withdraw { amount, method } => {
                println!("Processing withdrawal...");
                let transaction = self.api.withdraw(amount, payment_details(method)).await?;
                println!("{}", views::transaction_line(&transaction));
            }
            Command::Watch => {
                let url = self.api.wallet_feed_url()?;
                WebSocketClient::new(url).watch().await?;
            }
            Command::Profile => self.go("/settings").await?,
            Command::UpdateProfile(update) => {
                self.api.update_profile(&update).await?;
                println!("Profile updated.");
                self.show_profile().await?;
            }
            Command::Avatar(file) => {
                let bytes = read_file(&file).await?;
                let profile = self.api.upload_avatar(content_type_for(&file), bytes).await?;
                println!("Avatar uploaded: {}", profile.avatar_url.unwrap_or_default());
            }
            Command::Available { ign, game_id } => {
                let availability = self
                    .api
                    .check_availability(ign.as_deref(), game_id.as_deref())
                    .await?;
                for (field, available) in [
                    ("IGN", availability.ign_available),
                    ("Game ID", availability.game_id_available),
                ] {
                    if let Some(available) = available {
                        let verdict = if available { "available" } else { "taken" };
                        println!("{field} is {verdict}");
                    }
                }
            }
            Command::Help => println!("{HELP_TEXT}"),
            Command::Quit => {}
        }
        Ok(())
    }
}

fn payment_details(method: Option<String>) -> TransactionDetails {
    let mut details = TransactionDetails::new();
    if let Some(method) = method {
        details.insert("method".to_string(), Value::String(method));
    }
    details
}

async fn read_file(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

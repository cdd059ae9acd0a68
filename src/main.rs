//! `cloudchef`: command-line front end for the meal-planning service.
//!
//! Each subcommand stands in for one page of the web app. Guarded commands
//! ask the route guard first, exactly as the pages do, and refuse to run for
//! a signed-out user. The session persists between runs in the configured
//! session directory.

use std::sync::Arc;

use clap::{ArgAction, Args, Parser, Subcommand};
use serde_json::{Value, json};

use cloudchef::api::{ApiClient, ApiError, MealPlan, Preferences, filter_saved_plans};
use cloudchef::auth::cognito::CognitoClient;
use cloudchef::auth::guard::{ENTRY_POINT, GuardDecision, HOME, Route, guard};
use cloudchef::auth::{AuthError, FileStore, KeyValueStore, MemoryStore, SessionGate};
use cloudchef::config::{ClientConfig, ConfigError};
use cloudchef::error::{ErrorCode, describe};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("sign in first: run `cloudchef login <email>`")]
    SignInRequired,
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Auth(#[from] AuthError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

impl ErrorCode for CliError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::SignInRequired => "E_SIGN_IN_REQUIRED",
            Self::Config(e) => e.error_code(),
            Self::Auth(e) => e.error_code(),
            Self::Api(e) => e.error_code(),
            Self::Output(_) => "E_OUTPUT",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Auth(e) => e.retryable(),
            Self::Api(e) => e.retryable(),
            _ => false,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "cloudchef", about = "CloudChef meal planning from the terminal")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account; a verification code is emailed.
    Signup(Credentials),
    /// Confirm an account with the emailed 6-digit code.
    Verify { email: String, code: String },
    /// Send a new verification code.
    ResendCode { email: String },
    Login(Credentials),
    Logout,
    /// Show the current session.
    Status,
    /// Generate recipes matching a query.
    Search { query: String },
    /// Generate a grocery list for a recipe.
    Grocery { recipe: String },
    Mealplan(MealplanCommand),
    Prefs(PrefsCommand),
}

#[derive(Args, Debug)]
struct Credentials {
    email: String,
    #[arg(long, env = "CLOUDCHEF_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Args, Debug)]
struct MealplanCommand {
    #[command(subcommand)]
    command: MealplanSubcommand,
}

#[derive(Subcommand, Debug)]
enum MealplanSubcommand {
    /// Generate and save a plan for the week.
    Generate,
    /// List saved plans, newest first.
    List {
        #[arg(long)]
        filter: Option<String>,
    },
}

#[derive(Args, Debug)]
struct PrefsCommand {
    #[command(subcommand)]
    command: PrefsSubcommand,
}

#[derive(Subcommand, Debug)]
enum PrefsSubcommand {
    Show,
    /// Update preferences; omitted fields keep their saved value.
    Set {
        #[arg(long)]
        cuisine: Option<String>,
        #[arg(long)]
        allergies: Option<String>,
        #[arg(long)]
        dislikes: Option<String>,
    },
}

struct Context {
    gate: SessionGate,
    api: ApiClient,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    if let Err(e) = run(cli.command).await {
        eprintln!("error: {}", describe(&e));
        if e.retryable() {
            eprintln!("(temporary failure; try again)");
        }
        std::process::exit(1);
    }
}

fn build_context() -> Result<Context, CliError> {
    let config = ClientConfig::from_env()?;
    let store: Arc<dyn KeyValueStore> = match &config.session_dir {
        Some(dir) => Arc::new(FileStore::new(dir)),
        None => {
            tracing::warn!("no session directory available; session will not persist");
            Arc::new(MemoryStore::new())
        }
    };
    let provider = Arc::new(CognitoClient::new(&config.identity, config.timeouts)?);
    let gate = SessionGate::new(provider, store);
    let api = ApiClient::new(&config, gate.clone())?;
    Ok(Context { gate, api })
}

async fn run(command: Command) -> Result<(), CliError> {
    let ctx = build_context()?;
    ctx.gate.initialize().await;

    match command {
        Command::Signup(Credentials { email, password }) => {
            let outcome = ctx.gate.sign_up(&email, &password).await?;
            let next = if outcome.user_confirmed { "login" } else { "verify" };
            print_json(&json!({
                "email": email.trim(),
                "confirmed": outcome.user_confirmed,
                "codeSentTo": outcome.code_destination,
                "next": next,
            }))
        }
        Command::Verify { email, code } => {
            ctx.gate.confirm_sign_up(&email, &code).await?;
            print_json(&json!({ "email": email.trim(), "verified": true, "next": "login" }))
        }
        Command::ResendCode { email } => {
            let destination = ctx.gate.resend_code(&email).await?;
            print_json(&json!({ "email": email.trim(), "codeSentTo": destination }))
        }
        Command::Login(Credentials { email, password }) => {
            let session = ctx.gate.sign_in(&email, &password).await?;
            print_json(&json!({ "username": session.username, "route": HOME.path() }))
        }
        Command::Logout => {
            ctx.gate.sign_out();
            print_json(&json!({ "signedOut": true, "route": ENTRY_POINT.path() }))
        }
        Command::Status => {
            let state = ctx.gate.auth_state();
            let route = match guard(&state, HOME) {
                GuardDecision::Redirect(to) => to,
                _ => HOME,
            };
            print_json(&json!({
                "phase": format!("{:?}", state.phase()),
                "username": state.user.as_ref().map(|s| s.username.as_str()),
                "route": route.path(),
            }))
        }
        Command::Search { query } => {
            require(&ctx.gate, Route::Search)?;
            let recipes = ctx.api.search_recipes(&query).await?;
            print_json(&serde_json::to_value(recipes)?)
        }
        Command::Grocery { recipe } => {
            require(&ctx.gate, Route::Grocery)?;
            let items = ctx.api.generate_grocery_list(&recipe).await?;
            print_json(&json!({ "recipe": recipe.trim(), "groceryList": items }))
        }
        Command::Mealplan(MealplanCommand { command }) => run_mealplan(&ctx, command).await,
        Command::Prefs(PrefsCommand { command }) => run_prefs(&ctx, command).await,
    }
}

async fn run_mealplan(ctx: &Context, command: MealplanSubcommand) -> Result<(), CliError> {
    match command {
        MealplanSubcommand::Generate => {
            require(&ctx.gate, Route::MealPlan)?;
            let plan = ctx.api.generate_meal_plan().await?;
            print_json(&week_json(&plan))
        }
        MealplanSubcommand::List { filter } => {
            require(&ctx.gate, Route::SavedPlans)?;
            let plans = ctx.api.list_meal_plans().await?;
            let listed: Vec<Value> = filter_saved_plans(&plans, filter.as_deref().unwrap_or_default())
                .into_iter()
                .map(|(n, saved)| {
                    json!({
                        "label": format!("Plan #{n}"),
                        "createdAt": saved.created_at,
                        "plan": week_json(&saved.plan),
                    })
                })
                .collect();
            print_json(&Value::Array(listed))
        }
    }
}

async fn run_prefs(ctx: &Context, command: PrefsSubcommand) -> Result<(), CliError> {
    require(&ctx.gate, Route::Preferences)?;
    match command {
        PrefsSubcommand::Show => {
            let prefs = ctx.api.get_preferences().await?;
            match prefs {
                Some(prefs) => print_json(&serde_json::to_value(prefs)?),
                None => print_json(&json!({ "message": "No preferences found" })),
            }
        }
        PrefsSubcommand::Set { cuisine, allergies, dislikes } => {
            let mut prefs: Preferences = ctx.api.get_preferences().await?.unwrap_or_default();
            if let Some(cuisine) = cuisine {
                prefs.cuisine = cuisine;
            }
            if let Some(allergies) = allergies {
                prefs.allergies = allergies;
            }
            if let Some(dislikes) = dislikes {
                prefs.dislikes = dislikes;
            }
            let saved = ctx.api.save_preferences(&prefs).await?;
            print_json(&serde_json::to_value(saved)?)
        }
    }
}

/// Apply the page guard for `route` to the already-initialized gate.
fn require(gate: &SessionGate, route: Route) -> Result<(), CliError> {
    match guard(&gate.auth_state(), route) {
        GuardDecision::Render => Ok(()),
        GuardDecision::Pending | GuardDecision::Redirect(_) => Err(CliError::SignInRequired),
    }
}

/// Plan as an array in week order; JSON objects would lose it.
fn week_json(plan: &MealPlan) -> Value {
    Value::Array(
        plan.days()
            .into_iter()
            .map(|(day, meals)| {
                json!({
                    "day": day,
                    "breakfast": meals.breakfast,
                    "lunch": meals.lunch,
                    "dinner": meals.dinner,
                })
            })
            .collect(),
    )
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "aiva")]
#[command(about = "Sign in to AIVA and manage the local session", long_about = None)]
pub struct Args {
    #[arg(short = 'v', long = "verbose", global = true, help = "Show debug logging")]
    pub verbose: bool,

    #[arg(
        long = "api-base-url",
        global = true,
        help = "Backend API base URL (e.g., http://localhost:5000/api)"
    )]
    pub api_base_url: Option<String>,

    #[arg(
        long = "data-dir",
        global = true,
        help = "Directory holding the stored session"
    )]
    pub data_dir: Option<String>,

    #[arg(
        long = "ephemeral",
        global = true,
        help = "Keep the session in memory only for this run"
    )]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the current session and the screen it routes to
    Status,
    /// Sign in with email/password or a social provider token
    Login(LoginArgs),
    /// Create an account and sign in
    Signup(SignupArgs),
    /// Sign out and forget the stored session
    Logout,
    /// Fetch the signed-in user's profile from the backend
    Profile,
    /// Show or toggle the theme
    Theme(ThemeArgs),
}

#[derive(ClapArgs, Debug)]
pub struct LoginArgs {
    #[arg(long, help = "Account email", requires = "password")]
    pub email: Option<String>,

    #[arg(long, help = "Account password")]
    pub password: Option<String>,

    #[arg(
        long = "google-token",
        help = "Google ID token",
        conflicts_with_all = ["email", "apple_token", "facebook_token"]
    )]
    pub google_token: Option<String>,

    #[arg(
        long = "apple-token",
        help = "Apple ID token",
        conflicts_with_all = ["email", "facebook_token"]
    )]
    pub apple_token: Option<String>,

    #[arg(long, help = "Nonce used when requesting the Apple token", requires = "apple_token")]
    pub nonce: Option<String>,

    #[arg(
        long = "facebook-token",
        help = "Facebook access token",
        conflicts_with = "email"
    )]
    pub facebook_token: Option<String>,
}

#[derive(ClapArgs, Debug)]
pub struct SignupArgs {
    #[arg(long, help = "Account email")]
    pub email: String,

    #[arg(long, help = "Account password")]
    pub password: String,

    #[arg(long = "confirm-password", help = "Repeat the password")]
    pub confirm_password: String,

    #[arg(long = "display-name", help = "Name shown in the app")]
    pub display_name: Option<String>,
}

#[derive(ClapArgs, Debug)]
pub struct ThemeArgs {
    #[arg(long, help = "Switch between light and dark")]
    pub toggle: bool,
}

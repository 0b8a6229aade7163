use aiva::auth_flow::{AuthFlow, FlowKind, SignUpRequest};
use aiva::cli::{Args, Command, LoginArgs, SignupArgs, ThemeArgs};
use aiva::config::Config;
use aiva::identity::ProviderCredential;
use aiva::ui::{display_error, display_profile, display_status, display_success, display_theme};
use aiva::{logging, App, Error};
use clap::Parser;
use std::process;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Load configuration
    let config = match Config::from_env_and_args(&args) {
        Ok(config) => config,
        Err(e) => {
            display_error("Error", &e);
            process::exit(1);
        }
    };
    logging::init(config.verbose);

    let app = App::start(config, args.ephemeral).await;

    let outcome = match args.command {
        Command::Status => {
            display_status(&app.session.state(), app.current_screen());
            Ok(())
        }
        Command::Login(login) => run_login(&app, login).await,
        Command::Signup(signup) => run_signup(&app, signup).await,
        Command::Logout => run_logout(&app).await,
        Command::Profile => run_profile(&app).await,
        Command::Theme(theme) => run_theme(&app, theme).await,
    };

    if let Err((kind, e)) = outcome {
        tracing::debug!(error = %e, "command failed");
        display_error(&kind.title(), &e.user_message(&kind.fallback_message()));
        process::exit(1);
    }
}

type Outcome = Result<(), (FlowKind, Error)>;

async fn flow(app: &App, kind: FlowKind) -> Result<AuthFlow, (FlowKind, Error)> {
    app.auth_flow().await.map_err(|e| (kind, e))
}

async fn run_login(app: &App, login: LoginArgs) -> Outcome {
    let provider = match (login.google_token, login.apple_token, login.facebook_token) {
        (Some(id_token), _, _) => Some(ProviderCredential::Google { id_token }),
        (_, Some(id_token), _) => Some(ProviderCredential::Apple {
            id_token,
            nonce: login.nonce,
        }),
        (_, _, Some(access_token)) => Some(ProviderCredential::Facebook { access_token }),
        _ => None,
    };

    match provider {
        Some(credential) => {
            let kind = FlowKind::ProviderSignIn(credential.method());
            let auth = flow(app, kind).await?;
            auth.sign_in_with_provider(&credential)
                .await
                .map_err(|e| (kind, e))?;
            display_success(&format!("Signed in with {}!", credential.method()));
        }
        None => {
            let kind = FlowKind::PasswordSignIn;
            let auth = flow(app, kind).await?;
            let email = login.email.unwrap_or_default();
            let password = login.password.unwrap_or_default();
            auth.sign_in_with_password(&email, &password)
                .await
                .map_err(|e| (kind, e))?;
            display_success("Logged in successfully!");
        }
    }

    display_status(&app.session.state(), app.current_screen());
    Ok(())
}

async fn run_signup(app: &App, signup: SignupArgs) -> Outcome {
    let kind = FlowKind::SignUp;
    let request = SignUpRequest {
        email: signup.email,
        password: signup.password,
        confirm_password: signup.confirm_password,
        display_name: signup.display_name,
    };
    // Reject bad input before requiring identity settings
    request.validate().map_err(|e| (kind, e))?;

    let auth = flow(app, kind).await?;
    auth.sign_up(&request).await.map_err(|e| (kind, e))?;
    display_success("Account created successfully! You can now log in.");
    Ok(())
}

async fn run_logout(app: &App) -> Outcome {
    let kind = FlowKind::SignOut;
    let auth = flow(app, kind).await?;
    auth.sign_out().await.map_err(|e| (kind, e))?;
    display_success("You have been successfully logged out.");
    Ok(())
}

async fn run_profile(app: &App) -> Outcome {
    let kind = FlowKind::Profile;
    let auth = flow(app, kind).await?;
    let profile = auth.profile().await.map_err(|e| (kind, e))?;
    display_profile(&profile);
    Ok(())
}

async fn run_theme(app: &App, args: ThemeArgs) -> Outcome {
    let theme = app.theme().await;
    if args.toggle {
        theme
            .toggle()
            .await
            .map_err(|e| (FlowKind::Theme, Error::Storage(e)))?;
    }
    display_theme(theme.current(), theme.preference());
    Ok(())
}

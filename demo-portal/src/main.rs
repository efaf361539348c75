use std::sync::Arc;

use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use portal_session::{
    Credentials, GuardDecision, OAuthCallbackParams, OAuthCompletion, PortalAuth,
    RecordingNavigator, Role, RouteGuard,
};

/// Headless walk through the portal: restore sessions, optionally sign in
/// with DEMO_ROLE / DEMO_EMAIL / DEMO_PASSWORD, optionally finish an OAuth
/// redirect given as DEMO_OAUTH_CALLBACK, then print where the user was sent.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=debug,portal_session=debug", env!("CARGO_CRATE_NAME")).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let navigator = Arc::new(RecordingNavigator::new());
    let portal = PortalAuth::from_env(navigator.clone())?;

    let restored = portal.bootstrap_all();
    tracing::info!("Restored {} session(s)", restored.len());

    for role in Role::NAMESPACES {
        match RouteGuard::new(role).decide(&portal.service(role).state()) {
            GuardDecision::Render(principal) => {
                println!("{role}: signed in as {}", principal.display_name())
            }
            GuardDecision::Redirect(route) => println!("{role}: signed out, login at {route}"),
            GuardDecision::Loading => println!("{role}: loading"),
        }
    }

    if let (Ok(role), Ok(email), Ok(password)) = (
        std::env::var("DEMO_ROLE"),
        std::env::var("DEMO_EMAIL"),
        std::env::var("DEMO_PASSWORD"),
    ) {
        let role: Role = role.parse()?;
        match portal
            .service(role)
            .login(&Credentials::new(email, password))
            .await
        {
            Ok(principal) => println!(
                "Signed in {} ({}) to the {} portal",
                principal.display_name(),
                principal.role,
                role.namespace()
            ),
            Err(e) => println!("Sign-in failed: {e}"),
        }
    }

    if let Ok(callback) = std::env::var("DEMO_OAUTH_CALLBACK") {
        let params = OAuthCallbackParams::from_url(&callback)?;
        match OAuthCompletion::new(&portal).run(params).await {
            Ok(principal) => println!("OAuth sign-in completed for {}", principal.display_name()),
            Err(e) => println!("OAuth sign-in failed: {e}"),
        }
    }

    for route in navigator.history() {
        println!("navigated to {route}");
    }

    Ok(())
}

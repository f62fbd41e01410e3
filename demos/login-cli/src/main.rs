//! Login demo.
//!
//! Restores a saved session if there is one, otherwise logs in with
//! `SESSIONKIT_USERNAME` / `SESSIONKIT_PASSWORD`. Then keeps the profile
//! fresh in the background until Ctrl-C.
//!
//! ```text
//! SESSIONKIT_API_URL=http://localhost:8081/api \
//! SESSIONKIT_USERNAME=alice SESSIONKIT_PASSWORD=secret \
//!     cargo run -p login-cli
//! ```
//!
//! Pass `--logout` to clear the saved session and exit.

use sessionkit::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let kit = SessionKit::builder()
        .config(ClientConfig::from_env())
        .build()?;

    if std::env::args().any(|arg| arg == "--logout") {
        kit.logout()?;
        println!("Logged out.");
        return Ok(());
    }

    if kit.resume().await?.is_none() {
        let Some(credentials) = credentials_from_env(&kit) else {
            println!("No saved session. Set SESSIONKIT_USERNAME and SESSIONKIT_PASSWORD to log in.");
            println!("Landing page: {}", kit.navigate("/")?);
            return Ok(());
        };

        if let Err(failure) = kit.login(&credentials).await {
            eprintln!("Login failed: {failure}");
            for (field, message) in failure.validation_errors.iter().flatten() {
                eprintln!("  {field}: {message}");
            }
            return Ok(());
        }
    }

    let state = kit.context().snapshot();
    if let Some(user) = state.user() {
        println!(
            "Logged in as {} (admin: {}, pro: {})",
            user.username,
            state.is_admin(),
            state.is_pro()
        );
    }
    println!("Landing page: {}", kit.navigate("/")?);
    println!("Refreshing every {:?}. Ctrl-C to quit.", kit.config().refresh_interval);

    tokio::signal::ctrl_c().await?;

    let metrics = kit.refresh().metrics();
    tracing::info!(
        cycles = metrics.cycles,
        refreshed = metrics.refreshed,
        failures = metrics.failures,
        "shutting down"
    );
    kit.refresh().stop();
    Ok(())
}

fn credentials_from_env(kit: &SessionKit) -> Option<Credentials> {
    let username = std::env::var("SESSIONKIT_USERNAME")
        .ok()
        .or_else(|| kit.context().saved_username())?;
    let password = std::env::var("SESSIONKIT_PASSWORD").ok()?;
    let remember = std::env::var("SESSIONKIT_REMEMBER_ME").is_ok_and(|v| v == "1" || v == "true");
    Some(Credentials::new(username, password).remember(remember))
}

use std::sync::mpsc;
use std::time::Duration;

use socialnetwork::social::{CompletionOutcome, Credentials, Provider, SocialNetwork, SocialResult};

fn credentials_from_env(prefix: &str) -> Option<Credentials> {
    let client_id = std::env::var(format!("{prefix}_CLIENT_ID")).ok()?;
    let credentials = Credentials::new(client_id);
    Some(match std::env::var(format!("{prefix}_CLIENT_SECRET")) {
        Ok(secret) => credentials.with_client_secret(secret),
        Err(_) => credentials,
    })
}

fn main() -> SocialResult<()> {
    let (tx, rx) = mpsc::channel();
    let mut builder = SocialNetwork::builder().with_observer(move |event| {
        let _ = tx.send(event.clone());
    });
    for (provider, prefix) in [
        (Provider::Facebook, "FACEBOOK"),
        (Provider::Google, "GOOGLE"),
        (Provider::Odnoklassniki, "ODNOKLASSNIKI"),
        (Provider::Vkontakte, "VKONTAKTE"),
    ] {
        if let Some(credentials) = credentials_from_env(prefix) {
            builder = builder.with_credentials(provider, credentials);
        }
    }
    let network = builder.build()?;

    let Some(redirect) = std::env::args().nth(1) else {
        for provider in network.credentials().providers() {
            println!("{provider}: {}", network.oauth_url(provider)?);
        }
        println!("Re-run with the URL the browser was redirected to.");
        return Ok(());
    };

    if !network.handle_url(&redirect)? {
        println!("{redirect} is not an authorization redirect");
        return Ok(());
    }

    match rx.recv_timeout(Duration::from_secs(30)) {
        Ok(event) => match event.outcome {
            CompletionOutcome::Success(parameters) => {
                let token = event.provider.access_token(&parameters).unwrap_or("<none>");
                println!("{} signed in, token {token}", event.provider);
            }
            CompletionOutcome::Failure(err) if err.is_exchange_failure() => {
                println!("{} token endpoint call failed: {err}", event.provider)
            }
            CompletionOutcome::Failure(err) => println!("{} failed: {err}", event.provider),
        },
        Err(_) => println!("no completion received"),
    }
    Ok(())
}

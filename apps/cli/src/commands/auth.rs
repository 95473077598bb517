//! # Session Commands
//!
//! `shop login`, `shop register`, `shop logout` and `shop whoami`.

use std::io::Write;

use secrecy::SecretString;
use storefront_client::{RegisterOutcome, Storefront};

use crate::error::CliError;

pub async fn login(shop: &Storefront, email: &str, password: SecretString, out: &mut dyn Write) -> Result<(), CliError> {
    if !shop.session.login(email, &password).await {
        return Err(CliError::LoginFailed);
    }

    match shop.session.user() {
        Some(user) => writeln!(out, "Signed in as {}.", user.email)?,
        // Token issued but /users/me refused it; the session already reset.
        None => return Err(CliError::LoginFailed),
    }
    Ok(())
}

/// Creates an account. The user signs in separately afterwards.
pub async fn register(
    shop: &Storefront,
    email: &str,
    password: SecretString,
    confirm: SecretString,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    match shop
        .session
        .register_with_confirmation(email, &password, &confirm)
        .await
    {
        RegisterOutcome::Registered => {
            writeln!(out, "Account created. Sign in with: shop login {}", email.trim())?;
            Ok(())
        }
        RegisterOutcome::Rejected(e) => Err(e.into()),
        RegisterOutcome::Failed(reason) => Err(CliError::RegistrationFailed(reason)),
    }
}

pub fn logout(shop: &Storefront, out: &mut dyn Write) -> Result<(), CliError> {
    shop.session.logout();
    writeln!(out, "Signed out.")?;
    Ok(())
}

pub fn whoami(shop: &Storefront, out: &mut dyn Write) -> Result<(), CliError> {
    match shop.session.user() {
        Some(user) => writeln!(out, "{} ({})", user.email, user.role_label())?,
        None => writeln!(out, "Not signed in.")?,
    }
    Ok(())
}

//! Account command handlers.
//!
//! This module implements the CLI commands for:
//! - `cuan register` - Create an account
//! - `cuan login` - Exchange credentials for a token and save the session
//! - `cuan logout` - Delete the saved session

use crate::api::{self, Mode};
use crate::args::{LoginArgs, RegisterArgs};
use crate::commands::Out;
use crate::session::Session;
use crate::{validate, Config, Result};
use tracing::debug;

/// Handles `cuan register`. The form is checked locally before anything is sent.
///
/// # Errors
/// - `Validation` if the email is malformed or the password confirmation does not match.
/// - `Backend` if the backend refuses the registration, e.g. because the email is taken.
pub async fn register(config: &Config, mode: Mode, args: &RegisterArgs) -> Result<Out<()>> {
    validate::email(args.email())?;
    validate::password_confirmation(args.password(), args.confirm())?;
    let backend = api::backend(config, mode)?;
    backend.register(args.email().trim(), args.password()).await?;
    Ok(format!(
        "Akun {} berhasil dibuat. Silakan login dengan 'cuan login'",
        args.email().trim()
    )
    .into())
}

/// Handles `cuan login`. The token is saved to the session file and used by every later
/// command until `cuan logout`.
pub async fn login(config: &Config, mode: Mode, args: &LoginArgs) -> Result<Out<()>> {
    validate::required(args.email(), "Email")?;
    validate::required(args.password(), "Password")?;
    let email = args.email().trim();
    let backend = api::backend(config, mode)?;
    let token = backend.login(email, args.password()).await?;

    let store = config.session_store();
    store.save(&Session::new(token, email)).await?;
    debug!("Session saved to {}", store.path().display());
    Ok(format!("Login berhasil sebagai {email}").into())
}

/// Handles `cuan logout`. Succeeds even if nobody was logged in.
pub async fn logout(config: &Config) -> Result<Out<()>> {
    if config.session_store().clear().await? {
        Ok("Anda telah logout".into())
    } else {
        Ok("Tidak ada sesi yang aktif".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{DEMO_EMAIL, DEMO_PASSWORD};
    use crate::error::{error_type_of, ErrorType};
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_register_then_login() {
        let env = TestEnv::new().await;
        let args = RegisterArgs::new("sari@kopisenja.id", "kopi1234", "kopi1234");
        register(env.config(), env.mode(), &args).await.unwrap();

        let out = login(
            env.config(),
            env.mode(),
            &LoginArgs::new("sari@kopisenja.id", "kopi1234"),
        )
        .await
        .unwrap();
        assert_eq!(out.message(), "Login berhasil sebagai sari@kopisenja.id");
        let session = env.config().session_store().require().await.unwrap();
        assert_eq!(session.email(), "sari@kopisenja.id");
    }

    #[tokio::test]
    async fn test_register_mismatched_confirmation() {
        let env = TestEnv::new().await;
        let args = RegisterArgs::new("sari@kopisenja.id", "kopi1234", "kopi4321");
        let e = register(env.config(), env.mode(), &args).await.unwrap_err();
        assert_eq!(error_type_of(&e), Some(ErrorType::Validation));
        assert_eq!(e.root_cause().to_string(), "Konfirmasi password tidak cocok");
    }

    #[tokio::test]
    async fn test_register_existing_email() {
        let env = TestEnv::new().await;
        let args = RegisterArgs::new(DEMO_EMAIL, "lain1234", "lain1234");
        let e = register(env.config(), env.mode(), &args).await.unwrap_err();
        assert_eq!(error_type_of(&e), Some(ErrorType::Backend));
    }

    #[tokio::test]
    async fn test_wrong_password_saves_nothing() {
        let env = TestEnv::new().await;
        let args = LoginArgs::new(DEMO_EMAIL, "salah");
        assert!(login(env.config(), env.mode(), &args).await.is_err());
        assert!(env.config().session_store().load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout() {
        let env = TestEnv::new().await;
        let args = LoginArgs::new(DEMO_EMAIL, DEMO_PASSWORD);
        login(env.config(), env.mode(), &args).await.unwrap();

        assert_eq!(logout(env.config()).await.unwrap().message(), "Anda telah logout");
        assert_eq!(
            logout(env.config()).await.unwrap().message(),
            "Tidak ada sesi yang aktif"
        );
        let e = env.config().session_store().require().await.unwrap_err();
        assert_eq!(error_type_of(&e), Some(ErrorType::Auth));
    }
}

//! Verification and login flow.
//!
//! Glues the OTP engine, the account directory, and the token issuer into
//! the complete authentication path: request a code, then trade a correct
//! code for a session, registering the email on first login.

use courtside_core::entity::Account;
use courtside_core::error::{CourtsideError, Result};
use courtside_core::validate;
use courtside_directory::AccountDirectory;
use tracing::{debug, warn};

use crate::otp::OtpEngine;
use crate::token::SessionSigner;

/// The result of a successful verification: the acting account and its
/// freshly minted session token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Resolved or newly created account
    pub user: Account,
    /// Signed bearer credential
    pub token: String,
}

/// End-to-end authentication flow.
pub struct AuthFlow {
    otp: OtpEngine,
    directory: AccountDirectory,
    signer: SessionSigner,
}

impl AuthFlow {
    /// Assemble the flow from its engines.
    pub fn new(otp: OtpEngine, directory: AccountDirectory, signer: SessionSigner) -> Self {
        Self {
            otp,
            directory,
            signer,
        }
    }

    /// Issue a one-time code for this email.
    pub async fn request_code(&self, email: &str) -> Result<()> {
        self.otp.issue(email).await
    }

    /// Verify a code, then log in or register.
    ///
    /// A new registration uses `requested_name` when it is usable
    /// (1..=256 chars after trimming), otherwise the email's local part.
    /// An existing email whose profile row is missing is a fatal
    /// `NotFound`; the flow never fabricates a replacement profile.
    pub async fn verify_and_login(
        &self,
        email: &str,
        code: &str,
        requested_name: Option<&str>,
    ) -> Result<AuthSession> {
        let email = validate::normalize_email(email)?;
        self.otp.verify(&email, code).await?;

        if let Some(index) = self.directory.find_by_email(&email).await? {
            let profile = self
                .directory
                .profile(&index.user_id)
                .await?
                .ok_or_else(|| {
                    warn!(user_id = %index.user_id, "email index exists but profile is missing");
                    CourtsideError::not_found("user profile not found")
                })?;
            debug!(user_id = %index.user_id, "login");
            return self.session(Account {
                user_id: index.user_id,
                email: index.email,
                name: profile.name,
            });
        }

        let name = requested_name
            .and_then(validate::usable_display_name)
            .map(str::to_string)
            .unwrap_or_else(|| validate::derived_display_name(&email));

        match self.directory.create_account(&email, &name).await {
            Ok(account) => {
                debug!(user_id = %account.user_id, "registered");
                self.session(account)
            }
            Err(CourtsideError::Conflict { .. }) => {
                // Lost a concurrent registration race: the winner's account
                // is authoritative. Re-resolve instead of retrying the write.
                let index = self
                    .directory
                    .find_by_email(&email)
                    .await?
                    .ok_or_else(|| CourtsideError::conflict("user already exists"))?;
                let profile = self
                    .directory
                    .profile(&index.user_id)
                    .await?
                    .ok_or_else(|| CourtsideError::conflict("user already exists"))?;
                debug!(user_id = %index.user_id, "login after concurrent registration");
                self.session(Account {
                    user_id: index.user_id,
                    email: index.email,
                    name: profile.name,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Resolve a bearer token to its account. The token identity must
    /// match the directory's current mapping for the email.
    pub async fn authenticate(&self, token: &str) -> Result<Account> {
        let claims = self
            .signer
            .verify(token)
            .ok_or(CourtsideError::Unauthorized)?;

        let index = self
            .directory
            .find_by_email(&claims.email)
            .await?
            .ok_or(CourtsideError::Unauthorized)?;
        if index.user_id != claims.user_id {
            return Err(CourtsideError::Unauthorized);
        }

        let profile = self
            .directory
            .profile(&index.user_id)
            .await?
            .ok_or_else(|| CourtsideError::not_found("user profile not found"))?;

        Ok(Account {
            user_id: index.user_id,
            email: index.email,
            name: profile.name,
        })
    }

    fn session(&self, user: Account) -> Result<AuthSession> {
        let token = self.signer.mint(&user.user_id, &user.email)?;
        Ok(AuthSession { user, token })
    }
}

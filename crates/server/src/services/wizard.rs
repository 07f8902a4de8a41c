//! Conversational wizards: multi-step registration and a calorie
//! calculator, driven one text input at a time.
//!
//! Each wizard is a small state machine keyed by an external session id.
//! The flow types are pure (input in, next state out); [`WizardService`]
//! owns the persistence side effects.

use std::collections::HashMap;
use std::sync::Mutex;

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, instrument};

use minimart_core::{Email, EmailError, Login, LoginError};

use crate::db::{RepositoryError, UserRepository};
use crate::models::user::{MAX_AGE, NewUser, User};

/// External conversation identifier (e.g. a chat id).
pub type SessionId = i64;

/// Errors produced when a wizard input cannot be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WizardInputError {
    #[error(transparent)]
    Login(#[from] LoginError),
    #[error(transparent)]
    Email(#[from] EmailError),
    #[error("expected a whole number")]
    NotANumber,
    #[error("age must be between 0 and {MAX_AGE}")]
    AgeOutOfRange,
    #[error("value must be positive")]
    NotPositive,
}

/// Registration wizard state: collects login, email, and age in order.
#[derive(Debug, Clone)]
pub enum RegistrationFlow {
    AwaitingLogin,
    AwaitingEmail { login: Login },
    AwaitingAge { login: Login, email: Email },
}

/// Result of feeding one input to a [`RegistrationFlow`].
#[derive(Debug, Clone)]
pub enum RegistrationAdvance {
    /// More input needed; carry this state forward.
    Continue(RegistrationFlow),
    /// All fields collected and validated.
    Complete(NewUser),
}

impl RegistrationFlow {
    /// Apply one text input to the current step.
    ///
    /// # Errors
    ///
    /// Returns a [`WizardInputError`] when the input fails the current
    /// step's validation; the flow stays on that step.
    pub fn apply(&self, input: &str) -> Result<RegistrationAdvance, WizardInputError> {
        match self {
            Self::AwaitingLogin => {
                let login = Login::parse(input.trim())?;
                Ok(RegistrationAdvance::Continue(Self::AwaitingEmail { login }))
            }
            Self::AwaitingEmail { login } => {
                let email = Email::parse(input.trim())?;
                Ok(RegistrationAdvance::Continue(Self::AwaitingAge {
                    login: login.clone(),
                    email,
                }))
            }
            Self::AwaitingAge { login, email } => {
                let age = parse_age(input)?;
                Ok(RegistrationAdvance::Complete(NewUser {
                    login: login.clone(),
                    email: email.clone(),
                    age,
                }))
            }
        }
    }
}

/// Calorie wizard state: collects age, height, and weight in order.
#[derive(Debug, Clone, Copy)]
pub enum CalorieFlow {
    AwaitingAge,
    AwaitingHeight { age: i64 },
    AwaitingWeight { age: i64, height: i64 },
}

/// Result of feeding one input to a [`CalorieFlow`].
#[derive(Debug, Clone, Copy)]
pub enum CalorieAdvance {
    /// More input needed; carry this state forward.
    Continue(CalorieFlow),
    /// Estimated daily calorie requirement.
    Complete(f64),
}

impl CalorieFlow {
    /// Apply one text input to the current step.
    ///
    /// The final step computes the Mifflin-St Jeor estimate:
    /// `10 * weight + 6.25 * height - 5 * age - 161`.
    ///
    /// # Errors
    ///
    /// Returns a [`WizardInputError`] when the input fails the current
    /// step's validation; the flow stays on that step.
    pub fn apply(self, input: &str) -> Result<CalorieAdvance, WizardInputError> {
        match self {
            Self::AwaitingAge => {
                let age = parse_age(input)?;
                Ok(CalorieAdvance::Continue(Self::AwaitingHeight { age }))
            }
            Self::AwaitingHeight { age } => {
                let height = parse_positive(input)?;
                Ok(CalorieAdvance::Continue(Self::AwaitingWeight { age, height }))
            }
            Self::AwaitingWeight { age, height } => {
                let weight = parse_positive(input)?;
                #[allow(clippy::cast_precision_loss)]
                let calories = 10.0 * weight as f64 + 6.25 * height as f64
                    - 5.0 * age as f64
                    - 161.0;
                Ok(CalorieAdvance::Complete(calories))
            }
        }
    }
}

fn parse_age(input: &str) -> Result<i64, WizardInputError> {
    let age: i64 = input
        .trim()
        .parse()
        .map_err(|_| WizardInputError::NotANumber)?;
    if (0..=MAX_AGE).contains(&age) {
        Ok(age)
    } else {
        Err(WizardInputError::AgeOutOfRange)
    }
}

fn parse_positive(input: &str) -> Result<i64, WizardInputError> {
    let value: i64 = input
        .trim()
        .parse()
        .map_err(|_| WizardInputError::NotANumber)?;
    if value > 0 {
        Ok(value)
    } else {
        Err(WizardInputError::NotPositive)
    }
}

/// In-memory store of active wizard sessions.
#[derive(Debug, Default)]
pub struct WizardRegistry {
    registrations: Mutex<HashMap<SessionId, RegistrationFlow>>,
    calories: Mutex<HashMap<SessionId, CalorieFlow>>,
}

// Locks are never held across an await; state is taken out, worked on,
// and stored back.
impl WizardRegistry {
    fn take_registration(&self, session: SessionId) -> Option<RegistrationFlow> {
        self.registrations
            .lock()
            .expect("wizard registry poisoned")
            .remove(&session)
    }

    fn store_registration(&self, session: SessionId, flow: RegistrationFlow) {
        self.registrations
            .lock()
            .expect("wizard registry poisoned")
            .insert(session, flow);
    }

    fn take_calorie(&self, session: SessionId) -> Option<CalorieFlow> {
        self.calories
            .lock()
            .expect("wizard registry poisoned")
            .remove(&session)
    }

    fn store_calorie(&self, session: SessionId, flow: CalorieFlow) {
        self.calories
            .lock()
            .expect("wizard registry poisoned")
            .insert(session, flow);
    }

    /// Drop any active wizard for this session.
    pub fn cancel(&self, session: SessionId) {
        self.take_registration(session);
        self.take_calorie(session);
    }
}

/// Reply to one registration wizard input.
#[derive(Debug)]
pub enum RegistrationReply {
    /// Ask for the login (start of the flow, or restart after a conflict).
    PromptLogin,
    /// Login accepted; ask for the email.
    PromptEmail,
    /// Email accepted; ask for the age.
    PromptAge,
    /// Registration finished; the user was created.
    Registered(User),
    /// The login is already taken; the flow restarts from the login step.
    LoginTaken,
    /// Input failed validation; the flow stays on the current step.
    Invalid(WizardInputError),
}

/// Reply to one calorie wizard input.
#[derive(Debug)]
pub enum CalorieReply {
    /// Ask for the age (start of the flow).
    PromptAge,
    /// Age accepted; ask for the height in centimeters.
    PromptHeight,
    /// Height accepted; ask for the weight in kilograms.
    PromptWeight,
    /// Estimated daily calories.
    Result(f64),
    /// Input failed validation; the flow stays on the current step.
    Invalid(WizardInputError),
}

/// Drives wizard sessions and persists completed registrations.
pub struct WizardService<'a> {
    pool: &'a SqlitePool,
    registry: &'a WizardRegistry,
}

impl<'a> WizardService<'a> {
    /// Create a new wizard service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, registry: &'a WizardRegistry) -> Self {
        Self { pool, registry }
    }

    /// Start (or restart) a registration wizard for this session.
    pub fn start_registration(&self, session: SessionId) -> RegistrationReply {
        self.registry
            .store_registration(session, RegistrationFlow::AwaitingLogin);
        RegistrationReply::PromptLogin
    }

    /// Feed one text input to the session's registration wizard.
    ///
    /// A session without an active wizard is started implicitly, with the
    /// input treated as the login. The login is checked for uniqueness as
    /// soon as it is entered; a duplicate detected at insert time (a race
    /// with a concurrent registration) restarts the flow from the login
    /// step.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a lookup or insert fails.
    #[instrument(skip(self, input))]
    pub async fn registration_input(
        &self,
        session: SessionId,
        input: &str,
    ) -> Result<RegistrationReply, RepositoryError> {
        let flow = self
            .registry
            .take_registration(session)
            .unwrap_or(RegistrationFlow::AwaitingLogin);

        let advance = match flow.apply(input) {
            Ok(advance) => advance,
            Err(e) => {
                self.registry.store_registration(session, flow);
                return Ok(RegistrationReply::Invalid(e));
            }
        };

        let users = UserRepository::new(self.pool);
        match advance {
            RegistrationAdvance::Continue(next) => {
                if let RegistrationFlow::AwaitingEmail { ref login } = next
                    && users.login_exists(login).await?
                {
                    self.registry
                        .store_registration(session, RegistrationFlow::AwaitingLogin);
                    return Ok(RegistrationReply::LoginTaken);
                }
                let reply = match next {
                    RegistrationFlow::AwaitingEmail { .. } => RegistrationReply::PromptEmail,
                    RegistrationFlow::AwaitingAge { .. } => RegistrationReply::PromptAge,
                    RegistrationFlow::AwaitingLogin => RegistrationReply::PromptLogin,
                };
                self.registry.store_registration(session, next);
                Ok(reply)
            }
            RegistrationAdvance::Complete(new_user) => match users.create(&new_user).await {
                Ok(user) => {
                    info!(user_id = %user.id, "wizard registration complete");
                    Ok(RegistrationReply::Registered(user))
                }
                Err(RepositoryError::Conflict(_)) => {
                    self.registry
                        .store_registration(session, RegistrationFlow::AwaitingLogin);
                    Ok(RegistrationReply::LoginTaken)
                }
                Err(e) => {
                    self.registry.store_registration(session, flow);
                    Err(e)
                }
            },
        }
    }

    /// Start (or restart) a calorie wizard for this session.
    pub fn start_calories(&self, session: SessionId) -> CalorieReply {
        self.registry.store_calorie(session, CalorieFlow::AwaitingAge);
        CalorieReply::PromptAge
    }

    /// Feed one text input to the session's calorie wizard.
    ///
    /// A session without an active wizard is started implicitly, with the
    /// input treated as the age.
    pub fn calorie_input(&self, session: SessionId, input: &str) -> CalorieReply {
        let flow = self
            .registry
            .take_calorie(session)
            .unwrap_or(CalorieFlow::AwaitingAge);

        match flow.apply(input) {
            Ok(CalorieAdvance::Continue(next)) => {
                let reply = match next {
                    CalorieFlow::AwaitingHeight { .. } => CalorieReply::PromptHeight,
                    CalorieFlow::AwaitingWeight { .. } => CalorieReply::PromptWeight,
                    CalorieFlow::AwaitingAge => CalorieReply::PromptAge,
                };
                self.registry.store_calorie(session, next);
                reply
            }
            Ok(CalorieAdvance::Complete(calories)) => CalorieReply::Result(calories),
            Err(e) => {
                self.registry.store_calorie(session, flow);
                CalorieReply::Invalid(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MIGRATOR;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        MIGRATOR.run(&pool).await.expect("migrations");
        pool
    }

    #[tokio::test]
    async fn test_registration_happy_path() {
        let pool = test_pool().await;
        let registry = WizardRegistry::default();
        let service = WizardService::new(&pool, &registry);

        assert!(matches!(
            service.start_registration(1),
            RegistrationReply::PromptLogin
        ));
        assert!(matches!(
            service.registration_input(1, "alice").await.expect("step"),
            RegistrationReply::PromptEmail
        ));
        assert!(matches!(
            service
                .registration_input(1, "alice@example.com")
                .await
                .expect("step"),
            RegistrationReply::PromptAge
        ));

        let reply = service.registration_input(1, "30").await.expect("step");
        let RegistrationReply::Registered(user) = reply else {
            panic!("expected Registered, got {reply:?}");
        };
        assert_eq!(user.login.as_str(), "alice");
        assert_eq!(user.age, 30);

        // Session is gone; a fresh input starts over at the login step.
        assert!(matches!(
            service.registration_input(1, "bob").await.expect("step"),
            RegistrationReply::PromptEmail
        ));
    }

    #[tokio::test]
    async fn test_registration_invalid_input_stays_on_step() {
        let pool = test_pool().await;
        let registry = WizardRegistry::default();
        let service = WizardService::new(&pool, &registry);

        service.start_registration(1);
        service.registration_input(1, "alice").await.expect("step");

        assert!(matches!(
            service
                .registration_input(1, "not-an-email")
                .await
                .expect("step"),
            RegistrationReply::Invalid(WizardInputError::Email(_))
        ));
        // Still on the email step.
        assert!(matches!(
            service
                .registration_input(1, "alice@example.com")
                .await
                .expect("step"),
            RegistrationReply::PromptAge
        ));
    }

    #[tokio::test]
    async fn test_registration_duplicate_login_restarts() {
        let pool = test_pool().await;
        let registry = WizardRegistry::default();
        let service = WizardService::new(&pool, &registry);

        service.start_registration(1);
        service.registration_input(1, "alice").await.expect("step");
        service
            .registration_input(1, "alice@example.com")
            .await
            .expect("step");
        service.registration_input(1, "30").await.expect("step");

        // Second session tries the same login.
        service.start_registration(2);
        assert!(matches!(
            service.registration_input(2, "alice").await.expect("step"),
            RegistrationReply::LoginTaken
        ));
        // Back at the login step; a fresh login proceeds.
        assert!(matches!(
            service.registration_input(2, "bob").await.expect("step"),
            RegistrationReply::PromptEmail
        ));
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let pool = test_pool().await;
        let registry = WizardRegistry::default();
        let service = WizardService::new(&pool, &registry);

        service.start_registration(1);
        service.start_registration(2);
        service.registration_input(1, "alice").await.expect("step");

        // Session 2 is still on the login step.
        assert!(matches!(
            service.registration_input(2, "bob").await.expect("step"),
            RegistrationReply::PromptEmail
        ));
    }

    #[tokio::test]
    async fn test_calorie_wizard_computes_estimate() {
        let pool = test_pool().await;
        let registry = WizardRegistry::default();
        let service = WizardService::new(&pool, &registry);

        service.start_calories(7);
        assert!(matches!(
            service.calorie_input(7, "30"),
            CalorieReply::PromptHeight
        ));
        assert!(matches!(
            service.calorie_input(7, "170"),
            CalorieReply::PromptWeight
        ));

        let reply = service.calorie_input(7, "60");
        let CalorieReply::Result(calories) = reply else {
            panic!("expected Result, got {reply:?}");
        };
        // 10 * 60 + 6.25 * 170 - 5 * 30 - 161
        assert!((calories - 1351.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_calorie_wizard_rejects_nonsense() {
        let pool = test_pool().await;
        let registry = WizardRegistry::default();
        let service = WizardService::new(&pool, &registry);

        service.start_calories(7);
        assert!(matches!(
            service.calorie_input(7, "abc"),
            CalorieReply::Invalid(WizardInputError::NotANumber)
        ));
        assert!(matches!(
            service.calorie_input(7, "30"),
            CalorieReply::PromptHeight
        ));
        assert!(matches!(
            service.calorie_input(7, "-170"),
            CalorieReply::Invalid(WizardInputError::NotPositive)
        ));
    }

    #[tokio::test]
    async fn test_wizard_runs_against_shared_state() {
        let pool = test_pool().await;
        let config = crate::config::ServerConfig {
            database_url: secrecy::SecretString::from("sqlite::memory:"),
            host: "127.0.0.1".parse().expect("host"),
            port: 0,
        };
        let state = crate::state::AppState::new(config, pool);
        let service = WizardService::new(state.pool(), state.wizards());

        service.start_registration(1);
        service.registration_input(1, "carol").await.expect("step");
        service
            .registration_input(1, "carol@example.com")
            .await
            .expect("step");
        let reply = service.registration_input(1, "28").await.expect("step");
        assert!(matches!(reply, RegistrationReply::Registered(_)));
    }

    #[test]
    fn test_cancel_clears_session() {
        let registry = WizardRegistry::default();
        registry.store_registration(1, RegistrationFlow::AwaitingLogin);
        registry.store_calorie(1, CalorieFlow::AwaitingAge);
        registry.cancel(1);
        assert!(registry.take_registration(1).is_none());
        assert!(registry.take_calorie(1).is_none());
    }
}

//! Scripted in-memory [`AuthApi`] for tests.
//!
//! Responses are queued per operation and handed out in order. Each one
//! can be delayed, which (under `tokio::time::pause`) lets a test decide
//! exactly which of two in-flight calls completes first.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use sessionkit_protocol::{Credentials, Session, SignupRequest, Token, UserProfile};

use crate::{AuthApi, AuthFailure, AuthResult};

struct Scripted<T> {
    delay: Duration,
    result: AuthResult<T>,
}

type Queue<T> = Arc<Mutex<VecDeque<Scripted<T>>>>;

fn push<T>(queue: &Queue<T>, delay: Duration, result: AuthResult<T>) {
    queue
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push_back(Scripted { delay, result });
}

async fn next<T>(queue: &Queue<T>) -> AuthResult<T> {
    let scripted = queue
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .pop_front();
    match scripted {
        Some(Scripted { delay, result }) => {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            result
        }
        None => Err(AuthFailure::new("no scripted response")),
    }
}

/// Mock auth API.
///
/// Cloning shares the queues and counters, so a test can keep a handle
/// while the code under test owns another.
#[derive(Clone, Default)]
pub struct MockAuthApi {
    logins: Queue<Session>,
    signups: Queue<Session>,
    profiles: Queue<UserProfile>,
    profile_calls: Arc<AtomicUsize>,
    logout_calls: Arc<AtomicUsize>,
    installed_token: Arc<Mutex<Option<Token>>>,
}

impl MockAuthApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_login(&self, result: AuthResult<Session>) {
        push(&self.logins, Duration::ZERO, result);
    }

    pub fn push_signup(&self, result: AuthResult<Session>) {
        push(&self.signups, Duration::ZERO, result);
    }

    pub fn push_profile(&self, result: AuthResult<UserProfile>) {
        push(&self.profiles, Duration::ZERO, result);
    }

    /// Queues a profile response that resolves only after `delay`.
    pub fn push_profile_after(&self, delay: Duration, result: AuthResult<UserProfile>) {
        push(&self.profiles, delay, result);
    }

    /// How many times `get_fresh_user_data` was called.
    pub fn profile_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }

    /// How many times `logout` was called.
    pub fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }

    /// The token most recently passed to `install_token`.
    pub fn installed_token(&self) -> Option<Token> {
        self.installed_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AuthApi for MockAuthApi {
    async fn login(&self, _credentials: &Credentials) -> AuthResult<Session> {
        next(&self.logins).await
    }

    async fn signup(&self, _user_data: &SignupRequest) -> AuthResult<Session> {
        next(&self.signups).await
    }

    async fn get_fresh_user_data(&self) -> AuthResult<UserProfile> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        next(&self.profiles).await
    }

    fn logout(&self) {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        *self
            .installed_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn install_token(&self, token: Option<&Token>) {
        *self
            .installed_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = token.cloned();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_responses_are_handed_out_in_order() {
        let api = MockAuthApi::new();
        api.push_profile(Ok(UserProfile {
            id: 1,
            ..UserProfile::default()
        }));
        api.push_profile(Err(AuthFailure::new("down").with_status(503)));

        assert_eq!(api.get_fresh_user_data().await.unwrap().id, 1);
        assert_eq!(api.get_fresh_user_data().await.unwrap_err().status, Some(503));
        assert_eq!(api.profile_calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_queue_is_a_failure() {
        let api = MockAuthApi::new();
        let result = api.login(&Credentials::new("a", "b")).await;
        assert!(result.is_err());
    }
}

//! Session persistence through a [`SessionStore`].
//!
//! Glue between the codec and a storage backend. [`restore_or_create`] is the
//! startup path a device runs: it implements the fallback for unreadable
//! state and makes sure the persisted secret never lags behind the calendar.

use crate::{env::Environment, error::SessionError, session::Session, storage::SessionStore};

/// Encode `session` and store it under `key`.
pub fn save_session<S: SessionStore>(
    store: &S,
    key: &str,
    session: &Session,
) -> Result<(), SessionError> {
    let bytes = session.to_bytes();
    store.store(key, &bytes)?;

    tracing::debug!(key, day = %session.day(), "Saved session");
    Ok(())
}

/// Load and decode the session stored under `key`.
///
/// Returns `Ok(None)` if nothing is stored under `key`.
///
/// # Errors
///
/// - `Storage`: the backend failed
/// - `Format`: stored bytes are not a valid session
pub fn restore_session<S: SessionStore>(
    store: &S,
    key: &str,
) -> Result<Option<Session>, SessionError> {
    let Some(bytes) = store.load(key)? else {
        return Ok(None);
    };

    Ok(Some(Session::restore(&bytes)?))
}

/// Restore the session under `key`, or start a fresh one.
///
/// - Nothing stored: create a fresh session for `env.today()`
/// - Stored bytes rejected by the codec: discard them and create a fresh
///   session (logged at warn)
/// - Restored session behind `env.today()`: advance it to today
/// - Restored session ahead of `env.today()`: keep it as is (the clock moved
///   backwards; the chain cannot)
///
/// The resulting session is saved back before returning, so the store never
/// keeps a secret older than the returned session's.
///
/// # Errors
///
/// - `Storage`: the backend failed; nothing is discarded
/// - `RandomSourceUnavailable`: a fresh session was needed but the random
///   source failed
pub fn restore_or_create<S: SessionStore, E: Environment>(
    store: &S,
    key: &str,
    env: &E,
) -> Result<Session, SessionError> {
    let today = env.today();

    let mut session = match restore_session(store, key) {
        Ok(Some(session)) => session,
        Ok(None) => {
            tracing::info!(key, "No persisted session, creating a fresh one");
            Session::create(env, today)?
        },
        Err(e) if e.is_recoverable_by_fresh_session() => {
            tracing::warn!(key, error = %e, "Discarding unreadable session state");
            Session::create(env, today)?
        },
        Err(e) => return Err(e),
    };

    if session.day() < today {
        session.advance(today)?;
    } else if session.day() > today {
        tracing::warn!(
            key,
            session_day = %session.day(),
            today = %today,
            "Persisted session is ahead of the clock"
        );
    }

    save_session(store, key, &session)?;
    Ok(session)
}

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::booking::{BookingEvent, BookingState, Transition};
use crate::error::{AppError, AppResult};

pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug)]
struct Session {
    state: BookingState,
    touched_at: Instant,
}

impl Session {
    fn new(state: BookingState) -> Self {
        Self {
            state,
            touched_at: Instant::now(),
        }
    }
}

/// In-progress bookings, kept only in memory. A session untouched for
/// longer than the idle TTL is dropped.
#[derive(Debug)]
pub struct BookingSessions {
    sessions: RwLock<HashMap<Uuid, Session>>,
    idle_ttl: Duration,
}

impl Default for BookingSessions {
    fn default() -> Self {
        Self::with_idle_ttl(DEFAULT_IDLE_TTL)
    }
}

impl BookingSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_ttl,
        }
    }

    pub fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    pub async fn create(&self, state: BookingState) -> Uuid {
        let id = Uuid::new_v4();
        let mut sessions = self.sessions.write().await;
        let expired = Self::evict_idle(&mut sessions, self.idle_ttl);
        sessions.insert(id, Session::new(state));
        tracing::debug!(booking_id = %id, expired, "Booking session opened");
        id
    }

    pub async fn get(&self, id: Uuid) -> AppResult<BookingState> {
        self.sessions
            .read()
            .await
            .get(&id)
            .filter(|session| session.touched_at.elapsed() < self.idle_ttl)
            .map(|session| session.state.clone())
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))
    }

    /// Drop every session idle for at least the TTL; returns how many went.
    pub async fn prune(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let expired = Self::evict_idle(&mut sessions, self.idle_ttl);
        if expired > 0 {
            tracing::info!(
                expired,
                remaining = sessions.len(),
                "Idle booking sessions dropped"
            );
        }
        expired
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn evict_idle(sessions: &mut HashMap<Uuid, Session>, idle_ttl: Duration) -> usize {
        let before = sessions.len();
        sessions.retain(|_, session| session.touched_at.elapsed() < idle_ttl);
        before - sessions.len()
    }

    /// Run one event through the reducer and store the resulting state.
    pub async fn apply(&self, id: Uuid, event: BookingEvent) -> AppResult<Transition> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .remove(&id)
            .filter(|session| session.touched_at.elapsed() < self.idle_ttl)
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        let from = session.state.step();
        let transition = session.state.apply(event);
        sessions.insert(id, Session::new(transition.state.clone()));

        match &transition.rejection {
            Some(reason) => tracing::info!(
                booking_id = %id,
                from,
                to = transition.state.step(),
                reason = %reason,
                "Booking event rejected"
            ),
            None => tracing::debug!(
                booking_id = %id,
                from,
                to = transition.state.step(),
                "Booking advanced"
            ),
        }

        Ok(transition)
    }

    pub async fn remove(&self, id: Uuid) -> AppResult<()> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_apply_stores_state_even_when_rejected() {
        let sessions = BookingSessions::new();
        let id = sessions.create(BookingState::new()).await;

        let transition = sessions
            .apply(id, BookingEvent::SetPassengers(4))
            .await
            .unwrap();
        assert_eq!(transition.rejection, None);
        assert_eq!(sessions.get(id).await.unwrap().passengers(), 4);

        let transition = sessions
            .apply(id, BookingEvent::SetPassengers(40))
            .await
            .unwrap();
        assert!(transition.rejection.is_some());
        assert_eq!(sessions.get(id).await.unwrap().passengers(), 4);
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let sessions = BookingSessions::new();

        assert!(matches!(
            sessions.get(Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            sessions.apply(Uuid::new_v4(), BookingEvent::Reset).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_remove() {
        let sessions = BookingSessions::new();
        let id = sessions.create(BookingState::new()).await;

        sessions.remove(id).await.unwrap();
        assert!(sessions.get(id).await.is_err());
    }

    #[tokio::test]
    async fn test_idle_sessions_expire() {
        let sessions = BookingSessions::with_idle_ttl(Duration::ZERO);
        let id = sessions.create(BookingState::new()).await;

        assert!(matches!(sessions.get(id).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            sessions.apply(id, BookingEvent::Reset).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(sessions.count().await, 0);

        sessions.create(BookingState::new()).await;
        assert_eq!(sessions.prune().await, 1);
        assert_eq!(sessions.count().await, 0);
    }

    #[tokio::test]
    async fn test_create_evicts_abandoned_sessions() {
        let sessions = BookingSessions::with_idle_ttl(Duration::from_millis(20));
        for _ in 0..5 {
            sessions.create(BookingState::new()).await;
        }
        assert_eq!(sessions.count().await, 5);

        tokio::time::sleep(Duration::from_millis(40)).await;
        let id = sessions.create(BookingState::new()).await;

        assert_eq!(sessions.count().await, 1);
        assert!(sessions.get(id).await.is_ok());
        assert_eq!(sessions.prune().await, 0);
    }
}

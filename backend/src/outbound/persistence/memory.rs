//! In-memory adapters for tests and database-less development runs.
//!
//! The store assigns sequential ids the way the SQL schema's serial columns
//! do, so handler behaviour is identical across backends.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{
    LoginService, ResultRepository, ResultRepositoryError, UserPersistenceError, UserRepository,
};
use crate::domain::{
    DomainError, Email, EmailValidationError, Identity, LoginCredentials, ResultDraft,
    ResultEntry, Role, UNAUTHORIZED_MESSAGE, User,
};

struct StoredUser {
    user: User,
    password: String,
}

/// Shared backing store for the in-memory adapters.
#[derive(Default)]
pub struct InMemoryStore {
    users: Mutex<Vec<StoredUser>>,
    results: Mutex<Vec<ResultEntry>>,
    next_user_id: AtomicI32,
    next_result_id: AtomicI32,
}

impl InMemoryStore {
    /// Register a user with the given credentials and roles.
    pub fn seed_user(
        &self,
        email: &str,
        password: &str,
        roles: Vec<Role>,
    ) -> Result<User, EmailValidationError> {
        let email = Email::new(email)?;
        let id = self.next_user_id.fetch_add(1, Ordering::SeqCst) + 1;
        let user = User::new(id, email, roles);
        self.users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(StoredUser {
                user: user.clone(),
                password: password.to_owned(),
            });
        Ok(user)
    }
}

/// In-memory implementation of the result repository port.
#[derive(Clone)]
pub struct MemoryResultRepository {
    store: Arc<InMemoryStore>,
}

impl MemoryResultRepository {
    /// Create a repository backed by the shared store.
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ResultRepository for MemoryResultRepository {
    async fn find(&self, id: i32) -> Result<Option<ResultEntry>, ResultRepositoryError> {
        let results = self
            .store
            .results
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(results.iter().find(|entry| entry.id() == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<ResultEntry>, ResultRepositoryError> {
        let results = self
            .store
            .results
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Insertion order is id order: ids ascend and removals keep it sorted.
        Ok(results.clone())
    }

    async fn find_by_user(
        &self,
        user_id: i32,
    ) -> Result<Vec<ResultEntry>, ResultRepositoryError> {
        let results = self
            .store
            .results
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(results
            .iter()
            .filter(|entry| entry.user().id() == user_id)
            .cloned()
            .collect())
    }

    async fn add(&self, draft: &ResultDraft) -> Result<ResultEntry, ResultRepositoryError> {
        let id = self.store.next_result_id.fetch_add(1, Ordering::SeqCst) + 1;
        let entry = ResultEntry::new(id, draft.result, draft.user.clone(), draft.time);
        self.store
            .results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.clone());
        Ok(entry)
    }

    async fn save(&self, entry: &ResultEntry) -> Result<(), ResultRepositoryError> {
        let mut results = self
            .store
            .results
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = results.iter_mut().find(|stored| stored.id() == entry.id()) {
            *slot = entry.clone();
        }
        Ok(())
    }

    async fn remove(&self, id: i32) -> Result<bool, ResultRepositoryError> {
        let mut results = self
            .store
            .results
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = results.len();
        results.retain(|entry| entry.id() != id);
        Ok(results.len() != before)
    }
}

/// In-memory implementation of the user repository port.
#[derive(Clone)]
pub struct MemoryUserRepository {
    store: Arc<InMemoryStore>,
}

impl MemoryUserRepository {
    /// Create a repository backed by the shared store.
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, UserPersistenceError> {
        let users = self
            .store
            .users
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(users
            .iter()
            .find(|stored| stored.user.id() == id)
            .map(|stored| stored.user.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserPersistenceError> {
        let users = self
            .store
            .users
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(users
            .iter()
            .find(|stored| stored.user.email().as_ref() == email)
            .map(|stored| stored.user.clone()))
    }
}

/// In-memory implementation of the login port.
#[derive(Clone)]
pub struct MemoryLoginService {
    store: Arc<InMemoryStore>,
}

impl MemoryLoginService {
    /// Create a service backed by the shared store.
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl LoginService for MemoryLoginService {
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<Identity, DomainError> {
        let users = self
            .store
            .users
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        users
            .iter()
            .find(|stored| {
                stored.user.email().as_ref() == credentials.email()
                    && stored.password == credentials.password()
            })
            .map(|stored| Identity::from(&stored.user))
            .ok_or_else(|| DomainError::unauthorized(UNAUTHORIZED_MESSAGE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::{fixture, rstest};

    #[fixture]
    fn store() -> Arc<InMemoryStore> {
        Arc::new(InMemoryStore::default())
    }

    fn draft(user: &User, result: i32) -> ResultDraft {
        ResultDraft {
            result,
            user: user.clone(),
            time: Utc::now(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn add_assigns_sequential_ids(store: Arc<InMemoryStore>) {
        let user = store
            .seed_user("a@b.com", "secret", vec![Role::User])
            .expect("seed user");
        let repo = MemoryResultRepository::new(store);

        let first = repo.add(&draft(&user, 1)).await.expect("first add");
        let second = repo.add(&draft(&user, 2)).await.expect("second add");

        assert_eq!(first.id(), 1);
        assert_eq!(second.id(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn remove_reports_whether_a_row_existed(store: Arc<InMemoryStore>) {
        let user = store
            .seed_user("a@b.com", "secret", vec![Role::User])
            .expect("seed user");
        let repo = MemoryResultRepository::new(store);
        let entry = repo.add(&draft(&user, 1)).await.expect("add");

        assert!(repo.remove(entry.id()).await.expect("remove existing"));
        assert!(!repo.remove(entry.id()).await.expect("remove missing"));
        assert!(repo.find(entry.id()).await.expect("find").is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn find_by_user_filters_ownership(store: Arc<InMemoryStore>) {
        let first = store
            .seed_user("a@b.com", "secret", vec![Role::User])
            .expect("seed first");
        let second = store
            .seed_user("c@d.com", "secret", vec![Role::User])
            .expect("seed second");
        let repo = MemoryResultRepository::new(store);
        repo.add(&draft(&first, 1)).await.expect("add first");
        repo.add(&draft(&second, 2)).await.expect("add second");

        let owned = repo.find_by_user(first.id()).await.expect("find by user");
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].user().id(), first.id());
    }

    #[rstest]
    #[tokio::test]
    async fn save_replaces_the_stored_entry(store: Arc<InMemoryStore>) {
        let user = store
            .seed_user("a@b.com", "secret", vec![Role::User])
            .expect("seed user");
        let repo = MemoryResultRepository::new(store);
        let mut entry = repo.add(&draft(&user, 1)).await.expect("add");

        entry.set_result(9);
        repo.save(&entry).await.expect("save");

        let found = repo
            .find(entry.id())
            .await
            .expect("find")
            .expect("entry present");
        assert_eq!(found.result(), 9);
    }

    #[rstest]
    #[tokio::test]
    async fn login_checks_email_and_password(store: Arc<InMemoryStore>) {
        store
            .seed_user("a@b.com", "secret", vec![Role::User])
            .expect("seed user");
        let service = MemoryLoginService::new(store);

        let good = LoginCredentials::try_from_parts("a@b.com", "secret").expect("credentials");
        let identity = service.authenticate(&good).await.expect("valid login");
        assert_eq!(identity.email().as_ref(), "a@b.com");

        let bad = LoginCredentials::try_from_parts("a@b.com", "wrong").expect("credentials");
        let err = service.authenticate(&bad).await.expect_err("invalid login");
        assert_eq!(err.message(), UNAUTHORIZED_MESSAGE);
    }
}

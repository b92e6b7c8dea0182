//! JSON ファイル版 UserRepository（`users.json`）

use std::path::Path;

use async_trait::async_trait;

use super::collection::JsonCollection;
use crate::domain::{RepositoryError, User, UserRepository, Username};

pub const USERS_FILE: &str = "users.json";

pub struct JsonUserRepository {
    users: JsonCollection<User>,
}

impl JsonUserRepository {
    pub async fn open(data_dir: &Path) -> Result<Self, RepositoryError> {
        Ok(Self {
            users: JsonCollection::open("users", data_dir.join(USERS_FILE)).await?,
        })
    }

    pub fn in_memory() -> Self {
        Self {
            users: JsonCollection::in_memory("users"),
        }
    }
}

#[async_trait]
impl UserRepository for JsonUserRepository {
    async fn add(&self, user: User) -> Result<bool, RepositoryError> {
        self.users
            .mutate(|users| {
                if users.iter().any(|u| u.username == user.username) {
                    return false;
                }
                users.push(user);
                true
            })
            .await
    }

    async fn find_by_username(&self, username: &Username) -> Option<User> {
        self.users.find(|u| &u.username == username).await
    }

    async fn find_by_email(&self, email: &str) -> Option<User> {
        self.users.find(|u| u.email == email).await
    }

    async fn update(&self, user: User) -> Result<bool, RepositoryError> {
        self.users
            .mutate(|users| match users.iter_mut().find(|u| u.username == user.username) {
                Some(slot) => {
                    *slot = user;
                    true
                }
                None => false,
            })
            .await
    }

    async fn list(&self) -> Vec<User> {
        self.users.snapshot().await
    }
}

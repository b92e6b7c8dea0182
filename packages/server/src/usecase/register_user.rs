//! UseCase: ユーザー登録
//!
//! 入力チェックは「空白 → 長さ → パスワード → メール → ユーザー名重複 → メール重複」
//! の順で行い、最初に該当したものを返す。

use std::sync::Arc;

use crate::domain::{User, UserRepository, Username};

use super::error::RegisterError;

const USERNAME_MIN_LEN: usize = 3;
const USERNAME_MAX_LEN: usize = 20;
const PASSWORD_MIN_LEN: usize = 6;

/// ユーザー登録のユースケース
pub struct RegisterUserUseCase {
    users: Arc<dyn UserRepository>,
}

impl RegisterUserUseCase {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// 新しいユーザーを登録する（オフライン、Room 未所属）
    pub async fn execute(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<User, RegisterError> {
        if username.contains(' ') {
            return Err(RegisterError::UsernameHasSpace);
        }
        let length = username.chars().count();
        if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&length) {
            return Err(RegisterError::UsernameLength);
        }
        if password.chars().count() < PASSWORD_MIN_LEN {
            return Err(RegisterError::PasswordTooShort);
        }
        if !email.contains('@') {
            return Err(RegisterError::InvalidEmail);
        }

        let username =
            Username::new(username.to_string()).map_err(|_| RegisterError::UsernameLength)?;
        if self.users.find_by_username(&username).await.is_some() {
            return Err(RegisterError::UsernameTaken);
        }
        if self.users.find_by_email(email).await.is_some() {
            return Err(RegisterError::EmailTaken);
        }

        let user = User::new(username, password.to_string(), email.to_string());
        // 確認と追加の間に同名の登録が割り込んだ場合
        if !self.users.add(user.clone()).await? {
            return Err(RegisterError::UsernameTaken);
        }
        tracing::info!("Registered user '{}'", user.username);
        Ok(user)
    }
}

//! Session authentication: a fixed user directory, signed session tokens and the cookie that carries them.

pub mod cookie;
pub mod token;

use serde::{Deserialize, Serialize};

pub use cookie::{TOKEN_COOKIE, clear_session_cookie, read_cookie, session_cookie};
pub use token::{Claims, TokenService};

/// Identity carried by a session token and inserted into request extensions by the route guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: String,
}

struct Account {
    id: &'static str,
    username: &'static str,
    password: &'static str,
    email: &'static str,
    role: &'static str,
}

// Plaintext demo accounts. Not a credential store.
const ACCOUNTS: [Account; 2] = [
    Account {
        id: "1",
        username: "admin",
        password: "123456",
        email: "admin@example.com",
        role: "admin",
    },
    Account {
        id: "2",
        username: "user",
        password: "123456",
        email: "user@example.com",
        role: "user",
    },
];

/// Looks up an account by exact username and password.
pub fn authenticate(username: &str, password: &str) -> Option<UserInfo> {
    ACCOUNTS
        .iter()
        .find(|account| account.username == username && account.password == password)
        .map(|account| UserInfo {
            id: account.id.to_string(),
            username: account.username.to_string(),
            email: Some(account.email.to_string()),
            role: account.role.to_string(),
        })
}

use super::session::Role;

pub const INVALID_CREDENTIALS: &str = "Invalid credentials. Try admin/admin123 or viewer/viewer123";

const ACCOUNTS: [(&str, &str, Role); 2] = [
    ("admin", "admin123", Role::Admin),
    ("viewer", "viewer123", Role::Viewer),
];

/// Checks a username/password pair against the built-in demo accounts.
///
/// Unknown users and wrong passwords are not told apart.
pub fn authenticate(username: &str, password: &str) -> Option<Role> {
    ACCOUNTS
        .iter()
        .find(|(u, p, _)| *u == username && *p == password)
        .map(|(_, _, role)| *role)
}

//! User display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::User;

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Role")]
    role: String,
}

/// Format users as a table
pub fn format_user_list(users: &[User]) -> String {
    if users.is_empty() {
        return "No users found.".to_string();
    }

    let rows = users.iter().map(|u| UserRow {
        id: u.id.to_string(),
        name: u.name.clone(),
        email: u.email.clone(),
        role: u.role.to_string(),
    });
    Table::new(rows).with(Style::psql()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn test_format_user_list() {
        let users = vec![
            User::new("Ada", "ada@example.com", Role::Admin),
            User::new("Mia", "mia@example.com", Role::Member),
        ];
        let output = format_user_list(&users);
        assert!(output.contains("ada@example.com"));
        assert!(output.contains("member"));
        assert!(output.contains("Role"));
    }

    #[test]
    fn test_empty() {
        assert_eq!(format_user_list(&[]), "No users found.");
    }
}

//! Input rules shared by the user and todo services.

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 50;
pub const MIN_PASSWORD_LENGTH: usize = 8;
/// bcrypt ignores input past 72 bytes
pub const MAX_PASSWORD_BYTES: usize = 72;
pub const MAX_TODO_LENGTH: usize = 500;

pub fn validate_username_format(username: &str) -> Result<(), String> {
    let length = username.chars().count();

    if username.is_empty() {
        return Err("Username cannot be empty".to_string());
    }

    if length < MIN_USERNAME_LENGTH {
        return Err(format!("Username must be at least {} characters", MIN_USERNAME_LENGTH));
    }

    if length > MAX_USERNAME_LENGTH {
        return Err(format!("Username must be at most {} characters", MAX_USERNAME_LENGTH));
    }

    // Allow alphanumeric, underscore, hyphen
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err("Username can only contain letters, numbers, underscore, and hyphen".to_string());
    }

    if !username.starts_with(|c: char| c.is_ascii_alphanumeric()) {
        return Err("Username must start with a letter or number".to_string());
    }

    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH));
    }

    if password.len() > MAX_PASSWORD_BYTES {
        return Err(format!("Password must be at most {} bytes", MAX_PASSWORD_BYTES));
    }

    Ok(())
}

/// Trimmed todo text, or why it was refused
pub fn normalize_todo_text(text: &str) -> Result<String, String> {
    let text = text.trim();

    if text.is_empty() {
        return Err("Todo text cannot be empty".to_string());
    }

    if text.chars().count() > MAX_TODO_LENGTH {
        return Err(format!("Todo text must be at most {} characters", MAX_TODO_LENGTH));
    }

    Ok(text.to_string())
}

use crate::error::{PlayerError, PlayerResult};

/// Identifies one live connection. Freshly generated per connection, never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        SessionId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Implement Display so we can use it in format strings
impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Song names come straight from request paths, so they must stay a plain
/// file name inside the audio directory. Dots inside a name are fine
/// (`Wait... What.mp3`); only the `.` and `..` entries themselves are refused.
pub fn validate_song_name(name: &str) -> PlayerResult<&str> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);

    if invalid {
        return Err(PlayerError::InvalidSongName(name.to_string()));
    }
    Ok(name)
}

pub fn validate_source_url(url: Option<&str>) -> PlayerResult<&str> {
    let url = url.map(str::trim).filter(|u| !u.is_empty()).ok_or(PlayerError::MissingSourceUrl)?;

    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(PlayerError::InvalidSourceUrl(url.to_string()));
    }
    Ok(url)
}

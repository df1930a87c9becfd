use clap::ValueEnum;
use std::str::FromStr;

pub enum Auth {
    /// Use an OAuth2 access token via the Authorization header
    Bearer(String),
    /// Talk to the Firestore emulator, which accepts the `owner` token
    Emulator,
    /// Don't use any authentication
    None,
}

impl Auth {
    pub fn new(r#type: &AuthType, token: Option<String>) -> Self {
        match (r#type, token) {
            (AuthType::Bearer, Some(token)) => Self::Bearer(token),
            (AuthType::Emulator, _) => Self::Emulator,
            (AuthType::None, _) | _ => Self::None,
        }
    }

    /// Value for the Authorization header, if any
    pub fn header_value(&self) -> Option<String> {
        match self {
            Self::Bearer(token) => Some(format!("Bearer {}", token)),
            Self::Emulator => Some("Bearer owner".to_string()),
            Self::None => None,
        }
    }
}

impl std::fmt::Display for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearer(_) => write!(f, "Bearer"),
            Self::Emulator => write!(f, "Emulator"),
            Self::None => write!(f, "None"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, ValueEnum)]
pub enum AuthType {
    Bearer,
    Emulator,
    None,
}

impl FromStr for AuthType {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bearer" => Ok(Self::Bearer),
            "emulator" => Ok(Self::Emulator),
            "none" => Ok(Self::None),
            _ => Err(()),
        }
    }
}

//! Backend credentials read from the process environment.
//!
//! A `.env` file in the working directory is honoured (via `dotenvy`) before
//! the lookup, so local setups can keep tokens out of `settings.toml`.

/// Gemini API key.
pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
/// Key for OpenAI-compatible story backends.
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// Hugging Face token names, in lookup order.
pub const HF_TOKEN_VARS: [&str; 3] = ["HF_TOKEN", "HUGGINGFACE_API_TOKEN", "HUGGINGFACEHUB_API_TOKEN"];

/// Tokens discovered at startup.  Empty values count as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Credentials {
    pub google_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    /// Used by the speech backend (required) and the caption backend (optional).
    pub hf_token: Option<String>,
}

impl Credentials {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => log::debug!("config: loaded {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => log::warn!("config: ignoring unreadable .env: {e}"),
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve credentials through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            google_api_key: get(GOOGLE_API_KEY),
            openai_api_key: get(OPENAI_API_KEY),
            hf_token: HF_TOKEN_VARS.iter().find_map(|name| get(*name)),
        }
    }
}

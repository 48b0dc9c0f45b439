use anyhow::{Context, Result};

/// Folder the gallery lives under when `CLOUDINARY_FOLDER` is not set.
pub const DEFAULT_FOLDER: &str = "festa_tios";

/// Immutable service configuration, resolved once at startup from the
/// environment and passed by reference through the router state.
#[derive(Debug, Clone)]
pub struct Config {
    pub cloudinary: CloudinaryConfig,
    pub captions: CaptionConfig,
    /// Preferred caption font. Falls back to the embedded face when missing.
    pub font_path: String,
    pub bind_address: String,
}

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
    /// Overridable so tests can point the client at an unroutable address.
    pub api_base: String,
}

/// The two static caption lines. The date line is computed per upload.
#[derive(Debug, Clone)]
pub struct CaptionConfig {
    pub title: String,
    pub names: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| get(key).with_context(|| format!("{key} is not set"));
        Ok(Self {
            cloudinary: CloudinaryConfig {
                cloud_name: required("CLOUD_NAME")?,
                api_key: required("CLOUD_API_KEY")?,
                api_secret: required("CLOUD_API_SECRET")?,
                folder: get("CLOUDINARY_FOLDER").unwrap_or_else(|| DEFAULT_FOLDER.to_string()),
                api_base: get("CLOUDINARY_API_BASE")
                    .unwrap_or_else(|| "https://api.cloudinary.com".to_string()),
            },
            captions: CaptionConfig {
                title: get("CAPTION_TITLE").unwrap_or_else(|| "Bodas de Ouro".to_string()),
                names: get("CAPTION_NAMES").unwrap_or_else(|| "Jonas e Cleide".to_string()),
            },
            font_path: get("FONT_PATH").unwrap_or_else(|| "font.ttf".to_string()),
            bind_address: get("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn creds() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("CLOUD_NAME", "demo"),
            ("CLOUD_API_KEY", "key"),
            ("CLOUD_API_SECRET", "secret"),
        ])
    }

    #[test]
    fn defaults_fill_everything_but_credentials() {
        let vars = creds();
        let cfg = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.cloudinary.cloud_name, "demo");
        assert_eq!(cfg.cloudinary.folder, DEFAULT_FOLDER);
        assert_eq!(cfg.captions.title, "Bodas de Ouro");
        assert_eq!(cfg.captions.names, "Jonas e Cleide");
        assert_eq!(cfg.font_path, "font.ttf");
        assert_eq!(cfg.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn missing_credentials_abort_startup() {
        let mut vars = creds();
        vars.remove("CLOUD_API_SECRET");
        let err = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap_err();
        assert!(err.to_string().contains("CLOUD_API_SECRET"));
    }

    #[test]
    fn environment_overrides_win() {
        let mut vars = creds();
        vars.insert("CLOUDINARY_FOLDER", "casamento");
        vars.insert("CAPTION_TITLE", "Bodas de Prata");
        let cfg = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.cloudinary.folder, "casamento");
        assert_eq!(cfg.captions.title, "Bodas de Prata");
    }
}

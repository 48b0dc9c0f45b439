use rusttype::Font;
use std::path::Path;

const DEFAULT_FONT_DATA: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");

/// Caption font resolved once at startup. Loading never fails: when the
/// configured font file is missing or unparsable, the embedded DejaVu Sans
/// takes over. The variant records which branch was taken.
pub enum CaptionFont {
    Loaded(Font<'static>),
    Fallback(Font<'static>),
}

impl CaptionFont {
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read(path).ok().and_then(Font::try_from_vec) {
            Some(font) => {
                tracing::info!(path = %path.display(), "caption font loaded");
                CaptionFont::Loaded(font)
            }
            None => {
                tracing::warn!(
                    path = %path.display(),
                    "caption font missing or unreadable, using embedded fallback"
                );
                CaptionFont::Fallback(embedded())
            }
        }
    }

    /// The usable face, whichever way loading went. One face serves all
    /// caption sizes; scaling happens at render time.
    pub fn font(&self) -> &Font<'static> {
        match self {
            CaptionFont::Loaded(f) | CaptionFont::Fallback(f) => f,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, CaptionFont::Fallback(_))
    }
}

fn embedded() -> Font<'static> {
    Font::try_from_bytes(DEFAULT_FONT_DATA).expect("embedded font parses")
}

/// Options that control how the built-in Whisper transcriber runs.
///
/// This struct represents *library-level configuration*, not CLI flags directly. The CLI is
/// responsible for mapping user input into this type so other frontends can construct it
/// programmatically.
#[derive(Debug, Clone, Default)]
pub struct TranscribeOpts {
    /// Whether to translate speech to English instead of transcribing verbatim.
    ///
    /// The lexicon is English, so this is mostly useful when the source is dubbed or mixed.
    pub enable_translate_to_english: bool,

    /// Optional language hint (e.g. `"en"`, `"es"`).
    ///
    /// When `None`, we allow Whisper to auto-detect the spoken language.
    pub language: Option<String>,
}

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use hush::interval_encoder::{IntervalEncoder, encode_all};
use hush::json_array_encoder::JsonArrayEncoder;
use hush::merge::MergedInterval;
use hush::opts::TranscribeOpts;
use hush::output_type::OutputType;
use hush::vtt_encoder::VttEncoder;
use hush::{
    FilterSettings, Ffmpeg, JsonTranscriber, Lexicon, Pipeline, PipelineConfig, Transcriber,
    WhisperTranscriber,
};

fn main() -> Result<()> {
    hush::logging::init();
    let params = get_params()?;

    let lexicon = load_lexicon(params.lexicon_path.as_deref())?;
    if params.list_categories {
        return list_categories(&lexicon);
    }

    let input = params
        .input_path
        .as_deref()
        .context("--input is required unless --list-categories is given")?;
    let settings = build_settings(&params)?;

    let transcriber: Box<dyn Transcriber> = match (&params.transcript_path, &params.model_path) {
        (Some(path), _) => Box::new(JsonTranscriber::new(path)),
        (None, Some(model)) => {
            let opts = TranscribeOpts {
                enable_translate_to_english: params.enable_translation_to_english,
                language: params.language.clone(),
            };
            Box::new(WhisperTranscriber::new(model, opts)?)
        }
        (None, None) => anyhow::bail!("either --model or --transcript must be given"),
    };

    let media = match &params.ffmpeg_path {
        Some(program) => Ffmpeg::with_program(program),
        None => Ffmpeg::new(),
    }
    .with_log_level(params.ffmpeg_log_level.as_str());
    media.locate()?;

    let work_dir = params
        .work_dir
        .clone()
        .unwrap_or_else(|| PipelineConfig::default().work_dir);
    let config = PipelineConfig::new(work_dir, &params.output_dir)
        .keep_intermediates(params.keep_intermediates);

    let pipeline = Pipeline::new(config, Arc::new(lexicon), transcriber, media);
    let report = pipeline.run(input, &settings)?;

    if let Some(audit_path) = &params.audit_path {
        write_audit(audit_path, params.audit_format, &report.intervals)?;
    }

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    serde_json::to_writer_pretty(&mut writer, &report)?;
    writeln!(writer)?;
    writer.flush()?;

    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "hush")]
#[command(about = "Mute spoken profanity in a video")]
struct Params {
    /// Video file to clean.
    #[arg(short = 'i', long = "input")]
    pub input_path: Option<PathBuf>,

    /// whisper.cpp model file.
    #[arg(short = 'm', long = "model")]
    pub model_path: Option<PathBuf>,

    /// Replay a saved JSON transcript instead of running Whisper.
    #[arg(long = "transcript", conflicts_with = "model_path")]
    pub transcript_path: Option<PathBuf>,

    #[arg(short = 'o', long = "output-dir", default_value = ".")]
    pub output_dir: PathBuf,

    /// Scratch space for extracted audio and intermediate video.
    #[arg(long = "work-dir")]
    pub work_dir: Option<PathBuf>,

    #[arg(long = "keep-intermediates", default_value_t = false)]
    pub keep_intermediates: bool,

    /// JSON file with `enabled_categories`, `word_padding`, `confidence_threshold`.
    #[arg(short = 's', long = "settings")]
    pub settings_path: Option<PathBuf>,

    /// Category to enable; repeat to enable several. Replaces the configured list.
    #[arg(short = 'c', long = "category")]
    pub categories: Vec<String>,

    /// Seconds added before and after each matched word.
    #[arg(short = 'p', long = "padding")]
    pub word_padding: Option<f64>,

    /// Minimum word confidence, 0 disables the gate.
    #[arg(long = "threshold")]
    pub confidence_threshold: Option<f32>,

    /// JSON lexicon replacing the built-in categories.
    #[arg(long = "lexicon")]
    pub lexicon_path: Option<PathBuf>,

    #[arg(long = "list-categories", default_value_t = false)]
    pub list_categories: bool,

    #[arg(short = 'l', long = "language")]
    pub language: Option<String>,

    #[arg(
        short = 't',
        long = "enable-translation-to-english",
        default_value_t = false
    )]
    pub enable_translation_to_english: bool,

    /// Also write the muted intervals to this file.
    #[arg(long = "audit")]
    pub audit_path: Option<PathBuf>,

    #[arg(long = "audit-format", value_enum, default_value_t = OutputType::Json)]
    pub audit_format: OutputType,

    /// ffmpeg executable to use instead of the one on `PATH`.
    #[arg(long = "ffmpeg")]
    pub ffmpeg_path: Option<PathBuf>,

    /// ffmpeg `-v` level; raise it to see more in failure diagnostics.
    #[arg(long = "ffmpeg-log-level", default_value = "error")]
    pub ffmpeg_log_level: String,
}

fn get_params() -> Result<Params> {
    Ok(Params::parse())
}

fn load_lexicon(path: Option<&Path>) -> Result<Lexicon> {
    let Some(path) = path else {
        return Ok(Lexicon::builtin());
    };

    let file = File::open(path)
        .with_context(|| format!("failed to open lexicon '{}'", path.display()))?;
    Lexicon::from_json_reader(BufReader::new(file))
        .with_context(|| format!("failed to load lexicon '{}'", path.display()))
}

fn build_settings(params: &Params) -> Result<FilterSettings> {
    let mut settings = match &params.settings_path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open settings '{}'", path.display()))?;
            FilterSettings::from_json_reader(BufReader::new(file))?
        }
        None => FilterSettings::default(),
    };

    if !params.categories.is_empty() {
        settings = settings.with_categories(params.categories.iter().cloned());
    }
    if let Some(padding) = params.word_padding {
        settings = settings.with_word_padding(padding);
    }
    if let Some(threshold) = params.confidence_threshold {
        settings = settings.with_confidence_threshold(threshold);
    }

    settings.validate()?;
    Ok(settings)
}

fn list_categories(lexicon: &Lexicon) -> Result<()> {
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    for id in lexicon.categories() {
        let count = lexicon.phrases(id).map_or(0, <[String]>::len);
        writeln!(writer, "{id}\t{count}")?;
    }
    writer.flush()?;
    Ok(())
}

fn write_audit(path: &Path, format: OutputType, intervals: &[MergedInterval]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create audit file '{}'", path.display()))?;
    let writer = BufWriter::new(file);

    let mut encoder: Box<dyn IntervalEncoder> = match format {
        OutputType::Json => Box::new(JsonArrayEncoder::new(writer)),
        OutputType::Vtt => Box::new(VttEncoder::new(writer)),
    };

    encode_all(&mut *encoder, intervals)?;
    Ok(())
}

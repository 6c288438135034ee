//! Speech synthesis module.
//!
//! Turns request text into an audio file through an external engine.
//!
//! Backends:
//!
//! - `espeak` (default): runs a local `espeak-ng` binary, writes WAV
//! - `openai`: calls an OpenAI-compatible `/audio/speech` endpoint, writes MP3

mod config;
mod error;
mod espeak;
mod openai;
mod traits;
mod types;

pub use config::{EspeakConfig, OpenAiConfig, SynthesizerBackend, SynthesizerConfig};
pub use error::SynthesisError;
pub use espeak::EspeakSynthesizer;
pub use openai::OpenAiSynthesizer;
pub use traits::SpeechSynthesizer;
pub use types::{AudioFormat, SynthesisResult};

/// Create a synthesizer for the configured backend.
pub fn create_synthesizer(
    config: &SynthesizerConfig,
) -> Result<Box<dyn SpeechSynthesizer>, SynthesisError> {
    match config.backend {
        SynthesizerBackend::Espeak => Ok(Box::new(EspeakSynthesizer::new(config.espeak.clone()))),
        SynthesizerBackend::Openai => Ok(Box::new(OpenAiSynthesizer::new(config.openai.clone())?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_espeak_synthesizer() {
        let synth = create_synthesizer(&SynthesizerConfig::default()).unwrap();
        assert_eq!(synth.name(), "espeak");
        assert_eq!(synth.audio_format(), AudioFormat::Wav);
    }

    #[test]
    fn test_create_openai_synthesizer() {
        let mut config = SynthesizerConfig::default();
        config.backend = SynthesizerBackend::Openai;
        config.openai.api_key = Some("sk-test".to_string());

        let synth = create_synthesizer(&config).unwrap();
        assert_eq!(synth.name(), "openai");
        assert_eq!(synth.audio_format(), AudioFormat::Mp3);
    }

    #[test]
    fn test_create_openai_without_key_fails() {
        let mut config = SynthesizerConfig::default();
        config.backend = SynthesizerBackend::Openai;

        let result = create_synthesizer(&config);
        assert!(matches!(result, Err(SynthesisError::Config { .. })));
    }
}

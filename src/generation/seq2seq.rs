//! Seq2seq answer generator (T5 family) with an extractive stub backend.

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::t5::{self, T5ForConditionalGeneration};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokenizers::Tokenizer;
use tracing::{debug, info, instrument, warn};

use super::TextGenerator;
use super::beam::{BeamSearchConfig, LENGTH_PENALTY, beam_search};
use super::config::{GenerationParams, GeneratorConfig};
use super::error::GenerationError;
use crate::embedding::device::{device_label, select_device};
use crate::embedding::utils::load_tokenizer;

struct T5Runtime {
    model: Mutex<T5ForConditionalGeneration>,
    tokenizer: Tokenizer,
    device: Device,
    start_token: u32,
    eos_token: u32,
}

enum GeneratorBackend {
    Model(Box<T5Runtime>),
    Stub,
}

/// Answer generator backed by a T5 encoder-decoder.
pub struct Seq2SeqGenerator {
    backend: GeneratorBackend,
    config: GeneratorConfig,
}

impl std::fmt::Debug for Seq2SeqGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let backend = match &self.backend {
            GeneratorBackend::Model(runtime) => format!("Model({})", device_label(&runtime.device)),
            GeneratorBackend::Stub => "Stub".to_string(),
        };
        f.debug_struct("Seq2SeqGenerator")
            .field("backend", &backend)
            .field("model_dir", &self.config.model_dir)
            .finish()
    }
}

impl Seq2SeqGenerator {
    pub fn load(config: GeneratorConfig) -> Result<Self, GenerationError> {
        config.validate()?;

        if config.testing_stub {
            warn!("Generator running in STUB mode (testing only)");
            return Ok(Self::stub());
        }

        let device = select_device();

        let config_content = std::fs::read_to_string(config.model_dir.join("config.json"))?;
        let mut model_config: t5::Config = serde_json::from_str(&config_content).map_err(|e| {
            GenerationError::ModelLoadFailed {
                reason: format!("Failed to parse config: {e}"),
            }
        })?;
        // Every step re-feeds the whole decoder sequence of each beam.
        model_config.use_cache = false;

        let weights_path = config.model_dir.join("model.safetensors");
        let vb =
            unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)? };
        let model = T5ForConditionalGeneration::load(vb, &model_config).map_err(|e| {
            GenerationError::ModelLoadFailed {
                reason: format!("Failed to load T5 model: {e}"),
            }
        })?;

        let mut tokenizer = load_tokenizer(&config.model_dir).map_err(|e| {
            GenerationError::TokenizationFailed {
                reason: format!("Failed to load tokenizer: {e}"),
            }
        })?;
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(None)
            .map_err(|e| GenerationError::TokenizationFailed {
                reason: e.to_string(),
            })?;

        let start_token = model_config
            .decoder_start_token_id
            .unwrap_or(model_config.pad_token_id) as u32;
        let eos_token = model_config.eos_token_id as u32;

        info!(
            model_dir = %config.model_dir.display(),
            device = device_label(&device),
            vocab_size = model_config.vocab_size,
            "Seq2seq generator loaded"
        );

        Ok(Self {
            backend: GeneratorBackend::Model(Box::new(T5Runtime {
                model: Mutex::new(model),
                tokenizer,
                device,
                start_token,
                eos_token,
            })),
            config,
        })
    }

    pub fn stub() -> Self {
        Self {
            backend: GeneratorBackend::Stub,
            config: GeneratorConfig::stub(),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn generate_with_model(
        &self,
        runtime: &T5Runtime,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, GenerationError> {
        let encoding = runtime.tokenizer.encode(prompt, true).map_err(|e| {
            GenerationError::TokenizationFailed {
                reason: e.to_string(),
            }
        })?;
        let input_ids = truncate_prompt(
            encoding.get_ids().to_vec(),
            params.max_input_tokens,
            runtime.eos_token,
        );
        debug!(prompt_tokens = input_ids.len(), "Encoding prompt");

        let device = &runtime.device;
        let mut model = runtime.model.lock();
        model.clear_kv_cache();

        let input = Tensor::new(input_ids.as_slice(), device)?.unsqueeze(0)?;
        let encoder_output = model.encode(&input)?;
        let (_, src_len, hidden) = encoder_output.dims3()?;

        let beam_config = BeamSearchConfig {
            num_beams: params.num_beams,
            max_length: params.max_length,
            temperature: params.temperature,
            do_sample: params.do_sample,
            eos_token_id: runtime.eos_token,
            length_penalty: LENGTH_PENALTY,
        };
        let mut rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let best = beam_search(runtime.start_token, &beam_config, &mut rng, |sequences| {
            let rows = sequences
                .iter()
                .map(|seq| Tensor::new(seq.as_slice(), device))
                .collect::<candle_core::Result<Vec<_>>>()?;
            let decoder_ids = Tensor::stack(&rows, 0)?;
            let encoder_states = encoder_output
                .broadcast_as((sequences.len(), src_len, hidden))?
                .contiguous()?;

            model.clear_kv_cache();
            let logits = model.decode(&decoder_ids, &encoder_states)?;
            Ok(logits.to_dtype(DType::F32)?.to_vec2::<f32>()?)
        })?;

        debug!(
            generated_tokens = best.tokens.len(),
            score = best.score,
            "Beam search finished"
        );

        let text = runtime.tokenizer.decode(&best.tokens, true).map_err(|e| {
            GenerationError::TokenizationFailed {
                reason: e.to_string(),
            }
        })?;
        Ok(text.trim().to_string())
    }
}

impl TextGenerator for Seq2SeqGenerator {
    #[instrument(skip_all, fields(prompt_len = prompt.len(), num_beams = params.num_beams))]
    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, GenerationError> {
        params.validate()?;
        if prompt.trim().is_empty() {
            return Err(GenerationError::EmptyPrompt);
        }

        match &self.backend {
            GeneratorBackend::Model(runtime) => self.generate_with_model(runtime, prompt, params),
            GeneratorBackend::Stub => Ok(stub_answer(prompt)),
        }
    }

    fn is_stub(&self) -> bool {
        matches!(self.backend, GeneratorBackend::Stub)
    }
}

/// Keeps the first `max_tokens` prompt tokens, re-appending EOS if the prompt had one.
pub(crate) fn truncate_prompt(mut ids: Vec<u32>, max_tokens: usize, eos: u32) -> Vec<u32> {
    if ids.len() <= max_tokens {
        return ids;
    }

    let ends_with_eos = ids.last() == Some(&eos);
    if ends_with_eos {
        ids.truncate(max_tokens.saturating_sub(1));
        ids.push(eos);
    } else {
        ids.truncate(max_tokens);
    }
    ids
}

/// Extractive answer: the first sentence of the first context summary in the prompt.
pub(crate) fn stub_answer(prompt: &str) -> String {
    const SUMMARY_MARKER: &str = "Summary: ";

    let summary = prompt.find(SUMMARY_MARKER).map(|at| {
        let rest = &prompt[at + SUMMARY_MARKER.len()..];
        let block = rest.split("\n\n").next().unwrap_or(rest);
        block.split_whitespace().collect::<Vec<_>>().join(" ")
    });

    match summary.as_deref().map(first_sentence) {
        Some(sentence) if !sentence.is_empty() => sentence.to_string(),
        _ => {
            let question = prompt
                .lines()
                .next()
                .and_then(|line| line.split_once("question: "))
                .map(|(_, q)| q.trim())
                .unwrap_or(prompt.trim());
            format!("None of the fetched papers directly address: {question}")
        }
    }
}

fn first_sentence(text: &str) -> &str {
    let bytes = text.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        let ends = matches!(b, b'.' | b'!' | b'?');
        let boundary = bytes.get(i + 1).is_none_or(|next| next.is_ascii_whitespace());
        if ends && boundary {
            return &text[..=i];
        }
    }
    text
}

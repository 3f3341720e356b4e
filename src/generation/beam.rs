//! Beam search with optional sampling.
//!
//! The decoder is model agnostic: a step closure receives the token sequences of
//! the live beams (each starting with the decoder start token) and returns one row
//! of next-token logits per beam.
//!
//! Per step, logits are divided by the temperature and turned into log
//! probabilities. Every `(beam, token)` pair is scored as the beam's running
//! log probability plus the token's. `2 * num_beams` candidates are kept, either
//! the best scoring ones or, when sampling, a draw without replacement from the
//! joint distribution (Gumbel-top-k). Candidates ending in EOS become finished
//! hypotheses scored by `sum_logprob / len^length_penalty`.

use std::cmp::Ordering;

use rand::Rng;
use tracing::debug;

use super::error::GenerationError;

pub const LENGTH_PENALTY: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BeamSearchConfig {
    pub num_beams: usize,
    /// Generated tokens per hypothesis, EOS included.
    pub max_length: usize,
    pub temperature: f64,
    pub do_sample: bool,
    pub eos_token_id: u32,
    pub length_penalty: f64,
}

/// A completed sequence (start token and EOS stripped).
#[derive(Debug, Clone, PartialEq)]
pub struct Hypothesis {
    pub tokens: Vec<u32>,
    pub score: f64,
}

#[derive(Debug, Clone)]
struct Beam {
    sequence: Vec<u32>,
    sum_logprob: f64,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    beam: usize,
    token: u32,
    score: f64,
}

/// Finished hypotheses, best first, capped at `num_beams`.
struct FinishedPool {
    capacity: usize,
    length_penalty: f64,
    hypotheses: Vec<Hypothesis>,
}

impl FinishedPool {
    fn new(capacity: usize, length_penalty: f64) -> Self {
        Self {
            capacity,
            length_penalty,
            hypotheses: Vec::with_capacity(capacity + 1),
        }
    }

    fn normalized(&self, sum_logprob: f64, len: usize) -> f64 {
        sum_logprob / (len.max(1) as f64).powf(self.length_penalty)
    }

    /// `generated` counts every generated token, including a trailing EOS.
    fn add(&mut self, tokens: Vec<u32>, sum_logprob: f64, generated: usize) {
        let score = self.normalized(sum_logprob, generated);
        if self.hypotheses.len() >= self.capacity && score <= self.worst_score() {
            return;
        }

        let at = self
            .hypotheses
            .iter()
            .position(|h| h.score < score)
            .unwrap_or(self.hypotheses.len());
        self.hypotheses.insert(at, Hypothesis { tokens, score });
        self.hypotheses.truncate(self.capacity);
    }

    fn worst_score(&self) -> f64 {
        self.hypotheses
            .last()
            .map(|h| h.score)
            .unwrap_or(f64::NEG_INFINITY)
    }

    fn is_done(&self, best_live_sum_logprob: f64, generated: usize) -> bool {
        self.hypotheses.len() >= self.capacity
            && self.normalized(best_live_sum_logprob, generated) <= self.worst_score()
    }
}

/// Numerically stable `log_softmax(logits / temperature)`.
pub fn log_softmax_with_temperature(logits: &[f32], temperature: f64) -> Vec<f64> {
    let scaled: Vec<f64> = logits.iter().map(|&l| l as f64 / temperature).collect();
    let max = scaled.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return vec![f64::NEG_INFINITY; scaled.len()];
    }
    let log_sum = scaled.iter().map(|s| (s - max).exp()).sum::<f64>().ln() + max;
    scaled.into_iter().map(|s| s - log_sum).collect()
}

/// Draws a standard Gumbel variate.
fn gumbel<R: Rng>(rng: &mut R) -> f64 {
    let u: f64 = rng.gen_range(f64::MIN_POSITIVE..1.0);
    -(-u.ln()).ln()
}

fn by_score_desc(a: &f64, b: &f64) -> Ordering {
    b.partial_cmp(a).unwrap_or(Ordering::Equal)
}

/// Keeps the `k` best entries by `key`, ordered best first.
fn select_top<T>(mut items: Vec<(f64, T)>, k: usize) -> Vec<T> {
    if items.len() > k {
        items.select_nth_unstable_by(k - 1, |a, b| by_score_desc(&a.0, &b.0));
        items.truncate(k);
    }
    items.sort_by(|a, b| by_score_desc(&a.0, &b.0));
    items.into_iter().map(|(_, item)| item).collect()
}

fn pick_candidates<R: Rng>(
    beams: &[Beam],
    log_probs: &[Vec<f64>],
    config: &BeamSearchConfig,
    rng: &mut R,
) -> Vec<Candidate> {
    let k = 2 * config.num_beams;
    let mut keyed = Vec::with_capacity(log_probs.iter().map(Vec::len).sum());

    for (beam_idx, (beam, row)) in beams.iter().zip(log_probs).enumerate() {
        for (token, &lp) in row.iter().enumerate() {
            if lp == f64::NEG_INFINITY {
                continue;
            }
            let score = beam.sum_logprob + lp;
            let key = if config.do_sample {
                score + gumbel(rng)
            } else {
                score
            };
            keyed.push((
                key,
                Candidate {
                    beam: beam_idx,
                    token: token as u32,
                    score,
                },
            ));
        }
    }

    let mut picked = select_top(keyed, k);
    if config.do_sample {
        picked.sort_by(|a, b| by_score_desc(&a.score, &b.score));
    }
    picked
}

/// Runs beam search from `start_token` and returns the best hypothesis.
///
/// Live beams left at the end compete with the finished hypotheses as they stand.
pub fn beam_search<R, F>(
    start_token: u32,
    config: &BeamSearchConfig,
    rng: &mut R,
    mut step: F,
) -> Result<Hypothesis, GenerationError>
where
    R: Rng,
    F: FnMut(&[Vec<u32>]) -> Result<Vec<Vec<f32>>, GenerationError>,
{
    if config.num_beams == 0 || config.max_length == 0 {
        return Err(GenerationError::InvalidParams {
            reason: "num_beams and max_length must be non-zero".to_string(),
        });
    }

    let mut beams = vec![Beam {
        sequence: vec![start_token],
        sum_logprob: 0.0,
    }];
    let mut finished = FinishedPool::new(config.num_beams, config.length_penalty);

    for generated in 1..=config.max_length {
        let sequences: Vec<Vec<u32>> = beams.iter().map(|b| b.sequence.clone()).collect();
        let logits = step(&sequences)?;
        if logits.len() != beams.len() {
            return Err(GenerationError::InferenceFailed {
                reason: format!(
                    "step returned {} logit rows for {} beams",
                    logits.len(),
                    beams.len()
                ),
            });
        }

        let log_probs: Vec<Vec<f64>> = logits
            .iter()
            .map(|row| log_softmax_with_temperature(row, config.temperature))
            .collect();

        let candidates = pick_candidates(&beams, &log_probs, config, rng);

        let mut next = Vec::with_capacity(config.num_beams);
        for (rank, candidate) in candidates.into_iter().enumerate() {
            let parent = &beams[candidate.beam];
            if candidate.token == config.eos_token_id {
                if rank < config.num_beams {
                    finished.add(parent.sequence[1..].to_vec(), candidate.score, generated);
                }
            } else {
                let mut sequence = parent.sequence.clone();
                sequence.push(candidate.token);
                next.push(Beam {
                    sequence,
                    sum_logprob: candidate.score,
                });
            }
            if next.len() == config.num_beams {
                break;
            }
        }

        if next.is_empty() {
            beams.clear();
            break;
        }

        let best_live = next
            .iter()
            .map(|b| b.sum_logprob)
            .fold(f64::NEG_INFINITY, f64::max);
        beams = next;

        if finished.is_done(best_live, generated) {
            debug!(generated, "Beam search converged");
            break;
        }
    }

    for beam in &beams {
        let generated = beam.sequence.len() - 1;
        finished.add(beam.sequence[1..].to_vec(), beam.sum_logprob, generated);
    }

    finished
        .hypotheses
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::InferenceFailed {
            reason: "beam search produced no hypothesis".to_string(),
        })
}

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, bail};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use statrs::function::erf::erfc;
use tracing::debug;

use judge_config::JudgeConfig;
use judge_core::assignment::Outcome;
use judge_core::enums::{BeginAction, VoteAction};
use judge_core::ranking::rank_correlation;
use judge_db::JudgeDb;
use judge_db::replay::DEFAULT_TOLERANCE;
use judge_db::retry::RetryConfig;
use judge_db::service::JudgeService;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SimulateArgs;
use crate::output::output;
use crate::progress::Progress;

#[derive(Debug, Serialize)]
struct SimulationReport {
    seed: u64,
    items: usize,
    judges: usize,
    decisions: u64,
    /// Spearman correlation between the leaderboard and the hidden order.
    rank_correlation: Option<f64>,
    replay_consistent: bool,
    elapsed_ms: u64,
}

/// Hidden behavior of one simulated judge.
#[derive(Clone, Copy, Debug)]
struct Persona {
    attentiveness: f64,
    actions: usize,
}

/// Handle `jdg simulate`.
pub async fn handle(args: &SimulateArgs, config: &JudgeConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    if args.items < 2 {
        bail!("--items must be at least 2");
    }
    if args.judges == 0 {
        bail!("--judges must be at least 1");
    }
    if !(0.0..=1.0).contains(&args.attentiveness) {
        bail!("--attentiveness must be within [0, 1], got {}", args.attentiveness);
    }

    let seed = args.seed.unwrap_or_else(|| rand::rng().random());
    let started = Instant::now();

    let scratch = tempfile::tempdir().context("failed to create scratch directory")?;
    let path = scratch.path().join("simulation.db");
    let db = JudgeDb::open_local(&path.to_string_lossy()).await?;
    let svc = Arc::new(JudgeService::from_db(
        db,
        config.ranking.params(),
        config.priors.priors(),
        RetryConfig::from(&config.database),
    ));

    let mut rng = StdRng::seed_from_u64(seed);
    let skills = Arc::new(seed_items(&svc, args.items, &mut rng).await?);

    let persona = Persona {
        attentiveness: args.attentiveness,
        actions: args.actions,
    };
    let total = u64::try_from(args.judges * args.actions)?;
    let progress = Arc::new(Progress::bar(total, "judging"));

    let mut tasks = Vec::with_capacity(args.judges);
    for index in 0..args.judges {
        let judge = svc.create_judge(&format!("Judge {:02}", index + 1), "").await?;
        tasks.push(tokio::spawn(run_judge(
            Arc::clone(&svc),
            Arc::clone(&skills),
            judge.id,
            StdRng::seed_from_u64(rng.random()),
            persona,
            Arc::clone(&progress),
        )));
    }
    for task in tasks {
        task.await.context("simulated judge panicked")??;
    }
    progress.finish_clear();

    let leaderboard: Vec<String> = svc
        .leaderboard()
        .await?
        .into_iter()
        .map(|standing| standing.item_id)
        .collect();
    let mut truth: Vec<(&String, &f64)> = skills.iter().collect();
    truth.sort_by(|a, b| b.1.total_cmp(a.1));
    let truth: Vec<String> = truth.into_iter().map(|(id, _)| id.clone()).collect();

    let report = SimulationReport {
        seed,
        items: args.items,
        judges: args.judges,
        decisions: svc.count_decisions().await?,
        rank_correlation: rank_correlation(&leaderboard, &truth),
        replay_consistent: svc.replay_report(DEFAULT_TOLERANCE).await?.is_consistent(),
        elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
    };
    output(&report, flags.format)
}

/// Create items with evenly spread hidden skills in a shuffled order.
async fn seed_items(
    svc: &JudgeService,
    count: usize,
    rng: &mut StdRng,
) -> anyhow::Result<HashMap<String, f64>> {
    #[allow(clippy::cast_precision_loss)]
    let mut skills: Vec<f64> = (0..count)
        .map(|i| 4.0 * (i as f64) / ((count - 1) as f64) - 2.0)
        .collect();
    skills.shuffle(rng);

    let mut hidden = HashMap::with_capacity(count);
    for (index, skill) in skills.into_iter().enumerate() {
        let item = svc.create_item(&format!("Item {:02}", index + 1), "").await?;
        hidden.insert(item.id, skill);
    }
    Ok(hidden)
}

async fn run_judge(
    svc: Arc<JudgeService>,
    skills: Arc<HashMap<String, f64>>,
    judge_id: String,
    mut rng: StdRng,
    persona: Persona,
    progress: Arc<Progress>,
) -> anyhow::Result<()> {
    let mut outcome = svc.initialize_if_needed(&judge_id, &mut rng).await?;
    let mut done = 0;
    while done < persona.actions {
        let Outcome::Assigned(assignment) = outcome else {
            break;
        };
        outcome = match (assignment.prev, assignment.next) {
            (None, Some(next)) => {
                svc.submit_begin_action(&judge_id, &next, BeginAction::Continue, &mut rng)
                    .await?
            }
            (Some(prev), Some(next)) => {
                let action = judge_pair(&skills, &prev, &next, persona.attentiveness, &mut rng);
                svc.submit_vote_action(&judge_id, &prev, &next, action, &mut rng)
                    .await?
            }
            (_, None) => break,
        };
        done += 1;
        progress.inc(1);
    }
    debug!(judge = %judge_id, actions = done, "Simulated judge finished");
    progress.inc(u64::try_from(persona.actions - done)?);
    Ok(())
}

/// Decide a comparison the way a judge with hidden attentiveness would: an
/// attentive judge prefers the truly better item through a probit link, an
/// inattentive one flips a coin.
fn judge_pair<R: Rng + ?Sized>(
    skills: &HashMap<String, f64>,
    prev: &str,
    next: &str,
    attentiveness: f64,
    rng: &mut R,
) -> VoteAction {
    let p_prev = if rng.random_bool(attentiveness) {
        let diff = skills.get(prev).copied().unwrap_or_default()
            - skills.get(next).copied().unwrap_or_default();
        0.5 * erfc(-diff / std::f64::consts::SQRT_2)
    } else {
        0.5
    };
    if rng.random::<f64>() < p_prev {
        VoteAction::Previous
    } else {
        VoteAction::Current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills() -> HashMap<String, f64> {
        HashMap::from([("strong".to_string(), 8.0), ("weak".to_string(), -8.0)])
    }

    #[test]
    fn attentive_judge_picks_the_better_item() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            assert_eq!(
                judge_pair(&skills(), "strong", "weak", 1.0, &mut rng),
                VoteAction::Previous
            );
            assert_eq!(
                judge_pair(&skills(), "weak", "strong", 1.0, &mut rng),
                VoteAction::Current
            );
        }
    }

    #[test]
    fn inattentive_judge_is_a_coin_flip() {
        let mut rng = StdRng::seed_from_u64(2);
        let trials = 4000;
        let prev_wins = (0..trials)
            .filter(|_| judge_pair(&skills(), "weak", "strong", 0.0, &mut rng) == VoteAction::Previous)
            .count();
        #[allow(clippy::cast_precision_loss)]
        let rate = prev_wins as f64 / f64::from(trials);
        assert!((rate - 0.5).abs() < 0.05, "rate {rate}");
    }
}

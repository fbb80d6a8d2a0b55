//! The pure Q-learning / Thompson-sampling difficulty-selection math.
//! Every function here is deterministic given its RNG input, so the
//! blending and safety-adjustment rules can be unit tested exactly.

use std::collections::HashMap;

use rand::Rng;
use rand_distr::{Beta, Distribution};
use studyforge_generation::Difficulty;

use crate::config::QuizConfig;
use crate::types::{State, Trend};

/// Reward assigned after grading a turn served at `difficulty`.
#[must_use]
pub fn reward(difficulty: Difficulty, is_correct: bool) -> f64 {
    match (difficulty, is_correct) {
        (Difficulty::Low, true) => 0.50,
        (Difficulty::Low, false) => -0.50,
        (Difficulty::Medium, true) => 0.75,
        (Difficulty::Medium, false) => -0.55,
        (Difficulty::Hard, true) => 1.00,
        (Difficulty::Hard, false) => -0.75,
    }
}

/// Computes `trend` from up to the last 3 answered outcomes, most recent
/// last. A window shorter than 2 is always `stable`.
#[must_use]
pub fn compute_trend(recent_correctness: &[bool]) -> Trend {
    let window = &recent_correctness[recent_correctness.len().saturating_sub(3)..];
    if window.len() < 2 {
        return Trend::Stable;
    }
    let correct = window.iter().filter(|c| **c).count();
    let incorrect = window.len() - correct;
    if correct >= 2 {
        Trend::Improving
    } else if incorrect >= 2 {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

/// Bellman update: `Q(s,a) <- Q(s,a) + alpha * (r + gamma * max_a' Q(s',a') - Q(s,a))`.
/// Unset actions for any state default to 0.
pub fn q_update(
    q_table: &mut HashMap<State, HashMap<Difficulty, f64>>,
    state: State,
    action: Difficulty,
    reward: f64,
    next_state: State,
    config: &QuizConfig,
) -> f64 {
    let current = q_table
        .get(&state)
        .and_then(|m| m.get(&action))
        .copied()
        .unwrap_or(0.0);

    let max_next = Difficulty::all()
        .iter()
        .map(|a| q_table.get(&next_state).and_then(|m| m.get(a)).copied().unwrap_or(0.0))
        .fold(f64::MIN, f64::max);

    let updated = current + config.alpha * (reward + config.gamma * max_next - current);
    q_table.entry(state).or_default().insert(action, updated);
    updated
}

/// `argmax_a Q(state, a)`, ties broken in the order medium > low > hard.
#[must_use]
pub fn q_policy_greedy(q_table: &HashMap<State, HashMap<Difficulty, f64>>, state: State) -> Difficulty {
    const TIE_ORDER: [Difficulty; 3] = [Difficulty::Medium, Difficulty::Low, Difficulty::Hard];
    let values: HashMap<Difficulty, f64> = TIE_ORDER
        .iter()
        .map(|d| (*d, q_table.get(&state).and_then(|m| m.get(d)).copied().unwrap_or(0.0)))
        .collect();
    let best = values.values().copied().fold(f64::MIN, f64::max);
    *TIE_ORDER
        .iter()
        .find(|d| (values[d] - best).abs() < f64::EPSILON)
        .unwrap_or(&Difficulty::Medium)
}

/// Epsilon-greedy Q-policy recommendation: explore uniformly with
/// probability `epsilon`, otherwise exploit via [`q_policy_greedy`].
pub fn q_policy_recommend<R: Rng + ?Sized>(
    q_table: &HashMap<State, HashMap<Difficulty, f64>>,
    state: State,
    epsilon: f64,
    rng: &mut R,
) -> Difficulty {
    if rng.gen::<f64>() < epsilon {
        let options = Difficulty::all();
        options[rng.gen_range(0..options.len())]
    } else {
        q_policy_greedy(q_table, state)
    }
}

/// Thompson-sampling recommendation: sample `theta_d ~ Beta(alpha_d,
/// beta_d)` per difficulty and pick the argmax.
pub fn thompson_policy_recommend<R: Rng + ?Sized>(
    bandit: &HashMap<Difficulty, (f64, f64)>,
    rng: &mut R,
) -> Difficulty {
    let mut best = Difficulty::Medium;
    let mut best_sample = f64::MIN;
    for difficulty in Difficulty::all() {
        let (alpha, beta) = bandit.get(&difficulty).copied().unwrap_or((1.0, 1.0));
        let sample = Beta::new(alpha, beta)
            .map(|dist| dist.sample(rng))
            .unwrap_or(0.5);
        if sample > best_sample {
            best_sample = sample;
            best = difficulty;
        }
    }
    best
}

fn rank(difficulty: Difficulty) -> i8 {
    match difficulty {
        Difficulty::Low => 0,
        Difficulty::Medium => 1,
        Difficulty::Hard => 2,
    }
}

/// Blends the Q-policy and Thompson recommendations by sampling once from
/// `Bernoulli(blend_weight_q)`, then applies the safety adjustment: a
/// correct last answer never lets the result end up easier than
/// `current_difficulty`; an incorrect one never lets it end up harder.
pub fn blend_and_adjust<R: Rng + ?Sized>(
    q_recommendation: Difficulty,
    thompson_recommendation: Difficulty,
    blend_weight_q: f64,
    current_difficulty: Difficulty,
    last_was_correct: bool,
    rng: &mut R,
) -> Difficulty {
    let blended = if rng.gen::<f64>() < blend_weight_q {
        q_recommendation
    } else {
        thompson_recommendation
    };

    if last_was_correct && rank(blended) < rank(current_difficulty) {
        current_difficulty
    } else if !last_was_correct && rank(blended) > rank(current_difficulty) {
        current_difficulty
    } else {
        blended
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn reward_table_matches_spec() {
        assert_eq!(reward(Difficulty::Low, true), 0.50);
        assert_eq!(reward(Difficulty::Low, false), -0.50);
        assert_eq!(reward(Difficulty::Medium, true), 0.75);
        assert_eq!(reward(Difficulty::Medium, false), -0.55);
        assert_eq!(reward(Difficulty::Hard, true), 1.00);
        assert_eq!(reward(Difficulty::Hard, false), -0.75);
    }

    #[test]
    fn trend_requires_at_least_two_in_window() {
        assert_eq!(compute_trend(&[]), Trend::Stable);
        assert_eq!(compute_trend(&[true]), Trend::Stable);
    }

    #[test]
    fn trend_improving_on_two_correct() {
        assert_eq!(compute_trend(&[true, true]), Trend::Improving);
        assert_eq!(compute_trend(&[false, true, true]), Trend::Improving);
    }

    #[test]
    fn trend_declining_on_two_incorrect() {
        assert_eq!(compute_trend(&[false, false]), Trend::Declining);
    }

    #[test]
    fn trend_stable_on_mixed_window_of_three() {
        assert_eq!(compute_trend(&[true, false, true]), Trend::Stable);
    }

    #[test]
    fn q_update_on_empty_table_matches_bellman_update_by_hand() {
        let mut q_table = HashMap::new();
        let config = QuizConfig::default();
        let state = (Difficulty::Medium, Trend::Stable);
        let next_state = (Difficulty::Hard, Trend::Improving);
        let updated = q_update(&mut q_table, state, Difficulty::Hard, 1.0, next_state, &config);
        assert!((updated - 0.1).abs() < 1e-12);
        assert!((q_table[&state][&Difficulty::Hard] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn q_policy_greedy_breaks_ties_medium_then_low_then_hard() {
        let q_table = HashMap::new();
        let state = (Difficulty::Medium, Trend::Stable);
        assert_eq!(q_policy_greedy(&q_table, state), Difficulty::Medium);
    }

    #[test]
    fn safety_adjustment_blocks_demotion_after_correct() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = blend_and_adjust(
            Difficulty::Low,
            Difficulty::Low,
            1.0,
            Difficulty::Medium,
            true,
            &mut rng,
        );
        assert_ne!(result, Difficulty::Low);
    }

    #[test]
    fn safety_adjustment_blocks_promotion_after_incorrect() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = blend_and_adjust(
            Difficulty::Hard,
            Difficulty::Hard,
            1.0,
            Difficulty::Medium,
            false,
            &mut rng,
        );
        assert_ne!(result, Difficulty::Hard);
    }

    #[test]
    fn safety_adjustment_never_skips_more_than_one_level() {
        let mut rng = StdRng::seed_from_u64(7);
        let result = blend_and_adjust(
            Difficulty::Low,
            Difficulty::Low,
            1.0,
            Difficulty::Medium,
            true,
            &mut rng,
        );
        assert!(matches!(result, Difficulty::Medium | Difficulty::Hard));
    }
}

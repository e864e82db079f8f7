//! The block grader.
//!
//! Five phases over one height's validated candidates:
//!
//! 1. deduplicate by payout address (first occurrence in ledger order wins)
//! 2. rank by self-reported difficulty, truncate to the cutoff, verify the
//!    claimed difficulties against the proof-of-work oracle
//! 3. iteratively eliminate the worst-graded record until `top_rank` remain
//! 4. canonical prices: coordinate-wise median of the winners
//! 5. winners' short-hashes, the reference for the next height
//!
//! Every ordering decision has a total, deterministic tie-break (oprhash
//! ascending, then entry hash ascending), and grade summation follows the
//! rule-set's asset order, so independent nodes produce bit-identical
//! graded blocks from the same candidate set.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::grading::cache::DifficultyCache;
use crate::grading::error::GradingError;
use crate::grading::graded_block::{BlockState, GradedBlock, GradedCandidate};
use crate::grading::rules::RuleSet;
use crate::grading::validate::Candidate;
use crate::pow::DifficultyOracle;

/// Runs the grading pipeline for `height` over `candidates`.
///
/// `candidates` must be in the ledger's native entry order; Phase 1 keys off
/// that order. The cache, when provided, short-circuits Phase 2 difficulty
/// recomputation across reorg re-grades.
pub fn grade_block(
    height: i32,
    candidates: Vec<Candidate>,
    rules: &RuleSet,
    oracle: &dyn DifficultyOracle,
    cache: Option<&DifficultyCache>,
) -> GradedBlock {
    let admitted = candidates.len();

    // Phase 1: first record per payout address survives.
    let mut seen = HashSet::with_capacity(candidates.len());
    let mut unique: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if seen.insert(candidate.record.payout_address.clone()) {
            unique.push(candidate);
        }
    }

    // Phase 2: difficulty admission.
    unique.sort_by(|a, b| {
        b.self_reported_difficulty
            .cmp(&a.self_reported_difficulty)
            .then_with(|| a.oprhash.cmp(&b.oprhash))
            .then_with(|| a.entry_hash.cmp(&b.entry_hash))
    });
    unique.truncate(rules.cutoff);

    let mut survivors: Vec<Candidate> = unique
        .into_iter()
        .filter(|candidate| {
            let computed = match cache {
                Some(cache) => {
                    cache.difficulty(oracle, &candidate.oprhash, &candidate.nonce)
                }
                None => oracle.compute_difficulty(&candidate.oprhash, &candidate.nonce),
            };
            computed == candidate.self_reported_difficulty
        })
        .collect();

    let graded_count = survivors.len();
    if graded_count < rules.top_rank {
        return GradedBlock::degenerate(
            height,
            rules.version,
            rules.cutoff,
            admitted,
            graded_count,
        );
    }

    // Phase 3: eliminate the worst record one round at a time.
    let mut eliminated: Vec<(Candidate, f64, usize)> = Vec::new();
    while survivors.len() > rules.top_rank {
        let grades = match round_grades(&survivors, rules) {
            Ok(grades) => grades,
            Err(_) => {
                return GradedBlock::failed(
                    height,
                    rules.version,
                    rules.cutoff,
                    admitted,
                    graded_count,
                )
            }
        };

        let worst = worst_index(&survivors, &grades);
        let rank = survivors.len();
        let grade = grades[worst];
        eliminated.push((survivors.remove(worst), grade, rank));
    }

    // Final round: rank the remaining records by ascending grade.
    let final_grades = match round_grades(&survivors, rules) {
        Ok(grades) => grades,
        Err(_) => {
            return GradedBlock::failed(
                height,
                rules.version,
                rules.cutoff,
                admitted,
                graded_count,
            )
        }
    };

    let mut ranked: Vec<(Candidate, f64)> =
        survivors.into_iter().zip(final_grades).collect();
    ranked.sort_by(|(a, ga), (b, gb)| {
        ga.total_cmp(gb)
            .then_with(|| a.oprhash.cmp(&b.oprhash))
            .then_with(|| a.entry_hash.cmp(&b.entry_hash))
    });

    // Phase 4: coordinate-wise median of the winners.
    let canonical_prices = median_prices(&ranked, rules);

    // Phase 5: winners' short-hashes in rank order.
    let short_hashes: Vec<String> = ranked
        .iter()
        .map(|(candidate, _)| candidate.short_hash())
        .collect();

    let winner_count = ranked.len();
    let mut graded: Vec<GradedCandidate> = Vec::with_capacity(winner_count + eliminated.len());
    for (rank, (candidate, grade)) in ranked.into_iter().enumerate() {
        graded.push(graded_candidate(candidate, grade, rank + 1));
    }
    // Eliminated records follow in reverse elimination order, ranks ascending.
    for (candidate, grade, rank) in eliminated.into_iter().rev() {
        graded.push(graded_candidate(candidate, grade, rank));
    }

    GradedBlock {
        height,
        version: rules.version,
        state: BlockState::Graded,
        cutoff: rules.cutoff,
        admitted,
        graded_count,
        graded,
        winner_count,
        canonical_prices,
        short_hashes,
    }
}

/// Grades of every survivor against this round's reference values.
/// A non-finite value is an internal consistency violation and surfaces as
/// [`GradingError::NonFiniteGrade`]; the caller marks the block failed.
fn round_grades(survivors: &[Candidate], rules: &RuleSet) -> Result<Vec<f64>, GradingError> {
    let reference = reference_values(survivors, rules);
    let mut grades = Vec::with_capacity(survivors.len());
    for candidate in survivors {
        let mut grade = 0.0f64;
        for (i, reference_value) in reference.iter().enumerate() {
            let deviation =
                (candidate.record.prices[i] as f64 - reference_value) / reference_value;
            grade += deviation * deviation * deviation * deviation;
        }
        if !grade.is_finite() {
            return Err(GradingError::NonFiniteGrade);
        }
        grades.push(grade);
    }
    Ok(grades)
}

/// Per-asset reference value: plain arithmetic mean for band-zero rule-sets,
/// otherwise the mean of the values within the band around the preliminary
/// mean (falling back to the preliminary mean when the band is empty).
/// Summation runs in survivor order, per asset, in asset-list order.
fn reference_values(survivors: &[Candidate], rules: &RuleSet) -> Vec<f64> {
    let count = survivors.len() as f64;
    let mut reference = Vec::with_capacity(rules.assets.len());

    for i in 0..rules.assets.len() {
        let mut sum = 0.0f64;
        for candidate in survivors {
            sum += candidate.record.prices[i] as f64;
        }
        let mean = sum / count;

        if rules.band == 0.0 {
            reference.push(mean);
            continue;
        }

        let mut banded_sum = 0.0f64;
        let mut banded_count = 0u32;
        for candidate in survivors {
            let value = candidate.record.prices[i] as f64;
            if (value - mean).abs() <= rules.band * mean {
                banded_sum += value;
                banded_count += 1;
            }
        }
        if banded_count == 0 {
            reference.push(mean);
        } else {
            reference.push(banded_sum / banded_count as f64);
        }
    }

    reference
}

/// Index of the record to eliminate this round: highest grade, ties going
/// against the lexicographically larger oprhash, then entry hash.
fn worst_index(survivors: &[Candidate], grades: &[f64]) -> usize {
    let mut worst = 0;
    for i in 1..survivors.len() {
        let ordering = grades[i]
            .total_cmp(&grades[worst])
            .then_with(|| survivors[i].oprhash.cmp(&survivors[worst].oprhash))
            .then_with(|| survivors[i].entry_hash.cmp(&survivors[worst].entry_hash));
        if ordering == Ordering::Greater {
            worst = i;
        }
    }
    worst
}

/// Coordinate-wise median over the winners; even-sized sets take the lower
/// middle value, keeping the result integer-exact.
fn median_prices(winners: &[(Candidate, f64)], rules: &RuleSet) -> Vec<u64> {
    let mut medians = Vec::with_capacity(rules.assets.len());
    for i in 0..rules.assets.len() {
        let mut column: Vec<u64> = winners
            .iter()
            .map(|(candidate, _)| candidate.record.prices[i])
            .collect();
        column.sort_unstable();
        medians.push(column[(column.len() - 1) / 2]);
    }
    medians
}

fn graded_candidate(candidate: Candidate, grade: f64, rank: usize) -> GradedCandidate {
    GradedCandidate {
        oprhash: candidate.oprhash,
        entry_hash: candidate.entry_hash,
        identity: candidate.record.identity,
        payout_address: candidate.record.payout_address,
        prices: candidate.record.prices,
        self_reported_difficulty: candidate.self_reported_difficulty,
        grade,
        rank,
    }
}

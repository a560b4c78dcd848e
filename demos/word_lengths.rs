//! Word statistics over a small corpus.
//!
//! Demonstrates:
//! - Building a dataset keyed by a derived key (first letter)
//! - Chaining map, filter and reduce_by_key
//! - Reusing an intermediate dataset for two different results
//! - Explaining a chain before running it
//!
//! Run with: cargo run --example word_lengths

use anyhow::{Result, bail};
use ironspark::*;

fn main() -> Result<()> {
    println!("📚 Word Lengths Example\n");

    let words: Vec<String> = "the quick brown fox jumps over the lazy dog then trots back to town"
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let by_initial = from_vec(words, |w: &String| match w.chars().next() {
        Some(c) => Ok(c),
        None => bail!("empty word"),
    });

    // Shared prefix: lowercase, no short words.
    let cleaned = by_initial
        .map(|w| Ok(w.to_lowercase()))
        .filter(|w| w.len() > 3);

    // =============================================================================
    // Longest word per initial
    // =============================================================================
    let longest = cleaned.reduce_by_key(|group| {
        let best = group.iter().max_by_key(|w| w.len()).cloned();
        Ok(best.into_iter().collect())
    });

    println!("{}", longest.explain());
    println!("Longest word per initial: {:?}\n", longest.collect()?);

    // =============================================================================
    // Words per initial, from the same prefix
    // =============================================================================
    let counts = cleaned
        .reduce_by_key(|group| Ok(vec![format!("{}x{}", &group[0][..1], group.len())]));
    counts.for_each(|line| {
        println!("  {line}");
        Ok(())
    })?;

    println!("\nThe prefix itself still yields {} words.", cleaned.count()?);
    Ok(())
}

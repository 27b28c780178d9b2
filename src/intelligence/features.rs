//! Mood classification from audio features.

use std::fmt;

use serde::Serialize;

use crate::spotify::AudioFeatures;

/// Valence/energy above this is "high".
pub const HIGH_THRESHOLD: f64 = 0.7;
/// Valence/energy below this is "low".
pub const LOW_THRESHOLD: f64 = 0.3;

const KEY_NAMES: [&str; 12] = [
    "C", "C♯/D♭", "D", "D♯/E♭", "E", "F", "F♯/G♭", "G", "G♯/A♭", "A", "A♯/B♭", "B",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MoodLabel {
    HappyEnergetic,
    HappyRelaxed,
    AngryIntense,
    SadMelancholic,
    EnergeticNeutral,
    CalmNeutral,
    // Aggregate-only labels
    IntenseAggressive,
    Energetic,
    CalmAtmospheric,
    BalancedModerate,
}

impl MoodLabel {
    /// Phrase used in "This track sounds ..." sentences.
    pub fn description(&self) -> &'static str {
        match self {
            MoodLabel::HappyEnergetic => "happy and energetic",
            MoodLabel::HappyRelaxed => "happy and relaxed",
            MoodLabel::AngryIntense => "angry or intense",
            MoodLabel::SadMelancholic => "sad or melancholic",
            MoodLabel::EnergeticNeutral => "energetic and neutral",
            MoodLabel::CalmNeutral => "calm and neutral",
            MoodLabel::IntenseAggressive => "intense or aggressive",
            MoodLabel::Energetic => "energetic",
            MoodLabel::CalmAtmospheric => "calm and atmospheric",
            MoodLabel::BalancedModerate => "balanced and moderate",
        }
    }
}

impl fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Mood of a single track.
pub fn classify(features: &AudioFeatures) -> MoodLabel {
    let high_energy = features.energy > HIGH_THRESHOLD;

    if features.valence > HIGH_THRESHOLD {
        if high_energy {
            MoodLabel::HappyEnergetic
        } else {
            MoodLabel::HappyRelaxed
        }
    } else if features.valence < LOW_THRESHOLD {
        if high_energy {
            MoodLabel::AngryIntense
        } else {
            MoodLabel::SadMelancholic
        }
    } else if high_energy {
        MoodLabel::EnergeticNeutral
    } else {
        MoodLabel::CalmNeutral
    }
}

/// Mood of a collection, from its mean features.
///
/// Differs from [`classify`] in the neutral-valence band, which is split
/// three ways on energy.
pub fn classify_aggregate(means: &FeatureMeans) -> MoodLabel {
    if means.valence > HIGH_THRESHOLD {
        if means.energy > HIGH_THRESHOLD {
            MoodLabel::HappyEnergetic
        } else {
            MoodLabel::HappyRelaxed
        }
    } else if means.valence < LOW_THRESHOLD {
        if means.energy > HIGH_THRESHOLD {
            MoodLabel::IntenseAggressive
        } else {
            MoodLabel::SadMelancholic
        }
    } else if means.energy > HIGH_THRESHOLD {
        MoodLabel::Energetic
    } else if means.energy < LOW_THRESHOLD {
        MoodLabel::CalmAtmospheric
    } else {
        MoodLabel::BalancedModerate
    }
}

/// Per-dimension arithmetic means over a set of feature vectors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureMeans {
    pub danceability: f64,
    pub energy: f64,
    pub valence: f64,
    pub tempo: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
}

impl FeatureMeans {
    /// `None` when there are no vectors to average.
    pub fn from_vectors<'a, I>(vectors: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a AudioFeatures>,
    {
        let mut sum = FeatureMeans {
            danceability: 0.0,
            energy: 0.0,
            valence: 0.0,
            tempo: 0.0,
            acousticness: 0.0,
            instrumentalness: 0.0,
        };
        let mut count = 0usize;

        for v in vectors {
            sum.danceability += v.danceability;
            sum.energy += v.energy;
            sum.valence += v.valence;
            sum.tempo += v.tempo;
            sum.acousticness += v.acousticness;
            sum.instrumentalness += v.instrumentalness;
            count += 1;
        }

        if count == 0 {
            return None;
        }

        let n = count as f64;
        Some(FeatureMeans {
            danceability: sum.danceability / n,
            energy: sum.energy / n,
            valence: sum.valence / n,
            tempo: sum.tempo / n,
            acousticness: sum.acousticness / n,
            instrumentalness: sum.instrumentalness / n,
        })
    }
}

/// Pitch class name with mode, e.g. "F♯/G♭ Minor".
pub fn key_name(key: i32, mode: i32) -> String {
    let pitch = usize::try_from(key)
        .ok()
        .and_then(|k| KEY_NAMES.get(k).copied())
        .unwrap_or("Unknown");
    let mode = if mode == 1 { "Major" } else { "Minor" };
    format!("{} {}", pitch, mode)
}

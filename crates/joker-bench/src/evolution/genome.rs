use joker_bot::BotTuning;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const GENE_COUNT: usize = 17;

/// Bounds a scale factor is held to after every mutation or blend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneRange {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
}

impl GeneRange {
    const fn new(name: &'static str, min: f64, max: f64) -> Self {
        Self { name, min, max }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_finite() {
            value.clamp(self.min, self.max)
        } else {
            1.0f64.clamp(self.min, self.max)
        }
    }
}

/// Ranges in the same order as [`Genome::genes`].
pub const GENE_RANGES: [GeneRange; GENE_COUNT] = [
    GeneRange::new("chase_win_probability", 0.5, 1.8),
    GeneRange::new("chase_projected_score", 0.5, 1.6),
    GeneRange::new("chase_threat_penalty", 0.3, 2.0),
    GeneRange::new("chase_joker_waste", 0.4, 2.0),
    GeneRange::new("chase_pressure", 0.4, 1.8),
    GeneRange::new("dump_lose_probability", 0.5, 1.8),
    GeneRange::new("dump_projected_score", 0.5, 1.6),
    GeneRange::new("dump_threat_disposal", 0.3, 2.0),
    GeneRange::new("dump_joker_waste", 0.4, 2.0),
    GeneRange::new("power_confidence_blend", 0.3, 2.0),
    GeneRange::new("threat_trump", 0.5, 1.8),
    GeneRange::new("threat_joker", 0.5, 1.8),
    GeneRange::new("future_trick", 0.5, 1.5),
    GeneRange::new("rank_base", 0.7, 1.4),
    GeneRange::new("trump_bonus", 0.5, 1.8),
    GeneRange::new("joker_power", 0.7, 1.3),
    GeneRange::new("trump_declare_threshold", 0.6, 1.6),
];

/// Scale factors applied on top of a baseline [`BotTuning`]. `1.0` everywhere leaves the
/// baseline untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    pub chase_win_probability: f64,
    pub chase_projected_score: f64,
    pub chase_threat_penalty: f64,
    pub chase_joker_waste: f64,
    pub chase_pressure: f64,
    pub dump_lose_probability: f64,
    pub dump_projected_score: f64,
    pub dump_threat_disposal: f64,
    pub dump_joker_waste: f64,
    pub power_confidence_blend: f64,
    pub threat_trump: f64,
    /// Scales face-up, face-down and declaration threat together.
    pub threat_joker: f64,
    pub future_trick: f64,
    pub rank_base: f64,
    pub trump_bonus: f64,
    pub joker_power: f64,
    pub trump_declare_threshold: f64,
}

impl Default for Genome {
    fn default() -> Self {
        Self::identity()
    }
}

impl Genome {
    pub fn identity() -> Self {
        Self::from_genes([1.0; GENE_COUNT])
    }

    pub fn genes(&self) -> [f64; GENE_COUNT] {
        [
            self.chase_win_probability,
            self.chase_projected_score,
            self.chase_threat_penalty,
            self.chase_joker_waste,
            self.chase_pressure,
            self.dump_lose_probability,
            self.dump_projected_score,
            self.dump_threat_disposal,
            self.dump_joker_waste,
            self.power_confidence_blend,
            self.threat_trump,
            self.threat_joker,
            self.future_trick,
            self.rank_base,
            self.trump_bonus,
            self.joker_power,
            self.trump_declare_threshold,
        ]
    }

    /// Builds a genome from raw values, clamping each into its range.
    pub fn from_genes(genes: [f64; GENE_COUNT]) -> Self {
        let g: [f64; GENE_COUNT] = std::array::from_fn(|i| GENE_RANGES[i].clamp(genes[i]));
        Self {
            chase_win_probability: g[0],
            chase_projected_score: g[1],
            chase_threat_penalty: g[2],
            chase_joker_waste: g[3],
            chase_pressure: g[4],
            dump_lose_probability: g[5],
            dump_projected_score: g[6],
            dump_threat_disposal: g[7],
            dump_joker_waste: g[8],
            power_confidence_blend: g[9],
            threat_trump: g[10],
            threat_joker: g[11],
            future_trick: g[12],
            rank_base: g[13],
            trump_bonus: g[14],
            joker_power: g[15],
            trump_declare_threshold: g[16],
        }
    }

    pub fn clamped(self) -> Self {
        Self::from_genes(self.genes())
    }

    /// Identity perturbed in every gene, for seeding a population.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, magnitude: f64) -> Self {
        let mut genome = Self::identity();
        genome.mutate(rng, 1.0, magnitude);
        genome
    }

    /// Each gene independently, with probability `chance`, moves by up to `magnitude`
    /// either way. A uniform draw is consumed per gene whether or not it mutates.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R, chance: f64, magnitude: f64) {
        let magnitude = magnitude.abs();
        let mut genes = self.genes();
        for gene in genes.iter_mut() {
            let roll: f64 = rng.r#gen();
            let delta = rng.gen_range(-1.0..=1.0) * magnitude;
            if roll < chance {
                *gene += delta;
            }
        }
        *self = Self::from_genes(genes);
    }

    /// Per-gene uniform blend between two parents.
    pub fn crossover<R: Rng + ?Sized>(&self, other: &Genome, rng: &mut R) -> Genome {
        let a = self.genes();
        let b = other.genes();
        let blended: [f64; GENE_COUNT] = std::array::from_fn(|i| {
            let t: f64 = rng.r#gen();
            a[i] + (b[i] - a[i]) * t
        });
        Self::from_genes(blended)
    }

    /// Gene-by-gene total order, used to break fitness ties reproducibly.
    pub fn lexicographic_cmp(&self, other: &Genome) -> Ordering {
        self.genes()
            .iter()
            .zip(other.genes().iter())
            .map(|(a, b)| a.total_cmp(b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    pub fn apply(&self, base: &BotTuning) -> BotTuning {
        let mut tuning = *base;

        let turn = &mut tuning.turn;
        turn.chase_win_probability_weight *= self.chase_win_probability;
        turn.chase_projected_score_weight *= self.chase_projected_score;
        turn.chase_threat_penalty *= self.chase_threat_penalty;
        turn.chase_joker_waste_penalty *= self.chase_joker_waste;
        turn.chase_pressure_weight *= self.chase_pressure;
        turn.dump_lose_probability_weight *= self.dump_lose_probability;
        turn.dump_projected_score_weight *= self.dump_projected_score;
        turn.dump_threat_disposal_bonus *= self.dump_threat_disposal;
        turn.dump_joker_waste_penalty *= self.dump_joker_waste;
        turn.power_confidence_blend =
            (turn.power_confidence_blend * self.power_confidence_blend).clamp(0.0, 1.0);
        turn.threat_trump_weight *= self.threat_trump;
        turn.threat_joker_face_up_weight *= self.threat_joker;
        turn.threat_joker_face_down_weight *= self.threat_joker;
        turn.threat_joker_declaration_weight *= self.threat_joker;
        turn.future_trick_weight *= self.future_trick;

        let bidding = &mut tuning.bidding;
        bidding.rank_base_weight *= self.rank_base;
        bidding.trump_bonus *= self.trump_bonus;
        bidding.joker_power *= self.joker_power;

        tuning.trump.min_declare_power *= self.trump_declare_threshold;
        tuning
    }
}

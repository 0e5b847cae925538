use indexmap::IndexMap;
use serde_derive::Serialize;
use crate::error::GraphError;

/// One profile's metric relative to the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfileRatios {
    pub obfuscated: f64,
    pub deobfuscated: f64,
}

impl ProfileRatios {
    pub fn is_finite(&self) -> bool {
        self.obfuscated.is_finite() && self.deobfuscated.is_finite()
    }
}

/// Metric values normalized by the original (unobfuscated) value. Serializes
/// as `{"original": 1.0, "obf": {profile: {...}, ...}}`, in profile order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub original: f64,
    pub obf: IndexMap<String, ProfileRatios>,
    #[serde(skip)]
    metric: String,
    #[serde(skip)]
    baseline: f64,
}

impl Dataset {
    pub fn new<S: Into<String>>(metric: S, baseline: f64) -> Self {
        Self {
            original: 1.0,
            obf: IndexMap::new(),
            metric: metric.into(),
            baseline,
        }
    }

    /// Divides both raw values by the baseline. A zero baseline is not an
    /// error here; the ratios just come out non-finite.
    pub fn push_raw(&mut self, profile: &str, obfuscated: f64, deobfuscated: f64) {
        self.obf.insert(profile.to_string(), ProfileRatios {
            obfuscated: obfuscated / self.baseline,
            deobfuscated: deobfuscated / self.baseline,
        });
    }

    pub fn metric(&self) -> &str {
        &self.metric
    }

    /// The raw metric value of the original code.
    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    pub fn profiles(&self) -> impl Iterator<Item = &str> {
        self.obf.keys().map(String::as_str)
    }

    pub(crate) fn len(&self) -> usize {
        self.obf.len()
    }

    fn ratios(&self) -> impl Iterator<Item = f64> + '_ {
        self.obf.values().flat_map(|r| [r.obfuscated, r.deobfuscated])
    }

    /// Largest value that has to fit on the y axis, including the baseline.
    pub fn max_ratio(&self) -> f64 {
        self.ratios().fold(self.original, f64::max)
    }

    /// Smallest value that has to fit on the y axis. Bars start at 0, so
    /// this is 0 unless some ratio is negative.
    pub fn min_ratio(&self) -> f64 {
        self.ratios().fold(0.0, f64::min)
    }

    /// Rejects datasets that cannot be charted.
    pub fn check_finite(&self) -> Result<(), GraphError> {
        if self.baseline == 0.0 {
            return Err(GraphError::ZeroBaseline { key: self.metric.clone() });
        }
        match self.obf.iter().find(|(_, r)| !r.is_finite()) {
            Some((profile, _)) => Err(GraphError::NonFiniteRatio { profile: profile.clone() }),
            None => Ok(()),
        }
    }
}

//! Sieve Configuration

use crate::{Cpv, Cut, End, Max, Min, Ppv, Sieve, SieveError, Threshold};
use serde::{Deserialize, Serialize};

/// Serializable description of a sieve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SieveConfig {
    Max {
        #[serde(default = "default_cuts")]
        cuts: Vec<Cut>,
        #[serde(default)]
        segments: bool,
    },
    Min {
        #[serde(default = "default_cuts")]
        cuts: Vec<Cut>,
        #[serde(default)]
        segments: bool,
    },
    End {
        #[serde(default = "default_cuts")]
        cuts: Vec<Cut>,
    },
    Ppv {
        quantiles: Vec<Threshold>,
        #[serde(default = "default_sample_size")]
        sample_size: f64,
        #[serde(default)]
        seed: u64,
        #[serde(default)]
        segments: bool,
    },
    Cpv {
        quantiles: Vec<Threshold>,
        #[serde(default = "default_sample_size")]
        sample_size: f64,
        #[serde(default)]
        seed: u64,
    },
}

fn default_cuts() -> Vec<Cut> {
    vec![Cut::default()]
}

fn default_sample_size() -> f64 {
    1.0
}

impl SieveConfig {
    /// Instantiate the described sieve, checking its parameters
    pub fn build(&self) -> Result<Box<dyn Sieve>, SieveError> {
        Ok(match self {
            Self::Max { cuts, segments } => Box::new(Max::new(cuts.clone(), *segments)?),
            Self::Min { cuts, segments } => Box::new(Min::new(cuts.clone(), *segments)?),
            Self::End { cuts } => Box::new(End::new(cuts.clone())?),
            Self::Ppv {
                quantiles,
                sample_size,
                seed,
                segments,
            } => Box::new(Ppv::new(quantiles.clone(), *sample_size, *seed, *segments)?),
            Self::Cpv {
                quantiles,
                sample_size,
                seed,
            } => Box::new(Cpv::new(quantiles.clone(), *sample_size, *seed)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_registry() {
        let json = r#"[
            {"type": "max"},
            {"type": "min", "cuts": [{"fraction": 0.5}, {"mass": 1.0}], "segments": true},
            {"type": "end", "cuts": [{"mass": 0.5}]},
            {"type": "ppv", "quantiles": [{"value": 0.0, "constant": true}, {"value": 0.9}]},
            {"type": "cpv", "quantiles": [{"value": 0.5}], "sample_size": 0.2, "seed": 4}
        ]"#;
        let configs: Vec<SieveConfig> = serde_json::from_str(json).unwrap();
        let sieves: Vec<Box<dyn Sieve>> = configs.iter().map(|c| c.build().unwrap()).collect();

        let widths: Vec<usize> = sieves.iter().map(|s| s.nfeatures()).collect();
        assert_eq!(widths, vec![1, 1, 1, 2, 1]);
        let fit: Vec<bool> = sieves.iter().map(|s| s.requires_fit()).collect();
        assert_eq!(fit, vec![false, false, false, true, true]);
    }

    #[test]
    fn test_build_validates() {
        let bad = SieveConfig::End { cuts: vec![] };
        assert!(matches!(bad.build(), Err(SieveError::InvalidParameter { .. })));
    }
}

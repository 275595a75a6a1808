//! Preparateur Configuration

use crate::{
    Dilation, Dotting, Increments, LeadLag, MovingAverage, One, Padding, Preparateur,
    PreparationError, Span, Standardize, StandardizeMode, Window,
};
use serde::{Deserialize, Serialize};

/// Serializable description of a preparateur
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PreparateurConfig {
    Increments {
        #[serde(default)]
        padding: Padding,
    },
    Standardize {
        #[serde(default)]
        mode: StandardizeMode,
    },
    MovingAverage {
        window: Span,
    },
    LeadLag,
    One,
    Dotting {
        #[serde(default = "default_dot_spacing")]
        spacing: Span,
    },
    Window {
        start: f64,
        end: f64,
    },
    Dilation {
        #[serde(default)]
        clusters: Option<f64>,
        #[serde(default)]
        seed: u64,
    },
}

fn default_dot_spacing() -> Span {
    Span::Fixed(2)
}

impl PreparateurConfig {
    /// Instantiate the described preparateur, checking its parameters
    pub fn build(&self) -> Result<Box<dyn Preparateur>, PreparationError> {
        Ok(match self {
            Self::Increments { padding } => Box::new(Increments::new(*padding)),
            Self::Standardize { mode } => Box::new(Standardize::new(*mode)),
            Self::MovingAverage { window } => Box::new(MovingAverage::new(*window)?),
            Self::LeadLag => Box::new(LeadLag),
            Self::One => Box::new(One),
            Self::Dotting { spacing } => Box::new(Dotting::new(*spacing)?),
            Self::Window { start, end } => Box::new(Window::new(*start, *end)?),
            Self::Dilation { clusters, seed } => Box::new(Dilation::new(*clusters, *seed)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_registry() {
        let json = r#"[
            {"type": "increments"},
            {"type": "moving_average", "window": {"fraction": 0.25}},
            {"type": "lead_lag"},
            {"type": "dilation", "clusters": 0.1, "seed": 3}
        ]"#;
        let configs: Vec<PreparateurConfig> = serde_json::from_str(json).unwrap();
        assert_eq!(
            configs[0],
            PreparateurConfig::Increments {
                padding: Padding::Zero
            }
        );
        let names: Vec<&str> = configs
            .iter()
            .map(|c| c.build().unwrap().name())
            .collect();
        assert_eq!(names, vec!["Increments", "MovingAverage", "LeadLag", "Dilation"]);
    }

    #[test]
    fn test_build_validates() {
        let bad = PreparateurConfig::Window { start: 0.5, end: 0.1 };
        assert!(matches!(
            bad.build(),
            Err(PreparationError::InvalidParameter { .. })
        ));
    }
}

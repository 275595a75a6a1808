//! Position-based Sieves

use crate::{Cut, Sieve, SieveError};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Extremum {
    Max,
    Min,
}

impl Extremum {
    fn name(self) -> &'static str {
        match self {
            Extremum::Max => "Max",
            Extremum::Min => "Min",
        }
    }

    fn reduce(self, values: &[f64]) -> f64 {
        match self {
            Extremum::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Extremum::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct CutExtremum {
    kind: Extremum,
    cuts: Vec<Cut>,
    segments: bool,
}

impl CutExtremum {
    fn new(kind: Extremum, cuts: Vec<Cut>, segments: bool) -> Result<Self, SieveError> {
        if cuts.is_empty() {
            return Err(SieveError::invalid(kind.name(), "at least one cut is required"));
        }
        if segments && cuts.len() < 2 {
            return Err(SieveError::invalid(kind.name(), "segments need at least two cuts"));
        }
        for cut in &cuts {
            cut.validate(kind.name())?;
        }
        Ok(Self {
            kind,
            cuts,
            segments,
        })
    }

    fn nfeatures(&self) -> usize {
        if self.segments {
            self.cuts.len() - 1
        } else {
            self.cuts.len()
        }
    }

    fn transform(&self, array: &[f64]) -> Result<Vec<f64>, SieveError> {
        if array.is_empty() {
            return Err(SieveError::EmptyArray(self.kind.name()));
        }
        let indices: Vec<usize> = self.cuts.iter().map(|c| c.index(array)).collect();
        if self.segments {
            Ok(indices
                .windows(2)
                .map(|pair| {
                    let (lo, hi) = (pair[0].min(pair[1]), pair[0].max(pair[1]));
                    self.kind.reduce(&array[lo..=hi])
                })
                .collect())
        } else {
            Ok(indices
                .into_iter()
                .map(|i| self.kind.reduce(&array[..=i]))
                .collect())
        }
    }
}

macro_rules! extremum_sieve {
    ($(#[$doc:meta])* $name:ident, $kind:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name(CutExtremum);

        impl $name {
            /// One feature per cut, or per pair of consecutive cuts with `segments`
            pub fn new(cuts: Vec<Cut>, segments: bool) -> Result<Self, SieveError> {
                CutExtremum::new($kind, cuts, segments).map(Self)
            }

            pub fn cuts(&self) -> &[Cut] {
                &self.0.cuts
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self(CutExtremum {
                    kind: $kind,
                    cuts: vec![Cut::default()],
                    segments: false,
                })
            }
        }

        impl Sieve for $name {
            fn name(&self) -> &'static str {
                $kind.name()
            }

            fn nfeatures(&self) -> usize {
                self.0.nfeatures()
            }

            fn transform(&self, array: &[f64]) -> Result<Vec<f64>, SieveError> {
                self.0.transform(array)
            }

            fn box_clone(&self) -> Box<dyn Sieve> {
                Box::new(self.clone())
            }
        }
    };
}

extremum_sieve!(
    /// Running maximum up to each cut
    Max,
    Extremum::Max
);

extremum_sieve!(
    /// Running minimum up to each cut
    Min,
    Extremum::Min
);

/// Value at each cut
#[derive(Debug, Clone, PartialEq)]
pub struct End {
    cuts: Vec<Cut>,
}

impl End {
    pub fn new(cuts: Vec<Cut>) -> Result<Self, SieveError> {
        if cuts.is_empty() {
            return Err(SieveError::invalid("End", "at least one cut is required"));
        }
        for cut in &cuts {
            cut.validate("End")?;
        }
        Ok(Self { cuts })
    }
}

impl Default for End {
    fn default() -> Self {
        Self {
            cuts: vec![Cut::default()],
        }
    }
}

impl Sieve for End {
    fn name(&self) -> &'static str {
        "End"
    }

    fn nfeatures(&self) -> usize {
        self.cuts.len()
    }

    fn transform(&self, array: &[f64]) -> Result<Vec<f64>, SieveError> {
        if array.is_empty() {
            return Err(SieveError::EmptyArray(self.name()));
        }
        Ok(self.cuts.iter().map(|c| array[c.index(array)]).collect())
    }

    fn box_clone(&self) -> Box<dyn Sieve> {
        Box::new(self.clone())
    }
}

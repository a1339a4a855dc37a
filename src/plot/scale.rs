use crate::channel::store::ChannelStore;
use crate::foundation::error::{OverplotError, OverplotResult};

/// Multiplicative margin applied to the data extremes of an auto-derived y range.
pub const YLIM_MARGIN: f64 = 1.1;

/// How the y axis range is chosen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AxisScale {
    /// Caller-supplied `(min, max)`, used verbatim.
    Explicit {
        /// Lower limit.
        min: f64,
        /// Upper limit.
        max: f64,
    },
    /// `(min(lo, 0) * 1.1, max(hi, 0) * 1.1)` over every registered channel.
    Auto,
}

impl AxisScale {
    /// Explicit limits when `ylim` is given, auto otherwise.
    pub fn from_ylim(ylim: Option<(f64, f64)>) -> Self {
        match ylim {
            Some((min, max)) => Self::Explicit { min, max },
            None => Self::Auto,
        }
    }

    /// Resolve to concrete `(min, max)` limits against the channels registered so far.
    pub fn resolve(&self, store: &ChannelStore) -> OverplotResult<(f64, f64)> {
        match *self {
            Self::Explicit { min, max } => {
                if !min.is_finite() || !max.is_finite() || min >= max {
                    return Err(OverplotError::validation(format!(
                        "ylim must be finite with min < max, got ({min}, {max})"
                    )));
                }
                Ok((min, max))
            }
            Self::Auto => {
                let (lo, hi) = store.data_bounds().ok_or_else(|| {
                    OverplotError::validation(
                        "cannot derive y axis range: no finite channel data and no ylim given",
                    )
                })?;
                // Bounds start at zero.
                let (min, max) = (lo.min(0.0) * YLIM_MARGIN, hi.max(0.0) * YLIM_MARGIN);
                if min < max {
                    Ok((min, max))
                } else {
                    Ok((min - 1.0, max + 1.0))
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/plot/scale.rs"]
mod tests;

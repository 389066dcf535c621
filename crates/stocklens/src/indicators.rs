//! Moving average overlays and crossover detection

use crate::api::PriceBar;
use crate::error::{AnalysisError, Result};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use ta::Next;
use ta::indicators::SimpleMovingAverage;

/// Direction of a moving average crossover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossKind {
    /// Short average crossed above the long average (bullish)
    Golden,
    /// Short average crossed below the long average (bearish)
    Death,
}

/// A detected crossover event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crossover {
    /// Trading day the cross completed on
    pub date: NaiveDate,
    pub kind: CrossKind,
    /// Short average value on the crossing day
    pub short: f64,
    /// Long average value on the crossing day
    pub long: f64,
}

/// Simple moving average series over a close-price sequence
///
/// During warm-up (fewer samples than the period) the average covers the
/// samples seen so far.
pub fn sma_series(closes: &[f64], period: usize) -> Result<Vec<f64>> {
    let mut sma = SimpleMovingAverage::new(period)
        .map_err(|e| AnalysisError::IndicatorError(e.to_string()))?;
    let mut values = Vec::with_capacity(closes.len());
    for &close in closes {
        values.push(sma.next(close));
    }
    Ok(values)
}

/// Short/long simple moving average pair with crossover detection
#[derive(Debug, Clone, Copy)]
pub struct SmaCross {
    short_period: usize,
    long_period: usize,
}

impl SmaCross {
    /// Create a crossover detector
    ///
    /// The short period must be at least 1 and strictly less than the long
    /// period.
    pub fn new(short_period: usize, long_period: usize) -> Result<Self> {
        if short_period == 0 {
            return Err(AnalysisError::IndicatorError(
                "short period must be at least 1".to_string(),
            ));
        }
        if short_period >= long_period {
            return Err(AnalysisError::IndicatorError(format!(
                "short period ({short_period}) must be less than long period ({long_period})"
            )));
        }

        Ok(Self {
            short_period,
            long_period,
        })
    }

    pub fn short_period(&self) -> usize {
        self.short_period
    }

    pub fn long_period(&self) -> usize {
        self.long_period
    }

    /// Detect all crossover events in a chronologically ordered bar series
    ///
    /// Comparison starts once both averages have a full window, so warm-up
    /// values never produce spurious events. A cross is detected on the bar
    /// where the short average moves from at-or-below to above the long
    /// average (golden) or from at-or-above to below it (death).
    pub fn detect(&self, bars: &[PriceBar]) -> Result<Vec<Crossover>> {
        if bars.len() <= self.long_period {
            return Ok(Vec::new());
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let short = sma_series(&closes, self.short_period)?;
        let long = sma_series(&closes, self.long_period)?;

        let mut events = Vec::new();
        for i in self.long_period..bars.len() {
            let (prev_short, prev_long) = (short[i - 1], long[i - 1]);
            let (cur_short, cur_long) = (short[i], long[i]);

            if prev_short <= prev_long && cur_short > cur_long {
                events.push(Crossover {
                    date: bars[i].date,
                    kind: CrossKind::Golden,
                    short: cur_short,
                    long: cur_long,
                });
            } else if prev_short >= prev_long && cur_short < cur_long {
                events.push(Crossover {
                    date: bars[i].date,
                    kind: CrossKind::Death,
                    short: cur_short,
                    long: cur_long,
                });
            }
        }

        Ok(events)
    }

    /// Detect crossovers, keeping only events within `days` of the last bar
    pub fn detect_within(&self, bars: &[PriceBar], days: u32) -> Result<Vec<Crossover>> {
        let mut events = self.detect(bars)?;

        if let Some(last) = bars.last() {
            let cutoff = last
                .date
                .checked_sub_days(Days::new(u64::from(days)))
                .unwrap_or(NaiveDate::MIN);
            events.retain(|e| e.date >= cutoff);
        }

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: start + Days::new(i as u64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1_000,
                adjclose: close,
            })
            .collect()
    }

    #[test]
    fn test_new_validates_periods() {
        assert!(SmaCross::new(0, 10).is_err());
        assert!(SmaCross::new(10, 10).is_err());
        assert!(SmaCross::new(200, 50).is_err());
        assert!(SmaCross::new(50, 200).is_ok());
    }

    #[test]
    fn test_sma_series_warmup() {
        let values = sma_series(&[1.0, 2.0, 3.0, 4.0, 5.0], 2).unwrap();
        assert_eq!(values, vec![1.0, 1.5, 2.5, 3.5, 4.5]);
    }

    #[test]
    fn test_sma_series_rejects_zero_period() {
        assert!(sma_series(&[1.0, 2.0], 0).is_err());
    }

    #[test]
    fn test_golden_cross_detected() {
        let bars = make_bars(&[10.0, 9.0, 8.0, 7.0, 9.0, 12.0]);
        let cross = SmaCross::new(2, 3).unwrap();

        let events = cross.detect(&bars).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, CrossKind::Golden);
        assert_eq!(events[0].date, bars[5].date);
        assert!(events[0].short > events[0].long);
    }

    #[test]
    fn test_death_cross_detected() {
        let bars = make_bars(&[7.0, 8.0, 9.0, 10.0, 8.0, 5.0]);
        let cross = SmaCross::new(2, 3).unwrap();

        let events = cross.detect(&bars).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, CrossKind::Death);
        assert_eq!(events[0].date, bars[5].date);
        assert!(events[0].short < events[0].long);
    }

    #[test]
    fn test_flat_series_has_no_crossovers() {
        let bars = make_bars(&[5.0; 20]);
        let cross = SmaCross::new(2, 3).unwrap();
        assert!(cross.detect(&bars).unwrap().is_empty());
    }

    #[test]
    fn test_insufficient_bars_yields_no_events() {
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        let cross = SmaCross::new(2, 3).unwrap();
        assert!(cross.detect(&bars).unwrap().is_empty());
    }

    #[test]
    fn test_detect_within_filters_old_events() {
        // One golden cross at day 5, then a flat tail through day 13
        let mut closes = vec![10.0, 9.0, 8.0, 7.0, 9.0, 12.0];
        closes.extend([12.0; 8]);
        let bars = make_bars(&closes);
        let cross = SmaCross::new(2, 3).unwrap();

        assert_eq!(cross.detect(&bars).unwrap().len(), 1);
        assert!(cross.detect_within(&bars, 3).unwrap().is_empty());
        assert_eq!(cross.detect_within(&bars, 10).unwrap().len(), 1);
        // Cutoff is inclusive: the event sits exactly `days` before the last bar
        assert_eq!(cross.detect_within(&bars, 8).unwrap().len(), 1);
    }

    #[test]
    fn test_detect_within_empty_bars() {
        let cross = SmaCross::new(2, 3).unwrap();
        assert!(cross.detect_within(&[], 30).unwrap().is_empty());
    }
}

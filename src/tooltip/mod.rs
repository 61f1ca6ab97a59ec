//! Hover tooltip as an explicit two-state machine.
//!
//! The controller knows nothing about the UI toolkit: front-ends translate their
//! pointer callbacks into `PointerEvent`s and read back content, anchor position
//! and opacity. Opacity fades linearly toward the current state's target; a new
//! event restarts the fade from wherever the previous one had got to, so the
//! latest event always wins.

use std::time::Duration;

use crate::data::education::FipsIndex;
use crate::domain::{EducationRecord, Fips};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Visible,
}

impl Visibility {
    fn target_opacity(self) -> f64 {
        match self {
            Visibility::Hidden => 0.0,
            Visibility::Visible => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Pointer entered or moved over a county at `(x, y)`.
    Over { fips: Fips, x: f64, y: f64 },
    /// Pointer left the county.
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TooltipConfig {
    /// Added to the pointer position to get the tooltip anchor.
    pub offset: (f64, f64),
    pub fade: Duration,
}

impl TooltipConfig {
    /// Browser page: pixels, tooltip above-left of the pointer.
    pub const WEB: TooltipConfig = TooltipConfig {
        offset: (-45.0, -100.0),
        fade: Duration::from_millis(50),
    };

    /// Terminal preview: cells, tooltip just below-right of the pointer.
    pub const TERMINAL: TooltipConfig = TooltipConfig {
        offset: (2.0, 1.0),
        fade: Duration::from_millis(50),
    };
}

/// Tooltip text: `"{area_name}, {state}: {value}%"`.
///
/// The value uses the shortest round-trip form (`21.3`, `20`).
pub fn tooltip_text(record: &EducationRecord) -> String {
    format!(
        "{}, {}: {}%",
        record.area_name, record.state, record.bachelors_or_higher
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Fade {
    from: f64,
    to: f64,
    started_at: Duration,
}

#[derive(Debug, Clone)]
pub struct TooltipController {
    config: TooltipConfig,
    visibility: Visibility,
    content: String,
    education: Option<f64>,
    fips: Option<Fips>,
    anchor: (f64, f64),
    fade: Fade,
}

impl TooltipController {
    pub fn new(config: TooltipConfig) -> Self {
        Self {
            config,
            visibility: Visibility::Hidden,
            content: String::new(),
            education: None,
            fips: None,
            anchor: (0.0, 0.0),
            fade: Fade {
                from: 0.0,
                to: 0.0,
                started_at: Duration::ZERO,
            },
        }
    }

    /// Apply one pointer event at time `now` (measured from any fixed origin).
    ///
    /// An `Over` for a fips missing from the index fails with `MissingJoinKey`
    /// and leaves the tooltip untouched.
    pub fn handle(&mut self, event: PointerEvent, index: &FipsIndex, now: Duration) -> Result<(), AppError> {
        match event {
            PointerEvent::Over { fips, x, y } => {
                let record = index.lookup(fips)?;
                self.content = tooltip_text(record);
                self.education = Some(record.bachelors_or_higher);
                self.fips = Some(fips);
                self.anchor = (x + self.config.offset.0, y + self.config.offset.1);
                self.transition(Visibility::Visible, now);
            }
            PointerEvent::Leave => self.transition(Visibility::Hidden, now),
        }
        Ok(())
    }

    fn transition(&mut self, target: Visibility, now: Duration) {
        let current = self.opacity(now);
        self.visibility = target;
        self.fade = Fade {
            from: current,
            to: target.target_opacity(),
            started_at: now,
        };
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Value mirrored onto the tooltip element as `data-education`.
    pub fn education(&self) -> Option<f64> {
        self.education
    }

    /// County the tooltip last described.
    pub fn fips(&self) -> Option<Fips> {
        self.fips
    }

    pub fn anchor(&self) -> (f64, f64) {
        self.anchor
    }

    pub fn config(&self) -> TooltipConfig {
        self.config
    }

    /// Interpolated opacity in `[0, 1]`.
    pub fn opacity(&self, now: Duration) -> f64 {
        let Fade { from, to, started_at } = self.fade;
        let elapsed = now.saturating_sub(started_at);
        if self.config.fade.is_zero() || elapsed >= self.config.fade {
            return to;
        }
        let u = elapsed.as_secs_f64() / self.config.fade.as_secs_f64();
        from + (to - from) * u
    }

    /// True once the fade toward the current state has finished.
    pub fn is_settled(&self, now: Duration) -> bool {
        now.saturating_sub(self.fade.started_at) >= self.config.fade
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn index() -> FipsIndex {
        FipsIndex::build(vec![
            EducationRecord {
                fips: 1001,
                area_name: "Autauga County".to_string(),
                state: "AL".to_string(),
                bachelors_or_higher: 21.3,
            },
            EducationRecord {
                fips: 1003,
                area_name: "Baldwin County".to_string(),
                state: "AL".to_string(),
                bachelors_or_higher: 20.0,
            },
        ])
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn autauga_tooltip_text() {
        let index = index();
        assert_eq!(tooltip_text(index.get(1001).unwrap()), "Autauga County, AL: 21.3%");
        assert_eq!(tooltip_text(index.get(1003).unwrap()), "Baldwin County, AL: 20%");
    }

    #[test]
    fn starts_hidden_and_transparent() {
        let tip = TooltipController::new(TooltipConfig::WEB);
        assert_eq!(tip.visibility(), Visibility::Hidden);
        assert_eq!(tip.opacity(ms(0)), 0.0);
        assert_eq!(tip.content(), "");
    }

    #[test]
    fn over_shows_content_at_offset_and_fades_in() {
        let index = index();
        let mut tip = TooltipController::new(TooltipConfig::WEB);
        tip.handle(PointerEvent::Over { fips: 1001, x: 200.0, y: 300.0 }, &index, ms(1000))
            .unwrap();

        assert_eq!(tip.visibility(), Visibility::Visible);
        assert_eq!(tip.content(), "Autauga County, AL: 21.3%");
        assert_eq!(tip.anchor(), (155.0, 200.0));
        assert_eq!(tip.education(), Some(21.3));
        assert_eq!(tip.fips(), Some(1001));

        assert_eq!(tip.opacity(ms(1000)), 0.0);
        assert!((tip.opacity(ms(1025)) - 0.5).abs() < 1e-9);
        assert_eq!(tip.opacity(ms(1050)), 1.0);
        assert!(tip.is_settled(ms(1050)));
    }

    #[test]
    fn leave_fades_out() {
        let index = index();
        let mut tip = TooltipController::new(TooltipConfig::WEB);
        tip.handle(PointerEvent::Over { fips: 1001, x: 0.0, y: 0.0 }, &index, ms(0)).unwrap();
        tip.handle(PointerEvent::Leave, &index, ms(100)).unwrap();

        assert_eq!(tip.visibility(), Visibility::Hidden);
        assert_eq!(tip.opacity(ms(100)), 1.0);
        assert_eq!(tip.opacity(ms(150)), 0.0);
    }

    #[test]
    fn latest_event_wins_mid_fade() {
        let index = index();
        let mut tip = TooltipController::new(TooltipConfig::WEB);
        tip.handle(PointerEvent::Over { fips: 1001, x: 0.0, y: 0.0 }, &index, ms(0)).unwrap();
        // Halfway in, the pointer leaves: fade out starts from 0.5.
        tip.handle(PointerEvent::Leave, &index, ms(25)).unwrap();
        assert!((tip.opacity(ms(25)) - 0.5).abs() < 1e-9);
        assert!(tip.opacity(ms(50)) < 0.5);
        assert_eq!(tip.opacity(ms(75)), 0.0);

        // And back over a different county before it finishes.
        tip.handle(PointerEvent::Over { fips: 1003, x: 10.0, y: 10.0 }, &index, ms(60)).unwrap();
        assert_eq!(tip.visibility(), Visibility::Visible);
        assert_eq!(tip.content(), "Baldwin County, AL: 20%");
        assert_eq!(tip.opacity(ms(200)), 1.0);
    }

    #[test]
    fn repeated_moves_keep_visible_and_follow_pointer() {
        let index = index();
        let mut tip = TooltipController::new(TooltipConfig::TERMINAL);
        tip.handle(PointerEvent::Over { fips: 1001, x: 5.0, y: 5.0 }, &index, ms(0)).unwrap();
        tip.handle(PointerEvent::Over { fips: 1001, x: 6.0, y: 5.0 }, &index, ms(80)).unwrap();
        assert_eq!(tip.anchor(), (8.0, 6.0));
        assert_eq!(tip.opacity(ms(80)), 1.0);
    }

    #[test]
    fn unknown_fips_leaves_state_unchanged() {
        let index = index();
        let mut tip = TooltipController::new(TooltipConfig::WEB);
        tip.handle(PointerEvent::Over { fips: 1001, x: 0.0, y: 0.0 }, &index, ms(0)).unwrap();

        let err = tip
            .handle(PointerEvent::Over { fips: 1005, x: 9.0, y: 9.0 }, &index, ms(10))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingJoinKey);
        assert_eq!(tip.content(), "Autauga County, AL: 21.3%");
        assert_eq!(tip.anchor(), (-45.0, -100.0));
    }
}

//! Visibility state machine of the chat panel.
//!
//! The structural hidden state (out of the layout) and the visual hidden
//! state (animated opacity/scale) are separate. Opening removes the
//! structural state first and applies the visual one a frame later so the
//! transition runs. Closing applies the visual state first and only removes
//! the panel from the layout once the transition finished.

use crate::{i18n::Locale, render::RenderInstruction};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PanelPhase {
    #[default]
    Closed,
    /// In the layout, waiting one frame before animating in.
    Opening,
    Open,
    /// Animating out, still in the layout.
    Closing,
}

impl PanelPhase {
    pub fn is_open(&self) -> bool {
        matches!(self, PanelPhase::Opening | PanelPhase::Open)
    }
}

#[derive(Clone, Debug, Default)]
pub struct PanelController {
    phase: PanelPhase,
    /// Bumped on every close, identifies which close a notification is for.
    close_generation: u64,
}

impl PanelController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> PanelPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase.is_open()
    }

    /// Generation of the latest close, the one `transition_finished` expects.
    pub fn close_generation(&self) -> u64 {
        self.close_generation
    }

    /// Opens a closed (or closing) panel, closes an open (or opening) one.
    ///
    /// `locale` is used to refresh the strings when opening.
    pub fn toggle(&mut self, locale: Locale) -> Vec<RenderInstruction> {
        if self.phase.is_open() {
            self.close()
        } else {
            self.open(locale)
        }
    }

    pub fn open(&mut self, locale: Locale) -> Vec<RenderInstruction> {
        let mut instructions = match self.phase {
            PanelPhase::Opening | PanelPhase::Open => return vec![],
            PanelPhase::Closed => vec![
                RenderInstruction::ShowPanel,
                RenderInstruction::RequestFrame,
            ],
            // Still in the layout, a pending transition end will be ignored.
            PanelPhase::Closing => vec![RenderInstruction::RequestFrame],
        };

        self.phase = PanelPhase::Opening;
        instructions.extend([
            RenderInstruction::SetToggleOpen(true),
            RenderInstruction::FocusInput,
            RenderInstruction::Localize(locale),
        ]);
        instructions
    }

    pub fn close(&mut self) -> Vec<RenderInstruction> {
        if !self.phase.is_open() {
            return vec![];
        }

        self.phase = PanelPhase::Closing;
        self.close_generation += 1;
        vec![
            RenderInstruction::SetToggleOpen(false),
            RenderInstruction::SetPanelVisual(false),
            RenderInstruction::AwaitTransition {
                generation: self.close_generation,
            },
        ]
    }

    /// The frame requested while opening was rendered.
    pub fn frame_ready(&mut self) -> Vec<RenderInstruction> {
        if self.phase != PanelPhase::Opening {
            return vec![];
        }

        self.phase = PanelPhase::Open;
        vec![RenderInstruction::SetPanelVisual(true)]
    }

    /// The closing transition of the close numbered `generation` ended (or
    /// its fallback timer fired).
    ///
    /// Stale notifications are ignored: one arriving after the panel was
    /// reopened mid-transition, or a timer left over from an earlier close.
    pub fn transition_finished(&mut self, generation: u64) -> Vec<RenderInstruction> {
        if self.phase != PanelPhase::Closing || generation != self.close_generation {
            return vec![];
        }

        self.phase = PanelPhase::Closed;
        vec![RenderInstruction::HidePanel]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_then_close() {
        let mut panel = PanelController::new();
        assert_eq!(panel.phase(), PanelPhase::Closed);

        let opening = panel.toggle(Locale::En);
        assert_eq!(opening[0], RenderInstruction::ShowPanel);
        assert!(opening.contains(&RenderInstruction::RequestFrame));
        assert!(opening.contains(&RenderInstruction::FocusInput));
        assert!(opening.contains(&RenderInstruction::Localize(Locale::En)));
        assert!(!opening.contains(&RenderInstruction::SetPanelVisual(true)));
        assert!(panel.is_open());

        assert_eq!(panel.frame_ready(), vec![RenderInstruction::SetPanelVisual(true)]);
        assert_eq!(panel.phase(), PanelPhase::Open);

        let closing = panel.toggle(Locale::En);
        assert!(closing.contains(&RenderInstruction::SetPanelVisual(false)));
        assert!(closing.contains(&RenderInstruction::AwaitTransition { generation: 1 }));
        assert!(!closing.contains(&RenderInstruction::HidePanel));
        assert!(!panel.is_open());
        assert_eq!(panel.phase(), PanelPhase::Closing);

        assert_eq!(panel.transition_finished(panel.close_generation()), vec![RenderInstruction::HidePanel]);
        assert_eq!(panel.phase(), PanelPhase::Closed);
    }

    #[test]
    fn test_hide_only_after_transition() {
        let mut panel = PanelController::new();
        panel.toggle(Locale::De);
        panel.frame_ready();

        // Nothing but the transition end may hide the panel structurally.
        let mut emitted = panel.toggle(Locale::De);
        emitted.extend(panel.frame_ready());
        emitted.extend(panel.close());
        assert!(!emitted.contains(&RenderInstruction::HidePanel));

        assert_eq!(panel.transition_finished(panel.close_generation()), vec![RenderInstruction::HidePanel]);
        // A second notification, e.g. the fallback timer, is a no-op.
        assert!(panel.transition_finished(panel.close_generation()).is_empty());
    }

    #[test]
    fn test_reopen_while_closing() {
        let mut panel = PanelController::new();
        panel.toggle(Locale::De);
        panel.frame_ready();
        panel.toggle(Locale::De);

        let reopening = panel.toggle(Locale::De);
        assert!(!reopening.contains(&RenderInstruction::ShowPanel));
        assert!(reopening.contains(&RenderInstruction::RequestFrame));

        // The transition end of the aborted close must not hide the panel.
        assert!(panel.transition_finished(panel.close_generation()).is_empty());
        assert_eq!(panel.frame_ready(), vec![RenderInstruction::SetPanelVisual(true)]);
        assert_eq!(panel.phase(), PanelPhase::Open);
    }

    #[test]
    fn test_close_when_closed_is_noop() {
        let mut panel = PanelController::new();
        assert!(panel.close().is_empty());
        assert!(panel.frame_ready().is_empty());
        assert!(panel.transition_finished(panel.close_generation()).is_empty());
        assert_eq!(panel.phase(), PanelPhase::Closed);
    }

    #[test]
    fn test_close_while_opening() {
        let mut panel = PanelController::new();
        panel.toggle(Locale::De);

        let closing = panel.close();
        assert!(closing.contains(&RenderInstruction::SetPanelVisual(false)));
        // The frame requested by the open must not make it visible again.
        assert!(panel.frame_ready().is_empty());
        assert_eq!(panel.transition_finished(panel.close_generation()), vec![RenderInstruction::HidePanel]);
    }

    #[test]
    fn test_stale_timer_does_not_cut_a_later_close() {
        let mut panel = PanelController::new();
        panel.toggle(Locale::De);
        panel.frame_ready();
        panel.toggle(Locale::De);
        let first = panel.close_generation();

        panel.toggle(Locale::De);
        panel.frame_ready();
        let closing = panel.toggle(Locale::De);
        let second = panel.close_generation();
        assert_ne!(first, second);
        assert!(closing.contains(&RenderInstruction::AwaitTransition { generation: second }));

        // The timer of the first close fires while the second one animates.
        assert!(panel.transition_finished(first).is_empty());
        assert_eq!(panel.phase(), PanelPhase::Closing);

        assert_eq!(panel.transition_finished(second), vec![RenderInstruction::HidePanel]);
        assert_eq!(panel.phase(), PanelPhase::Closed);
    }
}

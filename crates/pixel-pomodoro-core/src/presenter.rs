//! Display-side callbacks.
//!
//! A host implements [`Presenter`] for whatever it renders to and feeds it
//! the events drained from a [`PomodoroSession`](crate::session::PomodoroSession).

use crate::events::Event;
use crate::timer::Phase;

pub trait Presenter {
    fn on_display_update(&mut self, display: &str);

    fn on_phase_changed(&mut self, label: &str);

    fn on_session_count_changed(&mut self, count: u64);

    /// Play the boundary alert.
    fn on_phase_boundary(&mut self, _from: Phase, _to: Phase) {}

    /// Stop the boundary alert if it is still playing.
    fn on_notification_silenced(&mut self) {}

    fn on_fault(&mut self, _message: &str) {}

    /// Route one event to the matching callback.
    fn present(&mut self, event: &Event) {
        match event {
            Event::DisplayUpdated { display, .. } => self.on_display_update(display),
            Event::PhaseChanged { label, .. } => self.on_phase_changed(label),
            Event::SessionCountChanged { count, .. } => self.on_session_count_changed(*count),
            Event::PhaseBoundary { from, to, .. } => self.on_phase_boundary(*from, *to),
            Event::NotificationSilenced { .. } => self.on_notification_silenced(),
            Event::DriverFault { message, .. } => self.on_fault(message),
            Event::Started { .. } | Event::Reset { .. } => {}
        }
    }
}

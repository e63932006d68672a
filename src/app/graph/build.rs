use std::borrow::Cow;

use tracing::debug;

use crate::layout::{LayoutState, Viewport, reconcile, tween};

use super::super::{LayoutCache, Transition, ViewModel};

fn ease_cubic_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

impl ViewModel {
    fn transition_progress(&self, transition: &Transition, now: f64) -> f32 {
        let duration_secs = self.session.config().transition_ms as f64 / 1000.0;
        if duration_secs <= 0.0 {
            return 1.0;
        }
        ((now - transition.started_secs) / duration_secs).clamp(0.0, 1.0) as f32
    }

    /// Recomputes the layout when the canvas size or the level of detail changed.
    /// A level change starts a transition from whatever frame was on screen.
    pub(in crate::app) fn refresh_layout(&mut self, viewport: Viewport, now: f64) {
        let level = self.session.level();
        let level_changed = match &self.layout_cache {
            Some(cache) if cache.viewport == viewport && cache.level == level => return,
            Some(cache) => cache.level != level,
            None => false,
        };

        let next = self.session.compute_layout(viewport);
        let on_screen = self.frame_at(now).map(Cow::into_owned);

        self.transition = None;
        if let Some(from) = on_screen {
            let diff = reconcile(&from, &next);
            if diff.is_unchanged() {
                debug!("layout recomputed with the same elements");
            } else {
                debug!(
                    entered = diff.nodes.entered.len(),
                    retained = diff.nodes.retained.len(),
                    exited = diff.nodes.exited.len(),
                    edges_entered = diff.edges.entered.len(),
                    edges_exited = diff.edges.exited.len(),
                    "layout reconciled"
                );
            }

            if level_changed && self.session.config().transition_ms > 0 {
                self.transition = Some(Transition {
                    from,
                    started_secs: now,
                });
            }
        }

        self.layout_cache = Some(LayoutCache {
            viewport,
            level,
            layout: next,
        });
    }

    /// Ends a finished transition. Returns `true` while one is still running.
    pub(in crate::app) fn settle_transition(&mut self, now: f64) -> bool {
        let Some(transition) = &self.transition else {
            return false;
        };

        if self.transition_progress(transition, now) >= 1.0 {
            self.transition = None;
            false
        } else {
            true
        }
    }

    pub(in crate::app) fn frame_at(&self, now: f64) -> Option<Cow<'_, LayoutState>> {
        let cache = self.layout_cache.as_ref()?;
        let Some(transition) = &self.transition else {
            return Some(Cow::Borrowed(&cache.layout));
        };

        let t = ease_cubic_in_out(self.transition_progress(transition, now));
        Some(Cow::Owned(tween(
            &transition.from,
            &cache.layout,
            &self.session.report().tree,
            t,
            self.session.config(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::ease_cubic_in_out;

    #[test]
    fn easing_is_pinned_at_both_ends() {
        assert_eq!(ease_cubic_in_out(0.0), 0.0);
        assert_eq!(ease_cubic_in_out(1.0), 1.0);
        assert!((ease_cubic_in_out(0.5) - 0.5).abs() < 1e-6);
        assert!(ease_cubic_in_out(0.25) < 0.25);
    }
}

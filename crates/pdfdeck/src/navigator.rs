//! Operator-facing session state: the current page, the frozen audience page,
//! the blackout color and the presentation clock.
//!
//! The navigator holds no reference to the graph; every operation takes the
//! graph it navigates. Both output surfaces read it after each command:
//! the presenter surface follows [`Navigator::current`], the audience surface
//! follows [`Navigator::display_target`].

use image::Rgba;

use crate::error::{Error, Result};
use crate::graph::{Link, PrevPolicy, SlideGraph};
use crate::timer::Timer;

pub type Color = Rgba<u8>;

pub const BLACK: Color = Rgba([0, 0, 0, 255]);
pub const WHITE: Color = Rgba([255, 255, 255, 255]);

/// Whether a command changed the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Moved,
    Stayed,
}

impl Movement {
    pub fn moved(self) -> bool {
        self == Self::Moved
    }
}

/// Number of independent output surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surfaces {
    Single,
    Dual,
}

/// What [`Navigator::escape`] undid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escape {
    ClearedColor,
    Unfrozen,
    Paused,
    /// Nothing left to undo
    Quit,
}

#[derive(Debug, Clone)]
pub struct Navigator {
    current: usize,
    freeze_target: Option<usize>,
    color_override: Option<Color>,
    timer: Timer,
    surfaces: Surfaces,
    prev_policy: PrevPolicy,
}

impl Navigator {
    /// Start on the first slide.
    pub fn new(graph: &SlideGraph, surfaces: Surfaces) -> Self {
        Self {
            current: graph.layout()[0],
            freeze_target: None,
            color_override: None,
            timer: Timer::new(),
            surfaces,
            prev_policy: PrevPolicy::default(),
        }
    }

    pub fn with_prev_policy(mut self, policy: PrevPolicy) -> Self {
        self.prev_policy = policy;
        self
    }

    pub fn prev_policy(&self) -> PrevPolicy {
        self.prev_policy
    }

    pub fn surfaces(&self) -> Surfaces {
        self.surfaces
    }

    /// Page shown on the presenter surface.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Page shown on the audience surface.
    pub fn display_target(&self) -> usize {
        self.freeze_target.unwrap_or(self.current)
    }

    pub fn freeze_target(&self) -> Option<usize> {
        self.freeze_target
    }

    pub fn is_frozen(&self) -> bool {
        self.freeze_target.is_some()
    }

    pub fn color_override(&self) -> Option<Color> {
        self.color_override
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// `(logical index, slide count)` of the current page.
    pub fn progress(&self, graph: &SlideGraph) -> (usize, usize) {
        let index = graph
            .node(self.current)
            .map(|n| n.logical_index())
            .unwrap_or(0);
        (index, graph.slide_count())
    }

    /// First page of the next slide, shown as the presenter's preview.
    pub fn upcoming(&self, graph: &SlideGraph) -> Option<usize> {
        graph.next_page(self.current, true)
    }

    pub fn upcoming_overlay(&self, graph: &SlideGraph) -> Option<usize> {
        graph.next_overlay(self.current)
    }

    pub fn next(&mut self, graph: &SlideGraph, skip_overlay: bool) -> Movement {
        let target = graph.next_page(self.current, skip_overlay);
        self.move_to(target)
    }

    pub fn prev(&mut self, graph: &SlideGraph, skip_overlay: bool) -> Movement {
        let target = graph.prev_page(self.current, skip_overlay, self.prev_policy);
        self.move_to(target)
    }

    /// Next slide, skipping the remaining overlays.
    pub fn forward(&mut self, graph: &SlideGraph) -> Movement {
        self.next(graph, true)
    }

    pub fn backward(&mut self, graph: &SlideGraph) -> Movement {
        self.prev(graph, true)
    }

    /// Next overlay of the current slide; never leaves the slide.
    pub fn next_overlay(&mut self, graph: &SlideGraph) -> Movement {
        let target = graph.next_overlay(self.current);
        self.move_to(target)
    }

    pub fn prev_overlay(&mut self, graph: &SlideGraph) -> Movement {
        let target = graph.prev_overlay(self.current);
        self.move_to(target)
    }

    pub fn first_of_group(&mut self, graph: &SlideGraph) -> Movement {
        let target = graph.first_of_group(self.current);
        self.move_to(target)
    }

    /// Open on logical slide `slide` without starting the clock.
    pub fn with_start_slide(mut self, graph: &SlideGraph, slide: isize) -> Result<Self> {
        self.place(graph, slide, 0)?;
        Ok(self)
    }

    /// Jump to overlay `overlay` of logical slide `slide`.
    ///
    /// An overlay past the end of the slide lands on its last overlay.
    pub fn set_position(&mut self, graph: &SlideGraph, slide: isize, overlay: isize) -> Result<()> {
        self.place(graph, slide, overlay)?;
        self.timer.start();
        Ok(())
    }

    fn place(&mut self, graph: &SlideGraph, slide: isize, overlay: isize) -> Result<()> {
        let invalid = Error::InvalidPosition { slide, overlay };
        if slide < 0 || overlay < 0 {
            return Err(invalid);
        }
        let group = graph.slide(slide as usize).ok_or(invalid)?;
        let position = (overlay as usize).min(group.count() - 1);
        self.current = group.members()[position];
        Ok(())
    }

    /// Back to the first slide.
    pub fn start(&mut self, graph: &SlideGraph) {
        self.current = graph.layout()[0];
    }

    /// Back to the first slide with a cleared clock.
    pub fn reset(&mut self, graph: &SlideGraph) {
        self.start(graph);
        self.timer.reset();
    }

    /// Pin the audience surface to the current page, or release it.
    ///
    /// Returns `false` when there is no separate audience surface.
    pub fn freeze(&mut self) -> bool {
        if self.surfaces == Surfaces::Single {
            return false;
        }
        self.freeze_target = match self.freeze_target {
            Some(_) => None,
            None => Some(self.current),
        };
        true
    }

    /// Fill the audience surface with `color`; the same color again clears it.
    pub fn trigger_color(&mut self, color: Color) {
        self.color_override = if self.color_override == Some(color) {
            None
        } else {
            Some(color)
        };
    }

    pub fn jump_to_link(&mut self, link: &Link) -> Movement {
        self.move_to(Some(link.target))
    }

    pub fn toggle_pause(&mut self) {
        self.timer.toggle();
    }

    /// Undo the most recent presentation mode: color, then freeze, then a
    /// running clock.
    pub fn escape(&mut self) -> Escape {
        if self.color_override.take().is_some() {
            return Escape::ClearedColor;
        }
        if self.freeze_target.take().is_some() {
            return Escape::Unfrozen;
        }
        if self.timer.is_running() {
            self.timer.pause();
            return Escape::Paused;
        }
        Escape::Quit
    }

    /// Every movement command starts the clock, even one that stays put.
    fn move_to(&mut self, target: Option<usize>) -> Movement {
        self.timer.start();
        match target {
            Some(page) if page != self.current => {
                self.current = page;
                Movement::Moved
            }
            _ => Movement::Stayed,
        }
    }
}

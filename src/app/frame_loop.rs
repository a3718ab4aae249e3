use eframe::egui::Context;

/// Something that can be asked for one more frame.
pub(crate) trait FrameScheduler {
    fn request_frame(&mut self);
    fn cancel(&mut self);
}

pub(crate) struct EguiScheduler {
    ctx: Context,
}

impl EguiScheduler {
    pub(crate) fn new(ctx: Context) -> Self {
        Self { ctx }
    }
}

impl FrameScheduler for EguiScheduler {
    fn request_frame(&mut self) {
        self.ctx.request_repaint();
    }

    // egui has no pending-repaint handle to revoke; not re-arming is enough.
    fn cancel(&mut self) {}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct FrameTick {
    /// Simulation clock, advanced by a fixed step per frame.
    pub(crate) clock: f64,
    /// Host time in seconds, used for time-based animation.
    pub(crate) time: f64,
}

/// Continuous redraw loop with an explicit lifetime. While running, every
/// frame re-arms the scheduler; after `stop` no further frames are asked for.
pub(crate) struct FrameLoop<S: FrameScheduler> {
    scheduler: S,
    running: bool,
    clock: f64,
    clock_step: f64,
}

impl<S: FrameScheduler> FrameLoop<S> {
    pub(crate) fn new(scheduler: S, clock_step: f64) -> Self {
        Self {
            scheduler,
            running: false,
            clock: 0.0,
            clock_step,
        }
    }

    pub(crate) fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.scheduler.request_frame();
    }

    pub(crate) fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.scheduler.cancel();
    }

    #[cfg(test)]
    pub(crate) fn is_running(&self) -> bool {
        self.running
    }

    pub(crate) fn begin_frame(&mut self, time: f64) -> Option<FrameTick> {
        if !self.running {
            return None;
        }

        self.scheduler.request_frame();
        let tick = FrameTick {
            clock: self.clock,
            time,
        };
        self.clock += self.clock_step;
        Some(tick)
    }
}

impl<S: FrameScheduler> Drop for FrameLoop<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

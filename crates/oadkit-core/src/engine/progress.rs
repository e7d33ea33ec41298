/// Events emitted while a problem is being assembled.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    /// A counted task inside the current phase, such as visiting model nodes.
    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards [`Progress`] events to an optional callback.
///
/// The default reporter drops every event, so library callers that do not care about
/// progress can pass `&ProgressReporter::new()`.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    /// Runs `stage` between a `PhaseStart` and a `PhaseFinish` event.
    ///
    /// The finish event is sent whether or not the stage succeeds.
    pub fn phase<T>(&self, name: &'static str, stage: impl FnOnce() -> T) -> T {
        self.report(Progress::PhaseStart { name });
        let result = stage();
        self.report(Progress::PhaseFinish);
        result
    }
}

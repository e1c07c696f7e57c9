use tracing::{Event, Subscriber};
use tracing_subscriber::{
    fmt::{
        self,
        format::{Format, FormatEvent, FormatFields, Writer},
        FmtContext,
    },
    registry::LookupSpan,
};

/// Indents each event by how deep it is nested in spans, so stage logs line up under the run.
pub struct PrettyFormatter {
    inner: Format,
    verbose: bool,
}

impl PrettyFormatter {
    pub fn new(ansi: bool, verbose: bool) -> Self {
        Self {
            inner: fmt::format()
                .with_ansi(ansi)
                .with_target(verbose)
                .with_file(false)
                .with_line_number(verbose)
                .with_level(true),
            verbose,
        }
    }
}

impl<S, N> FormatEvent<S, N> for PrettyFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let depth = ctx.event_scope().map(|scope| scope.count()).unwrap_or(0);

        if self.verbose {
            for _ in 0..depth.saturating_sub(1) {
                write!(writer, "  ")?;
            }
        }

        if depth > 0 {
            write!(writer, "└─")?;
        } else {
            write!(writer, "  ")?;
        }

        self.inner.format_event(ctx, writer, event)
    }
}

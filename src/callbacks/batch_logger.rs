use std::io::{self, Stdout, Write};

use log::warn;

use crate::callbacks::Callback;
use crate::metrics::MetricLogs;

/// Writes `End of batch = <batch>, loss = <loss>` after every training batch.
///
/// Batches whose logs carry no `"loss"` entry produce no output.
pub struct BatchEndLogger<W: Write = Stdout> {
    out: W,
}

impl BatchEndLogger<Stdout> {
    pub fn new() -> Self {
        BatchEndLogger { out: io::stdout() }
    }
}

impl Default for BatchEndLogger<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> BatchEndLogger<W> {
    pub fn with_writer(out: W) -> Self {
        BatchEndLogger { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Callback for BatchEndLogger<W> {
    fn on_batch_end(&mut self, batch: usize, logs: &MetricLogs) {
        let Some(loss) = logs.get("loss") else {
            return;
        };
        if let Err(e) = writeln!(self.out, "End of batch = {batch}, loss = {loss}") {
            warn!("batch logger could not write: {e}");
        }
    }
}

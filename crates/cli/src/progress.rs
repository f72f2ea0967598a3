use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use shortid_backfill::{KindStats, ProgressEvent, ProgressSink};
use shortid_codec::EntityKind;
use std::collections::HashMap;
use std::sync::Mutex;

/// Renders one progress bar per collection as page events arrive.
pub struct BarSink {
    multi: MultiProgress,
    bars: Mutex<HashMap<EntityKind, ProgressBar>>,
    /// Suppress bars entirely when the report goes to stdout as JSON.
    disabled: bool,
}

impl BarSink {
    pub fn new(disabled: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
            disabled,
        }
    }

    pub fn clear(&self) {
        let _ = self.multi.clear();
    }
}

impl ProgressSink for BarSink {
    fn page_done(&self, event: &ProgressEvent) {
        if self.disabled {
            return;
        }

        let mut bars = self.bars.lock().expect("progress bars poisoned");
        let bar = bars.entry(event.kind).or_insert_with(|| {
            let bar = self.multi.add(ProgressBar::new(event.total));
            bar.set_style(
                ProgressStyle::with_template("{prefix:>14} [{bar:40.cyan/blue}] {pos}/{len}")
                    .expect("valid progress template")
                    .progress_chars("=> "),
            );
            bar.set_prefix(event.kind.name());
            bar
        });
        bar.set_position(event.processed.min(event.total));
    }

    fn collection_done(&self, kind: EntityKind, stats: &KindStats) {
        if self.disabled {
            return;
        }

        let mut bars = self.bars.lock().expect("progress bars poisoned");
        if let Some(bar) = bars.remove(&kind) {
            if stats.skipped > 0 || stats.errors > 0 {
                bar.finish_with_message(format!(
                    "{} skipped, {} errors",
                    stats.skipped, stats.errors
                ));
            } else {
                bar.finish();
            }
        }
    }
}

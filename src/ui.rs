//! Terminal progress display.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::models::{ScanPhase, ScanProgress};

pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::with_template("{prefix} {spinner:.green} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            bar.set_prefix(style("SCAN").cyan().bold().to_string());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        };
        Self { bar }
    }

    /// Consume progress events until the channel closes. Run this on
    /// the async side while the scan itself occupies a blocking thread.
    pub async fn run(self, mut events: mpsc::Receiver<ScanProgress>) {
        let mut bounded = false;

        while let Some(event) = events.recv().await {
            match event.phase {
                ScanPhase::Idle => {}
                ScanPhase::Discovering => {
                    self.bar
                        .set_message(format!("discovering files... {}", event.current));
                }
                ScanPhase::Extracting => {
                    if let Some(total) = event.total {
                        if !bounded {
                            bounded = true;
                            self.bar.set_length(total as u64);
                            self.bar.set_style(
                                ProgressStyle::with_template(
                                    "{prefix} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}",
                                )
                                .unwrap_or_else(|_| ProgressStyle::default_bar())
                                .progress_chars("█▉▊▋▌▍▎▏  "),
                            );
                        }
                    }
                    self.bar.set_position(event.current as u64);
                    self.bar.set_message(short_name(&event.current_file));
                }
                ScanPhase::Aggregating => {
                    self.bar.set_message("aggregating...".to_string());
                }
                ScanPhase::Completed => {
                    self.bar.finish_and_clear();
                }
                ScanPhase::Cancelled => {
                    self.bar
                        .abandon_with_message(style("cancelled").red().to_string());
                }
            }
        }

        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

fn short_name(path: &str) -> String {
    std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("/proj/textures/Hero.png"), "Hero.png");
        assert_eq!(short_name(""), "");
    }

    #[tokio::test]
    async fn test_run_drains_channel() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(ScanProgress {
            phase: ScanPhase::Discovering,
            current: 10,
            total: None,
            current_file: String::new(),
        })
        .await
        .unwrap();
        tx.send(ScanProgress {
            phase: ScanPhase::Completed,
            current: 10,
            total: Some(10),
            current_file: String::new(),
        })
        .await
        .unwrap();
        drop(tx);

        ProgressReporter::new(true).run(rx).await;
    }
}

//! One-shot generation from the command line: request a document set and
//! print each section to stdout as it completes.

use anyhow::{Result, bail};
use futures::StreamExt;

use guru_core::prompt;
use guru_core::section::{ANNUAL_PLAN, DAILY_PACKAGE, DAILY_PACKAGE_WITH_VIDEO};
use guru_core::{Generator, demux_stream};

pub async fn run_generate(
    generator: &dyn Generator,
    subject: &str,
    grade: &str,
    topic: Option<&str>,
    with_video: bool,
    planning: bool,
) -> Result<()> {
    let (prompt, sections) = if planning {
        (prompt::annual_plan(subject, grade, ANNUAL_PLAN), ANNUAL_PLAN)
    } else {
        let Some(topic) = topic else {
            bail!("--topic is required unless --planning is set");
        };
        let sections = if with_video {
            DAILY_PACKAGE_WITH_VIDEO
        } else {
            DAILY_PACKAGE
        };
        (
            prompt::lesson_package(subject, grade, topic, sections),
            sections,
        )
    };

    tracing::debug!(generator = generator.name(), "requesting {} sections", sections.len());
    let fragments = generator.stream(&prompt).await?;
    let mut events = demux_stream(fragments, sections);

    let mut received = 0usize;
    while let Some(event) = events.next().await {
        println!("=== {} ===", event.event_type);
        println!("{}", event.data);
        println!();
        received += 1;
    }

    if received < sections.len() {
        tracing::warn!(
            received,
            expected = sections.len(),
            "stream ended before every section arrived"
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

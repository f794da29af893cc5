use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::time::Duration;

use super::PlanDriver;
use crate::parsers::has_table;

/// In-memory driver: each page is a list of frame documents.
#[derive(Debug, Default)]
pub struct FixtureDriver {
    pub pages: Vec<Vec<String>>,
    pub current: usize,
    /// Page index whose `frames()` call fails.
    pub fail_on_page: Option<usize>,
    /// Frames whose table check hangs for a minute.
    pub slow_frames: Vec<usize>,
    /// Frames whose table check fails.
    pub broken_frames: Vec<usize>,
    /// Keep reporting a next page after the last one.
    pub endless: bool,
    pub next_page_calls: usize,
}

impl FixtureDriver {
    pub fn new(pages: Vec<Vec<String>>) -> Self {
        Self {
            pages,
            ..Default::default()
        }
    }
}

#[async_trait]
impl PlanDriver for FixtureDriver {
    type Frame = usize;

    async fn login(&mut self, _username: &str, password: &str) -> Result<bool> {
        Ok(password == "secret")
    }

    async fn open_plan(&mut self) -> Result<()> {
        Ok(())
    }

    async fn frames(&mut self) -> Result<Vec<usize>> {
        if self.fail_on_page == Some(self.current) {
            return Err(anyhow!("navigation failed on page {}", self.current + 1));
        }
        let count = self.pages.get(self.current).map(Vec::len).unwrap_or(0);
        Ok((0..count).collect())
    }

    async fn has_table(&mut self, frame: &usize) -> Result<bool> {
        if self.slow_frames.contains(frame) {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        if self.broken_frames.contains(frame) {
            return Err(anyhow!("frame {} crashed", frame));
        }
        Ok(has_table(&self.frame_html(frame).await?))
    }

    async fn frame_html(&mut self, frame: &usize) -> Result<String> {
        self.pages
            .get(self.current)
            .and_then(|frames| frames.get(*frame))
            .cloned()
            .ok_or_else(|| anyhow!("frame {} detached", frame))
    }

    async fn next_page(&mut self) -> Result<bool> {
        self.next_page_calls += 1;
        if self.current + 1 < self.pages.len() {
            self.current += 1;
            Ok(true)
        } else {
            Ok(self.endless)
        }
    }
}

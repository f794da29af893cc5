//! Browser-facing capabilities the extraction engine consumes.
//!
//! The engine never looks at how a page is reached; it asks a [`PlanDriver`]
//! for the sub-documents of the current page, for their rendered HTML, and
//! for the next page.

use anyhow::Result;
use async_trait::async_trait;
use std::fmt::Debug;

mod http;
pub use http::HttpDriver;

#[cfg(test)]
pub mod fixture;

#[async_trait]
pub trait PlanDriver: Send {
    /// Handle to one sub-document of the current page.
    type Frame: Debug + Send + Sync;

    /// Fills and submits the login form; `false` when the portal did not accept it.
    async fn login(&mut self, username: &str, password: &str) -> Result<bool>;

    /// Activates the element leading to the substitution plan.
    async fn open_plan(&mut self) -> Result<()>;

    /// Sub-documents of the current page in enumeration order.
    async fn frames(&mut self) -> Result<Vec<Self::Frame>>;

    /// Whether the sub-document renders at least one table.
    async fn has_table(&mut self, frame: &Self::Frame) -> Result<bool>;

    /// Rendered HTML of the sub-document.
    async fn frame_html(&mut self, frame: &Self::Frame) -> Result<String>;

    /// Advances to the next result page; `false` when there is none.
    async fn next_page(&mut self) -> Result<bool>;
}

//! Artifact persistence
//!
//! Every successful render produces three sibling files named after the
//! destination:
//!
//! ```text
//! <root>/htmls/<safe>.html
//! <root>/images/<safe>.png
//! <root>/urls/<safe>_links.txt
//! ```

use crate::render::RenderResult;
use crate::target::Destination;
use crate::CrawlError;
use std::path::{Path, PathBuf};

/// Subdirectory for serialized markup
pub const HTML_DIR: &str = "htmls";

/// Subdirectory for screenshots
pub const IMAGE_DIR: &str = "images";

/// Subdirectory for link lists
pub const LINKS_DIR: &str = "urls";

/// Paths of the three artifacts belonging to one destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSet {
    pub markup: PathBuf,
    pub image: PathBuf,
    pub links: PathBuf,
}

impl ArtifactSet {
    /// Lists the three paths in write order
    pub fn paths(&self) -> [&Path; 3] {
        [
            self.markup.as_path(),
            self.image.as_path(),
            self.links.as_path(),
        ]
    }
}

/// Writes render results under a fixed output root
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    root: PathBuf,
}

impl ArtifactWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the output root and its three subdirectories
    pub fn ensure_layout(&self) -> Result<(), CrawlError> {
        for dir in [HTML_DIR, IMAGE_DIR, LINKS_DIR] {
            std::fs::create_dir_all(self.root.join(dir))?;
        }
        Ok(())
    }

    /// Computes where the artifacts for a destination live
    pub fn artifact_set(&self, destination: &Destination) -> ArtifactSet {
        let safe = destination.safe_name();
        ArtifactSet {
            markup: self.root.join(HTML_DIR).join(format!("{}.html", safe)),
            image: self.root.join(IMAGE_DIR).join(format!("{}.png", safe)),
            links: self.root.join(LINKS_DIR).join(format!("{}_links.txt", safe)),
        }
    }

    /// Writes the markup, screenshot and link list for a destination
    ///
    /// All three writes are attempted even when an earlier one fails; the
    /// first failure is returned. Files that were written stay on disk.
    ///
    /// # Returns
    ///
    /// * `Ok(ArtifactSet)` - All three files were written
    /// * `Err(CrawlError::ArtifactWrite)` - At least one write failed
    pub async fn write(
        &self,
        destination: &Destination,
        result: &RenderResult,
    ) -> Result<ArtifactSet, CrawlError> {
        let set = self.artifact_set(destination);
        let link_list = link_list(&result.links);

        let writes = [
            (&set.markup, result.markup.as_bytes()),
            (&set.image, result.image.as_slice()),
            (&set.links, link_list.as_bytes()),
        ];

        let mut first_error = None;
        for (path, contents) in writes {
            if let Err(source) = tokio::fs::write(path, contents).await {
                tracing::debug!("Failed to write {}: {}", path.display(), source);
                if first_error.is_none() {
                    first_error = Some(CrawlError::ArtifactWrite {
                        path: path.clone(),
                        source,
                    });
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(set),
        }
    }
}

/// Joins links one per line, without a trailing newline
///
/// Empty entries are dropped so every line of the file is a link.
fn link_list(links: &[String]) -> String {
    links
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

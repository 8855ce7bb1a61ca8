use crate::target::Destination;
use crate::CrawlError;
use std::path::Path;

/// Header line of YAML-style target lists
const LIST_HEADER: &str = "urls:";

/// List item marker stripped from each entry
const LIST_MARKER: &str = "- ";

/// Loads the ordered list of destinations from a target file
///
/// # Arguments
///
/// * `path` - Path to the target list
///
/// # Returns
///
/// * `Ok(Vec<Destination>)` - Destinations in file order (possibly empty)
/// * `Err(CrawlError::TargetSource)` - The file could not be read
pub fn load_targets(path: &Path) -> Result<Vec<Destination>, CrawlError> {
    let content = std::fs::read_to_string(path).map_err(|source| CrawlError::TargetSource {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(parse_targets(&content))
}

/// Parses target list content
///
/// # Format
///
/// - Blank lines are skipped
/// - Lines starting with `#` are comments
/// - A line starting with `urls:` is a header and skipped
/// - A leading `- ` list marker is stripped; an item with nothing after the
///   marker is skipped
/// - Everything else is one destination
///
/// # Example
///
/// ```
/// use onion_lens::target::parse_targets;
///
/// let targets = parse_targets("urls:\n  - abc.onion\n# skip\n  - http://def.onion\n");
/// assert_eq!(targets.len(), 2);
/// assert_eq!(targets[1].url(), "http://def.onion");
/// ```
pub fn parse_targets(content: &str) -> Vec<Destination> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| {
            !line.is_empty() && !line.starts_with('#') && !line.starts_with(LIST_HEADER)
        })
        .map(|line| match line {
            // bare marker left by trimming "- " on an empty item
            "-" => "",
            _ => line.strip_prefix(LIST_MARKER).unwrap_or(line),
        })
        .filter_map(Destination::new)
        .collect()
}
